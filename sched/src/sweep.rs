use crate::{Task, TaskOpts};
use async_trait::async_trait;
use chrono::Utc;
use persister::VehiclePersisterExt;
use persister::error::PersisterError;
use persister::sweep::{MAX_RETENTION_DAYS, SweepReport, purge_sold};
use std::sync::Arc;
use tracing::{error, warn};

/// Task option overriding the configured retention for a single run.
pub const RETENTION_DAYS_OPT: &str = "retention_days";

/// Periodically hard-deletes sold vehicles past their retention.
pub struct SoldSweepTask {
    persister: Arc<dyn VehiclePersisterExt>,
    retention_days: u32,
}

impl SoldSweepTask {
    pub fn new(persister: Arc<dyn VehiclePersisterExt>, retention_days: u32) -> Self {
        Self {
            persister,
            retention_days,
        }
    }

    fn retention_days(&self, opts: Option<&TaskOpts>) -> u32 {
        let Some(raw) = opts.and_then(|o| o.get(RETENTION_DAYS_OPT)) else {
            return self.retention_days;
        };
        match raw.trim().parse::<u32>() {
            Ok(days) if days <= MAX_RETENTION_DAYS => days,
            _ => {
                warn!(%raw, default = self.retention_days, "invalid retention override ignored");
                self.retention_days
            }
        }
    }

    pub async fn sweep(&self, opts: Option<&TaskOpts>) -> Result<SweepReport, PersisterError> {
        let retention = chrono::Duration::days(self.retention_days(opts).into());
        purge_sold(self.persister.as_ref(), retention, Utc::now().naive_utc()).await
    }
}

#[async_trait]
impl Task for SoldSweepTask {
    async fn run(&self, opts: Option<&TaskOpts>) {
        if let Err(e) = self.sweep(opts).await {
            error!(persister_error = ?e, "sold sweep failed");
        }
    }

    fn descriptor(&self) -> &'static str {
        "sold sweep"
    }
}

#[cfg(test)]
mod tests {
    use crate::sweep::{RETENTION_DAYS_OPT, SoldSweepTask};
    use crate::{Task, TaskOpts};
    use chrono::{Duration, Utc};
    use common::persistence::models::vehicle::{NewVehicle, Vehicle};
    use persister::VehiclePersisterExt;
    use persister::memory::MemoryVehiclePersister;
    use std::sync::Arc;

    async fn store_with_sold(days_ago: i64) -> Arc<MemoryVehiclePersister> {
        let now = Utc::now().naive_utc();
        let mut vehicle = Vehicle::from_new(
            NewVehicle {
                inventory_number: "S-9".to_string(),
                status: "sold".to_string(),
                make: "Opel".to_string(),
                model: "Astra".to_string(),
                title: "Opel Astra".to_string(),
                ..NewVehicle::default()
            },
            now - Duration::days(90),
            now - Duration::days(days_ago),
        );
        vehicle.sold_at = Some(now - Duration::days(days_ago));

        let store = Arc::new(MemoryVehiclePersister::new());
        store.insert_row(vehicle).await;
        store
    }

    #[tokio::test]
    async fn test_sweep_uses_configured_retention() {
        let store = store_with_sold(10).await;
        let task = SoldSweepTask::new(store.clone(), 7);

        let report = task.sweep(None).await.unwrap();
        assert_eq!(report.deleted, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_retention_override_keeps_recent_sales() {
        let store = store_with_sold(10).await;
        let task = SoldSweepTask::new(store.clone(), 7);
        let opts = TaskOpts::from([(RETENTION_DAYS_OPT.to_string(), "30".to_string())]);

        task.run(Some(&opts)).await;
        assert!(store.find_vehicle("S-9").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_override_falls_back() {
        let store = store_with_sold(10).await;
        let task = SoldSweepTask::new(store.clone(), 7);
        let opts = TaskOpts::from([(RETENTION_DAYS_OPT.to_string(), "soon".to_string())]);

        let report = task.sweep(Some(&opts)).await.unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(task.descriptor(), "sold sweep");
    }

    #[tokio::test]
    async fn test_oversized_override_falls_back() {
        let store = store_with_sold(10).await;
        let task = SoldSweepTask::new(store.clone(), 7);
        let opts = TaskOpts::from([(RETENTION_DAYS_OPT.to_string(), "4000000000".to_string())]);

        let report = task.sweep(Some(&opts)).await.unwrap();
        assert_eq!(report.deleted, 1);
        assert!(store.is_empty().await);
    }
}
