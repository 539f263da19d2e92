pub mod error;
pub mod feed;
pub mod memory;
pub mod pg;
pub mod sweep;

use crate::error::PersisterError;
use crate::memory::MemoryVehiclePersister;
use crate::pg::PgVehiclePersister;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::persistence::init_pg_pool;
use common::persistence::models::vehicle::{NewVehicle, Vehicle, VehicleStatus};
use common::retry_async;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Catalog query. Every filter is optional except the status, which defaults to active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleFilter {
    pub status: VehicleStatus,
    /// Matched case-insensitively against the whole make.
    pub make: Option<String>,
    pub fuel_type: Option<String>,
    pub max_price: Option<i32>,
    pub min_year: Option<i32>,
    pub max_mileage: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl VehicleFilter {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(0, MAX_LIST_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Row predicate equivalent to the sql the Postgres persister builds. Rows lacking a
    /// filtered column never match.
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        vehicle.vehicle_status() == self.status
            && self
                .make
                .as_ref()
                .is_none_or(|make| vehicle.make.to_lowercase() == make.to_lowercase())
            && self
                .fuel_type
                .as_ref()
                .is_none_or(|fuel| vehicle.fuel_type.as_ref() == Some(fuel))
            && self
                .max_price
                .is_none_or(|max| vehicle.price.is_some_and(|price| price <= max))
            && self
                .min_year
                .is_none_or(|min| vehicle.model_year.is_some_and(|year| year >= min))
            && self
                .max_mileage
                .is_none_or(|max| vehicle.mileage.is_some_and(|mileage| mileage <= max))
    }
}

#[async_trait]
pub trait VehiclePersisterExt: Send + Sync {
    /// Inserts or replaces the row keyed by the inventory number. `sold_at` is derived from the
    /// previous row, whatever the caller put into it.
    async fn upsert_vehicle(&self, vehicle: NewVehicle) -> Result<UpsertOutcome, PersisterError>;

    /// Returns false when no row carries `inventory_number`.
    async fn set_status(
        &self,
        inventory_number: &str,
        status: VehicleStatus,
        now: NaiveDateTime,
    ) -> Result<bool, PersisterError>;

    /// Returns false when no row carries `inventory_number`.
    async fn delete_vehicle(&self, inventory_number: &str) -> Result<bool, PersisterError>;

    async fn find_vehicle(&self, inventory_number: &str) -> Result<Option<Vehicle>, PersisterError>;

    /// Newest first by `updated_at`.
    async fn list_vehicles(&self, filter: &VehicleFilter) -> Result<Vec<Vehicle>, PersisterError>;

    /// Inventory numbers of sold rows whose `sold_at` (or `updated_at` when it was never stamped)
    /// lies before `cutoff`.
    async fn expired_sold(&self, cutoff: NaiveDateTime) -> Result<Vec<String>, PersisterError>;

    /// Deletes the row only if it is still sold and expired by `cutoff`, checked in the same
    /// statement. Returns false when the row is gone or was relisted in the meantime.
    async fn delete_expired_sold(
        &self,
        inventory_number: &str,
        cutoff: NaiveDateTime,
    ) -> Result<bool, PersisterError>;
}

/// `sold_at` for a row moving from `previous` (status and stamp, if the row exists) to
/// `incoming`. The first transition into sold stamps `now`; staying sold keeps the stamp and
/// leaving sold clears it.
pub fn resolve_sold_at(
    previous: Option<(VehicleStatus, Option<NaiveDateTime>)>,
    incoming: VehicleStatus,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    if incoming != VehicleStatus::Sold {
        return None;
    }
    match previous {
        Some((VehicleStatus::Sold, Some(sold_at))) => Some(sold_at),
        _ => Some(now),
    }
}

/// Postgres persister when a database url is known, waiting until the database accepts
/// connections. Without a url everything lives in memory.
pub async fn connect(db_url: Option<String>) -> Result<Arc<dyn VehiclePersisterExt>, PersisterError> {
    let Some(db_url) = db_url else {
        warn!("no postgres configured, vehicles are kept in memory only");
        return Ok(Arc::new(MemoryVehiclePersister::new()));
    };

    let pool = init_pg_pool(&db_url);
    retry_async(Duration::from_secs(2), 15, || async {
        pool.get().await.map(drop).inspect_err(|e| {
            warn!(pg_pool_error = %e, "postgres not reachable yet");
        })
    })
    .await?;
    info!("connected to postgres");
    Ok(Arc::new(PgVehiclePersister::new(pool)))
}
