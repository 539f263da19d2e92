use crate::error::PersisterError;
use crate::{UpsertOutcome, VehiclePersisterExt};
use chrono::NaiveDateTime;
use common::config::DeleteMode;
use common::persistence::models::vehicle::{SOURCE_MOBILOX, VehicleStatus};
use mobilox::{FeedAction, FeedEntry};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Created,
    Updated,
    MarkedSold,
    Deleted,
    /// A delete for a vehicle the store does not know. Not an error.
    Missing,
}

impl From<UpsertOutcome> for ImportOutcome {
    fn from(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Created => Self::Created,
            UpsertOutcome::Updated => Self::Updated,
        }
    }
}

/// Applies one feed entry to the store.
#[instrument(skip(persister, entry), fields(action = %entry.action, inventory_number = %entry.inventory_number))]
pub async fn apply_entry<P>(
    persister: &P,
    entry: FeedEntry,
    delete_mode: DeleteMode,
    now: NaiveDateTime,
) -> Result<ImportOutcome, PersisterError>
where
    P: VehiclePersisterExt + ?Sized,
{
    let outcome = match (entry.action, entry.vehicle) {
        (FeedAction::Add | FeedAction::Change, Some(mut vehicle)) => {
            vehicle.source = SOURCE_MOBILOX.to_string();
            persister.upsert_vehicle(vehicle).await?.into()
        }
        (FeedAction::Add | FeedAction::Change, None) => {
            warn!("feed entry without vehicle data, skipping");
            ImportOutcome::Missing
        }
        (FeedAction::Delete, _) => match delete_mode {
            DeleteMode::MarkSold => {
                match persister
                    .set_status(&entry.inventory_number, VehicleStatus::Sold, now)
                    .await?
                {
                    true => ImportOutcome::MarkedSold,
                    false => ImportOutcome::Missing,
                }
            }
            DeleteMode::HardDelete => {
                match persister.delete_vehicle(&entry.inventory_number).await? {
                    true => ImportOutcome::Deleted,
                    false => ImportOutcome::Missing,
                }
            }
        },
    };
    info!(?outcome, "applied feed entry");
    Ok(outcome)
}

/// Applies entries in document order and stops at the first failure.
pub async fn apply_entries<P>(
    persister: &P,
    entries: Vec<FeedEntry>,
    delete_mode: DeleteMode,
    now: NaiveDateTime,
) -> Result<Vec<ImportOutcome>, PersisterError>
where
    P: VehiclePersisterExt + ?Sized,
{
    let mut outcomes = Vec::with_capacity(entries.len());
    for entry in entries {
        outcomes.push(apply_entry(persister, entry, delete_mode, now).await?);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use crate::VehiclePersisterExt;
    use crate::feed::{ImportOutcome, apply_entries, apply_entry};
    use crate::memory::MemoryVehiclePersister;
    use chrono::{NaiveDate, NaiveDateTime};
    use common::config::DeleteMode;
    use mobilox::parse_feed;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    const ADD: &str = r#"<vehicle action="add"><id>F-1</id><make>Seat</make><model>Leon</model></vehicle>"#;
    const DELETE: &str = r#"<vehicle action="delete"><id>F-1</id></vehicle>"#;

    async fn apply(persister: &MemoryVehiclePersister, xml: &str, mode: DeleteMode) -> ImportOutcome {
        let entry = parse_feed(xml).unwrap().remove(0);
        apply_entry(persister, entry, mode, now()).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_then_change() {
        let persister = MemoryVehiclePersister::new();
        assert_eq!(
            apply(&persister, ADD, DeleteMode::MarkSold).await,
            ImportOutcome::Created
        );
        assert_eq!(
            apply(&persister, ADD, DeleteMode::MarkSold).await,
            ImportOutcome::Updated
        );
        let stored = persister.find_vehicle("F-1").await.unwrap().unwrap();
        assert_eq!(stored.source, "mobilox");
    }

    #[tokio::test]
    async fn test_delete_marks_sold() {
        let persister = MemoryVehiclePersister::new();
        apply(&persister, ADD, DeleteMode::MarkSold).await;
        assert_eq!(
            apply(&persister, DELETE, DeleteMode::MarkSold).await,
            ImportOutcome::MarkedSold
        );
        let stored = persister.find_vehicle("F-1").await.unwrap().unwrap();
        assert_eq!(stored.status, "sold");
        assert_eq!(stored.sold_at, Some(now()));
    }

    #[tokio::test]
    async fn test_hard_delete_and_missing() {
        let persister = MemoryVehiclePersister::new();
        assert_eq!(
            apply(&persister, DELETE, DeleteMode::HardDelete).await,
            ImportOutcome::Missing
        );
        assert_eq!(
            apply(&persister, DELETE, DeleteMode::MarkSold).await,
            ImportOutcome::Missing
        );

        apply(&persister, ADD, DeleteMode::HardDelete).await;
        assert_eq!(
            apply(&persister, DELETE, DeleteMode::HardDelete).await,
            ImportOutcome::Deleted
        );
        assert!(persister.is_empty().await);
    }

    #[tokio::test]
    async fn test_entries_apply_in_document_order() {
        let persister = MemoryVehiclePersister::new();
        let entries = parse_feed(
            r#"<feed>
                <vehicle action="add"><id>O-1</id><make>Fiat</make><model>500</model></vehicle>
                <vehicle action="delete"><id>O-1</id></vehicle>
                <vehicle action="add"><id>O-2</id><make>Fiat</make><model>Panda</model></vehicle>
            </feed>"#,
        )
        .unwrap();

        let outcomes = apply_entries(&persister, entries, DeleteMode::HardDelete, now())
            .await
            .unwrap();
        assert_eq!(
            outcomes,
            vec![
                ImportOutcome::Created,
                ImportOutcome::Deleted,
                ImportOutcome::Created
            ]
        );
        assert!(persister.find_vehicle("O-1").await.unwrap().is_none());
        assert!(persister.find_vehicle("O-2").await.unwrap().is_some());
    }
}
