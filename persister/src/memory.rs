use crate::error::PersisterError;
use crate::{UpsertOutcome, VehicleFilter, VehiclePersisterExt, resolve_sold_at};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use common::persistence::models::vehicle::{NewVehicle, Vehicle, VehicleStatus};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Process-local store for runs without Postgres. Same semantics as the Postgres persister,
/// nothing survives a restart.
#[derive(Default)]
pub struct MemoryVehiclePersister {
    vehicles: RwLock<BTreeMap<String, Vehicle>>,
}

impl MemoryVehiclePersister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a fully materialized row, timestamps included.
    pub async fn insert_row(&self, vehicle: Vehicle) {
        self.vehicles
            .write()
            .await
            .insert(vehicle.inventory_number.clone(), vehicle);
    }

    pub async fn len(&self) -> usize {
        self.vehicles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.vehicles.read().await.is_empty()
    }
}

#[async_trait]
impl VehiclePersisterExt for MemoryVehiclePersister {
    #[instrument(skip_all, fields(inventory_number = %vehicle.inventory_number))]
    async fn upsert_vehicle(
        &self,
        mut vehicle: NewVehicle,
    ) -> Result<UpsertOutcome, PersisterError> {
        let now = Utc::now().naive_utc();
        let mut vehicles = self.vehicles.write().await;
        let previous = vehicles.get(&vehicle.inventory_number);

        vehicle.sold_at = resolve_sold_at(
            previous.map(|v| (v.vehicle_status(), v.sold_at)),
            vehicle.vehicle_status(),
            now,
        );
        let (created_at, outcome) = match previous {
            Some(previous) => (previous.created_at, UpsertOutcome::Updated),
            None => (now, UpsertOutcome::Created),
        };

        debug!(?outcome, status = %vehicle.status, "upserted vehicle");
        vehicles.insert(
            vehicle.inventory_number.clone(),
            Vehicle::from_new(vehicle, created_at, now),
        );
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn set_status(
        &self,
        inventory_number: &str,
        status: VehicleStatus,
        now: NaiveDateTime,
    ) -> Result<bool, PersisterError> {
        let mut vehicles = self.vehicles.write().await;
        let Some(vehicle) = vehicles.get_mut(inventory_number) else {
            return Ok(false);
        };
        vehicle.sold_at = resolve_sold_at(
            Some((vehicle.vehicle_status(), vehicle.sold_at)),
            status,
            now,
        );
        vehicle.status = status.as_str().to_string();
        vehicle.updated_at = now;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn delete_vehicle(&self, inventory_number: &str) -> Result<bool, PersisterError> {
        Ok(self.vehicles.write().await.remove(inventory_number).is_some())
    }

    async fn find_vehicle(
        &self,
        inventory_number: &str,
    ) -> Result<Option<Vehicle>, PersisterError> {
        Ok(self.vehicles.read().await.get(inventory_number).cloned())
    }

    async fn list_vehicles(&self, filter: &VehicleFilter) -> Result<Vec<Vehicle>, PersisterError> {
        let vehicles = self.vehicles.read().await;
        let mut matching = vehicles
            .values()
            .filter(|v| filter.matches(v))
            .collect::<Vec<_>>();
        // BTreeMap order breaks ties by inventory number, the sort is stable
        matching.sort_by_key(|v| Reverse(v.updated_at));

        Ok(matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .cloned()
            .collect())
    }

    async fn expired_sold(&self, cutoff: NaiveDateTime) -> Result<Vec<String>, PersisterError> {
        let vehicles = self.vehicles.read().await;
        Ok(vehicles
            .values()
            .filter(|v| expired_sold_by(v, cutoff))
            .map(|v| v.inventory_number.clone())
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_expired_sold(
        &self,
        inventory_number: &str,
        cutoff: NaiveDateTime,
    ) -> Result<bool, PersisterError> {
        let mut vehicles = self.vehicles.write().await;
        if !vehicles
            .get(inventory_number)
            .is_some_and(|v| expired_sold_by(v, cutoff))
        {
            return Ok(false);
        }
        Ok(vehicles.remove(inventory_number).is_some())
    }
}

fn expired_sold_by(vehicle: &Vehicle, cutoff: NaiveDateTime) -> bool {
    vehicle.vehicle_status() == VehicleStatus::Sold
        && vehicle.sold_at.unwrap_or(vehicle.updated_at) < cutoff
}

#[cfg(test)]
mod tests {
    use crate::memory::MemoryVehiclePersister;
    use crate::{UpsertOutcome, VehicleFilter, VehiclePersisterExt};
    use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
    use common::persistence::models::vehicle::{NewVehicle, Vehicle, VehicleStatus};

    fn new_vehicle(inventory_number: &str, status: &str) -> NewVehicle {
        NewVehicle {
            inventory_number: inventory_number.to_string(),
            status: status.to_string(),
            source: "mobilox".to_string(),
            make: "Audi".to_string(),
            model: "A3".to_string(),
            title: "Audi A3".to_string(),
            currency: "EUR".to_string(),
            ..NewVehicle::default()
        }
    }

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let persister = MemoryVehiclePersister::new();
        let outcome = persister
            .upsert_vehicle(new_vehicle("A-1", "active"))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);
        let created = persister.find_vehicle("A-1").await.unwrap().unwrap();

        let mut changed = new_vehicle("A-1", "active");
        changed.price = Some(9900);
        let outcome = persister.upsert_vehicle(changed).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);

        let updated = persister.find_vehicle("A-1").await.unwrap().unwrap();
        assert_eq!(updated.price, Some(9900));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(persister.len().await, 1);
    }

    #[tokio::test]
    async fn test_resending_sold_keeps_the_stamp() {
        let persister = MemoryVehiclePersister::new();
        let mut stale = new_vehicle("S-1", "sold");
        // stamps from the caller are ignored
        stale.sold_at = Some(at(1));
        persister.upsert_vehicle(stale).await.unwrap();

        let first = persister.find_vehicle("S-1").await.unwrap().unwrap();
        let stamp = first.sold_at.unwrap();
        assert!(stamp > at(1));

        persister
            .upsert_vehicle(new_vehicle("S-1", "sold"))
            .await
            .unwrap();
        let again = persister.find_vehicle("S-1").await.unwrap().unwrap();
        assert_eq!(again.sold_at, Some(stamp));

        persister
            .upsert_vehicle(new_vehicle("S-1", "active"))
            .await
            .unwrap();
        let relisted = persister.find_vehicle("S-1").await.unwrap().unwrap();
        assert_eq!(relisted.sold_at, None);
    }

    #[tokio::test]
    async fn test_set_status() {
        let persister = MemoryVehiclePersister::new();
        persister
            .upsert_vehicle(new_vehicle("T-1", "active"))
            .await
            .unwrap();

        assert!(
            persister
                .set_status("T-1", VehicleStatus::Sold, at(5))
                .await
                .unwrap()
        );
        let sold = persister.find_vehicle("T-1").await.unwrap().unwrap();
        assert_eq!(sold.status, "sold");
        assert_eq!(sold.sold_at, Some(at(5)));
        assert_eq!(sold.updated_at, at(5));

        assert!(
            persister
                .set_status("T-1", VehicleStatus::Sold, at(9))
                .await
                .unwrap()
        );
        let still_sold = persister.find_vehicle("T-1").await.unwrap().unwrap();
        assert_eq!(still_sold.sold_at, Some(at(5)));

        assert!(
            persister
                .set_status("T-1", VehicleStatus::Archived, at(10))
                .await
                .unwrap()
        );
        let archived = persister.find_vehicle("T-1").await.unwrap().unwrap();
        assert_eq!(archived.sold_at, None);

        assert!(
            !persister
                .set_status("missing", VehicleStatus::Sold, at(10))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let persister = MemoryVehiclePersister::new();
        persister
            .upsert_vehicle(new_vehicle("D-1", "active"))
            .await
            .unwrap();
        assert!(persister.delete_vehicle("D-1").await.unwrap());
        assert!(!persister.delete_vehicle("D-1").await.unwrap());
        assert!(persister.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_orders_and_pages() {
        let persister = MemoryVehiclePersister::new();
        for (inventory_number, day) in [("L-1", 1), ("L-2", 3), ("L-3", 2)] {
            persister
                .insert_row(Vehicle::from_new(
                    new_vehicle(inventory_number, "active"),
                    at(day),
                    at(day),
                ))
                .await;
        }
        persister
            .insert_row(Vehicle::from_new(new_vehicle("L-4", "sold"), at(4), at(4)))
            .await;

        let all = persister
            .list_vehicles(&VehicleFilter::default())
            .await
            .unwrap();
        let order = all
            .iter()
            .map(|v| v.inventory_number.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["L-2", "L-3", "L-1"]);

        let page = persister
            .list_vehicles(&VehicleFilter {
                limit: Some(1),
                offset: Some(1),
                ..VehicleFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].inventory_number, "L-3");
    }

    #[tokio::test]
    async fn test_expired_sold_falls_back_to_updated_at() {
        let persister = MemoryVehiclePersister::new();
        let now = Utc::now().naive_utc();
        let cutoff = now - Duration::days(7);

        let mut old = Vehicle::from_new(new_vehicle("E-1", "sold"), at(1), at(1));
        old.sold_at = Some(now - Duration::days(8));
        let mut fresh = Vehicle::from_new(new_vehicle("E-2", "sold"), at(1), now);
        fresh.sold_at = Some(now - Duration::days(6));
        let unstamped = Vehicle::from_new(
            new_vehicle("E-3", "sold"),
            at(1),
            now - Duration::days(30),
        );
        let active = Vehicle::from_new(
            new_vehicle("E-4", "active"),
            at(1),
            now - Duration::days(30),
        );
        for row in [old, fresh, unstamped, active] {
            persister.insert_row(row).await;
        }

        let expired = persister.expired_sold(cutoff).await.unwrap();
        assert_eq!(expired, vec!["E-1".to_string(), "E-3".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_expired_sold_rechecks_the_row() {
        let persister = MemoryVehiclePersister::new();
        let now = Utc::now().naive_utc();
        let cutoff = now - Duration::days(7);

        let mut sold = Vehicle::from_new(new_vehicle("D-1", "sold"), at(1), at(1));
        sold.sold_at = Some(now - Duration::days(10));
        let relisted = Vehicle::from_new(
            new_vehicle("D-2", "active"),
            at(1),
            now - Duration::days(30),
        );
        let mut recent = Vehicle::from_new(new_vehicle("D-3", "sold"), at(1), now);
        recent.sold_at = Some(now - Duration::days(2));
        for row in [sold, relisted, recent] {
            persister.insert_row(row).await;
        }

        assert!(persister.delete_expired_sold("D-1", cutoff).await.unwrap());
        assert!(!persister.delete_expired_sold("D-1", cutoff).await.unwrap());
        assert!(!persister.delete_expired_sold("D-2", cutoff).await.unwrap());
        assert!(!persister.delete_expired_sold("D-3", cutoff).await.unwrap());
        assert_eq!(persister.len().await, 2);
    }
}
