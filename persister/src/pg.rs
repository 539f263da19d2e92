use crate::error::PersisterError;
use crate::{UpsertOutcome, VehicleFilter, VehiclePersisterExt, resolve_sold_at};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use common::persistence::PgPool;
use common::persistence::models::vehicle::{NewVehicle, Vehicle, VehicleStatus};
use common::persistence::schema::vehicles;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::{debug, instrument};

diesel::define_sql_function!(fn lower(x: Text) -> Text);

#[derive(Clone)]
pub struct PgVehiclePersister {
    pool: PgPool,
}

impl PgVehiclePersister {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Status and stamp of the current row, locked until the transaction ends.
async fn lock_lifecycle(
    conn: &mut AsyncPgConnection,
    inventory_number: &str,
) -> Result<Option<(VehicleStatus, Option<NaiveDateTime>)>, PersisterError> {
    let row = vehicles::table
        .find(inventory_number)
        .select((vehicles::status, vehicles::sold_at))
        .for_update()
        .first::<(String, Option<NaiveDateTime>)>(conn)
        .await
        .optional()?;
    Ok(row.map(|(status, sold_at)| (status.parse().unwrap_or_default(), sold_at)))
}

#[async_trait]
impl VehiclePersisterExt for PgVehiclePersister {
    #[instrument(skip_all, fields(inventory_number = %vehicle.inventory_number))]
    async fn upsert_vehicle(
        &self,
        mut vehicle: NewVehicle,
    ) -> Result<UpsertOutcome, PersisterError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<_, PersisterError, _>(|conn| {
            async move {
                let previous = lock_lifecycle(conn, &vehicle.inventory_number).await?;
                let now = Utc::now().naive_utc();
                vehicle.sold_at = resolve_sold_at(previous, vehicle.vehicle_status(), now);

                diesel::insert_into(vehicles::table)
                    .values((
                        &vehicle,
                        vehicles::created_at.eq(now),
                        vehicles::updated_at.eq(now),
                    ))
                    .on_conflict(vehicles::inventory_number)
                    .do_update()
                    .set((&vehicle, vehicles::updated_at.eq(now)))
                    .execute(conn)
                    .await?;

                let outcome = match previous {
                    Some(_) => UpsertOutcome::Updated,
                    None => UpsertOutcome::Created,
                };
                debug!(?outcome, status = %vehicle.status, "upserted vehicle");
                Ok(outcome)
            }
            .scope_boxed()
        })
        .await
    }

    #[instrument(skip(self))]
    async fn set_status(
        &self,
        inventory_number: &str,
        status: VehicleStatus,
        now: NaiveDateTime,
    ) -> Result<bool, PersisterError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<_, PersisterError, _>(|conn| {
            async move {
                let Some(previous) = lock_lifecycle(conn, inventory_number).await? else {
                    return Ok(false);
                };
                diesel::update(vehicles::table.find(inventory_number))
                    .set((
                        vehicles::status.eq(status.as_str()),
                        vehicles::sold_at.eq(resolve_sold_at(Some(previous), status, now)),
                        vehicles::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_vehicle(&self, inventory_number: &str) -> Result<bool, PersisterError> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(vehicles::table.find(inventory_number))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }

    #[instrument(skip(self))]
    async fn find_vehicle(
        &self,
        inventory_number: &str,
    ) -> Result<Option<Vehicle>, PersisterError> {
        let mut conn = self.pool.get().await?;
        let vehicle = vehicles::table
            .find(inventory_number)
            .select(Vehicle::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(vehicle)
    }

    #[instrument(skip(self))]
    async fn list_vehicles(&self, filter: &VehicleFilter) -> Result<Vec<Vehicle>, PersisterError> {
        let mut conn = self.pool.get().await?;
        let mut query = vehicles::table
            .select(Vehicle::as_select())
            .filter(vehicles::status.eq(filter.status.as_str()))
            .into_boxed();

        if let Some(make) = &filter.make {
            query = query.filter(lower(vehicles::make).eq(make.to_lowercase()));
        }
        if let Some(fuel_type) = &filter.fuel_type {
            query = query.filter(vehicles::fuel_type.eq(fuel_type));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(vehicles::price.le(max_price));
        }
        if let Some(min_year) = filter.min_year {
            query = query.filter(vehicles::model_year.ge(min_year));
        }
        if let Some(max_mileage) = filter.max_mileage {
            query = query.filter(vehicles::mileage.le(max_mileage));
        }

        let vehicles = query
            .order((vehicles::updated_at.desc(), vehicles::inventory_number.asc()))
            .limit(filter.limit())
            .offset(filter.offset())
            .load(&mut conn)
            .await?;
        Ok(vehicles)
    }

    #[instrument(skip(self))]
    async fn expired_sold(&self, cutoff: NaiveDateTime) -> Result<Vec<String>, PersisterError> {
        let mut conn = self.pool.get().await?;
        let expired = vehicles::table
            .select(vehicles::inventory_number)
            .filter(vehicles::status.eq(VehicleStatus::Sold.as_str()))
            .filter(
                vehicles::sold_at.lt(cutoff).or(vehicles::sold_at
                    .is_null()
                    .and(vehicles::updated_at.lt(cutoff))
                    .nullable()),
            )
            .order(vehicles::inventory_number.asc())
            .load::<String>(&mut conn)
            .await?;
        debug!(expired = expired.len(), "expired sold vehicles");
        Ok(expired)
    }

    #[instrument(skip(self))]
    async fn delete_expired_sold(
        &self,
        inventory_number: &str,
        cutoff: NaiveDateTime,
    ) -> Result<bool, PersisterError> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(
            vehicles::table
                .filter(vehicles::inventory_number.eq(inventory_number))
                .filter(vehicles::status.eq(VehicleStatus::Sold.as_str()))
                .filter(
                    vehicles::sold_at.lt(cutoff).or(vehicles::sold_at
                        .is_null()
                        .and(vehicles::updated_at.lt(cutoff))
                        .nullable()),
                ),
        )
        .execute(&mut conn)
        .await?;
        Ok(deleted > 0)
    }
}
