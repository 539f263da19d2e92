use chrono::{NaiveDate, NaiveDateTime};
use common::persistence::models::vehicle::{NewVehicle, SOURCE_ADMIN, Vehicle, VehicleStatus};
use persister::sweep::SweepReport;
use persister::{UpsertOutcome, VehicleFilter};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDto {
    pub inventory_number: String,
    pub status: String,
    pub source: String,
    pub make: String,
    pub model: String,
    pub variant: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub body_type: Option<String>,
    pub condition: Option<String>,
    pub price: Option<i32>,
    pub currency: String,
    pub price_negotiable: bool,
    pub vat_deductible: bool,
    pub mileage: Option<i32>,
    pub first_registration: Option<NaiveDate>,
    pub model_year: Option<i32>,
    pub previous_owners: Option<i32>,
    pub vin: Option<String>,
    pub hsn: Option<String>,
    pub tsn: Option<String>,
    pub inspection_valid_until: Option<NaiveDate>,
    pub accident_free: Option<bool>,
    pub warranty_months: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub drive_type: Option<String>,
    pub power_kw: Option<i32>,
    pub power_hp: Option<i32>,
    pub displacement_ccm: Option<i32>,
    pub cylinders: Option<i32>,
    pub gears: Option<i32>,
    pub top_speed_kmh: Option<i32>,
    #[serde(rename = "acceleration0To100")]
    pub acceleration_0_100: Option<f64>,
    pub weight_kg: Option<i32>,
    pub electric_range_km: Option<i32>,
    pub emission_class: Option<String>,
    pub emission_sticker: Option<String>,
    pub co2_emissions: Option<i32>,
    pub consumption_combined: Option<f64>,
    pub consumption_urban: Option<f64>,
    pub consumption_extra_urban: Option<f64>,
    pub exterior_color: Option<String>,
    pub metallic: bool,
    pub interior_color: Option<String>,
    pub interior_material: Option<String>,
    pub doors: Option<i32>,
    pub seats: Option<i32>,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub categories: Vec<String>,
    #[schema(value_type = Option<String>, example = "2025-10-13T15:30:00")]
    pub sold_at: Option<NaiveDateTime>,
    #[schema(value_type = String, example = "2025-10-01T08:00:00")]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String, example = "2025-10-13T15:30:00")]
    pub updated_at: NaiveDateTime,
}

impl From<Vehicle> for VehicleDto {
    fn from(value: Vehicle) -> Self {
        Self {
            inventory_number: value.inventory_number,
            status: value.status,
            source: value.source,
            make: value.make,
            model: value.model,
            variant: value.variant,
            title: value.title,
            description: value.description,
            body_type: value.body_type,
            condition: value.condition,
            price: value.price,
            currency: value.currency,
            price_negotiable: value.price_negotiable,
            vat_deductible: value.vat_deductible,
            mileage: value.mileage,
            first_registration: value.first_registration,
            model_year: value.model_year,
            previous_owners: value.previous_owners,
            vin: value.vin,
            hsn: value.hsn,
            tsn: value.tsn,
            inspection_valid_until: value.inspection_valid_until,
            accident_free: value.accident_free,
            warranty_months: value.warranty_months,
            fuel_type: value.fuel_type,
            transmission: value.transmission,
            drive_type: value.drive_type,
            power_kw: value.power_kw,
            power_hp: value.power_hp,
            displacement_ccm: value.displacement_ccm,
            cylinders: value.cylinders,
            gears: value.gears,
            top_speed_kmh: value.top_speed_kmh,
            acceleration_0_100: value.acceleration_0_100,
            weight_kg: value.weight_kg,
            electric_range_km: value.electric_range_km,
            emission_class: value.emission_class,
            emission_sticker: value.emission_sticker,
            co2_emissions: value.co2_emissions,
            consumption_combined: value.consumption_combined,
            consumption_urban: value.consumption_urban,
            consumption_extra_urban: value.consumption_extra_urban,
            exterior_color: value.exterior_color,
            metallic: value.metallic,
            interior_color: value.interior_color,
            interior_material: value.interior_material,
            doors: value.doors,
            seats: value.seats,
            images: value.images,
            features: value.features,
            categories: value.categories,
            sold_at: value.sold_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Body of the admin upsert. The inventory number comes from the path.
#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleInput {
    #[schema(value_type = Option<String>, example = "active")]
    pub status: Option<VehicleStatus>,
    pub make: String,
    pub model: String,
    pub variant: Option<String>,
    /// Composed from make, model and variant when empty.
    pub title: Option<String>,
    pub description: Option<String>,
    pub body_type: Option<String>,
    pub condition: Option<String>,
    pub price: Option<i32>,
    pub currency: Option<String>,
    pub price_negotiable: bool,
    pub vat_deductible: bool,
    pub mileage: Option<i32>,
    pub first_registration: Option<NaiveDate>,
    pub model_year: Option<i32>,
    pub previous_owners: Option<i32>,
    pub vin: Option<String>,
    pub hsn: Option<String>,
    pub tsn: Option<String>,
    pub inspection_valid_until: Option<NaiveDate>,
    pub accident_free: Option<bool>,
    pub warranty_months: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub drive_type: Option<String>,
    pub power_kw: Option<i32>,
    pub power_hp: Option<i32>,
    pub displacement_ccm: Option<i32>,
    pub cylinders: Option<i32>,
    pub gears: Option<i32>,
    pub top_speed_kmh: Option<i32>,
    #[serde(rename = "acceleration0To100")]
    pub acceleration_0_100: Option<f64>,
    pub weight_kg: Option<i32>,
    pub electric_range_km: Option<i32>,
    pub emission_class: Option<String>,
    pub emission_sticker: Option<String>,
    pub co2_emissions: Option<i32>,
    pub consumption_combined: Option<f64>,
    pub consumption_urban: Option<f64>,
    pub consumption_extra_urban: Option<f64>,
    pub exterior_color: Option<String>,
    pub metallic: bool,
    pub interior_color: Option<String>,
    pub interior_material: Option<String>,
    pub doors: Option<i32>,
    pub seats: Option<i32>,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub categories: Vec<String>,
}

impl VehicleInput {
    pub fn into_new_vehicle(self, inventory_number: String) -> Result<NewVehicle, String> {
        let make = self.make.trim().to_string();
        let model = self.model.trim().to_string();
        if make.is_empty() || model.is_empty() {
            return Err("make and model are required".to_string());
        }
        let title = match self.title.map(|t| t.trim().to_string()) {
            Some(title) if !title.is_empty() => title,
            _ => [Some(make.as_str()), Some(model.as_str()), self.variant.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" "),
        };

        Ok(NewVehicle {
            inventory_number,
            status: self.status.unwrap_or_default().as_str().to_string(),
            source: SOURCE_ADMIN.to_string(),
            make,
            model,
            variant: self.variant,
            title,
            description: self.description,
            body_type: self.body_type,
            condition: self.condition,
            price: self.price,
            currency: self.currency.unwrap_or_else(|| "EUR".to_string()),
            price_negotiable: self.price_negotiable,
            vat_deductible: self.vat_deductible,
            mileage: self.mileage,
            first_registration: self.first_registration,
            model_year: self.model_year,
            previous_owners: self.previous_owners,
            vin: self.vin,
            hsn: self.hsn,
            tsn: self.tsn,
            inspection_valid_until: self.inspection_valid_until,
            accident_free: self.accident_free,
            warranty_months: self.warranty_months,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            drive_type: self.drive_type,
            power_kw: self.power_kw,
            power_hp: self.power_hp,
            displacement_ccm: self.displacement_ccm,
            cylinders: self.cylinders,
            gears: self.gears,
            top_speed_kmh: self.top_speed_kmh,
            acceleration_0_100: self.acceleration_0_100,
            weight_kg: self.weight_kg,
            electric_range_km: self.electric_range_km,
            emission_class: self.emission_class,
            emission_sticker: self.emission_sticker,
            co2_emissions: self.co2_emissions,
            consumption_combined: self.consumption_combined,
            consumption_urban: self.consumption_urban,
            consumption_extra_urban: self.consumption_extra_urban,
            exterior_color: self.exterior_color,
            metallic: self.metallic,
            interior_color: self.interior_color,
            interior_material: self.interior_material,
            doors: self.doors,
            seats: self.seats,
            images: self.images,
            features: self.features,
            categories: self.categories,
            sold_at: None,
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    pub inventory_number: String,
    pub created: bool,
}

impl UpsertResponse {
    pub fn new(inventory_number: String, outcome: UpsertOutcome) -> Self {
        Self {
            inventory_number,
            created: outcome == UpsertOutcome::Created,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct StatusUpdate {
    #[schema(value_type = String, example = "sold")]
    pub status: VehicleStatus,
}

#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct VehicleQuery {
    /// `active` (default), `sold` or `archived`
    #[param(value_type = Option<String>)]
    pub status: Option<VehicleStatus>,
    pub make: Option<String>,
    pub fuel_type: Option<String>,
    pub max_price: Option<i32>,
    pub min_year: Option<i32>,
    pub max_mileage: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<VehicleQuery> for VehicleFilter {
    fn from(query: VehicleQuery) -> Self {
        Self {
            status: query.status.unwrap_or_default(),
            make: query.make.filter(|m| !m.trim().is_empty()),
            fuel_type: query.fuel_type.filter(|f| !f.trim().is_empty()),
            max_price: query.max_price,
            min_year: query.min_year,
            max_mileage: query.max_mileage,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct CleanupQuery {
    /// Accepted when neither the `x-cleanup-secret` header nor a bearer token is sent.
    pub secret: Option<String>,
    /// Overrides the configured retention window, at most 36500 days.
    pub retention_days: Option<u32>,
}

#[derive(Serialize, ToSchema, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub candidates: usize,
    pub retention_days: u32,
}

impl CleanupResponse {
    pub fn new(report: SweepReport, retention_days: u32) -> Self {
        Self {
            success: true,
            deleted: report.deleted,
            skipped: report.skipped,
            failed: report.failed,
            candidates: report.candidates,
            retention_days,
        }
    }
}
