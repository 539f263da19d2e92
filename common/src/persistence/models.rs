pub mod vehicle {
    use chrono::{NaiveDate, NaiveDateTime};
    use diesel::prelude::*;
    use serde::{Deserialize, Serialize};
    use std::fmt::{Display, Formatter};
    use std::str::FromStr;

    pub type InventoryNumber = String;

    pub const SOURCE_MOBILOX: &str = "mobilox";
    pub const SOURCE_ADMIN: &str = "admin";

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum VehicleStatus {
        #[default]
        Active,
        Sold,
        Archived,
    }

    impl VehicleStatus {
        pub fn as_str(&self) -> &'static str {
            match self {
                Self::Active => "active",
                Self::Sold => "sold",
                Self::Archived => "archived",
            }
        }
    }

    impl Display for VehicleStatus {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.as_str())
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    pub struct UnknownStatus(pub String);

    impl Display for UnknownStatus {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "unknown vehicle status: `{}`", self.0)
        }
    }

    impl std::error::Error for UnknownStatus {}

    impl FromStr for VehicleStatus {
        type Err = UnknownStatus;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "active" => Ok(Self::Active),
                "sold" => Ok(Self::Sold),
                "archived" => Ok(Self::Archived),
                other => Err(UnknownStatus(other.to_string())),
            }
        }
    }

    #[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
    #[diesel(table_name = crate::persistence::schema::vehicles)]
    #[diesel(check_for_backend(diesel::pg::Pg))]
    #[diesel(primary_key(inventory_number))]
    pub struct Vehicle {
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
        pub sold_at: Option<NaiveDateTime>,
        pub created_at: NaiveDateTime,
        pub updated_at: NaiveDateTime,
    }

    impl Vehicle {
        /// Status column as enum; rows violating the check constraint read as active.
        pub fn vehicle_status(&self) -> VehicleStatus {
            self.status.parse().unwrap_or_default()
        }

        /// Materializes a row the way the database would after inserting `new`.
        pub fn from_new(
            new: NewVehicle,
            created_at: NaiveDateTime,
            updated_at: NaiveDateTime,
        ) -> Self {
            Self {
                inventory_number: new.inventory_number,
                status: new.status,
                source: new.source,
                make: new.make,
                model: new.model,
                variant: new.variant,
                title: new.title,
                description: new.description,
                body_type: new.body_type,
                condition: new.condition,
                price: new.price,
                currency: new.currency,
                price_negotiable: new.price_negotiable,
                vat_deductible: new.vat_deductible,
                mileage: new.mileage,
                first_registration: new.first_registration,
                model_year: new.model_year,
                previous_owners: new.previous_owners,
                vin: new.vin,
                hsn: new.hsn,
                tsn: new.tsn,
                inspection_valid_until: new.inspection_valid_until,
                accident_free: new.accident_free,
                warranty_months: new.warranty_months,
                fuel_type: new.fuel_type,
                transmission: new.transmission,
                drive_type: new.drive_type,
                power_kw: new.power_kw,
                power_hp: new.power_hp,
                displacement_ccm: new.displacement_ccm,
                cylinders: new.cylinders,
                gears: new.gears,
                top_speed_kmh: new.top_speed_kmh,
                acceleration_0_100: new.acceleration_0_100,
                weight_kg: new.weight_kg,
                electric_range_km: new.electric_range_km,
                emission_class: new.emission_class,
                emission_sticker: new.emission_sticker,
                co2_emissions: new.co2_emissions,
                consumption_combined: new.consumption_combined,
                consumption_urban: new.consumption_urban,
                consumption_extra_urban: new.consumption_extra_urban,
                exterior_color: new.exterior_color,
                metallic: new.metallic,
                interior_color: new.interior_color,
                interior_material: new.interior_material,
                doors: new.doors,
                seats: new.seats,
                images: new.images,
                features: new.features,
                categories: new.categories,
                sold_at: new.sold_at,
                created_at,
                updated_at,
            }
        }
    }

    /// Full row as written by the feed importer and the admin api. Doubles as the upsert
    /// changeset, so a `None` overwrites whatever the previous version stored.
    #[derive(Insertable, AsChangeset, Debug, Clone, PartialEq, Default)]
    #[diesel(table_name = crate::persistence::schema::vehicles)]
    #[diesel(primary_key(inventory_number))]
    #[diesel(treat_none_as_null = true)]
    pub struct NewVehicle {
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
        pub sold_at: Option<NaiveDateTime>,
    }

    impl NewVehicle {
        pub fn vehicle_status(&self) -> VehicleStatus {
            self.status.parse().unwrap_or_default()
        }
    }

}
