//! Column mapping. Every column reads a fallback chain of keys; the first key holding a value
//! that parses wins.

use crate::canonical;
use crate::error::FeedError;
use crate::fields::FieldMap;
use crate::values::{clean_text, parse_bool, parse_date, parse_decimal, parse_int, year_of};
use common::persistence::models::vehicle::{NewVehicle, SOURCE_MOBILOX, VehicleStatus};

const KW_TO_HP: f64 = 1.35962;

pub(crate) const INVENTORY_NUMBER: &[&str] = &[
    "inventory_number",
    "inventarnummer",
    "internal_number",
    "interne_nummer",
    "stock_number",
    "stocknumber",
    "bestandsnummer",
    "fahrzeugnummer",
    "vehicle_id",
    "vehicle.id",
    "fahrzeug.id",
];
/// Too generic to trust below the vehicle element, read from its own attributes and leaves only.
const GENERIC_ID: &[&str] = &["id", "nr", "dealer_id"];

const MAKE: &[&str] = &["make", "marke", "manufacturer", "hersteller", "brand"];
const MODEL: &[&str] = &["model", "modell", "model_name", "modellname"];
const VARIANT: &[&str] = &[
    "variant",
    "version",
    "model_description",
    "modellbeschreibung",
    "trim",
    "typ",
];
const TITLE: &[&str] = &["title", "titel", "headline", "ueberschrift"];
const DESCRIPTION: &[&str] = &[
    "description",
    "beschreibung",
    "remarks",
    "bemerkung",
    "freitext",
    "text",
];
const BODY_TYPE: &[&str] = &[
    "body_type",
    "karosserie",
    "karosserieform",
    "bodytype",
    "fahrzeugtyp",
    "category",
    "kategorie",
];
const CONDITION: &[&str] = &["condition", "zustand", "vehicle_condition", "fahrzeugzustand"];
const STATUS: &[&str] = &["status", "listing_status", "verkaufsstatus"];
const SOLD_FLAG: &[&str] = &["sold", "verkauft"];

const PRICE: &[&str] = &[
    "price",
    "preis",
    "price.amount",
    "price.value",
    "preis.betrag",
    "selling_price",
    "verkaufspreis",
    "retail_price",
    "consumer_price",
    "price_gross",
    "bruttopreis",
];
const CURRENCY: &[&str] = &["currency", "waehrung", "price.currency", "preis.waehrung"];
const NEGOTIABLE: &[&str] = &["price_negotiable", "negotiable", "verhandlungsbasis", "vb"];
const VAT: &[&str] = &["vat_deductible", "mwst_ausweisbar", "vat_reclaimable", "mwst", "vat"];

const MILEAGE: &[&str] = &[
    "mileage",
    "kilometerstand",
    "km_stand",
    "laufleistung",
    "odometer",
    "kilometer",
    "km",
];
const FIRST_REGISTRATION: &[&str] = &[
    "first_registration",
    "erstzulassung",
    "first_registration_date",
    "registration_date",
    "ez",
];
const MODEL_YEAR: &[&str] = &["model_year", "modelljahr", "baujahr", "year_of_manufacture", "year"];
const PREVIOUS_OWNERS: &[&str] = &[
    "previous_owners",
    "vorbesitzer",
    "anzahl_halter",
    "owners",
    "halter",
];
const VIN: &[&str] = &["vin", "fin", "fahrgestellnummer", "chassis_number"];
const HSN: &[&str] = &["hsn", "herstellerschluessel", "key_number_manufacturer"];
const TSN: &[&str] = &["tsn", "typschluessel", "key_number_type"];
const INSPECTION: &[&str] = &[
    "inspection_valid_until",
    "next_inspection",
    "hu",
    "hu_au",
    "hauptuntersuchung",
    "tuev",
];
const ACCIDENT_FREE: &[&str] = &["accident_free", "unfallfrei"];
const DAMAGED: &[&str] = &["damaged", "unfallfahrzeug", "accident_damage", "unfallschaden"];
const WARRANTY: &[&str] = &["warranty_months", "garantie_monate", "warranty", "garantie"];

const FUEL: &[&str] = &["fuel_type", "fuel", "kraftstoff", "kraftstoffart", "treibstoff"];
const TRANSMISSION: &[&str] = &["transmission", "getriebe", "getriebeart", "gearbox"];
const DRIVE: &[&str] = &["drive_type", "antrieb", "antriebsart", "drivetrain", "drive"];
const POWER_KW: &[&str] = &["power_kw", "leistung_kw", "kw", "engine.power_kw"];
const POWER_HP: &[&str] = &["power_hp", "power_ps", "leistung_ps", "ps", "hp"];
const POWER_GENERIC: &[&str] = &["power", "leistung", "engine.power"];
const POWER_UNIT: &[&str] = &["power.unit", "leistung.einheit", "power.einheit", "leistung.unit"];
const DISPLACEMENT: &[&str] = &["displacement", "hubraum", "cubic_capacity", "engine_size", "ccm"];
const CYLINDERS: &[&str] = &["cylinders", "zylinder", "cylinder_count", "anzahl_zylinder"];
const GEARS: &[&str] = &["gears", "gaenge", "gear_count", "anzahl_gaenge"];
const TOP_SPEED: &[&str] = &["top_speed", "hoechstgeschwindigkeit", "vmax", "max_speed"];
const ACCELERATION: &[&str] = &["acceleration_0_100", "acceleration", "beschleunigung"];
const WEIGHT: &[&str] = &["weight", "gewicht", "leergewicht", "curb_weight", "empty_weight"];
const ELECTRIC_RANGE: &[&str] = &[
    "electric_range",
    "elektrische_reichweite",
    "reichweite",
    "range",
];

const EMISSION_CLASS: &[&str] = &[
    "emission_class",
    "schadstoffklasse",
    "emission_standard",
    "abgasnorm",
    "euro_norm",
];
const EMISSION_STICKER: &[&str] = &["emission_sticker", "umweltplakette", "feinstaubplakette"];
const CO2: &[&str] = &["co2_emissions", "co2_emission", "co2", "co2_ausstoss"];
const CONSUMPTION_COMBINED: &[&str] = &[
    "consumption_combined",
    "verbrauch_kombiniert",
    "consumption.combined",
    "verbrauch.kombiniert",
    "kombiniert",
    "fuel_consumption",
    "verbrauch",
];
const CONSUMPTION_URBAN: &[&str] = &[
    "consumption_urban",
    "verbrauch_innerorts",
    "consumption.urban",
    "verbrauch.innerorts",
    "innerorts",
];
const CONSUMPTION_EXTRA_URBAN: &[&str] = &[
    "consumption_extra_urban",
    "verbrauch_ausserorts",
    "consumption.extra_urban",
    "verbrauch.ausserorts",
    "ausserorts",
];

const EXTERIOR_COLOR: &[&str] = &[
    "exterior_color",
    "aussenfarbe",
    "color",
    "colour",
    "farbe",
    "manufacturer_color",
    "herstellerfarbe",
];
const METALLIC: &[&str] = &["metallic", "lackierung_metallic"];
const INTERIOR_COLOR: &[&str] = &[
    "interior_color",
    "innenfarbe",
    "interior.color",
    "upholstery_color",
    "polsterfarbe",
];
const INTERIOR_MATERIAL: &[&str] = &[
    "interior_material",
    "interior.material",
    "interior_type",
    "innenausstattung",
    "polsterung",
    "upholstery",
];
const DOORS: &[&str] = &["doors", "tueren", "door_count", "anzahl_tueren"];
const SEATS: &[&str] = &["seats", "sitze", "sitzplaetze", "seat_count", "anzahl_sitze"];

pub(crate) fn inventory_number(fields: &FieldMap) -> Option<String> {
    fields
        .first(INVENTORY_NUMBER)
        .or_else(|| fields.own_first(GENERIC_ID))
        .and_then(clean_text)
}

/// Maps one vehicle element onto a full row. Only make and model are mandatory; everything
/// else stays empty when the provider did not send it.
pub fn map_vehicle(fields: &FieldMap, inventory_number: &str) -> Result<NewVehicle, FeedError> {
    let required = |keys: &[&str], field: &'static str| {
        fields
            .first(keys)
            .and_then(clean_text)
            .ok_or_else(|| FeedError::MissingField {
                inventory_number: inventory_number.to_string(),
                field,
            })
    };
    let text = |keys: &[&str]| fields.first(keys).and_then(clean_text);
    let int = |keys: &[&str]| fields.find(keys, parse_int);
    let decimal = |keys: &[&str]| fields.find(keys, parse_decimal);
    let date = |keys: &[&str]| fields.find(keys, parse_date);
    let flag = |keys: &[&str]| fields.find(keys, parse_bool);

    let make = required(MAKE, "make")?;
    let model = required(MODEL, "model")?;
    let variant = text(VARIANT);
    let title = text(TITLE).unwrap_or_else(|| {
        [Some(make.as_str()), Some(model.as_str()), variant.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    });

    let first_registration = date(FIRST_REGISTRATION);
    let model_year = int(MODEL_YEAR).or_else(|| first_registration.map(year_of));
    let (power_kw, power_hp) = power(fields);
    let exterior_color = text(EXTERIOR_COLOR);
    let metallic = flag(METALLIC).unwrap_or(false)
        || exterior_color
            .as_deref()
            .is_some_and(|color| color.to_lowercase().contains("metallic"));

    Ok(NewVehicle {
        inventory_number: inventory_number.to_string(),
        status: status(fields).as_str().to_string(),
        source: SOURCE_MOBILOX.to_string(),
        make,
        model,
        variant,
        title,
        description: text(DESCRIPTION),
        body_type: text(BODY_TYPE),
        condition: text(CONDITION).map(|c| canonical::condition(&c)),
        price: int(PRICE),
        currency: currency(fields),
        price_negotiable: flag(NEGOTIABLE).unwrap_or(false),
        vat_deductible: flag(VAT).unwrap_or(false),
        mileage: int(MILEAGE),
        first_registration,
        model_year,
        previous_owners: int(PREVIOUS_OWNERS),
        vin: text(VIN).map(|vin| vin.replace(' ', "").to_uppercase()),
        hsn: text(HSN),
        tsn: text(TSN),
        inspection_valid_until: date(INSPECTION),
        accident_free: flag(ACCIDENT_FREE).or_else(|| flag(DAMAGED).map(|damaged| !damaged)),
        warranty_months: int(WARRANTY),
        fuel_type: text(FUEL).map(|f| canonical::fuel_type(&f)),
        transmission: text(TRANSMISSION).map(|t| canonical::transmission(&t)),
        drive_type: text(DRIVE).map(|d| canonical::drive_type(&d)),
        power_kw,
        power_hp,
        displacement_ccm: int(DISPLACEMENT),
        cylinders: int(CYLINDERS),
        gears: int(GEARS),
        top_speed_kmh: int(TOP_SPEED),
        acceleration_0_100: decimal(ACCELERATION),
        weight_kg: int(WEIGHT),
        electric_range_km: int(ELECTRIC_RANGE),
        emission_class: text(EMISSION_CLASS),
        emission_sticker: text(EMISSION_STICKER),
        co2_emissions: int(CO2),
        consumption_combined: decimal(CONSUMPTION_COMBINED),
        consumption_urban: decimal(CONSUMPTION_URBAN),
        consumption_extra_urban: decimal(CONSUMPTION_EXTRA_URBAN),
        exterior_color,
        metallic,
        interior_color: text(INTERIOR_COLOR),
        interior_material: text(INTERIOR_MATERIAL),
        doors: int(DOORS),
        seats: int(SEATS),
        images: fields.images(),
        features: fields.features().to_vec(),
        categories: fields.categories().to_vec(),
        sold_at: None,
    })
}

fn status(fields: &FieldMap) -> VehicleStatus {
    if let Some(status) = fields.first(STATUS) {
        return canonical::status(status);
    }
    match fields.find(SOLD_FLAG, parse_bool) {
        Some(true) => VehicleStatus::Sold,
        _ => VehicleStatus::Active,
    }
}

fn currency(fields: &FieldMap) -> String {
    match fields.first(CURRENCY).map(|c| c.trim().to_uppercase()) {
        Some(c) if c == "€" || c.is_empty() => "EUR".to_string(),
        Some(c) => c,
        None => "EUR".to_string(),
    }
}

/// Reads kW and hp, falling back to a generic power field whose unit comes from an attribute
/// or the text itself (`110 kW (150 PS)`). The missing side is derived from the other.
fn power(fields: &FieldMap) -> (Option<i32>, Option<i32>) {
    let mut kw = fields.find(POWER_KW, parse_int);
    let mut hp = fields.find(POWER_HP, parse_int);

    if kw.is_none() && hp.is_none() {
        if let Some(raw) = fields.first(POWER_GENERIC) {
            let unit = fields.first(POWER_UNIT).unwrap_or(raw).to_lowercase();
            let value = parse_int(raw);
            if unit.contains("kw") {
                kw = value;
            } else if unit.contains("ps") || unit.contains("hp") {
                hp = value;
            } else {
                kw = value;
            }
        }
    }

    let kw = kw.or_else(|| hp.map(|hp| (f64::from(hp) / KW_TO_HP).round() as i32));
    let hp = hp.or_else(|| kw.map(|kw| (f64::from(kw) * KW_TO_HP).round() as i32));
    (kw, hp)
}
