//! Maps provider vocabulary (english and german) onto the values the catalog filters on.
//! Unrecognized values are kept, lowercased.

use crate::values::normalize_key;
use common::persistence::models::vehicle::VehicleStatus;

const SOLD: &[&str] = &["sold", "verkauft", "sold_out", "ausverkauft"];
const ARCHIVED: &[&str] = &[
    "archived",
    "archiviert",
    "archive",
    "inactive",
    "inaktiv",
    "deactivated",
    "deaktiviert",
    "offline",
];

fn lowered(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn fuel_type(raw: &str) -> String {
    let value = lowered(raw);
    let canonical = if value.contains("plug") {
        "plugin_hybrid"
    } else if value.contains("hybrid") {
        "hybrid"
    } else if value.contains("diesel") {
        "diesel"
    } else if value.contains("benzin") || value.contains("petrol") || value.contains("gasoline")
    {
        "petrol"
    } else if value.contains("elektr") || value.contains("electric") || value == "ev" {
        "electric"
    } else if value.contains("autogas") || value.contains("lpg") {
        "lpg"
    } else if value.contains("erdgas") || value.contains("cng") {
        "cng"
    } else if value.contains("wasserstoff") || value.contains("hydrogen") {
        "hydrogen"
    } else {
        return value;
    };
    canonical.to_string()
}

pub fn transmission(raw: &str) -> String {
    let value = lowered(raw);
    let canonical = if value.contains("halbautomat") || value.contains("semi") {
        "semi_automatic"
    } else if value.contains("automat") || value == "auto" || value.contains("dsg") {
        "automatic"
    } else if value.contains("schalt") || value.contains("manu") {
        "manual"
    } else {
        return value;
    };
    canonical.to_string()
}

pub fn drive_type(raw: &str) -> String {
    let value = lowered(raw);
    let canonical = if ["allrad", "4x4", "awd", "4wd", "all", "quattro", "xdrive", "4matic"]
        .iter()
        .any(|marker| value.contains(marker))
    {
        "all_wheel"
    } else if ["front", "fwd"].iter().any(|marker| value.contains(marker)) {
        "front"
    } else if ["heck", "rear", "rwd"].iter().any(|marker| value.contains(marker)) {
        "rear"
    } else {
        return value;
    };
    canonical.to_string()
}

pub fn condition(raw: &str) -> String {
    let value = lowered(raw);
    let canonical = if value.contains("gebraucht") || value == "used" {
        "used"
    } else if value.contains("vorf") || value.contains("demo") {
        "demo"
    } else if value.contains("jahreswagen") || value.contains("annual") {
        "annual"
    } else if value.contains("oldtimer") || value.contains("classic") {
        "classic"
    } else if value == "neu" || value == "new" || value.contains("neuwagen") {
        "new"
    } else {
        return value;
    };
    canonical.to_string()
}

/// Exact vocabulary match. Anything else, negations like "unverkauft" included, stays active.
pub fn status(raw: &str) -> VehicleStatus {
    let value = normalize_key(raw);
    if SOLD.contains(&value.as_str()) {
        VehicleStatus::Sold
    } else if ARCHIVED.contains(&value.as_str()) {
        VehicleStatus::Archived
    } else {
        VehicleStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuel_type() {
        assert_eq!(fuel_type("Benzin"), "petrol");
        assert_eq!(fuel_type("DIESEL"), "diesel");
        assert_eq!(fuel_type("Elektro"), "electric");
        assert_eq!(fuel_type("Hybrid (Benzin/Elektro)"), "hybrid");
        assert_eq!(fuel_type("Plug-in-Hybrid"), "plugin_hybrid");
        assert_eq!(fuel_type("Autogas (LPG)"), "lpg");
        assert_eq!(fuel_type("Ethanol"), "ethanol");
    }

    #[test]
    fn test_transmission() {
        assert_eq!(transmission("Schaltgetriebe"), "manual");
        assert_eq!(transmission("Automatik"), "automatic");
        assert_eq!(transmission("DSG"), "automatic");
        assert_eq!(transmission("Halbautomatik"), "semi_automatic");
    }

    #[test]
    fn test_drive_type() {
        assert_eq!(drive_type("Allrad"), "all_wheel");
        assert_eq!(drive_type("quattro"), "all_wheel");
        assert_eq!(drive_type("Frontantrieb"), "front");
        assert_eq!(drive_type("Heckantrieb"), "rear");
    }

    #[test]
    fn test_condition_and_status() {
        assert_eq!(condition("Gebrauchtfahrzeug"), "used");
        assert_eq!(condition("Vorführfahrzeug"), "demo");
        assert_eq!(condition("Neu"), "new");
        assert_eq!(status("Verkauft"), VehicleStatus::Sold);
        assert_eq!(status("archived"), VehicleStatus::Archived);
        assert_eq!(status("online"), VehicleStatus::Active);
        assert_eq!(status(" SOLD "), VehicleStatus::Sold);
        assert_eq!(status("Inaktiv"), VehicleStatus::Archived);
        assert_eq!(status("unverkauft"), VehicleStatus::Active);
        assert_eq!(status("unsold"), VehicleStatus::Active);
        assert_eq!(status("not sold"), VehicleStatus::Active);
        assert_eq!(status("nicht verkauft"), VehicleStatus::Active);
    }
}
