//! Normalization of Mobilox inventory feed documents.
//!
//! The provider pushes one XML document per change. Documents from different dealer setups
//! disagree on almost everything: element vs attribute values, english vs german names,
//! nesting, how images and equipment are listed. [`parse_feed`] flattens each vehicle
//! element into a [`fields::FieldMap`] and maps it onto a
//! [`NewVehicle`](common::persistence::models::vehicle::NewVehicle) row.

pub mod canonical;
pub mod error;
pub mod fields;
pub mod mapping;
pub mod values;

use crate::error::FeedError;
use crate::fields::FieldMap;
use crate::values::normalize_key;
use common::persistence::models::vehicle::NewVehicle;
use roxmltree::{Document, Node, ParsingOptions};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::debug;

const VEHICLE_TAGS: &[&str] = &[
    "vehicle", "fahrzeug", "car", "auto", "inserat", "angebot", "offer", "listing",
];
const ACTION_KEYS: &[&str] = &["action", "aktion", "operation", "mode"];
// `mode` and `operation` are ordinary vehicle fields when they appear as elements
const ACTION_ELEMENTS: &[&str] = &["action", "aktion"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedAction {
    Add,
    Change,
    Delete,
}

impl FromStr for FeedAction {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "add" | "new" | "insert" | "create" | "neu" | "anlegen" => Ok(Self::Add),
            "change" | "update" | "modify" | "edit" | "aendern" | "aktualisieren" => {
                Ok(Self::Change)
            }
            "delete" | "remove" | "del" | "loeschen" => Ok(Self::Delete),
            other => Err(FeedError::UnknownAction(other.to_string())),
        }
    }
}

impl Display for FeedAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Change => f.write_str("change"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub action: FeedAction,
    pub inventory_number: String,
    /// Mapped row for `add` and `change`; deletes only carry the key.
    pub vehicle: Option<NewVehicle>,
}

/// Parses a feed document into one entry per vehicle it describes.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml.trim_start_matches('\u{feff}'), options)?;
    let root = doc.root_element();

    let entries = vehicle_elements(root)
        .into_iter()
        .map(|vehicle| parse_entry(root, vehicle))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(entries = entries.len(), "parsed mobilox document");
    Ok(entries)
}

fn parse_entry(root: Node, vehicle: Node) -> Result<FeedEntry, FeedError> {
    let fields = FieldMap::from_element(vehicle);
    let action = action(root, vehicle)?;
    let inventory_number =
        mapping::inventory_number(&fields).ok_or(FeedError::MissingInventoryNumber)?;

    let vehicle = match action {
        FeedAction::Add | FeedAction::Change => {
            Some(mapping::map_vehicle(&fields, &inventory_number)?)
        }
        FeedAction::Delete => None,
    };

    Ok(FeedEntry {
        action,
        inventory_number,
        vehicle,
    })
}

/// The root itself when it is a vehicle, otherwise every outermost vehicle element below it.
/// Documents without any recognizable vehicle element are treated as one flat vehicle.
fn vehicle_elements<'a, 'input>(root: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    if is_vehicle(root) {
        return vec![root];
    }
    let mut found = Vec::new();
    collect_vehicles(root, &mut found);
    if found.is_empty() { vec![root] } else { found }
}

fn collect_vehicles<'a, 'input>(node: Node<'a, 'input>, found: &mut Vec<Node<'a, 'input>>) {
    for child in node.children().filter(Node::is_element) {
        if is_vehicle(child) {
            found.push(child);
        } else {
            collect_vehicles(child, found);
        }
    }
}

fn is_vehicle(node: Node) -> bool {
    VEHICLE_TAGS.contains(&normalize_key(node.tag_name().name()).as_str())
}

/// Action attribute on the vehicle, then on the document root, then an `<action>` element
/// directly below the vehicle or the root. Defaults to `add`, which upserts just like `change`.
fn action(root: Node, vehicle: Node) -> Result<FeedAction, FeedError> {
    let attribute = |node: Node| {
        node.attributes()
            .find(|attr| ACTION_KEYS.contains(&normalize_key(attr.name()).as_str()))
            .map(|attr| attr.value().to_string())
    };
    let element = |node: Node| {
        node.children()
            .filter(Node::is_element)
            .find(|c| ACTION_ELEMENTS.contains(&normalize_key(c.tag_name().name()).as_str()))
            .and_then(|c| c.text().map(str::to_string))
    };

    attribute(vehicle)
        .or_else(|| attribute(root))
        .or_else(|| element(vehicle))
        .or_else(|| element(root))
        .map_or(Ok(FeedAction::Add), |raw| raw.parse())
}
