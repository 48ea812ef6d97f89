//! Read-only lookup tables joined onto activity rows.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// String-keyed lookup whose misses are part of the contract: callers choose
/// between `get` (absent) and `get_or` (explicit fallback).
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMap<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for ReferenceMap<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> ReferenceMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts replace earlier ones.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a V) -> &'a V {
        self.entries.get(key).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for ReferenceMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotelAttributes {
    pub city: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    pub contract_type: Option<String>,
}

/// Hotel id to location, currency and contract.
pub type HotelReference = ReferenceMap<HotelAttributes>;

/// Segment code to display label.
pub type SegmentReference = ReferenceMap<String>;

#[derive(Debug, Deserialize)]
struct HotelRow {
    #[serde(rename = "ID hotel", alias = "hotel_id")]
    hotel_id: Option<String>,
    #[serde(rename = "Ville", alias = "city", default)]
    city: Option<String>,
    #[serde(rename = "Pays", alias = "country", default)]
    country: Option<String>,
    #[serde(rename = "Devise", alias = "currency", default)]
    currency: Option<String>,
    #[serde(rename = "Type de contrat", alias = "contract_type", default)]
    contract_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SegmentRow {
    #[serde(rename = "Code Segment", alias = "segment_code")]
    segment_code: Option<String>,
    #[serde(rename = "Segment", alias = "segment_label", default)]
    segment_label: Option<String>,
}

pub fn load_hotel_reference<R: Read>(reader: R) -> Result<HotelReference> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut map = HotelReference::new();
    for row in csv_reader.deserialize::<HotelRow>() {
        let row = row?;
        let Some(hotel_id) = clean_optional(row.hotel_id) else {
            continue;
        };
        map.insert(
            hotel_id,
            HotelAttributes {
                city: clean_optional(row.city),
                country: clean_optional(row.country),
                currency: clean_optional(row.currency),
                contract_type: clean_optional(row.contract_type),
            },
        );
    }

    debug!(hotels = map.len(), "hotel reference loaded");
    Ok(map)
}

pub fn load_segment_reference<R: Read>(reader: R) -> Result<SegmentReference> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut map = SegmentReference::new();
    for row in csv_reader.deserialize::<SegmentRow>() {
        let row = row?;
        let (Some(code), Some(label)) = (
            clean_optional(row.segment_code),
            clean_optional(row.segment_label),
        ) else {
            continue;
        };
        map.insert(code, label);
    }

    debug!(segments = map.len(), "segment reference loaded");
    Ok(map)
}

pub fn load_hotel_reference_path(path: &Path) -> Result<HotelReference> {
    let file = std::fs::File::open(path).map_err(|err| {
        PipelineError::Reference(format!("cannot open {}: {err}", path.display()))
    })?;
    load_hotel_reference(file)
}

pub fn load_segment_reference_path(path: &Path) -> Result<SegmentReference> {
    let file = std::fs::File::open(path).map_err(|err| {
        PipelineError::Reference(format!("cannot open {}: {err}", path.display()))
    })?;
    load_segment_reference(file)
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
