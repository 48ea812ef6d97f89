use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use hotelflux_parser::{FileType, PmsType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cleaning::EnrichedRecord;

/// Which fields identify one logical daily-activity row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    /// `(hotel_id, date_jour, segment_code, date_extraction)`, the store's
    /// conflict key.
    #[default]
    Extraction,
    /// `(hotel_id, date_jour, segment_code)`: only the latest extraction of a
    /// business day survives.
    BusinessDay,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub exact_duplicates: usize,
    pub key_duplicates: usize,
}

impl DedupReport {
    pub fn total(&self) -> usize {
        self.exact_duplicates + self.key_duplicates
    }
}

pub fn deduplicate(records: Vec<EnrichedRecord>) -> Vec<EnrichedRecord> {
    deduplicate_by(records, DedupKey::Extraction).0
}

/// Drops exact copies, then keeps the last row per identity after a stable
/// sort on `date_extraction` (rows without one sort last).
pub fn deduplicate_by(
    records: Vec<EnrichedRecord>,
    key: DedupKey,
) -> (Vec<EnrichedRecord>, DedupReport) {
    let mut report = DedupReport::default();

    let mut seen = HashSet::with_capacity(records.len());
    let mut distinct = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(RowFingerprint::of(&record)) {
            distinct.push(record);
        } else {
            report.exact_duplicates += 1;
        }
    }

    distinct.sort_by(|a, b| extraction_order(a.date_extraction, b.date_extraction));

    let mut last_index: HashMap<IdentityKey<'_>, usize> = HashMap::with_capacity(distinct.len());
    for (idx, record) in distinct.iter().enumerate() {
        last_index.insert(IdentityKey::of(record, key), idx);
    }
    let keep: HashSet<usize> = last_index.into_values().collect();
    report.key_duplicates = distinct.len() - keep.len();

    let survivors: Vec<EnrichedRecord> = distinct
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| keep.contains(idx))
        .map(|(_, record)| record)
        .collect();

    debug!(
        exact_duplicates = report.exact_duplicates,
        key_duplicates = report.key_duplicates,
        kept = survivors.len(),
        "deduplication finished"
    );

    (survivors, report)
}

fn extraction_order(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct IdentityKey<'a> {
    hotel_id: &'a str,
    date_jour: NaiveDate,
    segment_code: &'a str,
    date_extraction: Option<Option<NaiveDate>>,
}

impl<'a> IdentityKey<'a> {
    fn of(record: &'a EnrichedRecord, key: DedupKey) -> Self {
        Self {
            hotel_id: &record.hotel_id,
            date_jour: record.date_jour,
            segment_code: &record.segment_code,
            date_extraction: match key {
                DedupKey::Extraction => Some(record.date_extraction),
                DedupKey::BusinessDay => None,
            },
        }
    }
}

// Whole-row identity. Floats compare by bit pattern; parsing never yields NaN.
#[derive(PartialEq, Eq, Hash)]
struct RowFingerprint {
    date_jour: NaiveDate,
    hotel_id: String,
    hotel_name: Option<String>,
    date_extraction: Option<NaiveDate>,
    segment_code: String,
    segment_label: String,
    pms_type: PmsType,
    file_type: Option<FileType>,
    measures: [Option<u64>; 11],
    ville: Option<String>,
    pays: Option<String>,
    devise: Option<String>,
    type_contrat: Option<String>,
}

impl RowFingerprint {
    fn of(record: &EnrichedRecord) -> Self {
        let bits = |value: Option<f64>| value.map(|v| (v + 0.0).to_bits());
        Self {
            date_jour: record.date_jour,
            hotel_id: record.hotel_id.clone(),
            hotel_name: record.hotel_name.clone(),
            date_extraction: record.date_extraction,
            segment_code: record.segment_code.clone(),
            segment_label: record.segment_label.clone(),
            pms_type: record.pms_type,
            file_type: record.file_type,
            measures: [
                bits(record.ca_ttc),
                bits(record.rooms_occupied),
                bits(record.pax),
                bits(record.enf),
                bits(record.arrivals),
                bits(record.ntes),
                bits(record.double_occ),
                bits(record.guest_mkt),
                bits(record.revenue),
                bits(record.rooms),
                bits(record.guests),
            ],
            ville: record.ville.clone(),
            pays: record.pays.clone(),
            devise: record.devise.clone(),
            type_contrat: record.type_contrat.clone(),
        }
    }
}
