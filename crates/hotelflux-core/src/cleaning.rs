use chrono::NaiveDate;
use hotelflux_parser::{FileType, NormalizedRecord, PmsType};
use serde::Serialize;
use tracing::debug;

use crate::reference::{HotelAttributes, HotelReference, SegmentReference};

/// Segment code and label given to rows exported without a segment.
pub const DEFAULT_SEGMENT: &str = "AUTRES";

pub const DEFAULT_MAX_ROOMS_OCCUPIED: f64 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationSettings {
    /// Occupied-room counts above this are treated as corrupt and dropped.
    pub max_rooms_occupied: f64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            max_rooms_occupied: DEFAULT_MAX_ROOMS_OCCUPIED,
        }
    }
}

/// A validated row with segment and hotel reference data attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub date_jour: NaiveDate,
    pub hotel_id: String,
    pub hotel_name: Option<String>,
    pub date_extraction: Option<NaiveDate>,
    pub segment_code: String,
    pub segment_label: String,
    pub pms_type: PmsType,
    pub file_type: Option<FileType>,
    pub ca_ttc: Option<f64>,
    pub rooms_occupied: Option<f64>,
    pub pax: Option<f64>,
    pub enf: Option<f64>,
    pub arrivals: Option<f64>,
    pub ntes: Option<f64>,
    pub double_occ: Option<f64>,
    pub guest_mkt: Option<f64>,
    /// PMS2 measures, carried as read. Not part of the final table.
    pub revenue: Option<f64>,
    pub rooms: Option<f64>,
    pub guests: Option<f64>,
    pub ville: Option<String>,
    pub pays: Option<String>,
    pub devise: Option<String>,
    pub type_contrat: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub dropped_missing_date: usize,
    pub negative_values_nulled: usize,
    pub rooms_above_ceiling: usize,
    pub default_segments: usize,
    pub unmapped_segments: usize,
    pub unknown_hotels: usize,
}

pub fn validate_and_enrich(
    records: Vec<NormalizedRecord>,
    hotels: &HotelReference,
    segments: &SegmentReference,
    settings: &ValidationSettings,
) -> (Vec<EnrichedRecord>, CleaningReport) {
    let mut report = CleaningReport {
        input_rows: records.len(),
        ..CleaningReport::default()
    };
    let mut enriched = Vec::with_capacity(records.len());
    let no_hotel = HotelAttributes::default();

    for record in records {
        let Some(date_jour) = record.date_jour else {
            report.dropped_missing_date += 1;
            continue;
        };

        let mut negatives = 0;
        let mut guard = |value: Option<f64>| {
            let kept = non_negative(value);
            if kept.is_none() && value.is_some() {
                negatives += 1;
            }
            kept
        };
        let ca_ttc = guard(record.ca_ttc);
        let pax = guard(record.pax);
        let arrivals = guard(record.arrivals);
        let rooms_non_negative = guard(record.rooms_occupied);
        report.negative_values_nulled += negatives;

        let rooms_occupied = within_ceiling(rooms_non_negative, settings.max_rooms_occupied);
        if rooms_occupied.is_none() && rooms_non_negative.is_some() {
            report.rooms_above_ceiling += 1;
        }

        let (segment_code, segment_label) = match record.segment_code {
            Some(code) => {
                let label = match segments.get(&code) {
                    Some(label) => label.clone(),
                    None => {
                        report.unmapped_segments += 1;
                        code.clone()
                    }
                };
                (code, label)
            }
            None => {
                report.default_segments += 1;
                (DEFAULT_SEGMENT.to_string(), DEFAULT_SEGMENT.to_string())
            }
        };

        if hotels.get(&record.hotel_id).is_none() {
            report.unknown_hotels += 1;
        }
        let hotel = hotels.get_or(&record.hotel_id, &no_hotel);

        enriched.push(EnrichedRecord {
            date_jour,
            hotel_id: record.hotel_id,
            hotel_name: record.hotel_name,
            date_extraction: record.date_extraction,
            segment_code,
            segment_label,
            pms_type: record.pms_type,
            file_type: record.file_type,
            ca_ttc,
            rooms_occupied,
            pax,
            enf: record.enf,
            arrivals,
            ntes: record.ntes,
            double_occ: record.double_occ,
            guest_mkt: record.guest_mkt,
            revenue: record.revenue,
            rooms: record.rooms,
            guests: record.guests,
            ville: hotel.city.clone(),
            pays: hotel.country.clone(),
            devise: hotel.currency.clone(),
            type_contrat: hotel.contract_type.clone(),
        });
    }

    debug!(
        kept = enriched.len(),
        dropped_missing_date = report.dropped_missing_date,
        negative_values_nulled = report.negative_values_nulled,
        rooms_above_ceiling = report.rooms_above_ceiling,
        "validation finished"
    );

    (enriched, report)
}

/// Negative revenue, occupancy, guests or arrivals carry no signal.
pub fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v >= 0.0)
}

pub fn within_ceiling(value: Option<f64>, ceiling: f64) -> Option<f64> {
    value.filter(|v| *v <= ceiling)
}
