use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::Serialize;

use crate::cleaning::EnrichedRecord;

/// Output schema, in column order. Every projection carries all of them.
pub const FINAL_COLUMNS: [&str; 16] = [
    "date_jour",
    "hotel_id",
    "hotel_name",
    "date_extraction",
    "segment_code",
    "segment_label",
    "pms_type",
    "ca_ttc",
    "rooms_occupied",
    "pax",
    "enf",
    "arrivals",
    "ville",
    "pays",
    "devise",
    "type_contrat",
];

/// Row of the persisted daily-activity table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalRecord {
    pub date_jour: Option<NaiveDate>,
    pub hotel_id: Option<String>,
    pub hotel_name: Option<String>,
    pub date_extraction: Option<NaiveDate>,
    pub segment_code: Option<String>,
    pub segment_label: Option<String>,
    pub pms_type: Option<String>,
    pub ca_ttc: Option<f64>,
    pub rooms_occupied: Option<i64>,
    pub pax: Option<i64>,
    pub enf: Option<f64>,
    pub arrivals: Option<f64>,
    pub ville: Option<String>,
    pub pays: Option<String>,
    pub devise: Option<String>,
    pub type_contrat: Option<String>,
}

pub fn build_final(records: &[EnrichedRecord]) -> Vec<FinalRecord> {
    records.iter().map(FinalRecord::from).collect()
}

impl From<&EnrichedRecord> for FinalRecord {
    fn from(record: &EnrichedRecord) -> Self {
        Self {
            date_jour: Some(record.date_jour),
            hotel_id: Some(record.hotel_id.clone()),
            hotel_name: record.hotel_name.clone(),
            date_extraction: record.date_extraction,
            segment_code: Some(record.segment_code.clone()),
            segment_label: Some(record.segment_label.clone()),
            pms_type: Some(record.pms_type.as_str().to_string()),
            ca_ttc: record.ca_ttc,
            rooms_occupied: whole_number(record.rooms_occupied),
            pax: whole_number(record.pax),
            enf: record.enf,
            arrivals: record.arrivals,
            ville: record.ville.clone(),
            pays: record.pays.clone(),
            devise: record.devise.clone(),
            type_contrat: record.type_contrat.clone(),
        }
    }
}

/// `Some` only for finite values without a fractional part that fit `i64`.
pub fn whole_number(value: Option<f64>) -> Option<i64> {
    let value = value?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

/// Column-oriented copy of the final rows for the parquet export.
pub fn to_dataframe(records: &[FinalRecord]) -> PolarsResult<DataFrame> {
    let rows = || records.iter();

    DataFrame::new(vec![
        date_column("date_jour", rows().map(|r| r.date_jour))?,
        text_column("hotel_id", rows().map(|r| r.hotel_id.as_deref())),
        text_column("hotel_name", rows().map(|r| r.hotel_name.as_deref())),
        date_column("date_extraction", rows().map(|r| r.date_extraction))?,
        text_column("segment_code", rows().map(|r| r.segment_code.as_deref())),
        text_column("segment_label", rows().map(|r| r.segment_label.as_deref())),
        text_column("pms_type", rows().map(|r| r.pms_type.as_deref())),
        float_column("ca_ttc", rows().map(|r| r.ca_ttc)),
        integer_column("rooms_occupied", rows().map(|r| r.rooms_occupied)),
        integer_column("pax", rows().map(|r| r.pax)),
        float_column("enf", rows().map(|r| r.enf)),
        float_column("arrivals", rows().map(|r| r.arrivals)),
        text_column("ville", rows().map(|r| r.ville.as_deref())),
        text_column("pays", rows().map(|r| r.pays.as_deref())),
        text_column("devise", rows().map(|r| r.devise.as_deref())),
        text_column("type_contrat", rows().map(|r| r.type_contrat.as_deref())),
    ])
}

fn text_column<'a>(name: &str, values: impl Iterator<Item = Option<&'a str>>) -> Column {
    Series::new(name.into(), values.collect::<Vec<_>>()).into()
}

fn float_column(name: &str, values: impl Iterator<Item = Option<f64>>) -> Column {
    Series::new(name.into(), values.collect::<Vec<_>>()).into()
}

fn integer_column(name: &str, values: impl Iterator<Item = Option<i64>>) -> Column {
    Series::new(name.into(), values.collect::<Vec<_>>()).into()
}

fn date_column(
    name: &str,
    values: impl Iterator<Item = Option<NaiveDate>>,
) -> PolarsResult<Column> {
    let days: Vec<Option<i32>> = values.map(|date| date.map(days_since_epoch)).collect();
    Ok(Series::new(name.into(), days).cast(&DataType::Date)?.into())
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    // 719_163 days separate 0001-01-01 (CE day 1) from 1970-01-01.
    date.num_days_from_ce() - 719_163
}
