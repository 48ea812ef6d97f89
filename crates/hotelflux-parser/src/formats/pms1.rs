use crate::errors::ParserError;
use crate::fields::{parse_amount, parse_date, DateOrder};
use crate::filename::FileMetadata;
use crate::model::{NormalizedRecord, PmsType};
use crate::raw::RawTable;
use crate::registry::SourceFormat;

use super::{CanonicalField, ColumnMap};

pub const PMS1_COLUMNS: [(&str, CanonicalField); 8] = [
    ("JOUR", CanonicalField::DateJour),
    ("SEGMENTATION", CanonicalField::SegmentCode),
    ("C.A. HBGT T.T.C.", CanonicalField::CaTtc),
    ("OCCUP.", CanonicalField::RoomsOccupied),
    ("PAX", CanonicalField::Pax),
    ("ENF", CanonicalField::Enf),
    ("ARRIVEES", CanonicalField::Arrivals),
    ("NTES", CanonicalField::Ntes),
];

const MARKERS: [&str; 2] = ["JOUR", "SEGMENTATION"];

/// Classic daily export: French headers, day-first dates, labelled revenue.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pms1Format;

impl Pms1Format {
    const NAME: &'static str = "PMS1";

    pub fn column_map() -> ColumnMap {
        ColumnMap {
            pms_type: PmsType::Pms1,
            file_type: None,
            columns: &PMS1_COLUMNS,
            parse_date: |value| parse_date(value, DateOrder::DayFirst),
            parse_revenue: parse_amount,
        }
    }
}

impl SourceFormat for Pms1Format {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn claims(&self, table: &RawTable) -> Result<(), ParserError> {
        if MARKERS.iter().any(|marker| table.has_column(marker)) {
            Ok(())
        } else {
            Err(ParserError::FormatMismatch {
                format: Self::NAME,
                reason: format!("none of {MARKERS:?} present"),
            })
        }
    }

    fn normalize(
        &self,
        table: &RawTable,
        meta: &FileMetadata,
    ) -> Result<Vec<NormalizedRecord>, ParserError> {
        let map = Self::column_map();
        Ok(table.records().map(|row| map.apply(&row, meta)).collect())
    }
}
