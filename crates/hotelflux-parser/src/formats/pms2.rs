use crate::errors::ParserError;
use crate::fields::{parse_dotted_short_date, parse_number};
use crate::filename::FileMetadata;
use crate::model::{FileType, NormalizedRecord, PmsType};
use crate::raw::RawTable;
use crate::registry::SourceFormat;

use super::{CanonicalField, ColumnMap};

pub const PMS2_PAST_COLUMNS: [(&str, CanonicalField); 7] = [
    ("CHAR_BUSINESS_DATE", CanonicalField::DateJour),
    ("MASTER_VALUE", CanonicalField::SegmentCode),
    ("NO_DEFINITE_ROOMS", CanonicalField::Rooms),
    ("IN_GUEST", CanonicalField::Guests),
    ("REVENUE", CanonicalField::Revenue),
    ("PER_DOUBLE_MKT", CanonicalField::DoubleOcc),
    ("ARRIVAL_MKT", CanonicalField::Arrivals),
];

pub const PMS2_FUTURE_COLUMNS: [(&str, CanonicalField); 7] = [
    ("CHAR_RESERVATION_DATE", CanonicalField::DateJour),
    ("MARKET_CODE_SEQ", CanonicalField::SegmentCode),
    ("NO_DEFINITE_ROOMS", CanonicalField::Rooms),
    ("NO_OF_GUESTS", CanonicalField::Guests),
    ("TOTAL_REVENUE", CanonicalField::Revenue),
    ("GUEST_MKT", CanonicalField::GuestMkt),
    ("DOUBLE_OCC_MKT", CanonicalField::DoubleOcc),
];

const MARKERS: [&str; 3] = ["CHAR_BUSINESS_DATE", "MASTER_VALUE", "RESERVATION_DATE"];
const PAST_MARKER: &str = "CHAR_BUSINESS_DATE";
const FUTURE_MARKER: &str = "RESERVATION_DATE";

/// Market-segment statistics export, split into past (actuals) and future
/// (on-the-books) files.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pms2Format;

impl Pms2Format {
    const NAME: &'static str = "PMS2";

    /// Picks the past or future layout. A PMS2 table carrying neither marker
    /// is unusable and aborts the file.
    pub fn variant(table: &RawTable) -> Result<FileType, ParserError> {
        if table.has_column(PAST_MARKER) {
            Ok(FileType::Past)
        } else if table.has_column(FUTURE_MARKER) {
            Ok(FileType::Future)
        } else {
            Err(ParserError::UnrecognizedPms2Variant { format: Self::NAME })
        }
    }

    pub fn column_map(file_type: FileType) -> ColumnMap {
        let columns: &'static [(&'static str, CanonicalField)] = match file_type {
            FileType::Past => &PMS2_PAST_COLUMNS,
            FileType::Future => &PMS2_FUTURE_COLUMNS,
        };
        ColumnMap {
            pms_type: PmsType::Pms2,
            file_type: Some(file_type),
            columns,
            parse_date: parse_dotted_short_date,
            parse_revenue: parse_number,
        }
    }
}

impl SourceFormat for Pms2Format {
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
        let map = Self::column_map(Self::variant(table)?);
        Ok(table.records().map(|row| map.apply(&row, meta)).collect())
    }
}
