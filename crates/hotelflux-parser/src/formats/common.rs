use chrono::NaiveDate;

use crate::fields::parse_number;
use crate::filename::FileMetadata;
use crate::model::{FileType, NormalizedRecord, PmsType};
use crate::raw::RawRecord;

/// Canonical destination of a source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    DateJour,
    SegmentCode,
    CaTtc,
    RoomsOccupied,
    Pax,
    Enf,
    Arrivals,
    Ntes,
    DoubleOcc,
    GuestMkt,
    Revenue,
    Rooms,
    Guests,
}

impl CanonicalField {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            CanonicalField::DateJour => "date_jour",
            CanonicalField::SegmentCode => "segment_code",
            CanonicalField::CaTtc => "ca_ttc",
            CanonicalField::RoomsOccupied => "rooms_occupied",
            CanonicalField::Pax => "pax",
            CanonicalField::Enf => "enf",
            CanonicalField::Arrivals => "arrivals",
            CanonicalField::Ntes => "ntes",
            CanonicalField::DoubleOcc => "double_occ",
            CanonicalField::GuestMkt => "guest_mkt",
            CanonicalField::Revenue => "revenue",
            CanonicalField::Rooms => "rooms",
            CanonicalField::Guests => "guests",
        }
    }
}

/// Source header to canonical field renames plus the per-format coercions
/// for the two fields whose text differs between exports.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    pub pms_type: PmsType,
    pub file_type: Option<FileType>,
    pub columns: &'static [(&'static str, CanonicalField)],
    pub parse_date: fn(&str) -> Option<NaiveDate>,
    pub parse_revenue: fn(&str) -> Option<f64>,
}

impl ColumnMap {
    pub fn source_column(&self, field: CanonicalField) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(_, target)| *target == field)
            .map(|(source, _)| *source)
    }

    pub fn apply(&self, row: &RawRecord<'_>, meta: &FileMetadata) -> NormalizedRecord {
        let mut record = NormalizedRecord {
            hotel_id: meta.hotel_id.clone(),
            hotel_name: meta.hotel_name.clone(),
            date_extraction: meta.extraction_date,
            pms_type: self.pms_type,
            file_type: self.file_type,
            ..NormalizedRecord::default()
        };

        for (source, field) in self.columns {
            let Some(value) = row.get(source) else {
                continue;
            };
            match field {
                CanonicalField::DateJour => record.date_jour = (self.parse_date)(value),
                CanonicalField::SegmentCode => {
                    record.segment_code = Some(value.trim().to_string()).filter(|s| !s.is_empty())
                }
                CanonicalField::CaTtc => record.ca_ttc = (self.parse_revenue)(value),
                CanonicalField::RoomsOccupied => record.rooms_occupied = parse_number(value),
                CanonicalField::Pax => record.pax = parse_number(value),
                CanonicalField::Enf => record.enf = parse_number(value),
                CanonicalField::Arrivals => record.arrivals = parse_number(value),
                CanonicalField::Ntes => record.ntes = parse_number(value),
                CanonicalField::DoubleOcc => record.double_occ = parse_number(value),
                CanonicalField::GuestMkt => record.guest_mkt = parse_number(value),
                CanonicalField::Revenue => record.revenue = (self.parse_revenue)(value),
                CanonicalField::Rooms => record.rooms = parse_number(value),
                CanonicalField::Guests => record.guests = parse_number(value),
            }
        }

        record
    }
}
