use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PmsType {
    #[serde(rename = "PMS1")]
    Pms1,
    #[serde(rename = "PMS2")]
    Pms2,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl PmsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PmsType::Pms1 => "PMS1",
            PmsType::Pms2 => "PMS2",
            PmsType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for PmsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which half of a PMS2 extraction a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Past,
    Future,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Past => "past",
            FileType::Future => "future",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source row renamed onto the canonical field set, before validation.
///
/// PMS2 `revenue`, `rooms` and `guests` keep their own fields and never fill
/// `ca_ttc`, `rooms_occupied` or `pax`. Fields a format does not carry stay
/// `None`. Counts are kept as `f64` until the final projection decides
/// whether they are whole.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedRecord {
    pub date_jour: Option<NaiveDate>,
    pub segment_code: Option<String>,
    pub hotel_id: String,
    pub hotel_name: Option<String>,
    pub date_extraction: Option<NaiveDate>,
    pub pms_type: PmsType,
    pub file_type: Option<FileType>,
    pub ca_ttc: Option<f64>,
    pub rooms_occupied: Option<f64>,
    pub pax: Option<f64>,
    pub enf: Option<f64>,
    pub arrivals: Option<f64>,
    /// PMS1 `NTES`.
    pub ntes: Option<f64>,
    /// PMS2 `PER_DOUBLE_MKT` / `DOUBLE_OCC_MKT`.
    pub double_occ: Option<f64>,
    /// PMS2 future `GUEST_MKT`.
    pub guest_mkt: Option<f64>,
    /// PMS2 `REVENUE` / `TOTAL_REVENUE`.
    pub revenue: Option<f64>,
    /// PMS2 `NO_DEFINITE_ROOMS`.
    pub rooms: Option<f64>,
    /// PMS2 `IN_GUEST` / `NO_OF_GUESTS`.
    pub guests: Option<f64>,
    /// Unrecognized exports only: first column read as a date.
    pub date_parsed: Option<NaiveDate>,
    /// Unrecognized exports only: the untouched source cells.
    pub passthrough: Vec<(String, String)>,
}
