use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hotel identity and extraction day carried by an export's file name.
///
/// Names follow `{hotel_id}_{name parts...}_{YYYYMMDD}.csv`. Anything that does
/// not fit degrades to absent fields instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub hotel_id: String,
    pub hotel_name: Option<String>,
    pub extraction_date: Option<NaiveDate>,
}

pub fn parse_filename(filename: &str) -> FileMetadata {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(filename);

    let parts: Vec<&str> = stem.split('_').collect();
    let hotel_id = parts.first().copied().unwrap_or_default().to_string();

    let extraction_date = match parts.as_slice() {
        [_, .., last] => NaiveDate::parse_from_str(last, "%Y%m%d")
            .ok()
            .filter(|_| last.len() == 8 && last.bytes().all(|b| b.is_ascii_digit())),
        _ => None,
    };

    let hotel_name = if parts.len() > 2 {
        Some(parts[1..parts.len() - 1].join("_"))
    } else {
        None
    };

    FileMetadata {
        hotel_id,
        hotel_name,
        extraction_date,
    }
}
