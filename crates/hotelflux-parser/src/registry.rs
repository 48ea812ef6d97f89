use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::errors::{FormatAttempt, ParserError};
use crate::filename::{parse_filename, FileMetadata};
use crate::formats::{Pms1Format, Pms2Format, UnknownFormat};
use crate::model::NormalizedRecord;
use crate::raw::RawTable;

pub trait SourceFormat: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(())` when the header set belongs to this format. Declining is a
    /// [`ParserError::FormatMismatch`].
    fn claims(&self, table: &RawTable) -> Result<(), ParserError>;

    fn normalize(
        &self,
        table: &RawTable,
        meta: &FileMetadata,
    ) -> Result<Vec<NormalizedRecord>, ParserError>;
}

static FORMATS: Lazy<Vec<&'static dyn SourceFormat>> = Lazy::new(|| {
    vec![
        &Pms1Format as &dyn SourceFormat,
        &Pms2Format as &dyn SourceFormat,
        &UnknownFormat as &dyn SourceFormat,
    ]
});

/// Known formats in detection priority order; the catch-all comes last.
pub fn all_formats() -> &'static [&'static dyn SourceFormat] {
    FORMATS.as_slice()
}

pub struct Detection<'a> {
    pub format: &'a dyn SourceFormat,
    pub attempts: Vec<FormatAttempt>,
}

impl std::fmt::Debug for Detection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detection")
            .field("format", &self.format.name())
            .field("attempts", &self.attempts)
            .finish()
    }
}

pub fn detect_format(table: &RawTable) -> Result<Detection<'static>, ParserError> {
    detect_with_formats(table, all_formats())
}

pub fn detect_with_formats<'a>(
    table: &RawTable,
    formats: &[&'a dyn SourceFormat],
) -> Result<Detection<'a>, ParserError> {
    let mut attempts = Vec::new();

    for format in formats {
        match format.claims(table) {
            Ok(()) => {
                return Ok(Detection {
                    format: *format,
                    attempts,
                })
            }
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(FormatAttempt::new(format.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingFormat { attempts })
}

#[derive(Debug, Clone)]
pub struct NormalizedFile {
    pub metadata: FileMetadata,
    pub format: &'static str,
    pub raw_rows: usize,
    pub records: Vec<NormalizedRecord>,
}

pub fn detect_and_normalize(
    table: &RawTable,
    meta: &FileMetadata,
) -> Result<Vec<NormalizedRecord>, ParserError> {
    normalize_detected(table, meta).map(|(_, records)| records)
}

fn normalize_detected(
    table: &RawTable,
    meta: &FileMetadata,
) -> Result<(&'static str, Vec<NormalizedRecord>), ParserError> {
    let detection = detect_format(table)?;
    let format = detection.format;

    for attempt in &detection.attempts {
        debug!(format = attempt.format, reason = %attempt.message, "format declined");
    }
    if format.name() == "UNKNOWN" {
        warn!(
            hotel_id = %meta.hotel_id,
            headers = ?table.headers(),
            "no known PMS layout matched; passing columns through unchanged"
        );
    } else {
        debug!(format = format.name(), rows = table.len(), "format detected");
    }

    let records = format.normalize(table, meta)?;
    Ok((format.name(), records))
}

/// Reads one export from its file name and CSV text.
pub fn parse_hotel_file(filename: &str, content: &str) -> Result<NormalizedFile, ParserError> {
    let metadata = parse_filename(filename);
    let table = RawTable::from_csv(content)?;
    let (format, records) = normalize_detected(&table, &metadata)?;

    Ok(NormalizedFile {
        metadata,
        format,
        raw_rows: table.len(),
        records,
    })
}
