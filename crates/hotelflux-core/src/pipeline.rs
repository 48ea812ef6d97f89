use std::path::{Path, PathBuf};

use blake3::Hasher;
use hotelflux_parser::{parse_hotel_file, FileMetadata};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::cleaning::{validate_and_enrich, CleaningReport};
use crate::config::PipelineConfig;
use crate::dedup::{deduplicate_by, DedupReport};
use crate::error::{PipelineError, Result};
use crate::modeling::{build_final, FinalRecord};
use crate::reference::{
    load_hotel_reference_path, load_segment_reference_path, HotelReference, SegmentReference,
};

/// Reference lookups shared by every file of a run.
#[derive(Debug, Clone, Default)]
pub struct References {
    pub hotels: HotelReference,
    pub segments: SegmentReference,
}

impl References {
    pub fn load(hotel_path: &Path, segment_path: &Path) -> Result<Self> {
        Ok(Self {
            hotels: load_hotel_reference_path(hotel_path)?,
            segments: load_segment_reference_path(segment_path)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub run_id: Uuid,
    pub file: String,
    pub file_hash: String,
    pub hotel_id: String,
    pub format: &'static str,
    pub file_type: Option<String>,
    pub raw_rows: usize,
    pub cleaning: CleaningReport,
    pub dedup: DedupReport,
    pub final_rows: usize,
}

#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub path: PathBuf,
    pub metadata: FileMetadata,
    pub records: Vec<FinalRecord>,
    pub summary: PipelineSummary,
}

/// Read one export from disk and run it through every in-memory stage.
pub fn process_file(
    path: &Path,
    references: &References,
    config: &PipelineConfig,
) -> Result<ProcessedFile> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            PipelineError::Config(format!("{} has no usable file name", path.display()))
        })?;
    process_bytes(path, filename, &bytes, references, config)
}

pub fn process_bytes(
    path: &Path,
    filename: &str,
    bytes: &[u8],
    references: &References,
    config: &PipelineConfig,
) -> Result<ProcessedFile> {
    let file_hash = compute_hash(bytes);
    let content = String::from_utf8_lossy(bytes);

    let parsed = parse_hotel_file(filename, &content)?;
    let file_type = parsed
        .records
        .iter()
        .find_map(|record| record.file_type)
        .map(|file_type| file_type.to_string());

    let (enriched, cleaning) = validate_and_enrich(
        parsed.records,
        &references.hotels,
        &references.segments,
        &config.validation_settings(),
    );
    let (deduplicated, dedup) = deduplicate_by(enriched, config.dedup_key);
    let records = build_final(&deduplicated);

    let summary = PipelineSummary {
        run_id: Uuid::new_v4(),
        file: filename.to_string(),
        file_hash,
        hotel_id: parsed.metadata.hotel_id.clone(),
        format: parsed.format,
        file_type,
        raw_rows: parsed.raw_rows,
        cleaning,
        dedup,
        final_rows: records.len(),
    };

    info!(
        run_id = %summary.run_id,
        file = %summary.file,
        format = summary.format,
        raw_rows = summary.raw_rows,
        final_rows = summary.final_rows,
        "file processed"
    );

    Ok(ProcessedFile {
        path: path.to_path_buf(),
        metadata: parsed.metadata,
        records,
        summary,
    })
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
