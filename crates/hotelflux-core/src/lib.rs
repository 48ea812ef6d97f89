pub mod cleaning;
pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod modeling;
pub mod outputs;
pub mod pipeline;
pub mod reference;
pub mod sinks;

pub use cleaning::{validate_and_enrich, CleaningReport, EnrichedRecord, ValidationSettings};
pub use config::{DedupKey, PipelineConfig};
pub use dedup::{deduplicate, deduplicate_by, DedupReport};
pub use modeling::{build_final, FinalRecord, FINAL_COLUMNS};
pub use reference::{HotelAttributes, HotelReference, ReferenceMap, SegmentReference};
