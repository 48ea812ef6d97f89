pub mod errors;
pub mod fields;
pub mod filename;
pub mod formats;
pub mod model;
pub mod raw;
mod registry;

pub use errors::{FormatAttempt, ParserError};
pub use filename::{parse_filename, FileMetadata};
pub use model::{FileType, NormalizedRecord, PmsType};
pub use raw::{RawRecord, RawTable};
pub use registry::{
    all_formats, detect_and_normalize, detect_format, detect_with_formats, parse_hotel_file,
    Detection, NormalizedFile, SourceFormat,
};

#[cfg(test)]
mod tests;
