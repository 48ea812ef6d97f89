//! Delivery of one file's final rows to the parquet and database sinks.
//! Each sink runs regardless of how the other one fared.

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;

use crate::modeling::FinalRecord;
use crate::outputs::write_parquet;

/// Per-sink results. `None` means the sink was skipped.
#[derive(Debug, Default)]
pub struct SinkOutcome {
    pub parquet: Option<Result<PathBuf>>,
    pub upserted: Option<Result<u64>>,
}

impl SinkOutcome {
    pub fn is_ok(&self) -> bool {
        !matches!(self.parquet, Some(Err(_))) && !matches!(self.upserted, Some(Err(_)))
    }

    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(Err(err)) = &self.parquet {
            errors.push(format!("parquet: {err:#}"));
        }
        if let Some(Err(err)) = &self.upserted {
            errors.push(format!("database: {err:#}"));
        }
        errors
    }
}

/// Writes the parquet export when `output_dir` is given, then awaits `upsert`
/// when given.
pub async fn deliver<F>(
    records: &[FinalRecord],
    input: &Path,
    output_dir: Option<&Path>,
    upsert: Option<F>,
) -> SinkOutcome
where
    F: Future<Output = Result<u64>>,
{
    let parquet = output_dir.map(|dir| write_parquet(records, dir, input));
    if let Some(Err(err)) = &parquet {
        warn!(file = %input.display(), error = %format!("{err:#}"), "parquet export failed");
    }

    let upserted = match upsert {
        Some(upsert) => Some(upsert.await),
        None => None,
    };
    if let Some(Err(err)) = &upserted {
        warn!(file = %input.display(), error = %format!("{err:#}"), "database upsert failed");
    }

    SinkOutcome { parquet, upserted }
}
