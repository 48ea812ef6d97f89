use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cleaning::{ValidationSettings, DEFAULT_MAX_ROOMS_OCCUPIED};
use crate::db::{DEFAULT_TABLE, MAX_UPSERT_BATCH_SIZE};
use crate::error::{PipelineError, Result};

pub use crate::dedup::DedupKey;

/// Tunables for one pipeline run, read from an optional TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub max_rooms_occupied: f64,
    pub dedup_key: DedupKey,
    pub output_dir: PathBuf,
    pub table_name: String,
    pub upsert_batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_rooms_occupied: DEFAULT_MAX_ROOMS_OCCUPIED,
            dedup_key: DedupKey::default(),
            output_dir: PathBuf::from("data/output"),
            table_name: DEFAULT_TABLE.to_string(),
            upsert_batch_size: 1000,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_rooms_occupied.is_finite() || self.max_rooms_occupied < 0.0 {
            return Err(PipelineError::Config(format!(
                "max_rooms_occupied must be a non-negative number, got {}",
                self.max_rooms_occupied
            )));
        }
        if !(1..=MAX_UPSERT_BATCH_SIZE).contains(&self.upsert_batch_size) {
            return Err(PipelineError::Config(format!(
                "upsert_batch_size must be between 1 and {MAX_UPSERT_BATCH_SIZE}, got {}",
                self.upsert_batch_size
            )));
        }
        crate::db::validate_table_name(&self.table_name)
            .map_err(|err| PipelineError::Config(err.to_string()))?;
        Ok(())
    }

    pub fn validation_settings(&self) -> ValidationSettings {
        ValidationSettings {
            max_rooms_occupied: self.max_rooms_occupied,
        }
    }
}
