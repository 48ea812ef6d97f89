use std::path::PathBuf;

use anyhow::Result;
use hotelflux_core::config::{DedupKey, PipelineConfig};
use hotelflux_core::db::MAX_UPSERT_BATCH_SIZE;
use hotelflux_core::error::PipelineError;

#[test]
fn empty_config_uses_defaults() -> Result<()> {
    let config = PipelineConfig::from_toml_str("")?;
    assert_eq!(config, PipelineConfig::default());
    assert_eq!(config.max_rooms_occupied, 5000.0);
    assert_eq!(config.dedup_key, DedupKey::Extraction);
    assert_eq!(config.output_dir, PathBuf::from("data/output"));
    assert_eq!(config.table_name, "hotel_daily_activity");
    assert_eq!(config.upsert_batch_size, 1000);
    Ok(())
}

#[test]
fn overrides_are_applied() -> Result<()> {
    let config = PipelineConfig::from_toml_str(
        r#"
        max_rooms_occupied = 800.0
        dedup_key = "business_day"
        output_dir = "/tmp/hotelflux"
        "#,
    )?;
    assert_eq!(config.max_rooms_occupied, 800.0);
    assert_eq!(config.dedup_key, DedupKey::BusinessDay);
    assert_eq!(config.validation_settings().max_rooms_occupied, 800.0);
    assert_eq!(config.upsert_batch_size, 1000);
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() {
    let err = PipelineConfig::from_toml_str("max_room = 10").unwrap_err();
    assert!(matches!(err, PipelineError::Toml(_)));
}

#[test]
fn invalid_values_are_rejected() {
    for content in [
        "max_rooms_occupied = -1.0",
        "upsert_batch_size = 0",
        "upsert_batch_size = 5000",
        "table_name = \"activity; DROP TABLE x\"",
    ] {
        let err = PipelineConfig::from_toml_str(content).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)), "{content}: {err}");
    }
}

#[test]
fn batch_size_stays_within_bind_limit() -> Result<()> {
    assert_eq!(MAX_UPSERT_BATCH_SIZE, 4095);

    let config = PipelineConfig::from_toml_str("upsert_batch_size = 4095")?;
    assert_eq!(config.upsert_batch_size, MAX_UPSERT_BATCH_SIZE);

    let err = PipelineConfig::from_toml_str("upsert_batch_size = 4096").unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    Ok(())
}
