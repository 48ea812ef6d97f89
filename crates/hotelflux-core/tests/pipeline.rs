use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use hotelflux_core::config::{DedupKey, PipelineConfig};
use hotelflux_core::dedup::deduplicate_by;
use hotelflux_core::error::PipelineError;
use hotelflux_core::pipeline::{process_file, References};
use hotelflux_core::reference::{load_hotel_reference, load_segment_reference};
use hotelflux_core::{build_final, validate_and_enrich, ValidationSettings};
use hotelflux_parser::{
    detect_and_normalize, parse_filename, parse_hotel_file, ParserError, RawTable,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../hotelflux-parser/tests/data")
        .join(name)
}

fn references() -> Result<References> {
    let hotels = load_hotel_reference(
        "ID hotel,Ville,Pays,Devise,Type de contrat\n007,Paris,France,EUR,Franchise\n".as_bytes(),
    )?;
    let segments = load_segment_reference(
        "Code Segment,Segment\nBAR,Best Available Rate\nLOIS,Loisirs\n".as_bytes(),
    )?;
    Ok(References { hotels, segments })
}

#[test]
fn pms1_export_runs_end_to_end() -> Result<()> {
    let processed = process_file(
        &fixture("007_JamesBond_20251024.csv"),
        &references()?,
        &PipelineConfig::default(),
    )?;

    let summary = &processed.summary;
    assert_eq!(summary.format, "PMS1");
    assert_eq!(summary.hotel_id, "007");
    assert_eq!(summary.raw_rows, 7);
    assert_eq!(summary.cleaning.dropped_missing_date, 1);
    assert_eq!(summary.dedup.exact_duplicates, 1);
    assert_eq!(summary.dedup.key_duplicates, 1);
    assert_eq!(summary.final_rows, 4);
    assert_eq!(summary.file_hash.len(), 64);

    let segments: Vec<_> = processed
        .records
        .iter()
        .map(|row| row.segment_code.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(segments, ["CORP", "AUTRES", "BAR", "LOIS"]);

    let extraction = NaiveDate::from_ymd_opt(2025, 10, 24);
    assert!(processed
        .records
        .iter()
        .all(|row| row.date_extraction == extraction && row.pms_type.as_deref() == Some("PMS1")));
    assert!(processed
        .records
        .iter()
        .all(|row| row.ville.as_deref() == Some("Paris")));

    let corp = &processed.records[0];
    assert_eq!(corp.ca_ttc, Some(350.0));
    assert_eq!(corp.segment_label.as_deref(), Some("CORP"));

    let autres = &processed.records[1];
    assert_eq!(autres.date_jour, NaiveDate::from_ymd_opt(2025, 10, 25));
    assert_eq!(autres.segment_label.as_deref(), Some("AUTRES"));
    assert_eq!(autres.ca_ttc, Some(1.23));
    assert_eq!(autres.rooms_occupied, None);
    assert_eq!(autres.pax, None);
    assert_eq!(autres.arrivals, None);

    let bar = &processed.records[2];
    assert_eq!(bar.ca_ttc, Some(9900.0));
    assert_eq!(bar.segment_label.as_deref(), Some("Best Available Rate"));
    assert_eq!(bar.rooms_occupied, Some(12));

    let lois = &processed.records[3];
    assert_eq!(lois.segment_label.as_deref(), Some("Loisirs"));
    assert_eq!(lois.ca_ttc, None);
    assert_eq!(lois.rooms_occupied, None);
    assert_eq!(lois.pax, None);
    assert_eq!(lois.enf, Some(-1.0));
    Ok(())
}

#[test]
fn pms2_past_export_has_no_reference_match() -> Result<()> {
    let processed = process_file(
        &fixture("HMM_past_MickeyMouse_20251024.csv"),
        &references()?,
        &PipelineConfig::default(),
    )?;

    assert_eq!(processed.summary.format, "PMS2");
    assert_eq!(processed.summary.file_type.as_deref(), Some("past"));
    assert_eq!(processed.metadata.hotel_name.as_deref(), Some("past_MickeyMouse"));
    assert!(!processed.records.is_empty());
    assert!(processed.records.iter().all(|row| row.ville.is_none()
        && row.pays.is_none()
        && row.devise.is_none()
        && row.type_contrat.is_none()));
    assert!(processed
        .records
        .iter()
        .all(|row| row.pms_type.as_deref() == Some("PMS2")));
    Ok(())
}

#[test]
fn unrecognized_pms2_variant_is_fatal() -> Result<()> {
    let err = process_file(
        &fixture("HMM_broken_20251024.csv"),
        &references()?,
        &PipelineConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Parser(ParserError::UnrecognizedPms2Variant { .. })
    ));
    Ok(())
}

#[test]
fn unknown_layout_produces_no_final_rows() -> Result<()> {
    let processed = process_file(
        &fixture("999_Mystery_20251024.csv"),
        &references()?,
        &PipelineConfig::default(),
    )?;

    assert_eq!(processed.summary.format, "UNKNOWN");
    assert_eq!(processed.summary.raw_rows, 2);
    assert_eq!(processed.summary.cleaning.dropped_missing_date, 2);
    assert!(processed.records.is_empty());
    Ok(())
}

#[test]
fn business_day_key_keeps_latest_extraction_of_combined_exports() -> Result<()> {
    let refs = references()?;
    let export = "JOUR,SEGMENTATION,C.A. HBGT T.T.C.,OCCUP.,PAX,ENF,ARRIVEES,NTES\n\
                  24/10/2025,BAR,100,1,1,0,1,1\n\
                  24/10/2025,CORP,40,1,1,0,1,1\n";
    let newer_export = export.replace(",100,", ",250,");

    let mut normalized = parse_hotel_file("007_JamesBond_20251024.csv", &newer_export)?.records;
    normalized.extend(parse_hotel_file("007_JamesBond_20251023.csv", export)?.records);

    let (enriched, _) = validate_and_enrich(
        normalized,
        &refs.hotels,
        &refs.segments,
        &ValidationSettings::default(),
    );

    let (by_extraction, _) = deduplicate_by(enriched.clone(), DedupKey::Extraction);
    assert_eq!(by_extraction.len(), 4);

    let (by_day, report) = deduplicate_by(enriched, DedupKey::BusinessDay);
    assert_eq!(report.key_duplicates, 2);
    let finals = build_final(&by_day);
    assert_eq!(finals.len(), 2);
    let latest = NaiveDate::from_ymd_opt(2025, 10, 24);
    assert!(finals.iter().all(|row| row.date_extraction == latest));
    let bar = finals
        .iter()
        .find(|row| row.segment_code.as_deref() == Some("BAR"))
        .expect("BAR row");
    assert_eq!(bar.ca_ttc, Some(250.0));
    Ok(())
}

#[test]
fn pms2_measures_stay_out_of_the_final_table() -> Result<()> {
    for name in [
        "HMM_past_MickeyMouse_20251024.csv",
        "HMM_futur_MickeyMouse_20251024.csv",
    ] {
        let processed = process_file(&fixture(name), &references()?, &PipelineConfig::default())?;
        assert!(!processed.records.is_empty(), "{name}");
        for row in &processed.records {
            assert_eq!(row.ca_ttc, None, "{name}");
            assert_eq!(row.rooms_occupied, None, "{name}");
            assert_eq!(row.pax, None, "{name}");
        }
    }
    Ok(())
}

#[test]
fn reprocessing_is_stable() -> Result<()> {
    let content = std::fs::read_to_string(fixture("007_JamesBond_20251024.csv"))?;
    let metadata = parse_filename("007_JamesBond_20251024.csv");
    let table = RawTable::from_csv(&content)?;
    let refs = references()?;

    let normalized = detect_and_normalize(&table, &metadata)?;
    let (enriched, _) = validate_and_enrich(
        normalized,
        &refs.hotels,
        &refs.segments,
        &ValidationSettings::default(),
    );
    let (once, _) = deduplicate_by(enriched, DedupKey::Extraction);
    let (twice, report) = deduplicate_by(once.clone(), DedupKey::Extraction);

    assert_eq!(once, twice);
    assert_eq!(report.total(), 0);
    assert_eq!(build_final(&once), build_final(&twice));
    Ok(())
}
