use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::errors::ParserError;
use crate::formats::{CanonicalField, Pms1Format, Pms2Format, UnknownFormat};
use crate::model::{FileType, PmsType};
use crate::raw::RawTable;
use crate::registry::{detect_format, detect_with_formats, SourceFormat};
use crate::{detect_and_normalize, parse_filename, parse_hotel_file};

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn table(headers: &str) -> RawTable {
    RawTable::from_csv(&format!("{headers}\n")).expect("header-only table")
}

#[test]
fn detection_prefers_pms1_markers() {
    assert_eq!(detect_format(&table("JOUR,X")).unwrap().format.name(), "PMS1");
    assert_eq!(
        detect_format(&table("SEGMENTATION,MASTER_VALUE"))
            .unwrap()
            .format
            .name(),
        "PMS1"
    );
}

#[test]
fn detection_routes_pms2_markers() {
    for headers in ["CHAR_BUSINESS_DATE", "MASTER_VALUE", "RESERVATION_DATE"] {
        let detection = detect_format(&table(headers)).unwrap();
        assert_eq!(detection.format.name(), "PMS2", "headers {headers}");
        assert_eq!(detection.attempts.len(), 1);
        assert_eq!(detection.attempts[0].format, "PMS1");
    }
}

#[test]
fn detection_falls_back_to_unknown() {
    let detection = detect_format(&table("Date,Rooms")).unwrap();
    assert_eq!(detection.format.name(), "UNKNOWN");
    let declined: Vec<_> = detection.attempts.iter().map(|a| a.format).collect();
    assert_eq!(declined, ["PMS1", "PMS2"]);
}

#[test]
fn detection_without_catch_all_reports_attempts() {
    let formats: [&dyn SourceFormat; 2] = [&Pms1Format, &Pms2Format];
    let err = detect_with_formats(&table("Date,Rooms"), &formats).unwrap_err();
    match err {
        ParserError::NoMatchingFormat { attempts } => assert_eq!(attempts.len(), 2),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn pms2_variant_markers() {
    assert_eq!(
        Pms2Format::variant(&table("CHAR_BUSINESS_DATE,RESERVATION_DATE")).unwrap(),
        FileType::Past
    );
    assert_eq!(
        Pms2Format::variant(&table("RESERVATION_DATE")).unwrap(),
        FileType::Future
    );
    assert!(matches!(
        Pms2Format::variant(&table("MASTER_VALUE")),
        Err(ParserError::UnrecognizedPms2Variant { .. })
    ));
}

#[test]
fn normalizes_pms1_export() {
    let content = fixture("007_JamesBond_20251024.csv");
    let parsed = parse_hotel_file("007_JamesBond_20251024.csv", &content).expect("PMS1 parse");

    assert_eq!(parsed.format, "PMS1");
    assert_eq!(parsed.raw_rows, 7);
    assert_eq!(parsed.records.len(), 7);

    let first = &parsed.records[0];
    assert_eq!(first.date_jour, date(2025, 10, 24));
    assert_eq!(first.segment_code.as_deref(), Some("BAR"));
    assert_eq!(first.ca_ttc, Some(9800.0));
    assert_eq!(first.rooms_occupied, Some(12.0));
    assert_eq!(first.pax, Some(20.0));
    assert_eq!(first.enf, Some(2.0));
    assert_eq!(first.arrivals, Some(5.0));
    assert_eq!(first.ntes, Some(12.0));
    assert_eq!(first.hotel_id, "007");
    assert_eq!(first.hotel_name.as_deref(), Some("JamesBond"));
    assert_eq!(first.date_extraction, date(2025, 10, 24));
    assert_eq!(first.pms_type, PmsType::Pms1);
    assert!(first.file_type.is_none());

    assert_eq!(parsed.records[1].ca_ttc, Some(350.0));
    assert_eq!(parsed.records[2].segment_code, None);
    assert_eq!(parsed.records[2].ca_ttc, Some(1.23));
    assert_eq!(parsed.records[3].date_jour, None);
    assert_eq!(parsed.records[6].ca_ttc, None);
    assert_eq!(parsed.records[6].pax, None);
}

#[test]
fn normalizes_pms2_past_export() {
    let content = fixture("HMM_past_MickeyMouse_20251024.csv");
    let parsed =
        parse_hotel_file("HMM_past_MickeyMouse_20251024.csv", &content).expect("PMS2 past parse");

    assert_eq!(parsed.format, "PMS2");
    assert_eq!(parsed.metadata, parse_filename("HMM_past_MickeyMouse_20251024.csv"));

    let first = &parsed.records[0];
    assert_eq!(first.pms_type, PmsType::Pms2);
    assert_eq!(first.file_type, Some(FileType::Past));
    assert_eq!(first.date_jour, date(2025, 10, 20));
    assert_eq!(first.segment_code.as_deref(), Some("BAR"));
    assert_eq!(first.rooms, Some(30.0));
    assert_eq!(first.guests, Some(45.0));
    assert_eq!(first.revenue, Some(4500.5));
    assert_eq!(first.ca_ttc, None);
    assert_eq!(first.rooms_occupied, None);
    assert_eq!(first.pax, None);
    assert_eq!(first.double_occ, Some(10.0));
    assert_eq!(first.arrivals, Some(12.0));
    assert_eq!(first.enf, None);

    // ISO dates do not match the DD.MM.YY layout
    assert_eq!(parsed.records[3].date_jour, None);
}

#[test]
fn normalizes_pms2_future_export() {
    let content = fixture("HMM_futur_MickeyMouse_20251024.csv");
    let parsed = parse_hotel_file("HMM_futur_MickeyMouse_20251024.csv", &content)
        .expect("PMS2 future parse");

    assert_eq!(parsed.records.len(), 2);
    let first = &parsed.records[0];
    assert_eq!(first.file_type, Some(FileType::Future));
    assert_eq!(first.date_jour, date(2025, 11, 1));
    assert_eq!(first.segment_code.as_deref(), Some("BAR"));
    assert_eq!(first.revenue, Some(2300.0));
    assert_eq!(first.rooms, Some(15.0));
    assert_eq!(first.guests, Some(22.0));
    assert_eq!(first.ca_ttc, None);
    assert_eq!(first.guest_mkt, Some(22.0));
    assert_eq!(first.double_occ, Some(7.0));
    assert_eq!(first.arrivals, None);
}

#[test]
fn pms2_without_variant_marker_is_fatal() {
    let content = fixture("HMM_broken_20251024.csv");
    let err = parse_hotel_file("HMM_broken_20251024.csv", &content).unwrap_err();
    assert!(matches!(err, ParserError::UnrecognizedPms2Variant { .. }));
}

#[test]
fn unknown_export_passes_columns_through() {
    let content = fixture("999_Mystery_20251024.csv");
    let parsed = parse_hotel_file("999_Mystery_20251024.csv", &content).expect("unknown parse");

    assert_eq!(parsed.format, "UNKNOWN");
    let first = &parsed.records[0];
    assert_eq!(first.pms_type, PmsType::Unknown);
    assert_eq!(first.date_parsed, date(2025, 10, 24));
    assert_eq!(first.date_jour, None);
    assert_eq!(first.hotel_id, "999");
    assert_eq!(
        first.passthrough,
        vec![
            ("Date".to_string(), "10/24/2025".to_string()),
            ("Rooms".to_string(), "5".to_string()),
            ("Revenue".to_string(), "100".to_string()),
        ]
    );
    assert_eq!(parsed.records[1].date_parsed, None);
}

#[test]
fn missing_mapped_columns_leave_fields_absent() {
    let raw = RawTable::from_csv("JOUR,PAX\n01/03/2025,4\n").unwrap();
    let meta = parse_filename("1_Test_20250301.csv");
    let records = detect_and_normalize(&raw, &meta).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date_jour, date(2025, 3, 1));
    assert_eq!(records[0].pax, Some(4.0));
    assert_eq!(records[0].segment_code, None);
    assert_eq!(records[0].ca_ttc, None);
    assert_eq!(records[0].rooms_occupied, None);
}

#[test]
fn unknown_format_claims_everything() {
    assert!(UnknownFormat.claims(&table("anything")).is_ok());
}

#[test]
fn labels_serialize_as_stored() {
    assert_eq!(serde_json::to_string(&PmsType::Pms1).unwrap(), "\"PMS1\"");
    assert_eq!(serde_json::to_string(&PmsType::Unknown).unwrap(), "\"UNKNOWN\"");
    assert_eq!(serde_json::to_string(&FileType::Future).unwrap(), "\"future\"");
    let parsed: PmsType = serde_json::from_str("\"PMS2\"").unwrap();
    assert_eq!(parsed, PmsType::Pms2);
}

#[test]
fn pms2_measures_keep_their_own_names() {
    let past = Pms2Format::column_map(FileType::Past);
    assert_eq!(past.source_column(CanonicalField::Revenue), Some("REVENUE"));
    assert_eq!(past.source_column(CanonicalField::Guests), Some("IN_GUEST"));
    assert_eq!(past.source_column(CanonicalField::CaTtc), None);

    let future = Pms2Format::column_map(FileType::Future);
    assert_eq!(future.source_column(CanonicalField::Revenue), Some("TOTAL_REVENUE"));
    assert_eq!(future.source_column(CanonicalField::Guests), Some("NO_OF_GUESTS"));
    assert_eq!(future.source_column(CanonicalField::Pax), None);

    let targets: Vec<&str> = past
        .columns
        .iter()
        .map(|(_, field)| field.canonical_name())
        .collect();
    assert_eq!(
        targets,
        ["date_jour", "segment_code", "rooms", "guests", "revenue", "double_occ", "arrivals"]
    );
}
