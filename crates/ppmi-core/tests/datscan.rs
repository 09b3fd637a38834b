//! DaT-scan loader tests.

use ppmi_core::datscan::{available_datscan, load_datscan};
use ppmi_model::DeriveError;

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

fn write_scan_fixture(dir: &std::path::Path) {
    write(
        dir,
        "DATScan_Analysis.csv",
        "PATNO,EVENT_ID,SCAN_DATE,CAUDATE_R,CAUDATE_L\n\
         1001,V04,2012-06-14,2.1,2.3\n\
         1001,SC,2011-01-20,2.8,2.9\n\
         1002,SC,2011-02-11,3.0,3.1\n",
    );
}

#[test]
fn lists_measure_columns_lowercased() {
    let dir = tempfile::tempdir().unwrap();
    write_scan_fixture(dir.path());
    let measures = available_datscan(dir.path()).unwrap();
    assert_eq!(measures, ["caudate_l", "caudate_r"]);
}

#[test]
fn loads_wide_frame_in_schedule_order() {
    let dir = tempfile::tempdir().unwrap();
    write_scan_fixture(dir.path());

    let wide = load_datscan(dir.path(), None).unwrap();
    assert_eq!(wide.height(), 3);

    let participants = wide.column("participant").unwrap().i64().unwrap();
    let visits = wide.column("visit").unwrap().str().unwrap();
    // 1001's screening scan sorts before its V04 scan.
    assert_eq!(participants.get(0), Some(1001));
    assert_eq!(visits.get(0), Some("SC"));
    assert_eq!(visits.get(1), Some("V04"));
    assert_eq!(participants.get(2), Some(1002));

    let caudate = wide.column("caudate_r").unwrap().f64().unwrap();
    assert_eq!(caudate.get(0), Some(2.8));

    let dates = wide.column("date").unwrap().str().unwrap();
    assert_eq!(dates.get(0), Some("2011-01-20"));
}

#[test]
fn unknown_requested_measure_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_scan_fixture(dir.path());

    let requested = vec!["putamen_r".to_string()];
    let err = load_datscan(dir.path(), Some(&requested)).unwrap_err();
    assert!(matches!(err, DeriveError::UnknownMeasure { .. }));
}

#[test]
fn selection_keeps_only_requested_measures() {
    let dir = tempfile::tempdir().unwrap();
    write_scan_fixture(dir.path());

    let requested = vec!["caudate_r".to_string()];
    let wide = load_datscan(dir.path(), Some(&requested)).unwrap();
    let names: Vec<String> = wide
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, ["participant", "visit", "date", "caudate_r"]);
}

#[test]
fn falls_back_to_administrative_dates_without_scan_date() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "DATScan_Analysis.csv",
        "PATNO,EVENT_ID,CAUDATE_R\n1001,SC,2.8\n",
    );
    write(
        dir.path(),
        "Signature_Form.csv",
        "PATNO,EVENT_ID,INFODT\n1001,SC,01/2011\n",
    );

    let wide = load_datscan(dir.path(), None).unwrap();
    let dates = wide.column("date").unwrap().str().unwrap();
    assert_eq!(dates.get(0), Some("2011-01-01"));
}
