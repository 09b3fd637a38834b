//! End-to-end behavioral pipeline scenarios.

use ppmi_core::pipeline::{PipelineOptions, derive_behavior};
use ppmi_model::{AdjustmentRule, MeasureDefinition, PageSplitRule};
use ppmi_registry::MeasureRegistry;

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

/// A two-measure registry with the education adjustment, small enough to
/// exercise the whole pipeline against hand-written fixtures.
fn cognitive_registry() -> MeasureRegistry {
    let behavioral = vec![
        MeasureDefinition::builder("moca_unadj")
            .source("Cognitive_Screen.csv", &[&["CTOTAL"]])
            .build()
            .unwrap(),
        MeasureDefinition::builder("education")
            .source("Socio-Economics.csv", &[&["EDUCYRS"]])
            .build()
            .unwrap(),
        MeasureDefinition::builder("benton")
            .source("Line_Orientation.csv", &[&["BJLOT1", "BJLOT2"]])
            .build()
            .unwrap(),
    ];
    let adjustments = vec![AdjustmentRule {
        name: "moca".to_string(),
        base: "moca_unadj".to_string(),
        dependency: "education".to_string(),
        cutoff: 12.0,
        ceiling: 30.0,
        bonus: 1.0,
    }];
    MeasureRegistry::from_parts(behavioral, adjustments, Vec::new(), Vec::new()).unwrap()
}

fn write_cognitive_fixtures(dir: &std::path::Path) {
    write(
        dir,
        "Cognitive_Screen.csv",
        "PATNO,EVENT_ID,INFODT,PAG_NAME,CTOTAL\n\
         1001,BL,03/2011,COGSCRN,28\n\
         1002,BL,03/2011,COGSCRN,30\n",
    );
    write(
        dir,
        "Socio-Economics.csv",
        "PATNO,EVENT_ID,INFODT,PAG_NAME,EDUCYRS\n\
         1001,BL,03/2011,SOCIO,10\n\
         1002,BL,03/2011,SOCIO,8\n",
    );
    write(
        dir,
        "Line_Orientation.csv",
        "PATNO,EVENT_ID,INFODT,PAG_NAME,BJLOT1,BJLOT2\n\
         1001,BL,03/2011,BJLOT,1,1\n",
    );
}

#[test]
fn education_adjustment_replaces_the_unadjusted_measure() {
    let dir = tempfile::tempdir().unwrap();
    write_cognitive_fixtures(dir.path());
    let registry = cognitive_registry();

    let outcome =
        derive_behavior(dir.path(), &registry, None, &PipelineOptions::default()).unwrap();

    let names: Vec<String> = outcome
        .wide
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert!(names.contains(&"moca".to_string()));
    assert!(!names.contains(&"moca_unadj".to_string()));
    assert!(!names.contains(&"education".to_string()));

    // 28 with 10 years of education earns the bonus; 30 is at ceiling.
    let moca = outcome.wide.column("moca").unwrap().f64().unwrap();
    let participants = outcome.wide.column("participant").unwrap().i64().unwrap();
    for index in 0..outcome.wide.height() {
        match participants.get(index).unwrap() {
            1001 => assert_eq!(moca.get(index), Some(29.0)),
            1002 => assert_eq!(moca.get(index), Some(30.0)),
            other => panic!("unexpected participant {other}"),
        }
    }
}

#[test]
fn explicitly_requested_precursor_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    write_cognitive_fixtures(dir.path());
    let registry = cognitive_registry();

    let requested = vec!["moca".to_string(), "education".to_string()];
    let outcome = derive_behavior(
        dir.path(),
        &registry,
        Some(&requested),
        &PipelineOptions::default(),
    )
    .unwrap();

    let names: Vec<String> = outcome
        .wide
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert!(names.contains(&"moca".to_string()));
    assert!(names.contains(&"education".to_string()));
    assert!(!names.contains(&"moca_unadj".to_string()));
}

#[test]
fn missing_instrument_degrades_to_a_skip() {
    let dir = tempfile::tempdir().unwrap();
    write_cognitive_fixtures(dir.path());
    std::fs::remove_file(dir.path().join("Line_Orientation.csv")).unwrap();
    let registry = cognitive_registry();

    let outcome =
        derive_behavior(dir.path(), &registry, None, &PipelineOptions::default()).unwrap();

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].name, "benton");
    let names: Vec<String> = outcome
        .wide
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert!(names.contains(&"moca".to_string()));
    assert!(!names.contains(&"benton".to_string()));
}

#[test]
fn recomputation_from_unchanged_files_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_cognitive_fixtures(dir.path());
    let registry = cognitive_registry();

    let first =
        derive_behavior(dir.path(), &registry, None, &PipelineOptions::default()).unwrap();
    let second =
        derive_behavior(dir.path(), &registry, None, &PipelineOptions::default()).unwrap();

    assert!(first.wide.equals_missing(&second.wide));
    assert!(first.long.equals_missing(&second.long));
}

#[test]
fn page_split_gives_repeat_administrations_their_own_column() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "Motor_Exam.csv",
        "PATNO,EVENT_ID,INFODT,PAG_NAME,M1,M2\n\
         1001,BL,03/2011,NUPDRS3,2,3\n\
         1001,BL,03/2011,NUPDRS3A,1,1\n",
    );
    let behavioral = vec![
        MeasureDefinition::builder("updrs_iii")
            .source("Motor_Exam.csv", &[&["M1", "M2"]])
            .build()
            .unwrap(),
    ];
    let splits = vec![PageSplitRule {
        measure: "updrs_iii".to_string(),
        page: "NUPDRS3A".to_string(),
        renamed: "updrs_iii_a".to_string(),
    }];
    let registry =
        MeasureRegistry::from_parts(behavioral, Vec::new(), splits, Vec::new()).unwrap();

    let outcome =
        derive_behavior(dir.path(), &registry, None, &PipelineOptions::default()).unwrap();

    let exam = outcome.wide.column("updrs_iii").unwrap().f64().unwrap();
    let repeat = outcome.wide.column("updrs_iii_a").unwrap().f64().unwrap();
    assert_eq!(exam.get(0), Some(5.0));
    assert_eq!(repeat.get(0), Some(2.0));
}

#[test]
fn long_audit_table_carries_every_observation() {
    let dir = tempfile::tempdir().unwrap();
    write_cognitive_fixtures(dir.path());
    let registry = cognitive_registry();

    let outcome =
        derive_behavior(dir.path(), &registry, None, &PipelineOptions::default()).unwrap();

    // moca for 1001 and 1002, benton for 1001.
    assert_eq!(outcome.long.height(), 3);
    let columns: Vec<String> = outcome
        .long
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(columns, ["participant", "visit", "date", "test", "score"]);
}
