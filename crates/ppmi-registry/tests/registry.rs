//! Catalog validation tests.

use ppmi_model::{AdjustmentRule, ItemTransform, MeasureDefinition, Reducer};
use ppmi_registry::MeasureRegistry;

#[test]
fn standard_catalog_validates() {
    let registry = MeasureRegistry::standard().unwrap();
    assert_eq!(registry.behavioral().len(), 25);
    assert_eq!(registry.adjustments().len(), 1);
    assert_eq!(registry.page_splits().len(), 1);
    assert_eq!(registry.demographics().len(), 12);
}

#[test]
fn adjusted_and_split_measures_are_offered_but_precursors_are_not() {
    let registry = MeasureRegistry::standard().unwrap();
    let available = registry.available_behavior();
    assert!(available.contains(&"moca".to_string()));
    assert!(available.contains(&"updrs_iii_a".to_string()));
    assert!(!available.contains(&"moca_unadj".to_string()));
    assert!(!available.contains(&"education".to_string()));
}

#[test]
fn available_behavior_snapshot() {
    let registry = MeasureRegistry::standard().unwrap();
    insta::assert_json_snapshot!(registry.available_behavior(), @r###"
    [
      "benton",
      "epworth",
      "gds",
      "hvlt_recall",
      "hvlt_recognition",
      "hvlt_retention",
      "lns",
      "moca",
      "pigd",
      "quip",
      "rbd",
      "scopa_aut",
      "se_adl",
      "semantic_fluency",
      "stai_state",
      "stai_trait",
      "symbol_digit",
      "systolic_bp_drop",
      "tremor",
      "updrs_i",
      "updrs_ii",
      "updrs_iii",
      "updrs_iii_a",
      "updrs_iv",
      "upsit"
    ]
    "###);
}

#[test]
fn selection_expands_adjustment_prerequisites() {
    let registry = MeasureRegistry::standard().unwrap();
    let measures = registry.resolve_selection(&["moca".to_string()]).unwrap();
    let names: Vec<&str> = measures.iter().map(|m| m.name.as_str()).collect();
    assert!(names.contains(&"moca_unadj"));
    assert!(names.contains(&"education"));
}

#[test]
fn selection_rejects_unknown_measures() {
    let registry = MeasureRegistry::standard().unwrap();
    let err = registry
        .resolve_selection(&["sleep_quality".to_string()])
        .unwrap_err();
    assert!(matches!(err, ppmi_model::DeriveError::UnknownMeasure { .. }));
}

#[test]
fn retention_measure_uses_reciprocal_min_product() {
    let registry = MeasureRegistry::standard().unwrap();
    let retention = registry.measure("hvlt_retention").unwrap();
    assert_eq!(retention.combine, Reducer::Product);
    let groups = &retention.sources[0].groups;
    assert_eq!(groups[1].transform, ItemTransform::Reciprocal);
    assert_eq!(groups[1].reducer, Reducer::Min);
}

#[test]
fn rule_referencing_missing_measure_fails_at_load() {
    let behavioral = vec![
        MeasureDefinition::builder("epworth")
            .source("Epworth_Sleepiness_Scale.csv", &[&["ESS1"]])
            .build()
            .unwrap(),
    ];
    let bad_rule = AdjustmentRule {
        name: "moca".to_string(),
        base: "moca_unadj".to_string(),
        dependency: "education".to_string(),
        cutoff: 12.0,
        ceiling: 30.0,
        bonus: 1.0,
    };
    let err = MeasureRegistry::from_parts(behavioral, vec![bad_rule], Vec::new(), Vec::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ppmi_model::DeriveError::ReducerConfiguration { .. }
    ));
}
