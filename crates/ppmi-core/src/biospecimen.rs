//! Biospecimen assay loading.
//!
//! The assay export is already long-format (participant, clinical event,
//! test name, test value). Values are coerced to numeric, test names are
//! sanitized, repeated assays per (participant, visit, test) collapse to a
//! nan-tolerant mean, and the result pivots through the tidy assembler.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use polars::prelude::DataFrame;

use ppmi_ingest::{integer_column, parse_f64, read_source_table, string_column};
use ppmi_model::{Reducer, Result, ScoreRow, Visit, columns};

use crate::assemble::{TieBreak, pivot_wide};
use crate::dates::VisitDates;

pub const ASSAY_FILE: &str = "Current_Biospecimen_Analysis_Results.csv";
/// Lumbar-puncture log, tried first when recovering collection dates.
pub const COLLECTION_FILE: &str = "Lumbar_Puncture_Sample_Collection.csv";

const VISIT_COL: &str = "CLINICAL_EVENT";
const TEST_COL: &str = "TESTNAME";
const VALUE_COL: &str = "TESTVALUE";

/// CSF analytes present for most participants. Many other assays exist but
/// are missing for large parts of the cohort, so they are opt-in.
pub fn default_panel() -> Vec<String> {
    ["abeta_1-42", "csf_alpha-synuclein", "ptau", "ttau"]
        .iter()
        .map(|name| (*name).to_string())
        .collect()
}

/// Assay names use inconsistent casing and embedded spaces in the export.
pub fn sanitize_test_name(raw: &str) -> String {
    raw.trim().replace(' ', "_").to_lowercase()
}

/// Distinct sanitized assay names available in the export.
pub fn available_biospecimen(dir: &Path) -> Result<Vec<String>> {
    let frame = read_source_table(dir, ASSAY_FILE, &[TEST_COL])?;
    let names: BTreeSet<String> = string_column(&frame, TEST_COL)?
        .into_iter()
        .flatten()
        .map(|name| sanitize_test_name(&name))
        .collect();
    Ok(names.into_iter().collect())
}

/// Load assay results into the wide tidy table. `measures` of `None`
/// selects the default CSF panel; names not present in the export simply
/// yield no rows.
pub fn load_biospecimen(dir: &Path, measures: Option<&[String]>) -> Result<DataFrame> {
    let panel: BTreeSet<String> = match measures {
        Some(requested) => requested.iter().map(|name| sanitize_test_name(name)).collect(),
        None => default_panel().into_iter().collect(),
    };

    let frame = read_source_table(
        dir,
        ASSAY_FILE,
        &[columns::PARTICIPANT, VISIT_COL, TEST_COL, VALUE_COL],
    )?;
    let participants = integer_column(&frame, columns::PARTICIPANT)?;
    let visits = string_column(&frame, VISIT_COL)?;
    let tests = string_column(&frame, TEST_COL)?;
    let values = string_column(&frame, VALUE_COL)?;

    // Collapse repeated assays per key with a nan-tolerant mean.
    let mut grouped: BTreeMap<(i64, Visit, String), Vec<f64>> = BTreeMap::new();
    for index in 0..participants.len() {
        let (Some(participant), Some(visit), Some(test)) = (
            participants[index],
            visits[index].as_deref().and_then(Visit::from_code),
            tests[index].as_deref().map(sanitize_test_name),
        ) else {
            continue;
        };
        if !panel.contains(&test) {
            continue;
        }
        let value = values[index]
            .as_deref()
            .and_then(parse_f64)
            .unwrap_or(f64::NAN);
        grouped.entry((participant, visit, test)).or_default().push(value);
    }

    let mut rows: Vec<ScoreRow> = grouped
        .into_iter()
        .map(|((participant, visit, test), assay_values)| ScoreRow {
            participant,
            visit,
            collection_date: None,
            page: None,
            test,
            score: Reducer::NanMean.reduce(&assay_values),
        })
        .collect();

    let dates = VisitDates::load(dir, &[COLLECTION_FILE])?;
    dates.annotate(&mut rows);

    pivot_wide(&rows, TieBreak::Mean)
}
