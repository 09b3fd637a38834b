use std::path::PathBuf;

use ppmi_core::pipeline::{MeasureSummary, SkippedMeasure};

/// Result of one derivation command, for the summary table.
#[derive(Debug)]
pub struct DeriveResult {
    pub table: String,
    pub output: PathBuf,
    pub long_output: Option<PathBuf>,
    pub rows: usize,
    pub columns: usize,
    pub derived: Vec<MeasureSummary>,
    pub skipped: Vec<SkippedMeasure>,
}
