//! Derived observation rows and the long-format column contract.

use chrono::NaiveDate;

use crate::visits::Visit;

/// Column names of the long-format (tidy) observation stream.
pub mod long {
    pub const PARTICIPANT: &str = "participant";
    pub const VISIT: &str = "visit";
    pub const DATE: &str = "date";
    pub const TEST: &str = "test";
    pub const SCORE: &str = "score";
}

/// One derived observation: a single test score for one participant at one
/// visit. Produced fresh on every pipeline run; there is no persisted
/// intermediate state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub participant: i64,
    pub visit: Visit,
    pub collection_date: Option<NaiveDate>,
    /// Form page name, kept only while page-split rules may still apply.
    pub page: Option<String>,
    pub test: String,
    pub score: f64,
}
