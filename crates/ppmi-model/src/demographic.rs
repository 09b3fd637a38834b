//! Demographic field definitions.
//!
//! Demographics are per-participant attributes (no visit key): enrollment
//! category, birth date, handedness and so on. Each field names a source
//! file, the columns it reads, and a closed operation describing how the
//! raw values become the derived attribute.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One derived per-participant attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemographicField {
    pub name: String,
    pub file: String,
    pub columns: Vec<String>,
    pub op: DemographicOp,
}

impl DemographicField {
    pub fn new(name: &str, file: &str, columns: &[&str], op: DemographicOp) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            columns: columns.iter().map(|column| (*column).to_string()).collect(),
            op,
        }
    }
}

/// Operation deriving a demographic value from the raw columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DemographicOp {
    /// Keep the single column value as text.
    First,
    /// Keep the single column value as a number.
    Numeric,
    /// Lowercased text.
    Lowercase,
    /// Text recode; unmapped values pass through unchanged.
    MapText(Vec<(String, String)>),
    /// Numeric code → label. Unmapped or missing codes take the fallback
    /// label when one is declared, otherwise stay missing.
    MapCode {
        map: Vec<(i64, String)>,
        fallback: Option<String>,
    },
    /// Calendar date attribute.
    ParseDate,
    /// Fractional years between two date columns (start, end).
    YearsBetween,
    /// True when any of the flag columns is positive.
    CountPositive,
    /// Flag columns → category label. Labels align with `columns`; exactly
    /// one set flag yields its label, several yield "multi", none yields
    /// "ns".
    RaceLabel(Vec<String>),
}

/// A derived demographic value.
#[derive(Debug, Clone, PartialEq)]
pub enum DemographicValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Flag(bool),
    Missing,
}

impl DemographicValue {
    /// Render for tabular output; `Missing` renders empty.
    pub fn to_cell(&self) -> String {
        match self {
            DemographicValue::Text(value) => value.clone(),
            DemographicValue::Number(value) => {
                if value.fract() == 0.0 && value.is_finite() {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            DemographicValue::Date(value) => value.format("%Y-%m-%d").to_string(),
            DemographicValue::Flag(value) => if *value { "true" } else { "false" }.to_string(),
            DemographicValue::Missing => String::new(),
        }
    }
}
