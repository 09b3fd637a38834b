//! Per-participant demographic derivation.
//!
//! Each `DemographicField` reads one source file and produces one column.
//! Fields are outer-merged on participant; a participant appearing in any
//! field's file gets a row. A field whose file is absent is skipped with a
//! warning, matching the behavioral containment policy.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::warn;

use ppmi_ingest::{integer_column, numeric_column, read_source_table, string_column};
use ppmi_model::{
    DemographicField, DemographicOp, DemographicValue, DeriveError, Result, columns,
};
use ppmi_registry::MeasureRegistry;

use crate::dates::parse_date;

/// Outcome of the demographics derivation: the wide frame plus the fields
/// skipped because their source file was missing.
#[derive(Debug)]
pub struct DemographicsOutcome {
    pub frame: DataFrame,
    pub skipped: Vec<(String, String)>,
}

/// Derive the requested demographic fields (all catalog fields when
/// `measures` is `None`).
pub fn derive_demographics(
    dir: &Path,
    registry: &MeasureRegistry,
    measures: Option<&[String]>,
) -> Result<DemographicsOutcome> {
    let fields: Vec<&DemographicField> = match measures {
        None => registry.demographics().iter().collect(),
        Some(requested) => {
            let known: BTreeSet<&str> = registry
                .demographics()
                .iter()
                .map(|field| field.name.as_str())
                .collect();
            for name in requested {
                if !known.contains(name.as_str()) {
                    return Err(DeriveError::UnknownMeasure { name: name.clone() });
                }
            }
            registry
                .demographics()
                .iter()
                .filter(|field| requested.iter().any(|name| *name == field.name))
                .collect()
        }
    };

    let mut participants: BTreeSet<i64> = BTreeSet::new();
    let mut derived: Vec<(&DemographicField, BTreeMap<i64, DemographicValue>)> = Vec::new();
    let mut skipped = Vec::new();
    for field in fields {
        match derive_field(dir, field) {
            Ok(values) => {
                participants.extend(values.keys().copied());
                derived.push((field, values));
            }
            Err(error) if error.is_containable() => {
                warn!(
                    field = field.name.as_str(),
                    error = %error,
                    "demographic field skipped"
                );
                skipped.push((field.name.clone(), error.to_string()));
            }
            Err(error) => return Err(error),
        }
    }

    let ids: Vec<i64> = participants.iter().copied().collect();
    let mut series = vec![Series::new(ppmi_model::long::PARTICIPANT.into(), ids.clone()).into()];
    for (field, values) in &derived {
        series.push(field_series(field, values, &ids));
    }
    let frame =
        DataFrame::new(series).map_err(|error| DeriveError::Table(error.to_string()))?;
    Ok(DemographicsOutcome { frame, skipped })
}

/// Derive one field: participant → value, first occurrence winning for
/// duplicated participants. The duplicates are real in the registry
/// exports; keeping the first row is the documented tie-break.
fn derive_field(dir: &Path, field: &DemographicField) -> Result<BTreeMap<i64, DemographicValue>> {
    let mut required: Vec<&str> = vec![columns::PARTICIPANT];
    required.extend(field.columns.iter().map(String::as_str));
    let frame = read_source_table(dir, &field.file, &required)?;
    let ids = integer_column(&frame, columns::PARTICIPANT)?;

    let mut text_columns: Vec<Vec<Option<String>>> = Vec::new();
    let mut numeric_columns: Vec<Vec<f64>> = Vec::new();
    match field.op {
        DemographicOp::Numeric
        | DemographicOp::MapCode { .. }
        | DemographicOp::CountPositive
        | DemographicOp::RaceLabel(_) => {
            for column in &field.columns {
                numeric_columns.push(numeric_column(&frame, column)?);
            }
        }
        _ => {
            for column in &field.columns {
                text_columns.push(string_column(&frame, column)?);
            }
        }
    }

    let mut values = BTreeMap::new();
    for (index, id) in ids.iter().enumerate() {
        let Some(id) = id else { continue };
        let text_row: Vec<Option<&str>> = text_columns
            .iter()
            .map(|column| column[index].as_deref())
            .collect();
        let numeric_row: Vec<f64> = numeric_columns.iter().map(|column| column[index]).collect();
        let value = evaluate(&field.op, &text_row, &numeric_row);
        values.entry(*id).or_insert(value);
    }
    Ok(values)
}

fn evaluate(op: &DemographicOp, text: &[Option<&str>], numeric: &[f64]) -> DemographicValue {
    match op {
        DemographicOp::First => match text.first().copied().flatten() {
            Some(value) => DemographicValue::Text(value.to_string()),
            None => DemographicValue::Missing,
        },
        DemographicOp::Numeric => match numeric.first() {
            Some(value) if !value.is_nan() => DemographicValue::Number(*value),
            _ => DemographicValue::Missing,
        },
        DemographicOp::Lowercase => match text.first().copied().flatten() {
            Some(value) => DemographicValue::Text(value.to_lowercase()),
            None => DemographicValue::Missing,
        },
        DemographicOp::MapText(map) => match text.first().copied().flatten() {
            Some(value) => {
                let mapped = map
                    .iter()
                    .find(|(from, _)| from == value)
                    .map_or(value, |(_, to)| to.as_str());
                DemographicValue::Text(mapped.to_string())
            }
            None => DemographicValue::Missing,
        },
        DemographicOp::MapCode { map, fallback } => {
            let code = numeric
                .first()
                .filter(|value| !value.is_nan() && value.fract() == 0.0)
                .map(|value| *value as i64);
            let label = code.and_then(|code| {
                map.iter()
                    .find(|(from, _)| *from == code)
                    .map(|(_, to)| to.clone())
            });
            match (label, fallback) {
                (Some(label), _) => DemographicValue::Text(label),
                (None, Some(fallback)) => DemographicValue::Text(fallback.clone()),
                (None, None) => DemographicValue::Missing,
            }
        }
        DemographicOp::ParseDate => match text.first().copied().flatten().and_then(parse_date) {
            Some(date) => DemographicValue::Date(date),
            None => DemographicValue::Missing,
        },
        DemographicOp::YearsBetween => {
            let start = text.first().copied().flatten().and_then(parse_date);
            let end = text.get(1).copied().flatten().and_then(parse_date);
            match (start, end) {
                (Some(start), Some(end)) => {
                    let days = (end - start).num_days() as f64;
                    DemographicValue::Number(days / 365.25)
                }
                _ => DemographicValue::Missing,
            }
        }
        DemographicOp::CountPositive => {
            let count: f64 = numeric.iter().filter(|v| !v.is_nan() && **v > 0.0).count() as f64;
            DemographicValue::Flag(count > 0.0)
        }
        DemographicOp::RaceLabel(labels) => {
            let set: Vec<usize> = numeric
                .iter()
                .enumerate()
                .filter(|(_, value)| !value.is_nan() && **value != 0.0)
                .map(|(index, _)| index)
                .collect();
            match set.as_slice() {
                [] => DemographicValue::Missing,
                [single] => match labels.get(*single) {
                    Some(label) => DemographicValue::Text(label.clone()),
                    None => DemographicValue::Missing,
                },
                _ => DemographicValue::Text("multi".to_string()),
            }
        }
    }
}

fn field_series(
    field: &DemographicField,
    values: &BTreeMap<i64, DemographicValue>,
    ids: &[i64],
) -> polars::prelude::Column {
    match field.op {
        DemographicOp::Numeric | DemographicOp::YearsBetween => {
            let column: Vec<Option<f64>> = ids
                .iter()
                .map(|id| match values.get(id) {
                    Some(DemographicValue::Number(value)) => Some(*value),
                    _ => None,
                })
                .collect();
            Series::new(field.name.as_str().into(), column).into()
        }
        _ => {
            let column: Vec<Option<String>> = ids
                .iter()
                .map(|id| {
                    values.get(id).and_then(|value| match value {
                        DemographicValue::Missing => None,
                        other => Some(other.to_cell()),
                    })
                })
                .collect();
            Series::new(field.name.as_str().into(), column).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_map_falls_back_for_unmapped_codes() {
        let op = DemographicOp::MapCode {
            map: vec![(0, "f".to_string()), (2, "m".to_string())],
            fallback: Some("ns".to_string()),
        };
        assert_eq!(
            evaluate(&op, &[], &[2.0]),
            DemographicValue::Text("m".to_string())
        );
        assert_eq!(
            evaluate(&op, &[], &[7.0]),
            DemographicValue::Text("ns".to_string())
        );
        assert_eq!(
            evaluate(&op, &[], &[f64::NAN]),
            DemographicValue::Text("ns".to_string())
        );
    }

    #[test]
    fn race_label_distinguishes_single_and_multiple() {
        let labels: Vec<String> = ["white", "black"].iter().map(|s| s.to_string()).collect();
        let op = DemographicOp::RaceLabel(labels);
        assert_eq!(
            evaluate(&op, &[], &[1.0, 0.0]),
            DemographicValue::Text("white".to_string())
        );
        assert_eq!(
            evaluate(&op, &[], &[1.0, 1.0]),
            DemographicValue::Text("multi".to_string())
        );
        assert_eq!(evaluate(&op, &[], &[0.0, 0.0]), DemographicValue::Missing);
    }

    #[test]
    fn years_between_is_fractional() {
        let op = DemographicOp::YearsBetween;
        let value = evaluate(&op, &[Some("01/1950"), Some("01/2010")], &[]);
        match value {
            DemographicValue::Number(years) => assert!((years - 60.0).abs() < 0.1),
            other => panic!("expected a number, got {other:?}"),
        }
    }

    #[test]
    fn count_positive_ignores_missing_flags() {
        let op = DemographicOp::CountPositive;
        assert_eq!(
            evaluate(&op, &[], &[0.0, f64::NAN, 1.0]),
            DemographicValue::Flag(true)
        );
        assert_eq!(
            evaluate(&op, &[], &[0.0, f64::NAN]),
            DemographicValue::Flag(false)
        );
    }
}
