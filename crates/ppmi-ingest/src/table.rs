//! Raw table reader: one named delimited export into a typed frame.
//!
//! Columns are addressed by name, never position. Headers and cells are
//! normalized (BOM and surrounding whitespace stripped) because hand-rolled
//! registry exports are inconsistent about both.

use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::debug;

use ppmi_model::{DeriveError, Result};

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Load the named source file, keeping exactly the `required` columns.
///
/// Every kept column is a string column; values are typed downstream by the
/// extraction helpers. Fails with [`DeriveError::SourceNotFound`] if the
/// file is absent and [`DeriveError::SchemaMismatch`] naming the first
/// missing required column.
pub fn read_source_table(dir: &Path, file: &str, required: &[&str]) -> Result<DataFrame> {
    let path = dir.join(file);
    if !path.is_file() {
        return Err(DeriveError::SourceNotFound {
            file: file.to_string(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&path)
        .map_err(|error| DeriveError::Read {
            file: file.to_string(),
            detail: error.to_string(),
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|error| DeriveError::Read {
            file: file.to_string(),
            detail: error.to_string(),
        })?
        .iter()
        .map(normalize_header)
        .collect();

    let mut indices = Vec::with_capacity(required.len());
    for column in required {
        let index = headers.iter().position(|header| header == column).ok_or_else(|| {
            DeriveError::SchemaMismatch {
                file: file.to_string(),
                column: (*column).to_string(),
            }
        })?;
        indices.push(index);
    }

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); required.len()];
    for record in reader.records() {
        let record = record.map_err(|error| DeriveError::Read {
            file: file.to_string(),
            detail: error.to_string(),
        })?;
        for (slot, index) in indices.iter().enumerate() {
            let value = record.get(*index).unwrap_or("");
            columns[slot].push(normalize_cell(value));
        }
    }

    let series: Vec<_> = required
        .iter()
        .zip(columns)
        .map(|(name, values)| Series::new((*name).into(), values).into())
        .collect();
    let frame = DataFrame::new(series).map_err(|error| DeriveError::Table(error.to_string()))?;
    debug!(file, rows = frame.height(), "read source table");
    Ok(frame)
}

/// Read only the header row of a source file.
pub fn read_source_headers(dir: &Path, file: &str) -> Result<Vec<String>> {
    let path = dir.join(file);
    if !path.is_file() {
        return Err(DeriveError::SourceNotFound {
            file: file.to_string(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .map_err(|error| DeriveError::Read {
            file: file.to_string(),
            detail: error.to_string(),
        })?;
    let headers = reader
        .headers()
        .map_err(|error| DeriveError::Read {
            file: file.to_string(),
            detail: error.to_string(),
        })?
        .iter()
        .map(normalize_header)
        .collect();
    Ok(headers)
}

pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Extract a column as strings; nulls become `None`.
pub fn string_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = frame
        .column(name)
        .and_then(|column| column.str())
        .map_err(|error| DeriveError::Table(error.to_string()))?;
    Ok(column
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Extract a column as numeric values; nulls and unparseable cells become
/// NaN (missing), matching the reducers' missing-value convention.
pub fn numeric_column(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = frame
        .column(name)
        .and_then(|column| column.str())
        .map_err(|error| DeriveError::Table(error.to_string()))?;
    Ok(column
        .into_iter()
        .map(|value| value.and_then(parse_f64).unwrap_or(f64::NAN))
        .collect())
}

/// Extract a column as integers; nulls and unparseable cells become `None`.
pub fn integer_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = frame
        .column(name)
        .and_then(|column| column.str())
        .map_err(|error| DeriveError::Table(error.to_string()))?;
    Ok(column.into_iter().map(|value| value.and_then(parse_i64)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_rejects_blanks() {
        assert_eq!(parse_f64(" 2.5 "), Some(2.5));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("n/a"), None);
        assert_eq!(parse_i64("42"), Some(42));
        assert_eq!(parse_i64("4.2"), None);
    }
}
