//! DaT-scan imaging-measure loading.
//!
//! The scan export is already wide: one row per (participant, visit) with
//! one column per striatal binding ratio. Loading keeps the identifying
//! keys, optionally restricts the measure columns, lowercases measure
//! names, and sorts by schedule order.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::{DataFrame, NamedFrom, Series};

use ppmi_ingest::{integer_column, numeric_column, read_source_headers, read_source_table, string_column};
use ppmi_model::{DeriveError, Result, Visit, columns, long};

use crate::dates::{VisitDates, parse_iso_date};

pub const SCAN_FILE: &str = "DATScan_Analysis.csv";

const SCAN_DATE_COL: &str = "SCAN_DATE";

/// Measure columns available in the scan export, lowercased and sorted.
pub fn available_datscan(dir: &Path) -> Result<Vec<String>> {
    let headers = read_source_headers(dir, SCAN_FILE)?;
    let mut measures: Vec<String> = headers
        .iter()
        .filter(|header| !is_key_column(header))
        .map(|header| header.to_lowercase())
        .collect();
    measures.sort();
    Ok(measures)
}

fn is_key_column(header: &str) -> bool {
    header == columns::PARTICIPANT || header == columns::VISIT || header == SCAN_DATE_COL
}

/// Load scan measures into a wide tidy frame.
///
/// `measures` of `None` keeps every measure column. A requested name that
/// is not in the export is an [`DeriveError::UnknownMeasure`], since a
/// typo here silently dropping a column would corrupt analyses downstream.
pub fn load_datscan(dir: &Path, measures: Option<&[String]>) -> Result<DataFrame> {
    let headers = read_source_headers(dir, SCAN_FILE)?;
    let has_scan_date = headers.iter().any(|header| header == SCAN_DATE_COL);

    let all_measures: Vec<&String> = headers
        .iter()
        .filter(|header| !is_key_column(header))
        .collect();
    let selected: Vec<&String> = match measures {
        None => all_measures,
        Some(requested) => {
            let known: BTreeSet<String> =
                all_measures.iter().map(|header| header.to_lowercase()).collect();
            for name in requested {
                if !known.contains(&name.to_lowercase()) {
                    return Err(DeriveError::UnknownMeasure { name: name.clone() });
                }
            }
            all_measures
                .into_iter()
                .filter(|header| {
                    requested
                        .iter()
                        .any(|name| name.eq_ignore_ascii_case(header))
                })
                .collect()
        }
    };

    let mut required: Vec<&str> = vec![columns::PARTICIPANT, columns::VISIT];
    if has_scan_date {
        required.push(SCAN_DATE_COL);
    }
    required.extend(selected.iter().map(|header| header.as_str()));
    let frame = read_source_table(dir, SCAN_FILE, &required)?;

    let participants = integer_column(&frame, columns::PARTICIPANT)?;
    let visits = string_column(&frame, columns::VISIT)?;
    let scan_dates = if has_scan_date {
        Some(string_column(&frame, SCAN_DATE_COL)?)
    } else {
        None
    };
    let measure_columns: Vec<Vec<f64>> = selected
        .iter()
        .map(|header| numeric_column(&frame, header))
        .collect::<Result<_>>()?;

    // Recover dates from the administrative forms when the export has none.
    let fallback_dates = if has_scan_date {
        VisitDates::default()
    } else {
        VisitDates::load(dir, &[])?
    };

    // Rows with an unknown visit code are dropped; sort follows schedule
    // order, then scan date.
    let mut order: Vec<(i64, Visit, Option<NaiveDate>, usize)> = Vec::new();
    for index in 0..participants.len() {
        let (Some(participant), Some(visit)) = (
            participants[index],
            visits[index].as_deref().and_then(Visit::from_code),
        ) else {
            continue;
        };
        let date = match &scan_dates {
            Some(column) => column[index].as_deref().and_then(parse_iso_date),
            None => fallback_dates.get(participant, visit),
        };
        order.push((participant, visit, date, index));
    }
    order.sort();

    let out_participants: Vec<i64> = order.iter().map(|(id, ..)| *id).collect();
    let out_visits: Vec<&str> = order.iter().map(|(_, visit, ..)| visit.code()).collect();
    let out_dates: Vec<Option<String>> = order
        .iter()
        .map(|(_, _, date, _)| date.map(|date| date.format("%Y-%m-%d").to_string()))
        .collect();

    let mut series = vec![
        Series::new(long::PARTICIPANT.into(), out_participants).into(),
        Series::new(long::VISIT.into(), out_visits).into(),
        Series::new(long::DATE.into(), out_dates).into(),
    ];
    for (header, column) in selected.iter().zip(&measure_columns) {
        let values: Vec<Option<f64>> = order
            .iter()
            .map(|(.., index)| {
                let value = column[*index];
                if value.is_nan() { None } else { Some(value) }
            })
            .collect();
        series.push(Series::new(header.to_lowercase().into(), values).into());
    }
    DataFrame::new(series).map_err(|error| DeriveError::Table(error.to_string()))
}
