//! Tidy assembly: long score stream → wide analysis table.
//!
//! The pivot produces one column per measure, indexed by (participant,
//! visit, collection date), with rows sorted by participant and then by
//! visit rank in the declared schedule order. Duplicate cells are an
//! upstream contract violation; the declared tie-break decides whether
//! they surface as an error or collapse to an arithmetic mean.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use polars::prelude::{DataFrame, NamedFrom, Series};

use ppmi_model::{DeriveError, Reducer, Result, ScoreRow, Visit, long};

/// Policy for duplicate (participant, visit, date, test) cells at pivot
/// time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Surface a [`DeriveError::DuplicateKey`]; the derivation upstream
    /// should have kept the key unique.
    #[default]
    Error,
    /// Collapse duplicates with a nan-tolerant arithmetic mean. Used by
    /// the biospecimen path, where repeated assays per visit are routine.
    Mean,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct WideKey {
    participant: i64,
    visit: Visit,
    date: Option<NaiveDate>,
}

/// Build the long-format audit frame (participant, visit, date, test,
/// score), sorted by (participant, visit, test).
pub fn to_long_frame(rows: &[ScoreRow]) -> Result<DataFrame> {
    let mut sorted: Vec<&ScoreRow> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        (a.participant, a.visit, &a.test, a.collection_date).cmp(&(
            b.participant,
            b.visit,
            &b.test,
            b.collection_date,
        ))
    });

    let participants: Vec<i64> = sorted.iter().map(|row| row.participant).collect();
    let visits: Vec<&str> = sorted.iter().map(|row| row.visit.code()).collect();
    let dates: Vec<Option<String>> = sorted.iter().map(|row| format_date(row.collection_date)).collect();
    let tests: Vec<&str> = sorted.iter().map(|row| row.test.as_str()).collect();
    let scores: Vec<f64> = sorted.iter().map(|row| row.score).collect();

    DataFrame::new(vec![
        Series::new(long::PARTICIPANT.into(), participants).into(),
        Series::new(long::VISIT.into(), visits).into(),
        Series::new(long::DATE.into(), dates).into(),
        Series::new(long::TEST.into(), tests).into(),
        Series::new(long::SCORE.into(), scores).into(),
    ])
    .map_err(|error| DeriveError::Table(error.to_string()))
}

/// Pivot the long stream on `test` into the wide analysis table.
///
/// NaN scores become null cells; measure columns appear in sorted name
/// order after the three index columns.
pub fn pivot_wide(rows: &[ScoreRow], tie_break: TieBreak) -> Result<DataFrame> {
    let tests: BTreeSet<&str> = rows.iter().map(|row| row.test.as_str()).collect();

    let mut cells: BTreeMap<WideKey, BTreeMap<&str, Vec<f64>>> = BTreeMap::new();
    for row in rows {
        let key = WideKey {
            participant: row.participant,
            visit: row.visit,
            date: row.collection_date,
        };
        let entry = cells.entry(key).or_default();
        let values = entry.entry(row.test.as_str()).or_default();
        if !values.is_empty() && tie_break == TieBreak::Error {
            return Err(DeriveError::DuplicateKey {
                participant: row.participant,
                visit: row.visit.code().to_string(),
                test: row.test.clone(),
            });
        }
        values.push(row.score);
    }

    let mut participants = Vec::with_capacity(cells.len());
    let mut visits = Vec::with_capacity(cells.len());
    let mut dates = Vec::with_capacity(cells.len());
    let mut columns: BTreeMap<&str, Vec<Option<f64>>> = tests
        .iter()
        .map(|test| (*test, Vec::with_capacity(cells.len())))
        .collect();

    for (key, row_cells) in &cells {
        participants.push(key.participant);
        visits.push(key.visit.code());
        dates.push(format_date(key.date));
        for (test, column) in columns.iter_mut() {
            let value = row_cells.get(test).map(|values| match values.len() {
                1 => values[0],
                _ => Reducer::NanMean.reduce(values),
            });
            column.push(value.filter(|score| !score.is_nan()));
        }
    }

    let mut series = vec![
        Series::new(long::PARTICIPANT.into(), participants).into(),
        Series::new(long::VISIT.into(), visits).into(),
        Series::new(long::DATE.into(), dates).into(),
    ];
    for (test, column) in columns {
        series.push(Series::new(test.into(), column).into());
    }
    DataFrame::new(series).map_err(|error| DeriveError::Table(error.to_string()))
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|date| date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(participant: i64, visit: &str, test: &str, score: f64) -> ScoreRow {
        ScoreRow {
            participant,
            visit: Visit::from_code(visit).unwrap(),
            collection_date: None,
            page: None,
            test: test.to_string(),
            score,
        }
    }

    #[test]
    fn rows_sort_by_schedule_order_not_code_order() {
        let rows = vec![
            row(1001, "V02", "benton", 24.0),
            row(1001, "SC", "benton", 22.0),
            row(1001, "BL", "benton", 23.0),
        ];
        let wide = pivot_wide(&rows, TieBreak::Error).unwrap();
        let visits = wide.column(long::VISIT).unwrap().str().unwrap();
        let order: Vec<&str> = visits.into_iter().flatten().collect();
        assert_eq!(order, ["SC", "BL", "V02"]);
    }

    #[test]
    fn duplicate_cells_error_by_default() {
        let rows = vec![
            row(1001, "BL", "benton", 24.0),
            row(1001, "BL", "benton", 26.0),
        ];
        let err = pivot_wide(&rows, TieBreak::Error).unwrap_err();
        assert!(matches!(err, DeriveError::DuplicateKey { .. }));
    }

    #[test]
    fn mean_tie_break_averages_duplicates() {
        let rows = vec![
            row(1001, "BL", "ptau", 24.0),
            row(1001, "BL", "ptau", 26.0),
        ];
        let wide = pivot_wide(&rows, TieBreak::Mean).unwrap();
        let scores = wide.column("ptau").unwrap().f64().unwrap();
        assert_eq!(scores.get(0), Some(25.0));
    }

    #[test]
    fn nan_scores_become_null_cells() {
        let rows = vec![row(1001, "BL", "benton", f64::NAN)];
        let wide = pivot_wide(&rows, TieBreak::Error).unwrap();
        let scores = wide.column("benton").unwrap().f64().unwrap();
        assert_eq!(scores.get(0), None);
    }

    #[test]
    fn measure_columns_follow_index_columns_in_name_order() {
        let rows = vec![
            row(1001, "BL", "upsit", 30.0),
            row(1001, "BL", "benton", 24.0),
        ];
        let wide = pivot_wide(&rows, TieBreak::Error).unwrap();
        let names: Vec<String> = wide
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, ["participant", "visit", "date", "benton", "upsit"]);
    }

    #[test]
    fn long_frame_preserves_nan_for_audit() {
        let rows = vec![row(1001, "BL", "benton", f64::NAN)];
        let long_frame = to_long_frame(&rows).unwrap();
        let scores = long_frame.column(long::SCORE).unwrap().f64().unwrap();
        assert!(scores.get(0).unwrap().is_nan());
    }
}
