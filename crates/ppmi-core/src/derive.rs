//! Per-measure score derivation.
//!
//! For one `MeasureDefinition`: load each source file, transform and reduce
//! every sub-scale item group to a single column, inner-join the group
//! columns across files on the measure's identifying key, and fold them
//! into the final score with the measure's combine reducer.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use ppmi_ingest::{integer_column, numeric_column, read_source_table, string_column};
use ppmi_model::{KeyColumn, MeasureDefinition, Reducer, Result, ScoreRow, SubScale, Visit};

use crate::dates::parse_info_date;

/// Identifying key of one source row. Ordering gives derivation a
/// deterministic row order independent of source-file order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct RowKey {
    pub participant: i64,
    pub visit: Visit,
    pub date: Option<NaiveDate>,
    pub page: Option<String>,
}

/// Derive every score row for one measure from the raw exports in `dir`.
///
/// Rows whose participant id or visit code does not parse are dropped; a
/// (participant, visit) row missing from any required source file is
/// silently excluded by the inner join, reflecting that not every subject
/// completed every sub-instrument at every visit.
pub fn derive_measure(dir: &Path, measure: &MeasureDefinition) -> Result<Vec<ScoreRow>> {
    let mut joined: Option<BTreeMap<RowKey, Vec<f64>>> = None;
    for source in &measure.sources {
        let columns = source_columns(measure, source.groups.as_slice());
        let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
        let frame = read_source_table(dir, &source.file, &column_refs)?;
        let keys = extract_keys(&frame, &measure.key, &source.file)?;

        let mut group_values: Vec<Vec<f64>> = Vec::with_capacity(source.groups.len());
        for group in &source.groups {
            group_values.push(reduce_group(&frame, group)?);
        }

        let mut table: BTreeMap<RowKey, Vec<f64>> = BTreeMap::new();
        for (index, key) in keys.into_iter().enumerate() {
            let Some(key) = key else { continue };
            let values: Vec<f64> = group_values.iter().map(|column| column[index]).collect();
            // First occurrence wins for duplicate keys within one file.
            table.entry(key).or_insert(values);
        }

        joined = Some(match joined {
            None => table,
            Some(existing) => inner_join(existing, table),
        });
    }

    let joined = joined.unwrap_or_default();
    let mut rows = Vec::with_capacity(joined.len());
    for (key, values) in joined {
        let score = measure.combine.reduce(&values);
        // A product of a zero and an infinite sub-scale is wholly
        // indeterminate; drop the row rather than emit a null score.
        if score.is_nan() && measure.combine == Reducer::Product {
            debug!(
                measure = measure.name.as_str(),
                participant = key.participant,
                visit = key.visit.code(),
                "indeterminate product score dropped"
            );
            continue;
        }
        rows.push(ScoreRow {
            participant: key.participant,
            visit: key.visit,
            collection_date: key.date,
            page: key.page,
            test: measure.name.clone(),
            score,
        });
    }
    Ok(rows)
}

/// The required column list for one source file: key columns first, then
/// every item column of every group, de-duplicated in declaration order.
fn source_columns(measure: &MeasureDefinition, groups: &[SubScale]) -> Vec<String> {
    let mut columns: Vec<String> = measure
        .key
        .iter()
        .map(|key| key.source_name().to_string())
        .collect();
    for group in groups {
        for item in &group.items {
            if !columns.iter().any(|existing| existing == item) {
                columns.push(item.clone());
            }
        }
    }
    columns
}

fn extract_keys(
    frame: &polars::prelude::DataFrame,
    key: &[KeyColumn],
    file: &str,
) -> Result<Vec<Option<RowKey>>> {
    let participants = integer_column(frame, KeyColumn::Participant.source_name())?;
    let visits = string_column(frame, KeyColumn::Visit.source_name())?;
    let dates = if key.contains(&KeyColumn::Date) {
        Some(string_column(frame, KeyColumn::Date.source_name())?)
    } else {
        None
    };
    let pages = if key.contains(&KeyColumn::Page) {
        Some(string_column(frame, KeyColumn::Page.source_name())?)
    } else {
        None
    };

    let mut keys = Vec::with_capacity(participants.len());
    let mut dropped = 0usize;
    for index in 0..participants.len() {
        let participant = participants[index];
        let visit = visits[index].as_deref().and_then(Visit::from_code);
        let (Some(participant), Some(visit)) = (participant, visit) else {
            dropped += 1;
            keys.push(None);
            continue;
        };
        let date = dates
            .as_ref()
            .and_then(|column| column[index].as_deref())
            .and_then(parse_info_date);
        let page = pages.as_ref().and_then(|column| column[index].clone());
        keys.push(Some(RowKey {
            participant,
            visit,
            date,
            page,
        }));
    }
    if dropped > 0 {
        debug!(file, dropped, "rows without a valid participant/visit key");
    }
    Ok(keys)
}

/// Transform and reduce one sub-scale group to a single column.
fn reduce_group(frame: &polars::prelude::DataFrame, group: &SubScale) -> Result<Vec<f64>> {
    let mut items: Vec<Vec<f64>> = Vec::with_capacity(group.items.len());
    for item in &group.items {
        let mut column = numeric_column(frame, item)?;
        for value in &mut column {
            *value = group.transform.apply(*value);
        }
        items.push(column);
    }
    let height = items.first().map_or(0, Vec::len);
    let mut reduced = Vec::with_capacity(height);
    let mut row = Vec::with_capacity(items.len());
    for index in 0..height {
        row.clear();
        row.extend(items.iter().map(|column| column[index]));
        reduced.push(group.reducer.reduce(&row));
    }
    Ok(reduced)
}

fn inner_join(
    left: BTreeMap<RowKey, Vec<f64>>,
    right: BTreeMap<RowKey, Vec<f64>>,
) -> BTreeMap<RowKey, Vec<f64>> {
    let mut joined = BTreeMap::new();
    for (key, mut values) in left {
        if let Some(more) = right.get(&key) {
            values.extend_from_slice(more);
            joined.insert(key, values);
        }
    }
    joined
}
