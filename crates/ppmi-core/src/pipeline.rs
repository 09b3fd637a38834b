//! Behavioral derivation pipeline.
//!
//! Iterates the registry, derives each measure with containment at the
//! measure boundary, reconciles cross-measure rules, and assembles the
//! tidy outputs. The whole run is an explicit fold into one row vector;
//! there is no shared mutable accumulator and no persisted intermediate
//! state, so recomputation from unchanged raw files is byte-identical.

use std::collections::BTreeSet;
use std::path::Path;

use polars::prelude::DataFrame;
use tracing::{info, warn};

use ppmi_model::{MeasureDefinition, Result, ScoreRow};
use ppmi_registry::MeasureRegistry;

use crate::assemble::{TieBreak, pivot_wide, to_long_frame};
use crate::reconcile::{apply_adjustments, apply_page_splits};

/// Options for a behavioral pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub tie_break: TieBreak,
}

/// One derived measure's contribution to the run.
#[derive(Debug, Clone)]
pub struct MeasureSummary {
    pub name: String,
    pub rows: usize,
}

/// A measure omitted from the output, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedMeasure {
    pub name: String,
    pub reason: String,
}

/// Result of a behavioral pipeline run: the wide analysis table, the
/// long-format audit table, per-measure row counts, and the skip list.
#[derive(Debug)]
pub struct BehaviorOutcome {
    pub wide: DataFrame,
    pub long: DataFrame,
    pub derived: Vec<MeasureSummary>,
    pub skipped: Vec<SkippedMeasure>,
}

/// Derive behavioral measures from the exports in `dir`.
///
/// `measures` of `None` derives the full catalog. File- and schema-level
/// errors degrade to "measure omitted" warnings; configuration errors and
/// pivot collisions propagate.
pub fn derive_behavior(
    dir: &Path,
    registry: &MeasureRegistry,
    measures: Option<&[String]>,
    options: &PipelineOptions,
) -> Result<BehaviorOutcome> {
    let definitions: Vec<MeasureDefinition> = match measures {
        Some(requested) => registry.resolve_selection(requested)?,
        None => registry.behavioral().to_vec(),
    };
    // Measures the caller asked for by name survive reconciliation even
    // when an adjustment rule would otherwise swallow them.
    let requested: BTreeSet<String> = match measures {
        Some(requested) => requested.iter().cloned().collect(),
        None => registry.available_behavior().into_iter().collect(),
    };

    let mut rows: Vec<ScoreRow> = Vec::new();
    let mut skipped = Vec::new();
    for definition in &definitions {
        match crate::derive::derive_measure(dir, definition) {
            Ok(derived) => {
                info!(
                    measure = definition.name.as_str(),
                    rows = derived.len(),
                    "derived measure"
                );
                rows.extend(derived);
            }
            Err(error) if error.is_containable() => {
                warn!(
                    measure = definition.name.as_str(),
                    error = %error,
                    "measure omitted from output"
                );
                skipped.push(SkippedMeasure {
                    name: definition.name.clone(),
                    reason: error.to_string(),
                });
            }
            Err(error) => return Err(error),
        }
    }

    apply_page_splits(&mut rows, registry.page_splits());
    let rows = apply_adjustments(rows, registry.adjustments(), &requested);

    let mut derived: Vec<MeasureSummary> = Vec::new();
    {
        let mut names: Vec<&str> = rows.iter().map(|row| row.test.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        for name in names {
            derived.push(MeasureSummary {
                name: name.to_string(),
                rows: rows.iter().filter(|row| row.test == name).count(),
            });
        }
    }

    let long = to_long_frame(&rows)?;
    let wide = pivot_wide(&rows, options.tie_break)?;
    Ok(BehaviorOutcome {
        wide,
        long,
        derived,
        skipped,
    })
}
