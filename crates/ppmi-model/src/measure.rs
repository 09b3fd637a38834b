//! Measure definitions and cross-measure rules.
//!
//! A `MeasureDefinition` declares everything needed to derive one named
//! score from raw questionnaire exports: which files, which item columns
//! grouped into sub-scales, the per-group transform and reducer, and the
//! reducer that folds sub-scale scores into the final value. Definitions
//! are static configuration, validated once at registry load and read-only
//! afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{DeriveError, Result};
use crate::ops::{ItemTransform, Reducer};

/// Raw identifying column names shared by the study's tabular exports.
pub mod columns {
    pub const PARTICIPANT: &str = "PATNO";
    pub const VISIT: &str = "EVENT_ID";
    pub const INFO_DATE: &str = "INFODT";
    pub const PAGE: &str = "PAG_NAME";
}

/// One identifying column carried through a measure's derivation unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyColumn {
    Participant,
    Visit,
    Date,
    /// Form/page name. Distinguishes repeated administrations of the same
    /// instrument within a visit (e.g. a post-treatment motor exam).
    Page,
}

impl KeyColumn {
    /// The raw column name in source files.
    pub fn source_name(self) -> &'static str {
        match self {
            KeyColumn::Participant => columns::PARTICIPANT,
            KeyColumn::Visit => columns::VISIT,
            KeyColumn::Date => columns::INFO_DATE,
            KeyColumn::Page => columns::PAGE,
        }
    }
}

/// Default key for single-instrument measures: participant, visit,
/// collection date, and the form page name.
pub fn standard_key() -> Vec<KeyColumn> {
    vec![
        KeyColumn::Participant,
        KeyColumn::Visit,
        KeyColumn::Date,
        KeyColumn::Page,
    ]
}

/// Narrow key for measures merging several instruments, whose page names
/// differ per file and cannot participate in the join.
pub fn merge_key() -> Vec<KeyColumn> {
    vec![KeyColumn::Participant, KeyColumn::Visit, KeyColumn::Date]
}

/// One sub-scale: an ordered group of raw item columns, the element-wise
/// transform applied to each value, and the row-wise reducer that collapses
/// the group to a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubScale {
    pub items: Vec<String>,
    pub transform: ItemTransform,
    pub reducer: Reducer,
}

/// The sub-scale groups drawn from one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub file: String,
    pub groups: Vec<SubScale>,
}

/// A fully validated, derivable measure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureDefinition {
    pub name: String,
    pub sources: Vec<SourceSpec>,
    /// Reducer folding the sub-scale columns into the final score.
    pub combine: Reducer,
    pub key: Vec<KeyColumn>,
}

impl MeasureDefinition {
    pub fn builder(name: impl Into<String>) -> MeasureBuilder {
        MeasureBuilder {
            name: name.into(),
            sources: Vec::new(),
            transforms: None,
            reducers: None,
            combine: Reducer::Sum,
            key: standard_key(),
        }
    }

    /// Total number of sub-scale groups across all source files.
    pub fn group_count(&self) -> usize {
        self.sources.iter().map(|source| source.groups.len()).sum()
    }

    /// Source file identifiers, in declaration order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|source| source.file.as_str())
    }
}

/// Builder enforcing the transform/reducer count invariant.
///
/// Transforms and reducers index the ordered sequence of sub-scale groups
/// across all source files; when omitted the defaults (`Identity`, `Sum`)
/// repeat for every group.
#[derive(Debug, Clone)]
pub struct MeasureBuilder {
    name: String,
    sources: Vec<(String, Vec<Vec<String>>)>,
    transforms: Option<Vec<ItemTransform>>,
    reducers: Option<Vec<Reducer>>,
    combine: Reducer,
    key: Vec<KeyColumn>,
}

impl MeasureBuilder {
    /// Add a source file with its sub-scale item groups.
    pub fn source(mut self, file: &str, groups: &[&[&str]]) -> Self {
        let groups = groups
            .iter()
            .map(|items| items.iter().map(|item| (*item).to_string()).collect())
            .collect();
        self.sources.push((file.to_string(), groups));
        self
    }

    /// Per-group item transforms, one per sub-scale group in order.
    pub fn transforms(mut self, transforms: &[ItemTransform]) -> Self {
        self.transforms = Some(transforms.to_vec());
        self
    }

    /// Per-group reducers, one per sub-scale group in order.
    pub fn reducers(mut self, reducers: &[Reducer]) -> Self {
        self.reducers = Some(reducers.to_vec());
        self
    }

    /// Reducer folding sub-scale columns into the final score.
    pub fn combine(mut self, combine: Reducer) -> Self {
        self.combine = combine;
        self
    }

    /// Use the narrow (participant, visit, date) key for multi-instrument
    /// merges.
    pub fn merge_key(mut self) -> Self {
        self.key = merge_key();
        self
    }

    pub fn build(self) -> Result<MeasureDefinition> {
        let group_count: usize = self.sources.iter().map(|(_, groups)| groups.len()).sum();
        if group_count == 0 {
            return Err(DeriveError::ReducerConfiguration {
                measure: self.name,
                detail: "no sub-scale item groups declared".to_string(),
            });
        }
        if self
            .sources
            .iter()
            .any(|(_, groups)| groups.iter().any(Vec::is_empty))
        {
            return Err(DeriveError::ReducerConfiguration {
                measure: self.name,
                detail: "empty sub-scale item group".to_string(),
            });
        }
        let transforms = match self.transforms {
            Some(transforms) if transforms.len() != group_count => {
                return Err(DeriveError::ReducerConfiguration {
                    measure: self.name,
                    detail: format!(
                        "{} item transforms declared for {group_count} sub-scale groups",
                        transforms.len()
                    ),
                });
            }
            Some(transforms) => transforms,
            None => vec![ItemTransform::Identity; group_count],
        };
        let reducers = match self.reducers {
            Some(reducers) if reducers.len() != group_count => {
                return Err(DeriveError::ReducerConfiguration {
                    measure: self.name,
                    detail: format!(
                        "{} sub-scale reducers declared for {group_count} sub-scale groups",
                        reducers.len()
                    ),
                });
            }
            Some(reducers) => reducers,
            None => vec![Reducer::Sum; group_count],
        };

        let mut ops = transforms.into_iter().zip(reducers);
        let sources = self
            .sources
            .into_iter()
            .map(|(file, groups)| SourceSpec {
                file,
                groups: groups
                    .into_iter()
                    .map(|items| {
                        let (transform, reducer) =
                            ops.next().unwrap_or((ItemTransform::Identity, Reducer::Sum));
                        SubScale {
                            items,
                            transform,
                            reducer,
                        }
                    })
                    .collect(),
            })
            .collect();

        Ok(MeasureDefinition {
            name: self.name,
            sources,
            combine: self.combine,
            key: self.key,
        })
    }
}

/// Conditional adjustment replacing an unadjusted precursor measure.
///
/// "Derive `name` from `base`: for rows whose `dependency` value is at or
/// below `cutoff` and whose base score is below `ceiling`, add `bonus`;
/// otherwise pass the base score through." The precursor and dependency
/// measures are removed from the final output unless requested
/// independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentRule {
    pub name: String,
    pub base: String,
    pub dependency: String,
    pub cutoff: f64,
    pub ceiling: f64,
    pub bonus: f64,
}

impl AdjustmentRule {
    /// Resolve one row. A missing dependency value never blocks the row;
    /// it simply earns no bonus.
    pub fn adjusted_score(&self, base: f64, dependency: Option<f64>) -> f64 {
        if base.is_nan() || base >= self.ceiling {
            return base;
        }
        match dependency {
            Some(value) if !value.is_nan() && value <= self.cutoff => base + self.bonus,
            _ => base,
        }
    }
}

/// Rename rule keyed on the page-name column, splitting repeated
/// administrations of an instrument into their own measure before pivoting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSplitRule {
    pub measure: String,
    pub page: String,
    pub renamed: String,
}
