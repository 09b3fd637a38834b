//! The validated measure registry.
//!
//! Immutable configuration object constructed once at startup and passed
//! explicitly into the derivation engine. Construction validates every
//! entry (operator counts, rule references, name uniqueness) so that a bad
//! catalog fails the whole run immediately instead of surfacing per-row.

use std::collections::BTreeSet;

use ppmi_model::{
    AdjustmentRule, DemographicField, DeriveError, MeasureDefinition, PageSplitRule, Result,
};

use crate::behavioral::behavioral_measures;
use crate::demographics::demographic_fields;

#[derive(Debug, Clone)]
pub struct MeasureRegistry {
    behavioral: Vec<MeasureDefinition>,
    adjustments: Vec<AdjustmentRule>,
    page_splits: Vec<PageSplitRule>,
    demographics: Vec<DemographicField>,
}

impl MeasureRegistry {
    /// The standard study catalog.
    pub fn standard() -> Result<Self> {
        let registry = Self {
            behavioral: behavioral_measures()?,
            adjustments: vec![AdjustmentRule {
                name: "moca".to_string(),
                base: "moca_unadj".to_string(),
                dependency: "education".to_string(),
                cutoff: 12.0,
                ceiling: 30.0,
                bonus: 1.0,
            }],
            page_splits: vec![PageSplitRule {
                measure: "updrs_iii".to_string(),
                page: "NUPDRS3A".to_string(),
                renamed: "updrs_iii_a".to_string(),
            }],
            demographics: demographic_fields(),
        };
        registry.validate()?;
        Ok(registry)
    }

    /// Build a registry from explicit parts, validating it the same way as
    /// the standard catalog. Used by tests and by callers with custom
    /// instrument panels.
    pub fn from_parts(
        behavioral: Vec<MeasureDefinition>,
        adjustments: Vec<AdjustmentRule>,
        page_splits: Vec<PageSplitRule>,
        demographics: Vec<DemographicField>,
    ) -> Result<Self> {
        let registry = Self {
            behavioral,
            adjustments,
            page_splits,
            demographics,
        };
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for measure in &self.behavioral {
            if !names.insert(measure.name.as_str()) {
                return Err(DeriveError::ReducerConfiguration {
                    measure: measure.name.clone(),
                    detail: "duplicate measure name".to_string(),
                });
            }
        }
        for rule in &self.adjustments {
            if names.contains(rule.name.as_str()) {
                return Err(DeriveError::ReducerConfiguration {
                    measure: rule.name.clone(),
                    detail: "adjustment output collides with a measure name".to_string(),
                });
            }
            for referenced in [rule.base.as_str(), rule.dependency.as_str()] {
                if !names.contains(referenced) {
                    return Err(DeriveError::ReducerConfiguration {
                        measure: rule.name.clone(),
                        detail: format!("adjustment references unknown measure {referenced}"),
                    });
                }
            }
        }
        for split in &self.page_splits {
            if !names.contains(split.measure.as_str()) {
                return Err(DeriveError::ReducerConfiguration {
                    measure: split.renamed.clone(),
                    detail: format!("page split references unknown measure {}", split.measure),
                });
            }
        }
        Ok(())
    }

    pub fn behavioral(&self) -> &[MeasureDefinition] {
        &self.behavioral
    }

    pub fn adjustments(&self) -> &[AdjustmentRule] {
        &self.adjustments
    }

    pub fn page_splits(&self) -> &[PageSplitRule] {
        &self.page_splits
    }

    pub fn demographics(&self) -> &[DemographicField] {
        &self.demographics
    }

    pub fn measure(&self, name: &str) -> Option<&MeasureDefinition> {
        self.behavioral.iter().find(|measure| measure.name == name)
    }

    /// Measure names offered to callers: catalog entries that are not
    /// swallowed by an adjustment rule, plus the adjusted outputs and
    /// page-split variants, sorted.
    pub fn available_behavior(&self) -> Vec<String> {
        let mut hidden = BTreeSet::new();
        for rule in &self.adjustments {
            hidden.insert(rule.base.as_str());
            hidden.insert(rule.dependency.as_str());
        }
        let mut names: BTreeSet<String> = self
            .behavioral
            .iter()
            .filter(|measure| !hidden.contains(measure.name.as_str()))
            .map(|measure| measure.name.clone())
            .collect();
        names.extend(self.adjustments.iter().map(|rule| rule.name.clone()));
        names.extend(self.page_splits.iter().map(|split| split.renamed.clone()));
        names.into_iter().collect()
    }

    /// Demographic field names in catalog order.
    pub fn available_demographics(&self) -> Vec<String> {
        self.demographics
            .iter()
            .map(|field| field.name.clone())
            .collect()
    }

    /// Expand a requested behavioral selection into the catalog measures to
    /// derive: an adjusted measure pulls in its base and dependency; a
    /// page-split variant pulls in its parent. Unknown names fail.
    pub fn resolve_selection(&self, requested: &[String]) -> Result<Vec<MeasureDefinition>> {
        let mut names: BTreeSet<&str> = BTreeSet::new();
        for name in requested {
            if let Some(measure) = self.measure(name) {
                names.insert(measure.name.as_str());
                continue;
            }
            if let Some(rule) = self.adjustments.iter().find(|rule| rule.name == *name) {
                names.insert(rule.base.as_str());
                names.insert(rule.dependency.as_str());
                continue;
            }
            if let Some(split) = self.page_splits.iter().find(|split| split.renamed == *name) {
                names.insert(split.measure.as_str());
                continue;
            }
            return Err(DeriveError::UnknownMeasure { name: name.clone() });
        }
        Ok(self
            .behavioral
            .iter()
            .filter(|measure| names.contains(measure.name.as_str()))
            .cloned()
            .collect())
    }
}
