//! Cross-measure reconciliation.
//!
//! Two rule families run after all measures are derived and before the
//! pivot: page-split renames (repeated administrations of an instrument
//! become their own measure) and conditional adjustments (an education
//! bonus applied to the cognitive screen). Both are declarative rule
//! objects from the registry; the engine never hard-codes a measure name.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use ppmi_model::{AdjustmentRule, PageSplitRule, ScoreRow};

/// Rename rows whose page name matches a split rule, so the pivot gives
/// the repeated administration its own column instead of colliding.
pub fn apply_page_splits(rows: &mut [ScoreRow], splits: &[PageSplitRule]) {
    for split in splits {
        let mut renamed = 0usize;
        for row in rows.iter_mut() {
            if row.test == split.measure && row.page.as_deref() == Some(split.page.as_str()) {
                row.test = split.renamed.clone();
                renamed += 1;
            }
        }
        if renamed > 0 {
            debug!(
                measure = split.measure.as_str(),
                renamed = renamed,
                into = split.renamed.as_str(),
                "page-split rename"
            );
        }
    }
}

/// Apply adjustment rules to the long stream.
///
/// For each rule whose base measure is present: every base row is replaced
/// by an adjusted row under the rule's output name, joined with the
/// dependency measure on (participant, visit). The base and dependency
/// rows are then removed unless their measure was requested independently.
/// A rule whose base measure is absent (its file was missing) is silently
/// inert.
pub fn apply_adjustments(
    rows: Vec<ScoreRow>,
    rules: &[AdjustmentRule],
    requested: &BTreeSet<String>,
) -> Vec<ScoreRow> {
    let mut rows = rows;
    for rule in rules {
        if !rows.iter().any(|row| row.test == rule.base) {
            debug!(rule = rule.name.as_str(), "adjustment base absent, skipping");
            continue;
        }
        let dependency: BTreeMap<(i64, ppmi_model::Visit), f64> = rows
            .iter()
            .filter(|row| row.test == rule.dependency)
            .map(|row| ((row.participant, row.visit), row.score))
            .collect();

        let mut adjusted = Vec::new();
        rows.retain(|row| {
            if row.test == rule.base {
                let education = dependency.get(&(row.participant, row.visit)).copied();
                adjusted.push(ScoreRow {
                    test: rule.name.clone(),
                    score: rule.adjusted_score(row.score, education),
                    ..row.clone()
                });
                // Keep the unadjusted precursor only when asked for by name.
                return requested.contains(&rule.base);
            }
            if row.test == rule.dependency {
                return requested.contains(&rule.dependency);
            }
            true
        });
        rows.extend(adjusted);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppmi_model::Visit;

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

    fn moca_rule() -> AdjustmentRule {
        AdjustmentRule {
            name: "moca".to_string(),
            base: "moca_unadj".to_string(),
            dependency: "education".to_string(),
            cutoff: 12.0,
            ceiling: 30.0,
            bonus: 1.0,
        }
    }

    #[test]
    fn education_bonus_applies_below_ceiling() {
        let rows = vec![
            row(1001, "BL", "moca_unadj", 28.0),
            row(1001, "BL", "education", 10.0),
        ];
        let out = apply_adjustments(rows, &[moca_rule()], &BTreeSet::new());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].test, "moca");
        assert_eq!(out[0].score, 29.0);
    }

    #[test]
    fn ceiling_scores_pass_through() {
        let rows = vec![
            row(1001, "BL", "moca_unadj", 30.0),
            row(1001, "BL", "education", 8.0),
        ];
        let out = apply_adjustments(rows, &[moca_rule()], &BTreeSet::new());
        assert_eq!(out[0].score, 30.0);
    }

    #[test]
    fn missing_dependency_earns_no_bonus() {
        let rows = vec![row(1001, "V04", "moca_unadj", 25.0)];
        let out = apply_adjustments(rows, &[moca_rule()], &BTreeSet::new());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].test, "moca");
        assert_eq!(out[0].score, 25.0);
    }

    #[test]
    fn reconciliation_leaves_one_variant_per_key() {
        let rows = vec![
            row(1001, "BL", "moca_unadj", 28.0),
            row(1001, "BL", "education", 10.0),
            row(1002, "BL", "moca_unadj", 26.0),
            row(1002, "BL", "education", 16.0),
        ];
        let out = apply_adjustments(rows, &[moca_rule()], &BTreeSet::new());
        for r in &out {
            assert_eq!(r.test, "moca");
        }
        let mut keys: Vec<(i64, &str)> = out.iter().map(|r| (r.participant, r.visit.code())).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), out.len());
    }

    #[test]
    fn independently_requested_precursors_survive() {
        let rows = vec![
            row(1001, "BL", "moca_unadj", 28.0),
            row(1001, "BL", "education", 10.0),
        ];
        let requested: BTreeSet<String> = ["education".to_string()].into_iter().collect();
        let out = apply_adjustments(rows, &[moca_rule()], &requested);
        let tests: BTreeSet<&str> = out.iter().map(|r| r.test.as_str()).collect();
        assert!(tests.contains("moca"));
        assert!(tests.contains("education"));
        assert!(!tests.contains("moca_unadj"));
    }

    #[test]
    fn page_split_renames_matching_rows_only() {
        let mut rows = vec![
            ScoreRow {
                page: Some("NUPDRS3".to_string()),
                ..row(1001, "BL", "updrs_iii", 20.0)
            },
            ScoreRow {
                page: Some("NUPDRS3A".to_string()),
                ..row(1001, "BL", "updrs_iii", 15.0)
            },
        ];
        let splits = vec![PageSplitRule {
            measure: "updrs_iii".to_string(),
            page: "NUPDRS3A".to_string(),
            renamed: "updrs_iii_a".to_string(),
        }];
        apply_page_splits(&mut rows, &splits);
        assert_eq!(rows[0].test, "updrs_iii");
        assert_eq!(rows[1].test, "updrs_iii_a");
    }
}
