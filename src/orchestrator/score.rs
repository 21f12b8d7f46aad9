//! Weighted score reduction.
//!
//! Collapses the per-category result map into one 0-100 integer.
//! Security weighs 0.4, quality 0.3, compliance 0.2, and every other
//! category 0.1; the table is stored in tenths so the arithmetic stays
//! exact. Categories that failed or returned no score are skipped and
//! the weighting renormalizes over the rest.

use crate::models::{AgentKind, AnalysisResult};
use std::collections::BTreeMap;

/// Relative weight of a category, in tenths.
fn weight(kind: AgentKind) -> u32 {
    match kind {
        AgentKind::Security => 4,
        AgentKind::Quality => 3,
        AgentKind::Compliance => 2,
        _ => 1,
    }
}

/// Computes the weighted overall score.
///
/// Returns 0 when no category contributed a score. Rounds half up.
pub fn overall_score(agents: &BTreeMap<AgentKind, AnalysisResult>) -> u8 {
    let mut total = 0.0;
    let mut weight_sum = 0u32;

    for (kind, result) in agents {
        if !result.status.is_success() {
            continue;
        }
        let Some(score) = result.score else { continue };

        let w = weight(*kind);
        total += score * f64::from(w);
        weight_sum += w;
    }

    if weight_sum == 0 {
        return 0;
    }

    (total / f64::from(weight_sum)).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentAnalysis;
    use serde_json::Value;

    fn scored(kind: AgentKind, score: f64) -> (AgentKind, AnalysisResult) {
        let result = AnalysisResult::success(
            kind,
            AgentAnalysis {
                score: Some(score),
                payload: Value::Null,
            },
            10,
        );
        (kind, result)
    }

    fn failed(kind: AgentKind) -> (AgentKind, AnalysisResult) {
        (kind, AnalysisResult::error(kind, "scripted failure", 10))
    }

    fn unscored(kind: AgentKind) -> (AgentKind, AnalysisResult) {
        let result = AnalysisResult::success(
            kind,
            AgentAnalysis {
                score: None,
                payload: Value::Null,
            },
            10,
        );
        (kind, result)
    }

    fn score_of(entries: Vec<(AgentKind, AnalysisResult)>) -> u8 {
        overall_score(&entries.into_iter().collect())
    }

    #[test]
    fn test_weighted_mean_of_successes() {
        // (80*4 + 60*3) / 7 = 500/7 = 71.43
        let score = score_of(vec![
            scored(AgentKind::Security, 80.0),
            scored(AgentKind::Quality, 60.0),
        ]);
        assert_eq!(score, 71);
    }

    #[test]
    fn test_all_six_categories() {
        // (90*4 + 80*3 + 70*2 + 60 + 50 + 40) / 12 = 890/12 = 74.17
        let score = score_of(vec![
            scored(AgentKind::Security, 90.0),
            scored(AgentKind::Quality, 80.0),
            scored(AgentKind::Compliance, 70.0),
            scored(AgentKind::Documentation, 60.0),
            scored(AgentKind::Devops, 50.0),
            scored(AgentKind::Learning, 40.0),
        ]);
        assert_eq!(score, 74);
    }

    #[test]
    fn test_failed_category_is_skipped() {
        let with_failure = score_of(vec![
            scored(AgentKind::Security, 80.0),
            failed(AgentKind::Quality),
        ]);
        let without = score_of(vec![scored(AgentKind::Security, 80.0)]);
        assert_eq!(with_failure, without);
        assert_eq!(with_failure, 80);
    }

    #[test]
    fn test_success_without_score_is_skipped() {
        let score = score_of(vec![
            scored(AgentKind::Security, 64.0),
            unscored(AgentKind::Devops),
        ]);
        assert_eq!(score, 64);
    }

    #[test]
    fn test_no_contributing_categories_scores_zero() {
        assert_eq!(score_of(vec![]), 0);
        assert_eq!(
            score_of(vec![failed(AgentKind::Security), failed(AgentKind::Quality)]),
            0
        );
    }

    #[test]
    fn test_single_category_keeps_its_score() {
        assert_eq!(score_of(vec![scored(AgentKind::Documentation, 73.0)]), 73);
    }

    #[test]
    fn test_rounds_half_up() {
        // Equal weights: (80 + 81) / 2 = 80.5, which must round to 81.
        let score = score_of(vec![
            scored(AgentKind::Devops, 80.0),
            scored(AgentKind::Learning, 81.0),
        ]);
        assert_eq!(score, 81);
    }
}
