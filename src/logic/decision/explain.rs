//! Decision Explanation
//!
//! Pure, deterministic rendering of a decision into a user-facing sentence.
//! Same inputs always produce the same string (audit reproducibility).

use super::config::DecisionThresholds;
use super::types::{BestScores, Decision, Evidence, Rule};
use crate::logic::similarity::Algorithm;

pub const NO_LOOKUP_EXPLANATION: &str =
    "No similarity lookup performed or no matches available. Defaulting to ALLOW.";
pub const NO_MATCHES_EXPLANATION: &str =
    "No similar files found in the reference database. File is allowed.";

/// 0.923 -> "92%"
fn pct(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

pub fn render_explanation(
    decision: Decision,
    rules: &[Rule],
    scores: &BestScores,
    thresholds: &DecisionThresholds,
    evidence: Evidence,
) -> String {
    match evidence {
        Evidence::NotAvailable => return NO_LOOKUP_EXPLANATION.to_string(),
        Evidence::Empty => return NO_MATCHES_EXPLANATION.to_string(),
        Evidence::Scored => {}
    }

    match decision {
        Decision::Allow => explain_allow(scores),
        Decision::Warn => explain_warn(rules, scores, thresholds),
        Decision::Block => explain_block(rules, scores, thresholds),
    }
}

fn explain_allow(scores: &BestScores) -> String {
    let found: Vec<String> = Algorithm::ALL
        .iter()
        .filter_map(|a| scores.get(*a).map(|s| format!("{}: {}", a.as_str(), pct(s))))
        .collect();

    if found.is_empty() {
        return "No similarity detected. File is allowed.".to_string();
    }
    format!("File similarity is low ({}). File is allowed.", found.join(", "))
}

fn explain_warn(rules: &[Rule], scores: &BestScores, thresholds: &DecisionThresholds) -> String {
    let mut parts = Vec::new();

    if rules.contains(&Rule::FuzzyWarn) {
        if let Some(score) = scores.fuzzy {
            parts.push(format!(
                "File has moderate similarity to a known file (fuzzy match: {}, threshold: {})",
                pct(score),
                pct(thresholds.fuzzy_warn)
            ));
        }
    }

    if rules.contains(&Rule::SemanticWarn) {
        if let Some(score) = scores.semantic {
            parts.push(format!(
                "File content is moderately similar to a known file (semantic match: {}, threshold: {})",
                pct(score),
                pct(thresholds.semantic_warn)
            ));
        }
    }

    if parts.is_empty() {
        parts.push("File matches warning criteria".to_string());
    }

    format!("{}. Please review before downloading.", parts.join(". "))
}

fn explain_block(rules: &[Rule], scores: &BestScores, thresholds: &DecisionThresholds) -> String {
    if rules.contains(&Rule::ExactMatch) {
        return "File is identical to a known file. BLOCKED for safety.".to_string();
    }

    if rules.contains(&Rule::FuzzyBlock) {
        if let Some(score) = scores.fuzzy {
            return format!(
                "File is very similar to a known file (fuzzy match: {}, threshold: {}). BLOCKED for safety.",
                pct(score),
                pct(thresholds.fuzzy_block)
            );
        }
    }

    if rules.contains(&Rule::SemanticBlock) {
        if let Some(score) = scores.semantic {
            return format!(
                "File content is very similar to a known suspicious file (semantic match: {}, threshold: {}). BLOCKED for safety.",
                pct(score),
                pct(thresholds.semantic_block)
            );
        }
    }

    "File matches safety criteria. BLOCKED.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_available_mentions_no_lookup() {
        let text = render_explanation(
            Decision::Allow,
            &[],
            &BestScores::default(),
            &DecisionThresholds::default(),
            Evidence::NotAvailable,
        );
        assert!(text.contains("lookup performed"));
    }

    #[test]
    fn test_allow_lists_scores_in_fixed_order() {
        let scores = BestScores {
            exact: Some(0.0),
            fuzzy: None,
            semantic: Some(0.41),
        };
        let text = render_explanation(
            Decision::Allow,
            &[],
            &scores,
            &DecisionThresholds::default(),
            Evidence::Scored,
        );
        assert_eq!(text, "File similarity is low (exact: 0%, semantic: 41%). File is allowed.");
    }

    #[test]
    fn test_warn_uses_active_thresholds() {
        let scores = BestScores {
            fuzzy: Some(0.92),
            ..Default::default()
        };
        let thresholds = DecisionThresholds {
            fuzzy_warn: 0.75,
            fuzzy_block: 0.95,
            ..Default::default()
        };
        let text = render_explanation(
            Decision::Warn,
            &[Rule::FuzzyWarn],
            &scores,
            &thresholds,
            Evidence::Scored,
        );
        assert_eq!(
            text,
            "File has moderate similarity to a known file (fuzzy match: 92%, threshold: 75%). Please review before downloading."
        );
    }

    #[test]
    fn test_block_exact() {
        let text = render_explanation(
            Decision::Block,
            &[Rule::ExactMatch],
            &BestScores {
                exact: Some(1.0),
                ..Default::default()
            },
            &DecisionThresholds::default(),
            Evidence::Scored,
        );
        assert_eq!(text, "File is identical to a known file. BLOCKED for safety.");
    }

    #[test]
    fn test_block_semantic() {
        let text = render_explanation(
            Decision::Block,
            &[Rule::SemanticBlock],
            &BestScores {
                semantic: Some(0.97),
                ..Default::default()
            },
            &DecisionThresholds::default(),
            Evidence::Scored,
        );
        assert!(text.contains("semantic match: 97%, threshold: 92%"));
        assert!(text.ends_with("BLOCKED for safety."));
    }
}
