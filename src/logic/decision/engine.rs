//! Decision Engine
//!
//! Scores -> ALLOW / WARN / BLOCK. Strict precedence chain, first match wins,
//! no averaging across algorithms.
//!
//! Rules (in order):
//! 1. EXACT_MATCH     exact == 1.0                 -> BLOCK
//! 2. FUZZY_BLOCK     fuzzy >= fuzzy_block         -> BLOCK
//! 3. SEMANTIC_BLOCK  semantic >= semantic_block   -> BLOCK
//! 4. FUZZY_WARN      fuzzy >= fuzzy_warn          -> WARN
//! 5. SEMANTIC_WARN   semantic >= semantic_warn    -> WARN
//! 6. default                                      -> ALLOW

use super::config::DecisionThresholds;
use super::explain::render_explanation;
use super::types::{BestScores, Decision, DecisionResult, Evidence, Rule};
use crate::logic::similarity::SimilarityScore;

#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    thresholds: DecisionThresholds,
}

impl DecisionEngine {
    pub fn new(thresholds: DecisionThresholds) -> Self {
        Self { thresholds }
    }

    /// `scores = None` means no lookup result was available at all.
    pub fn decide(&self, event_id: &str, scores: Option<&[SimilarityScore]>) -> DecisionResult {
        let (best, evidence) = match scores {
            None => (BestScores::default(), Evidence::NotAvailable),
            Some([]) => (BestScores::default(), Evidence::Empty),
            Some(list) => (collect_best(list), Evidence::Scored),
        };

        let fired = Rule::CHAIN
            .into_iter()
            .find(|rule| self.rule_fires(*rule, &best));

        let (decision, triggered_rules) = match fired {
            Some(rule) => (rule.outcome(), vec![rule]),
            None => (Decision::Allow, Vec::new()),
        };

        let explanation = render_explanation(
            decision,
            &triggered_rules,
            &best,
            &self.thresholds,
            evidence,
        );

        let result = DecisionResult {
            event_id: event_id.to_string(),
            decision,
            triggered_rules,
            scores: best,
            evidence,
            explanation,
        };

        log::info!(
            target: "audit",
            "[DECISION] event={} decision={} rules=[{}] evidence={} exact={:?} fuzzy={:?} semantic={:?}",
            result.event_id,
            result.decision,
            result.reason_code(),
            result.evidence.as_str(),
            result.scores.exact,
            result.scores.fuzzy,
            result.scores.semantic
        );

        result
    }

    fn rule_fires(&self, rule: Rule, best: &BestScores) -> bool {
        let Some(score) = best.get(rule.algorithm()) else {
            return false;
        };
        let t = &self.thresholds;
        match rule {
            Rule::ExactMatch => score == 1.0,
            Rule::FuzzyBlock => score >= t.fuzzy_block,
            Rule::SemanticBlock => score >= t.semantic_block,
            Rule::FuzzyWarn => score >= t.fuzzy_warn,
            Rule::SemanticWarn => score >= t.semantic_warn,
        }
    }
}

fn collect_best(scores: &[SimilarityScore]) -> BestScores {
    let mut best = BestScores::default();
    for score in scores {
        best.observe(score.algorithm, score.confidence);
    }
    best
}

// ============================================================================
// TESTS
// ============================================================================
