//! Decision Types
//!
//! Core types cho download decisions.
//! KHÔNG chứa logic - chỉ data structures.

use serde::{Deserialize, Serialize};

use crate::logic::similarity::Algorithm;

// ============================================================================
// DECISION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// Download goes through
    Allow,
    /// User must confirm
    Warn,
    /// Download is stopped
    Block,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Warn => "WARN",
            Decision::Block => "BLOCK",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RULES
// ============================================================================

/// Named rules, listed in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    ExactMatch,
    FuzzyBlock,
    SemanticBlock,
    FuzzyWarn,
    SemanticWarn,
}

impl Rule {
    pub const CHAIN: [Rule; 5] = [
        Rule::ExactMatch,
        Rule::FuzzyBlock,
        Rule::SemanticBlock,
        Rule::FuzzyWarn,
        Rule::SemanticWarn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::ExactMatch => "EXACT_MATCH",
            Rule::FuzzyBlock => "FUZZY_BLOCK",
            Rule::SemanticBlock => "SEMANTIC_BLOCK",
            Rule::FuzzyWarn => "FUZZY_WARN",
            Rule::SemanticWarn => "SEMANTIC_WARN",
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Rule::ExactMatch => Algorithm::Exact,
            Rule::FuzzyBlock | Rule::FuzzyWarn => Algorithm::Fuzzy,
            Rule::SemanticBlock | Rule::SemanticWarn => Algorithm::Semantic,
        }
    }

    pub fn outcome(&self) -> Decision {
        match self {
            Rule::ExactMatch | Rule::FuzzyBlock | Rule::SemanticBlock => Decision::Block,
            Rule::FuzzyWarn | Rule::SemanticWarn => Decision::Warn,
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SCORES & EVIDENCE
// ============================================================================

/// Max confidence per algorithm; `None` = no data for that algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BestScores {
    pub exact: Option<f64>,
    pub fuzzy: Option<f64>,
    pub semantic: Option<f64>,
}

impl BestScores {
    pub fn get(&self, algorithm: Algorithm) -> Option<f64> {
        match algorithm {
            Algorithm::Exact => self.exact,
            Algorithm::Fuzzy => self.fuzzy,
            Algorithm::Semantic => self.semantic,
        }
    }

    /// Keep the maximum
    pub fn observe(&mut self, algorithm: Algorithm, confidence: f64) {
        let slot = match algorithm {
            Algorithm::Exact => &mut self.exact,
            Algorithm::Fuzzy => &mut self.fuzzy,
            Algorithm::Semantic => &mut self.semantic,
        };
        *slot = Some(slot.map_or(confidence, |current| current.max(confidence)));
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_none() && self.fuzzy.is_none() && self.semantic.is_none()
    }
}

/// What the engine had to work with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Evidence {
    /// No lookup result at all
    NotAvailable,
    /// Lookup ran, nothing came back
    Empty,
    /// At least one score
    Scored,
}

impl Evidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Evidence::NotAvailable => "NOT_AVAILABLE",
            Evidence::Empty => "EMPTY",
            Evidence::Scored => "SCORED",
        }
    }
}

// ============================================================================
// RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub event_id: String,
    pub decision: Decision,
    /// Empty = default path
    pub triggered_rules: Vec<Rule>,
    pub scores: BestScores,
    pub evidence: Evidence,
    pub explanation: String,
}

impl DecisionResult {
    /// Rules joined with " + ", or the decision name on the default path
    pub fn reason_code(&self) -> String {
        if self.triggered_rules.is_empty() {
            self.decision.as_str().to_string()
        } else {
            self.triggered_rules
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(" + ")
        }
    }
}
