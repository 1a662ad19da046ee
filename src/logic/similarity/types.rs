//! Similarity Types
//!
//! Core types cho similarity matching.
//! KHÔNG chứa logic - chỉ data structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// ALGORITHM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Exact,
    Fuzzy,
    Semantic,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Exact, Algorithm::Fuzzy, Algorithm::Semantic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Exact => "exact",
            Algorithm::Fuzzy => "fuzzy",
            Algorithm::Semantic => "semantic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Some(Algorithm::Exact),
            "fuzzy" => Some(Algorithm::Fuzzy),
            "semantic" => Some(Algorithm::Semantic),
            _ => None,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SIMILARITY SCORE
// ============================================================================

/// One (algorithm, confidence) observation, optionally tied to a reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub algorithm: Algorithm,
    /// Always in [0, 1]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_metadata: Option<serde_json::Value>,
}

impl SimilarityScore {
    /// Confidence is clamped into [0, 1]; NaN becomes 0
    pub fn new(algorithm: Algorithm, confidence: f64) -> Self {
        Self {
            algorithm,
            confidence: clamp_confidence(confidence),
            reference_id: None,
            reference_metadata: None,
        }
    }

    pub fn with_reference(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.reference_metadata = Some(metadata);
        self
    }
}

pub(crate) fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ============================================================================
// MATCH REPORT
// ============================================================================

/// A reference whose confidence reached the matcher threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMatch {
    pub reference_id: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Outcome of one matcher over the whole pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmResult {
    pub algorithm: Algorithm,
    /// Best confidence seen, even if below threshold
    pub confidence: f64,
    /// Reference carrying the best confidence
    pub best_reference: Option<ReferenceMatch>,
    /// References >= threshold, confidence desc then id
    pub matches: Vec<ReferenceMatch>,
    /// Number of references actually compared
    pub compared: usize,
}

/// Per-algorithm results for one fingerprint set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub results: Vec<AlgorithmResult>,
}

impl MatchReport {
    pub fn get(&self, algorithm: Algorithm) -> Option<&AlgorithmResult> {
        self.results.iter().find(|r| r.algorithm == algorithm)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// One score per evaluated algorithm, carrying its best reference
    pub fn scores(&self) -> Vec<SimilarityScore> {
        self.results
            .iter()
            .map(|r| {
                let mut score = SimilarityScore::new(r.algorithm, r.confidence);
                if let Some(best) = &r.best_reference {
                    score.reference_id = Some(best.reference_id.clone());
                    score.reference_metadata = best.metadata.clone();
                }
                score
            })
            .collect()
    }
}
