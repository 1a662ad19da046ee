//! Similarity Orchestrator
//!
//! Runs the enabled matchers of a fingerprint set against a reference pool.
//! Reports confidences only; the verdict belongs to the decision engine.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::pool::{ReferencePool, ReferenceSample};
use super::types::{clamp_confidence, Algorithm, AlgorithmResult, MatchReport, ReferenceMatch};
use crate::constants;
use crate::logic::features::FingerprintSet;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub exact_enabled: bool,
    pub fuzzy_enabled: bool,
    pub semantic_enabled: bool,
    /// Minimum fuzzy confidence for a reference to be listed as a match
    pub fuzzy_threshold: f64,
    /// Minimum semantic confidence for a reference to be listed as a match
    pub semantic_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            exact_enabled: true,
            fuzzy_enabled: true,
            semantic_enabled: true,
            fuzzy_threshold: constants::DEFAULT_FUZZY_MATCH_THRESHOLD,
            semantic_threshold: constants::DEFAULT_SEMANTIC_MATCH_THRESHOLD,
        }
    }
}

impl MatcherConfig {
    pub fn is_enabled(&self, algorithm: Algorithm) -> bool {
        match algorithm {
            Algorithm::Exact => self.exact_enabled,
            Algorithm::Fuzzy => self.fuzzy_enabled,
            Algorithm::Semantic => self.semantic_enabled,
        }
    }

    /// Exact is binary, so its threshold is 1.0
    pub fn threshold(&self, algorithm: Algorithm) -> f64 {
        match algorithm {
            Algorithm::Exact => 1.0,
            Algorithm::Fuzzy => self.fuzzy_threshold,
            Algorithm::Semantic => self.semantic_threshold,
        }
    }
}

// ============================================================================
// SCORING PRIMITIVES
// ============================================================================

/// 1.0 on identical digest (case-insensitive), else 0.0
pub fn exact_similarity(a: &str, b: &str) -> f64 {
    if a.eq_ignore_ascii_case(b) {
        1.0
    } else {
        0.0
    }
}

/// Estimated Jaccard: share of agreeing signature positions
pub fn fuzzy_similarity(a: &[u64], b: &[u64]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let agree = a.iter().zip(b).filter(|(x, y)| x == y).count();
    agree as f64 / a.len() as f64
}

/// Cosine similarity clamped to [0, 1]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    clamp_confidence(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SimilarityOrchestrator {
    config: MatcherConfig,
}

impl SimilarityOrchestrator {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Compare every present and enabled fingerprint against the pool.
    ///
    /// An algorithm only appears in the report when at least one reference
    /// could be compared with it.
    pub fn match_fingerprints(&self, set: &FingerprintSet, pool: &ReferencePool) -> MatchReport {
        let mut report = MatchReport::default();

        for algorithm in Algorithm::ALL {
            if !self.config.is_enabled(algorithm) {
                continue;
            }

            let scored: Vec<(&ReferenceSample, f64)> = pool
                .samples()
                .iter()
                .filter_map(|sample| score_sample(algorithm, set, sample).map(|s| (sample, s)))
                .collect();

            if scored.is_empty() {
                continue;
            }

            let result = summarize(algorithm, scored, self.config.threshold(algorithm));
            log::debug!(
                "[LOOKUP] Local {}: best={:.3} over {} references, {} matches",
                algorithm,
                result.confidence,
                result.compared,
                result.matches.len()
            );
            report.results.push(result);
        }

        report
    }
}

/// `None` when either side lacks this fingerprint
fn score_sample(algorithm: Algorithm, set: &FingerprintSet, sample: &ReferenceSample) -> Option<f64> {
    match algorithm {
        Algorithm::Exact => {
            let ours = set.exact.as_ref()?;
            let theirs = sample.exact_digest.as_ref()?;
            Some(exact_similarity(&ours.digest, theirs))
        }
        Algorithm::Fuzzy => {
            let ours = set.fuzzy.as_ref()?;
            let theirs = sample.fuzzy_signature.as_ref()?;
            Some(fuzzy_similarity(&ours.signature, theirs))
        }
        Algorithm::Semantic => {
            let ours = set.semantic.as_ref()?;
            let theirs = sample.embedding.as_ref()?;
            Some(cosine_similarity(&ours.vector, theirs))
        }
    }
}

fn by_confidence_then_id(a: &ReferenceMatch, b: &ReferenceMatch) -> Ordering {
    b.confidence
        .partial_cmp(&a.confidence)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.reference_id.cmp(&b.reference_id))
}

fn summarize(
    algorithm: Algorithm,
    scored: Vec<(&ReferenceSample, f64)>,
    threshold: f64,
) -> AlgorithmResult {
    let compared = scored.len();
    let mut ranked: Vec<ReferenceMatch> = scored
        .into_iter()
        .map(|(sample, confidence)| ReferenceMatch {
            reference_id: sample.reference_id.clone(),
            confidence,
            metadata: sample.metadata.clone(),
        })
        .collect();
    ranked.sort_by(by_confidence_then_id);

    let best_reference = ranked.first().cloned();
    let confidence = best_reference.as_ref().map(|b| b.confidence).unwrap_or(0.0);
    let matches = ranked
        .into_iter()
        .filter(|m| m.confidence >= threshold)
        .collect();

    AlgorithmResult {
        algorithm,
        confidence,
        best_reference,
        matches,
        compared,
    }
}
