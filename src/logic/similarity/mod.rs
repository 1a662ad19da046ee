//! Similarity Module
//!
//! So sánh fingerprints với reference pool, trả về confidence theo từng thuật toán.
//! KHÔNG quyết định ALLOW/WARN/BLOCK - đó là việc của decision engine.
//!
//! ## Structure
//! - `types`: Algorithm, SimilarityScore, MatchReport
//! - `pool`: Reference samples (JSON)
//! - `orchestrator`: Matchers + thresholds

pub mod types;
pub mod pool;
pub mod orchestrator;

#[cfg(test)]
mod tests;

pub use types::{Algorithm, AlgorithmResult, MatchReport, ReferenceMatch, SimilarityScore};
pub use pool::{ReferencePool, ReferenceSample};
pub use orchestrator::{
    cosine_similarity, exact_similarity, fuzzy_similarity, MatcherConfig, SimilarityOrchestrator,
};
