//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value here can be overridden through `AgentConfig` (file or env).

use std::path::PathBuf;

/// Default scoring backend URL
///
/// This is the fallback URL when no environment variable is set.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name (used as notification source)
pub const APP_NAME: &str = "One-Shield DLP";

// ============================================
// Feature extraction
// ============================================

/// Bytes hashed for the exact fingerprint (4 MiB)
pub const DEFAULT_PARTIAL_HASH_BYTES: usize = 4 * 1024 * 1024;

/// MinHash permutations
pub const DEFAULT_NUM_PERM: usize = 128;

/// Read size when streaming the file into MinHash (64 KiB)
pub const DEFAULT_FUZZY_CHUNK_BYTES: usize = 64 * 1024;

/// Fixed seed for MinHash permutation coefficients.
/// Changing it invalidates every stored fuzzy reference.
pub const MINHASH_SEED: u64 = 1;

/// Dimension of the built-in hashing embedder
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

// ============================================
// Similarity matching
// ============================================

pub const DEFAULT_FUZZY_MATCH_THRESHOLD: f64 = 0.75;
pub const DEFAULT_SEMANTIC_MATCH_THRESHOLD: f64 = 0.70;

// ============================================
// Decision thresholds
// ============================================

/// Trigger WARN if fuzzy score >= 0.75
pub const FUZZY_WARN_THRESHOLD: f64 = 0.75;
/// Trigger BLOCK if fuzzy score >= 0.90
pub const FUZZY_BLOCK_THRESHOLD: f64 = 0.90;
/// Trigger WARN if semantic score >= 0.80
pub const SEMANTIC_WARN_THRESHOLD: f64 = 0.80;
/// Trigger BLOCK if semantic score >= 0.92
pub const SEMANTIC_BLOCK_THRESHOLD: f64 = 0.92;

// ============================================
// Backend & enforcement
// ============================================

/// Remote lookup timeout (seconds). Single attempt, no retry.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Feedback POST timeout (seconds)
pub const DEFAULT_FEEDBACK_TIMEOUT_SECS: u64 = 5;

/// Seconds to wait for the user on a WARN decision
pub const DEFAULT_WARN_CONFIRMATION_TIMEOUT_SECS: u64 = 10;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Read a string variable, ignoring empty values
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// Boolean flag value: only "true"/"1"/"yes"/"on" enable, anything else disables
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Default agent identifier: `agent-<hostname>`
pub fn default_agent_id() -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("agent-{}", host.to_lowercase())
}

/// Default location of the local reference pool
pub fn default_reference_pool_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oneshield-dlp")
        .join("references.json")
}
