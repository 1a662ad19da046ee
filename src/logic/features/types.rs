//! Fingerprint Types
//!
//! Core types cho fingerprint extraction.
//! KHÔNG chứa logic - chỉ data structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// EXACT
// ============================================================================

/// Hash algorithm used for the exact fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
}

/// Digest of a bounded prefix of the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactFingerprint {
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest
    pub digest: String,
    /// Bytes actually hashed (<= partial hash limit)
    pub bytes_read: u64,
}

// ============================================================================
// FUZZY
// ============================================================================

/// MinHash signature of the whole file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyFingerprint {
    pub algorithm: String,
    pub signature: Vec<u64>,
    pub num_perm: usize,
}

// ============================================================================
// SEMANTIC
// ============================================================================

/// Embedding of the metadata text surrogate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticFingerprint {
    pub vector: Vec<f32>,
    pub dimension: usize,
    pub model_id: String,
}

// ============================================================================
// FINGERPRINT SET
// ============================================================================

/// All fingerprints of one observed file.
///
/// Each field is independent: a missing one never blocks the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FingerprintSet {
    pub exact: Option<ExactFingerprint>,
    pub fuzzy: Option<FuzzyFingerprint>,
    pub semantic: Option<SemanticFingerprint>,
}

impl FingerprintSet {
    /// Number of fingerprint types present (0..=3)
    pub fn present_count(&self) -> usize {
        [
            self.exact.is_some(),
            self.fuzzy.is_some(),
            self.semantic.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }

    /// Names of the present fields, in fixed order
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::with_capacity(3);
        if self.exact.is_some() {
            fields.push("exact");
        }
        if self.fuzzy.is_some() {
            fields.push("fuzzy");
        }
        if self.semantic.is_some() {
            fields.push("semantic");
        }
        fields
    }
}

// ============================================================================
// FILE METADATA
// ============================================================================

/// Descriptive metadata about a downloaded file (feeds the semantic surrogate)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
