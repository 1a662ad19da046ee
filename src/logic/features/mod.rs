//! Features Module - Fingerprint Extraction
//!
//! Ba kỹ thuật độc lập: exact (SHA-256 prefix), fuzzy (MinHash),
//! semantic (embedding của metadata).

pub mod types;
pub mod exact;
pub mod fuzzy;
pub mod semantic;
pub mod extractor;


use std::io;
use std::path::Path;

// Re-export common types
pub use types::{
    ExactFingerprint, FileMetadata, FingerprintSet, FuzzyFingerprint, HashAlgorithm,
    SemanticFingerprint,
};
pub use fuzzy::{MinHasher, MINHASH_ALGORITHM};
pub use semantic::{build_text_surrogate, EmbedError, Embedder, HashingEmbedder};
pub use extractor::{Capabilities, ExtractorConfig, FingerprintExtractor};

/// Log a file read failure with the cause spelled out
pub(crate) fn log_io_failure(label: &str, path: &Path, err: &io::Error) {
    match err.kind() {
        io::ErrorKind::NotFound => {
            log::warn!("[FEATURE] {}: file not found {}", label, path.display())
        }
        io::ErrorKind::PermissionDenied => {
            log::warn!("[FEATURE] {}: permission denied {}", label, path.display())
        }
        _ => log::error!("[FEATURE] {} failed for {}: {}", label, path.display(), err),
    }
}
