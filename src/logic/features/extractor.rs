//! Fingerprint Extractor
//!
//! Produces a `FingerprintSet` for one file. Never fails: every technique that
//! cannot run leaves its field empty and the others still run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::exact::extract_exact;
use super::fuzzy::{extract_fuzzy, MinHasher};
use super::semantic::{extract_semantic, Embedder};
use super::types::{FileMetadata, FingerprintSet, FuzzyFingerprint, SemanticFingerprint};
use crate::constants;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Bytes hashed for the exact fingerprint
    pub partial_hash_bytes: usize,
    pub fuzzy_enabled: bool,
    pub num_perm: usize,
    pub fuzzy_chunk_bytes: usize,
    pub semantic_enabled: bool,
    pub embedding_dim: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            partial_hash_bytes: constants::DEFAULT_PARTIAL_HASH_BYTES,
            fuzzy_enabled: true,
            num_perm: constants::DEFAULT_NUM_PERM,
            fuzzy_chunk_bytes: constants::DEFAULT_FUZZY_CHUNK_BYTES,
            semantic_enabled: true,
            embedding_dim: constants::DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl ExtractorConfig {
    /// Exact hash only
    pub fn exact_only() -> Self {
        Self {
            fuzzy_enabled: false,
            semantic_enabled: false,
            ..Default::default()
        }
    }
}

/// Optional techniques, resolved once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub fuzzy: bool,
    pub semantic: bool,
}

impl Capabilities {
    pub fn resolve(config: &ExtractorConfig, embedder_available: bool) -> Self {
        Self {
            fuzzy: config.fuzzy_enabled && config.num_perm > 0,
            semantic: config.semantic_enabled && embedder_available,
        }
    }
}

// ============================================================================
// EXTRACTOR
// ============================================================================

pub struct FingerprintExtractor {
    capabilities: Capabilities,
    default_partial_hash_bytes: usize,
    fuzzy_chunk_bytes: usize,
    minhash: Option<MinHasher>,
    embedder: Option<Arc<dyn Embedder>>,
}

impl FingerprintExtractor {
    pub fn new(config: &ExtractorConfig, embedder: Option<Arc<dyn Embedder>>) -> Self {
        let capabilities = Capabilities::resolve(config, embedder.is_some());

        let minhash = if capabilities.fuzzy {
            Some(MinHasher::new(config.num_perm, constants::MINHASH_SEED))
        } else {
            None
        };

        let embedder = if capabilities.semantic { embedder } else { None };

        log::info!(
            "[FEATURE] Extractor ready: exact=on, fuzzy={}, semantic={}",
            if capabilities.fuzzy { "on" } else { "off" },
            if capabilities.semantic { "on" } else { "off" }
        );

        Self {
            capabilities,
            default_partial_hash_bytes: config.partial_hash_bytes,
            fuzzy_chunk_bytes: config.fuzzy_chunk_bytes.max(1),
            minhash,
            embedder,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn default_partial_hash_bytes(&self) -> usize {
        self.default_partial_hash_bytes
    }

    /// Run all available techniques sequentially
    pub fn extract(
        &self,
        path: &Path,
        metadata: Option<&FileMetadata>,
        partial_hash_limit: usize,
    ) -> FingerprintSet {
        let set = FingerprintSet {
            exact: extract_exact(path, partial_hash_limit),
            fuzzy: self.extract_fuzzy(path),
            semantic: self.extract_semantic(path, metadata),
        };
        self.log_summary(path, &set);
        set
    }

    /// Run the three techniques on blocking tasks and join them.
    /// A panicked task only loses its own field.
    pub async fn extract_concurrent(
        self: &Arc<Self>,
        path: PathBuf,
        metadata: Option<FileMetadata>,
        partial_hash_limit: usize,
    ) -> FingerprintSet {
        let exact_task = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || extract_exact(&path, partial_hash_limit))
        };
        let fuzzy_task = {
            let this = Arc::clone(self);
            let path = path.clone();
            tokio::task::spawn_blocking(move || this.extract_fuzzy(&path))
        };
        let semantic_task = {
            let this = Arc::clone(self);
            let path = path.clone();
            tokio::task::spawn_blocking(move || this.extract_semantic(&path, metadata.as_ref()))
        };

        let (exact, fuzzy, semantic) = tokio::join!(exact_task, fuzzy_task, semantic_task);

        let set = FingerprintSet {
            exact: joined("exact", exact),
            fuzzy: joined("fuzzy", fuzzy),
            semantic: joined("semantic", semantic),
        };
        self.log_summary(&path, &set);
        set
    }

    fn extract_fuzzy(&self, path: &Path) -> Option<FuzzyFingerprint> {
        let hasher = self.minhash.as_ref()?;
        extract_fuzzy(hasher, path, self.fuzzy_chunk_bytes)
    }

    fn extract_semantic(
        &self,
        path: &Path,
        metadata: Option<&FileMetadata>,
    ) -> Option<SemanticFingerprint> {
        let embedder = self.embedder.as_ref()?;
        extract_semantic(embedder.as_ref(), path, metadata)
    }

    fn log_summary(&self, path: &Path, set: &FingerprintSet) {
        log::info!(
            "[FEATURE] Extraction complete: {} ({}/3 fingerprints: [{}])",
            path.display(),
            set.present_count(),
            set.present_fields().join(", ")
        );
    }
}

fn joined<T>(label: &str, result: Result<Option<T>, tokio::task::JoinError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::error!("[FEATURE] {} extraction task failed: {}", label, e);
            None
        }
    }
}
