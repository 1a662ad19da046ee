//! Reference Pool
//!
//! Known sensitive samples the agent compares against locally.
//! Stored as a JSON array of `ReferenceSample`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AgentError, AgentResult};
use crate::logic::features::FingerprintSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSample {
    pub reference_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_signature: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl ReferenceSample {
    /// Build a reference from fingerprints computed by this agent
    pub fn from_fingerprints(reference_id: impl Into<String>, set: &FingerprintSet) -> Self {
        Self {
            reference_id: reference_id.into(),
            metadata: None,
            exact_digest: set.exact.as_ref().map(|e| e.digest.clone()),
            fuzzy_signature: set.fuzzy.as_ref().map(|f| f.signature.clone()),
            embedding: set.semantic.as_ref().map(|s| s.vector.clone()),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferencePool {
    samples: Vec<ReferenceSample>,
}

impl ReferencePool {
    pub fn new(samples: Vec<ReferenceSample>) -> Self {
        Self { samples }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[ReferenceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, sample: ReferenceSample) {
        self.samples.push(sample);
    }

    pub fn load(path: &Path) -> AgentResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AgentError::ReferencePool {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let pool: ReferencePool =
            serde_json::from_str(&content).map_err(|e| AgentError::ReferencePool {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        log::info!(
            "[LOOKUP] Loaded {} reference samples from {}",
            pool.len(),
            path.display()
        );
        Ok(pool)
    }

    /// Missing file = empty pool. A present but broken file is an error.
    pub fn load_or_empty(path: &Path) -> AgentResult<Self> {
        if !path.exists() {
            log::info!(
                "[LOOKUP] No reference pool at {}, local matching has nothing to compare",
                path.display()
            );
            return Ok(Self::empty());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> AgentResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| AgentError::ReferencePool {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pool").join("references.json");

        let mut pool = ReferencePool::empty();
        pool.push(ReferenceSample {
            reference_id: "ref-1".to_string(),
            metadata: Some(serde_json::json!({"label": "payroll"})),
            exact_digest: Some("ab".repeat(32)),
            fuzzy_signature: None,
            embedding: None,
        });
        pool.save(&path).unwrap();

        let loaded = ReferencePool::load(&path).unwrap();
        assert_eq!(loaded, pool);
    }

    #[test]
    fn test_missing_file_is_empty_pool() {
        let dir = TempDir::new().unwrap();
        let pool = ReferencePool::load_or_empty(&dir.path().join("none.json")).unwrap();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_broken_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("references.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ReferencePool::load_or_empty(&path).unwrap_err();
        assert!(matches!(err, AgentError::ReferencePool { .. }));
    }
}
