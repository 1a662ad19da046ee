//! Semantic Fingerprint
//!
//! Embeds a short text surrogate built from download metadata.
//! Does NOT read file content.
//!
//! The embedding model is a black box behind [`Embedder`]; the agent ships
//! [`HashingEmbedder`] as its local default.

use std::path::Path;
use thiserror::Error;

use super::types::{FileMetadata, SemanticFingerprint};

// ============================================================================
// EMBEDDER COLLABORATOR
// ============================================================================

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),
    #[error("embedding failed: {0}")]
    Failed(String),
    #[error("nothing to embed")]
    EmptyInput,
}

/// Text -> vector
pub trait Embedder: Send + Sync {
    fn model_id(&self) -> &str;
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Feature-hashing bag-of-words embedder.
///
/// Deterministic, dependency free and good enough for near-identical
/// metadata. Vectors are L2-normalized.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            model_id: format!("hashing-bow-{}", dimension.max(1)),
        }
    }
}

impl Embedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vector = vec![0.0f32; self.dimension];
        let mut tokens = 0usize;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let h = crc32fast::hash(token.as_bytes());
            let idx = (h as usize) % self.dimension;
            let sign = if h & 0x8000_0000 != 0 { -1.0 } else { 1.0 };
            vector[idx] += sign;
            tokens += 1;
        }

        if tokens == 0 {
            return Err(EmbedError::EmptyInput);
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Err(EmbedError::EmptyInput);
        }
        vector.iter_mut().for_each(|v| *v /= norm);

        Ok(vector)
    }
}

// ============================================================================
// TEXT SURROGATE
// ============================================================================

/// Build the text to embed from metadata + base filename.
/// `None` when there is no text material at all.
pub fn build_text_surrogate(path: &Path, metadata: Option<&FileMetadata>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(meta) = metadata {
        if let Some(filename) = &meta.filename {
            parts.push(filename.clone());
        }
        if let Some(mime) = &meta.mime_type {
            parts.push(format!("type: {}", mime));
        }
        if let Some(url) = &meta.source_url {
            parts.push(format!("url: {}", url));
        }
        if let Some(description) = &meta.description {
            parts.push(description.clone());
        }
    }

    if let Some(base) = path.file_name() {
        parts.push(base.to_string_lossy().to_string());
    }

    let text = parts.join(" ");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Extract the semantic fingerprint. `None` when no embedder, no text, or
/// the embedder fails.
pub fn extract_semantic(
    embedder: &dyn Embedder,
    path: &Path,
    metadata: Option<&FileMetadata>,
) -> Option<SemanticFingerprint> {
    let text = match build_text_surrogate(path, metadata) {
        Some(text) => text,
        None => {
            log::debug!("[FEATURE] Semantic: no metadata to embed");
            return None;
        }
    };

    match embedder.embed(&text) {
        Ok(vector) if !vector.is_empty() => {
            log::debug!(
                "[FEATURE] Semantic embedding computed: {} (dimension={})",
                path.display(),
                vector.len()
            );
            Some(SemanticFingerprint {
                dimension: vector.len(),
                vector,
                model_id: embedder.model_id().to_string(),
            })
        }
        Ok(_) => {
            log::warn!("[FEATURE] Semantic extraction returned an empty vector");
            None
        }
        Err(e) => {
            log::warn!("[FEATURE] Semantic extraction failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_surrogate_order() {
        let meta = FileMetadata {
            filename: Some("report.pdf".to_string()),
            mime_type: Some("application/pdf".to_string()),
            source_url: Some("https://example.com/report.pdf".to_string()),
            description: Some("Q3 numbers".to_string()),
        };
        let text = build_text_surrogate(Path::new("/tmp/dl/report.pdf"), Some(&meta)).unwrap();
        assert_eq!(
            text,
            "report.pdf type: application/pdf url: https://example.com/report.pdf Q3 numbers report.pdf"
        );
    }

    #[test]
    fn test_surrogate_without_material() {
        assert!(build_text_surrogate(&PathBuf::new(), None).is_none());
        let blank = FileMetadata {
            description: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(build_text_surrogate(&PathBuf::new(), Some(&blank)).is_none());
    }

    #[test]
    fn test_hashing_embedder_normalized_and_deterministic() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed("Quarterly Report final").unwrap();
        let b = embedder.embed("quarterly report FINAL").unwrap();

        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert_eq!(embedder.model_id(), "hashing-bow-64");
    }

    #[test]
    fn test_hashing_embedder_rejects_empty_text() {
        let embedder = HashingEmbedder::new(16);
        assert!(matches!(embedder.embed(" -- "), Err(EmbedError::EmptyInput)));
    }

    struct BrokenEmbedder;

    impl Embedder for BrokenEmbedder {
        fn model_id(&self) -> &str {
            "broken"
        }
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Err(EmbedError::Unavailable("model not installed".to_string()))
        }
    }

    #[test]
    fn test_embedder_failure_yields_none() {
        let fp = extract_semantic(&BrokenEmbedder, Path::new("/tmp/a.txt"), None);
        assert!(fp.is_none());
    }

    #[test]
    fn test_extract_semantic_wraps_vector() {
        let embedder = HashingEmbedder::new(32);
        let fp = extract_semantic(&embedder, Path::new("/tmp/secret-plan.docx"), None).unwrap();
        assert_eq!(fp.dimension, 32);
        assert_eq!(fp.vector.len(), 32);
        assert_eq!(fp.model_id, "hashing-bow-32");
    }
}
