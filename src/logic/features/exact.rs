//! Exact Fingerprint
//!
//! SHA-256 of the first N bytes of the file (partial hash).

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::types::{ExactFingerprint, HashAlgorithm};

/// Extract the exact fingerprint. `None` on empty file or I/O failure.
pub fn extract_exact(path: &Path, partial_hash_bytes: usize) -> Option<ExactFingerprint> {
    match hash_prefix(path, partial_hash_bytes) {
        Ok(Some(fingerprint)) => {
            log::debug!(
                "[FEATURE] Exact hash computed: {} ({} bytes, hash={}...)",
                path.display(),
                fingerprint.bytes_read,
                &fingerprint.digest[..8]
            );
            Some(fingerprint)
        }
        Ok(None) => {
            log::warn!("[FEATURE] Exact hash: empty file {}", path.display());
            None
        }
        Err(e) => {
            super::log_io_failure("Exact hash", path, &e);
            None
        }
    }
}

fn hash_prefix(path: &Path, limit: usize) -> io::Result<Option<ExactFingerprint>> {
    let file = File::open(path)?;
    let mut reader = file.take(limit as u64);
    let mut hasher = Sha256::new();
    let bytes_read = io::copy(&mut reader, &mut hasher)?;

    if bytes_read == 0 {
        return Ok(None);
    }

    Ok(Some(ExactFingerprint {
        algorithm: HashAlgorithm::Sha256,
        digest: hex::encode(hasher.finalize()),
        bytes_read,
    }))
}
