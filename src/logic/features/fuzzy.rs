//! Fuzzy Fingerprint (MinHash)
//!
//! The file is streamed in fixed-size chunks; every chunk is one token of a
//! MinHash signature with `num_perm` permutations.
//!
//! Permutation coefficients come from a seeded RNG so that signatures
//! computed by different agents are comparable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::types::FuzzyFingerprint;

/// 2^61 - 1
const MERSENNE_PRIME: u64 = (1 << 61) - 1;

/// Signature values live in 32-bit space
const MAX_HASH: u64 = (1 << 32) - 1;

pub const MINHASH_ALGORITHM: &str = "minhash";

/// Precomputed permutations, built once at startup
#[derive(Debug, Clone)]
pub struct MinHasher {
    permutations: Vec<(u64, u64)>,
}

impl MinHasher {
    pub fn new(num_perm: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let permutations = (0..num_perm)
            .map(|_| {
                (
                    rng.gen_range(1..MERSENNE_PRIME),
                    rng.gen_range(0..MERSENNE_PRIME),
                )
            })
            .collect();

        Self { permutations }
    }

    pub fn num_perm(&self) -> usize {
        self.permutations.len()
    }

    pub fn accumulator(&self) -> MinHashAccumulator<'_> {
        MinHashAccumulator {
            hasher: self,
            values: vec![MAX_HASH; self.permutations.len()],
            tokens: 0,
        }
    }

    /// Stream a file into a signature
    pub fn signature_of_file(&self, path: &Path, chunk_bytes: usize) -> io::Result<Option<Vec<u64>>> {
        let mut file = File::open(path)?;
        let mut acc = self.accumulator();
        let mut chunk = Vec::with_capacity(chunk_bytes);

        loop {
            chunk.clear();
            let n = (&mut file).take(chunk_bytes as u64).read_to_end(&mut chunk)?;
            if n == 0 {
                break;
            }
            acc.update(&chunk);
        }

        Ok(acc.finish())
    }
}

/// Running minimum per permutation
pub struct MinHashAccumulator<'a> {
    hasher: &'a MinHasher,
    values: Vec<u64>,
    tokens: u64,
}

impl MinHashAccumulator<'_> {
    pub fn update(&mut self, token: &[u8]) {
        let hv = crc32fast::hash(token) as u128;

        for (slot, &(a, b)) in self.values.iter_mut().zip(&self.hasher.permutations) {
            let permuted = ((a as u128 * hv + b as u128) % MERSENNE_PRIME as u128) as u64 & MAX_HASH;
            if permuted < *slot {
                *slot = permuted;
            }
        }
        self.tokens += 1;
    }

    /// `None` when nothing was fed (empty input has no meaningful signature)
    pub fn finish(self) -> Option<Vec<u64>> {
        if self.tokens == 0 {
            None
        } else {
            Some(self.values)
        }
    }
}

/// Extract the fuzzy fingerprint. `None` on empty file or I/O failure.
pub fn extract_fuzzy(hasher: &MinHasher, path: &Path, chunk_bytes: usize) -> Option<FuzzyFingerprint> {
    match hasher.signature_of_file(path, chunk_bytes.max(1)) {
        Ok(Some(signature)) => {
            log::debug!(
                "[FEATURE] Fuzzy signature computed: {} (num_perm={})",
                path.display(),
                hasher.num_perm()
            );
            Some(FuzzyFingerprint {
                algorithm: MINHASH_ALGORITHM.to_string(),
                signature,
                num_perm: hasher.num_perm(),
            })
        }
        Ok(None) => {
            log::warn!("[FEATURE] Fuzzy hash: empty file {}", path.display());
            None
        }
        Err(e) => {
            super::log_io_failure("Fuzzy hash", path, &e);
            None
        }
    }
}
