//! Deterministic blob hashing

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of `blob`.
pub fn digest(blob: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(blob);
    format!("{:x}", hasher.finalize())
}
