//! SHA-256 digests for uploaded documents

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of an in-memory document
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
