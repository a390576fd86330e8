//! Cache key derivation.

use sha2::{Digest, Sha256};

/// Derive the cache key for a piece of text.
///
/// The text is trimmed and lowercased before hashing, so inputs that differ
/// only in surrounding whitespace or case share one entry.
pub fn cache_key(text: &str) -> String {
    let normalized = text.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    hex::encode(digest)
}
