//! Hashing transformer

use super::{CellInput, Transformer};
use sha2::{Digest, Sha256};

/// Hex characters kept from the digest
pub const HASH_DISPLAY_LEN: usize = 16;

/// Truncated SHA-256 digest
pub struct Hashing;

impl Transformer for Hashing {
    fn apply(&self, input: &CellInput<'_>) -> Result<String, String> {
        Ok(hash(input.value))
    }
}

/// First 16 hex characters of the SHA-256 digest of `value`
pub fn hash(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(HASH_DISPLAY_LEN);
    hex
}
