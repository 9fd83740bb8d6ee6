//! Encryption transformer
//!
//! AES-256-GCM under a key derived as SHA-256 of the operator key. The nonce is
//! derived from (key, field, value) so re-running a commit reproduces the same
//! ciphertext. Output is `enc:` followed by base64(nonce ‖ ciphertext).

use super::{CellInput, Transformer};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

/// Prefix marking encrypted cells
pub const CIPHERTEXT_PREFIX: &str = "enc:";
const NONCE_LEN: usize = 12;

/// Keyed symmetric encryption
pub struct Encryption;

impl Transformer for Encryption {
    fn apply(&self, input: &CellInput<'_>) -> Result<String, String> {
        let key = input
            .options
            .encryption_key
            .as_ref()
            .map(|k| k.expose_secret().as_str().to_string())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| "encryption key is missing".to_string())?;
        encrypt(input.value, &key, input.context.field)
    }
}

fn cipher(key: &str) -> Result<Aes256Gcm, String> {
    let key = Sha256::digest(key.as_bytes());
    Aes256Gcm::new_from_slice(&key).map_err(|e| e.to_string())
}

fn nonce_for(key: &str, field: &str, value: &str) -> [u8; NONCE_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(b"veil-nonce");
    for part in [key, field, value] {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&digest[..NONCE_LEN]);
    nonce
}

/// Encrypts a value for a field
pub fn encrypt(value: &str, key: &str, field: &str) -> Result<String, String> {
    let nonce_bytes = nonce_for(key, field, value);
    let ciphertext = cipher(key)?
        .encrypt(Nonce::from_slice(&nonce_bytes), value.as_bytes())
        .map_err(|e| format!("encryption failed: {e}"))?;

    let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    payload.extend_from_slice(&nonce_bytes);
    payload.extend_from_slice(&ciphertext);
    Ok(format!("{CIPHERTEXT_PREFIX}{}", STANDARD.encode(payload)))
}

/// Recovers the original value from [`encrypt`] output
///
/// ```
/// use veil::anonymization::transform::encryption::{decrypt, encrypt};
///
/// let sealed = encrypt("123-45-6789", "operator key", "ssn").unwrap();
/// assert_eq!(decrypt(&sealed, "operator key").unwrap(), "123-45-6789");
/// assert!(decrypt(&sealed, "wrong key").is_err());
/// ```
pub fn decrypt(ciphertext: &str, key: &str) -> Result<String, String> {
    let encoded = ciphertext
        .strip_prefix(CIPHERTEXT_PREFIX)
        .ok_or_else(|| format!("ciphertext must start with '{CIPHERTEXT_PREFIX}'"))?;
    let payload = STANDARD
        .decode(encoded)
        .map_err(|e| format!("invalid base64: {e}"))?;
    if payload.len() <= NONCE_LEN {
        return Err("ciphertext is too short".to_string());
    }
    let (nonce, sealed) = payload.split_at(NONCE_LEN);
    let plaintext = cipher(key)?
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| "decryption failed: wrong key or corrupted ciphertext".to_string())?;
    String::from_utf8(plaintext).map_err(|e| format!("decrypted value is not UTF-8: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let sealed = encrypt("jane@example.com", "k3y", "email").unwrap();
        assert!(sealed.starts_with(CIPHERTEXT_PREFIX));
        assert!(!sealed.contains("jane"));
        assert_eq!(decrypt(&sealed, "k3y").unwrap(), "jane@example.com");
    }

    #[test]
    fn test_deterministic_per_field() {
        let a = encrypt("x", "k", "email").unwrap();
        assert_eq!(a, encrypt("x", "k", "email").unwrap());
        assert_ne!(a, encrypt("x", "k", "phone").unwrap());
        assert_ne!(a, encrypt("x", "other", "email").unwrap());
    }

    #[test]
    fn test_decrypt_rejects_garbage() {
        assert!(decrypt("plain", "k").is_err());
        assert!(decrypt("enc:!!!", "k").is_err());
        assert!(decrypt("enc:AAAA", "k").is_err());
        let sealed = encrypt("x", "k", "f").unwrap();
        assert!(decrypt(&sealed, "not-k").is_err());
    }
}
