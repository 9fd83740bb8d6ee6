//! Secret handling for encryption keys
//!
//! Keys supplied for the `encrypt` technique are wrapped in
//! [`secrecy::Secret`], so they are zeroized on drop, print as `[REDACTED]`
//! in Debug output and need an explicit `expose_secret()` to read.
//!
//! ```rust
//! use veil::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("correct horse battery staple".to_string());
//! assert_eq!(key.expose_secret().as_str(), "correct horse battery staple");
//! assert!(!format!("{key:?}").contains("horse"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String payload of a [`SecretString`]
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
// Plans written back to disk keep their keys; `veil init` never emits one.
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// The key text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for an empty or whitespace-only key
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Zeroizing, Debug-redacted string
pub type SecretString = Secret<SecretValue>;

/// Wraps a string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Wraps an optional string as an optional [`SecretString`]
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(secret_string)
}
