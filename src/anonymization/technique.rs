//! Technique registry
//!
//! Static catalog of the anonymization techniques Veil offers and the
//! properties each one declares. The table is fixed at compile time; there is
//! no runtime mutation API.
//!
//! # Examples
//!
//! ```
//! use veil::anonymization::technique::{TechniqueCategory, TechniqueRegistry};
//!
//! let encrypt = TechniqueRegistry::get("encrypt").unwrap();
//! assert_eq!(encrypt.category, TechniqueCategory::Encryption);
//! assert!(encrypt.reversible);
//! assert!(TechniqueRegistry::get("scramble").is_err());
//! ```

use crate::domain::{Result, VeilError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a registered technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueId {
    /// Partial masking with `*`
    Mask,
    /// Truncated SHA-256 digest
    Hash,
    /// Realistic fake value for the column's PII type
    Substitute,
    /// `TYPE_xxxxxxxx` pseudonym token
    Tokenize,
    /// AES-256-GCM ciphertext
    Encrypt,
    /// Range or period bucket
    Generalize,
    /// Fixed `[REMOVED]` sentinel
    Remove,
    /// `[TYPE]` marker
    Redact,
}

impl TechniqueId {
    /// Registry key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mask => "mask",
            Self::Hash => "hash",
            Self::Substitute => "substitute",
            Self::Tokenize => "tokenize",
            Self::Encrypt => "encrypt",
            Self::Generalize => "generalize",
            Self::Remove => "remove",
            Self::Redact => "redact",
        }
    }
}

impl fmt::Display for TechniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TechniqueId {
    type Err = VeilError;

    fn from_str(s: &str) -> Result<Self> {
        TechniqueRegistry::get(s).map(|t| t.id)
    }
}

/// Family a technique belongs to; each family has one transformer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueCategory {
    /// Character masking
    Masking,
    /// One-way digests
    Hashing,
    /// Fake or pseudonymous replacement values
    Substitution,
    /// Keyed symmetric encryption
    Encryption,
    /// Lossy coarsening into ranges
    Generalization,
    /// Value dropped in favour of a sentinel
    Removal,
}

impl fmt::Display for TechniqueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Masking => "masking",
            Self::Hashing => "hashing",
            Self::Substitution => "substitution",
            Self::Encryption => "encryption",
            Self::Generalization => "generalization",
            Self::Removal => "removal",
        };
        f.write_str(s)
    }
}

/// Declared properties of a technique
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Technique {
    /// Registry key
    pub id: TechniqueId,
    /// Technique family
    pub category: TechniqueCategory,
    /// Human-readable name
    pub name: &'static str,
    /// One-line description for operators
    pub description: &'static str,
    /// Output keeps the shape of the input (e.g. still looks like an email)
    pub preserves_format: bool,
    /// Output has the same length as the input
    pub preserves_length: bool,
    /// The original can be recovered, by key or by lookup table
    pub reversible: bool,
    /// The output alone can be inverted (with the key), no lookup table needed
    pub intrinsically_reversible: bool,
    /// Same input always produces the same output without a row seed
    pub deterministic: bool,
}

static TECHNIQUES: [Technique; 8] = [
    Technique {
        id: TechniqueId::Mask,
        category: TechniqueCategory::Masking,
        name: "Mask",
        description: "Replace interior characters with '*', keeping two characters at each end",
        preserves_format: false,
        preserves_length: false,
        reversible: false,
        intrinsically_reversible: false,
        deterministic: true,
    },
    Technique {
        id: TechniqueId::Hash,
        category: TechniqueCategory::Hashing,
        name: "Hash",
        description: "One-way SHA-256 digest, truncated to 16 hex characters",
        preserves_format: false,
        preserves_length: false,
        reversible: false,
        intrinsically_reversible: false,
        deterministic: true,
    },
    Technique {
        id: TechniqueId::Substitute,
        category: TechniqueCategory::Substitution,
        name: "Substitute",
        description: "Realistic fake value of the same kind (email, phone, name, ...)",
        preserves_format: true,
        preserves_length: false,
        reversible: true,
        intrinsically_reversible: false,
        deterministic: false,
    },
    Technique {
        id: TechniqueId::Tokenize,
        category: TechniqueCategory::Substitution,
        name: "Tokenize",
        description: "Pseudonymous TYPE_xxxxxxxx token",
        preserves_format: false,
        preserves_length: false,
        reversible: true,
        intrinsically_reversible: false,
        deterministic: false,
    },
    Technique {
        id: TechniqueId::Encrypt,
        category: TechniqueCategory::Encryption,
        name: "Encrypt",
        description: "AES-256-GCM ciphertext, decryptable with the configured key",
        preserves_format: false,
        preserves_length: false,
        reversible: true,
        intrinsically_reversible: true,
        deterministic: true,
    },
    Technique {
        id: TechniqueId::Generalize,
        category: TechniqueCategory::Generalization,
        name: "Generalize",
        description: "Coarsen numbers into ranges and dates into quarters, years or decades",
        preserves_format: false,
        preserves_length: false,
        reversible: false,
        intrinsically_reversible: false,
        deterministic: true,
    },
    Technique {
        id: TechniqueId::Remove,
        category: TechniqueCategory::Removal,
        name: "Remove",
        description: "Replace the value with [REMOVED]",
        preserves_format: false,
        preserves_length: false,
        reversible: false,
        intrinsically_reversible: false,
        deterministic: true,
    },
    Technique {
        id: TechniqueId::Redact,
        category: TechniqueCategory::Removal,
        name: "Redact",
        description: "Replace the value with a [TYPE] marker such as [EMAIL]",
        preserves_format: false,
        preserves_length: false,
        reversible: false,
        intrinsically_reversible: false,
        deterministic: true,
    },
];

/// Read-only access to the technique table
pub struct TechniqueRegistry;

impl TechniqueRegistry {
    /// Looks up a technique by registry key
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::UnknownTechnique`] if no technique has this id.
    pub fn get(id: &str) -> Result<&'static Technique> {
        let key = id.trim().to_lowercase();
        TECHNIQUES
            .iter()
            .find(|t| t.id.as_str() == key)
            .ok_or_else(|| VeilError::UnknownTechnique(id.to_string()))
    }

    /// Properties of a known technique
    pub fn technique(id: TechniqueId) -> &'static Technique {
        // The table holds one entry per variant, in declaration order.
        &TECHNIQUES[id as usize]
    }

    /// All registered techniques
    pub fn list() -> &'static [Technique] {
        &TECHNIQUES
    }

    /// Techniques in one category
    pub fn by_category(category: TechniqueCategory) -> Vec<&'static Technique> {
        TECHNIQUES.iter().filter(|t| t.category == category).collect()
    }
}
