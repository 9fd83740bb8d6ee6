//! PII classification and anonymization for tabular datasets
//!
//! # Architecture
//!
//! The workflow runs in three steps over an in-memory [`Dataset`](crate::domain::Dataset):
//! - **Classify**: detectors score every column and flag likely PII
//! - **Preview**: the chosen techniques run on a few rows, read-only
//! - **Commit**: every row is anonymized, optionally with a lookup table
//!   mapping original values to anonymized ones
//!
//! Techniques come from a fixed catalogue ([`technique::TechniqueRegistry`]);
//! per-field choices live in an [`AnonymizationConfig`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use veil::anonymization::VeilEngine;
//! use veil::config::VeilConfig;
//!
//! let engine = VeilEngine::new(&VeilConfig::default())?;
//! let report = engine.classify(&dataset)?;
//! let outcome = engine.commit(&dataset, &config)?;
//! ```

pub mod audit;
pub mod classifier;
pub mod commit;
pub mod config;
pub mod detector;
pub mod engine;
pub mod lookup;
pub mod models;
pub mod preview;
pub mod technique;
pub mod transform;

// Re-export main types
pub use classifier::PiiClassifier;
pub use commit::{AnonymizedDataset, CommitOutcome, CommitService, CommitSummary};
pub use config::{AnonymizationConfig, AnonymizationOptions, ConfigBuilder, FieldTechnique};
pub use engine::VeilEngine;
pub use lookup::{LookupRecord, LookupTable};
pub use models::{ClassificationReport, PiiClassification, PiiType};
pub use preview::{PreviewResult, PreviewService};
pub use technique::{Technique, TechniqueCategory, TechniqueId, TechniqueRegistry};
