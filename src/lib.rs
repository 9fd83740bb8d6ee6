// Veil - PII classification and dataset anonymization
// Copyright (c) 2025 Veil Contributors
// Licensed under the MIT License

//! # Veil - PII classification and dataset anonymization
//!
//! Veil finds personal data in tabular datasets and replaces it using
//! per-column anonymization techniques chosen by an operator.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Classifying** columns as PII with a confidence score and detection method
//! - **Configuring** a technique per column (mask, hash, substitute, tokenize,
//!   encrypt, generalize, remove, redact)
//! - **Previewing** the result on a few rows without side effects
//! - **Committing** the whole dataset, optionally with a lookup table that maps
//!   anonymized values back to the originals
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`anonymization`] - Classifier, technique registry, transforms, preview, commit
//! - [`domain`] - Dataset model and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use veil::anonymization::{AnonymizationConfig, AnonymizationOptions, TechniqueId, VeilEngine};
//! use veil::config::VeilConfig;
//! use veil::domain::Dataset;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = VeilEngine::new(&VeilConfig::default())?;
//!     let dataset = Dataset::from_path("patients.json")?;
//!
//!     let report = engine.classify(&dataset)?;
//!     for column in report.classifications.iter().filter(|c| c.is_pii) {
//!         println!("{} looks like {}", column.column, column.pii_type);
//!     }
//!
//!     let plan = AnonymizationConfig::new("patient_id")
//!         .with_field("email", TechniqueId::Tokenize, AnonymizationOptions::default())
//!         .with_lookup_file("patients_lookup.csv");
//!     let outcome = engine.commit(&dataset, &plan)?;
//!
//!     println!("Anonymized {} rows", outcome.summary.rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Engine operations return [`domain::VeilError`]:
//!
//! ```rust
//! use veil::anonymization::technique::TechniqueRegistry;
//! use veil::domain::VeilError;
//!
//! let err = TechniqueRegistry::get("scramble").unwrap_err();
//! assert!(matches!(err, VeilError::UnknownTechnique(_)));
//! ```
//!
//! ## Logging
//!
//! Veil uses structured logging with the `tracing` crate. Cell values are
//! never logged; commit events carry ids and counts.

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
