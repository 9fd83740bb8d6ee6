//! Domain models and types for Veil.
//!
//! The domain layer provides:
//! - **Dataset model** ([`Dataset`], [`Column`], [`ColumnType`], [`Row`])
//! - **Error types** ([`VeilError`], [`ConfigViolation`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible engine operations return [`Result<T, VeilError>`]:
//!
//! ```rust
//! use veil::domain::{Dataset, Result};
//!
//! fn load() -> Result<Dataset> {
//!     Dataset::from_json_str(r#"{"columns": [{"name": "id"}], "rows": []}"#)
//! }
//! # load().unwrap();
//! ```

pub mod dataset;
pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use dataset::{cell_text, Column, ColumnType, Dataset, Row};
pub use errors::{ConfigViolation, VeilError};
pub use result::Result;
