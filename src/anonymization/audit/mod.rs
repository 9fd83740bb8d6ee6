//! Audit logging module
//!
//! Provides structured audit logging for commits.

pub mod logger;

pub use logger::AuditLogger;
