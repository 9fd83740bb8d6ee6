//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod classify;
pub mod commit;
pub mod init;
pub mod preview;
pub mod techniques;
pub mod validate;
