//! # ENCODE Portal Common
//!
//! Foundational pieces shared by every portal crate: the error severity
//! classification, error chain formatting, and logging helpers.
//!
//! ## Modules
//!
//! - [`error`] - Severity classification and error chain formatting
//! - [`logging`] - `Pretty` log wrapper and tracing subscriber setup

pub mod error;
pub mod logging;

// Re-export error types for convenience
pub use error::{CommonError, ErrorChain, ErrorChainExt, ErrorSeverity, Result, Severity};

// Re-export logging helpers for convenience
pub use logging::{init_tracing, Pretty, DEFAULT_LOG_FILTER};
