//! Error types shared across the ENCODE portal crates
//!
//! Each crate owns its own error enum; this module supplies the pieces they
//! have in common: a severity classification used to pick log levels, and a
//! formatter for walking `source()` chains.

use std::fmt;
use thiserror::Error as ThisError;

/// Severity levels for error classification
///
/// - **Warning**: the operation degraded (a sentinel or placeholder was used)
///   but produced a usable result.
/// - **Error**: the operation failed; the rest of the page keeps rendering.
/// - **Critical**: startup cannot continue (bad configuration, no HTTP client).
///
/// # Examples
///
/// ```rust
/// use encoded_common::ErrorSeverity;
///
/// let degraded = ErrorSeverity::Warning;
/// assert!(degraded < ErrorSeverity::Critical);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,
    /// Operation failed but the application can continue
    Error,
    /// Application cannot continue, requires immediate attention
    Critical,
}

impl ErrorSeverity {
    /// The tracing level errors of this severity should be logged at.
    pub fn level(self) -> tracing::Level {
        match self {
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Error | ErrorSeverity::Critical => tracing::Level::ERROR,
        }
    }
}

/// Trait for error types that have severity levels
///
/// All portal error types implement this so callers can classify failures
/// without matching on crate-specific variants.
///
/// # Example
///
/// ```rust
/// use encoded_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum MyError {
///     BadConfig,
///     MissingKey,
/// }
///
/// impl Severity for MyError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             MyError::BadConfig => ErrorSeverity::Critical,
///             MyError::MissingKey => ErrorSeverity::Warning,
///         }
///     }
/// }
///
/// assert_eq!(MyError::BadConfig.severity(), ErrorSeverity::Critical);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Errors raised by the shared infrastructure itself
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum CommonError {
    /// The log filter directive could not be parsed
    #[error("Invalid log filter '{filter}': {message}")]
    InvalidLogFilter {
        /// The directive that failed to parse
        filter: String,
        /// Parser message
        message: String,
    },
}

impl Severity for CommonError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CommonError::InvalidLogFilter { .. } => ErrorSeverity::Critical,
        }
    }
}

/// Error chain formatter for detailed error reporting
pub struct ErrorChain<'a>(&'a dyn std::error::Error);

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: {}", self.0)?;

        let mut current = self.0.source();
        let mut level = 1;

        while let Some(err) = current {
            writeln!(f, "{:indent$}Caused by: {}", "", err, indent = level * 2)?;
            current = err.source();
            level += 1;
        }

        Ok(())
    }
}

/// Extension trait for error types to format the full error chain
pub trait ErrorChainExt {
    /// Format the full error chain
    fn error_chain(&self) -> ErrorChain<'_>;
}

impl<E: std::error::Error> ErrorChainExt for E {
    fn error_chain(&self) -> ErrorChain<'_> {
        ErrorChain(self)
    }
}
