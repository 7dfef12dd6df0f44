//! Error types for color parsing

use encoded_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for color operations
pub type Result<T> = std::result::Result<T, ColorError>;

/// Errors from the fallible color constructors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    /// Not a `#RRGGBB` string
    #[error("invalid hex color '{value}': expected #RRGGBB")]
    InvalidHex { value: String },

    /// A palette must hold at least one color
    #[error("palette must contain at least one color")]
    EmptyPalette,
}

impl Severity for ColorError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ColorError::InvalidHex { .. } => ErrorSeverity::Warning,
            ColorError::EmptyPalette => ErrorSeverity::Critical,
        }
    }
}
