//! Error types for the view registry

use encoded_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, ViewsError>;

/// Errors from building type hierarchies. Registration and lookup never fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewsError {
    /// A type is its own ancestor
    #[error("type hierarchy cycle through '{type_name}'")]
    CyclicHierarchy { type_name: String },

    /// A declared parent was never declared itself
    #[error("type '{type_name}' names undeclared parent '{parent}'")]
    UnknownParent { type_name: String, parent: String },
}

impl Severity for ViewsError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }
}
