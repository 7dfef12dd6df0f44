//! Logging utilities for the portal crates
//!
//! Provides the `Pretty` wrapper for dumping structured values into log lines
//! and a one-call tracing subscriber setup for binaries and tests.

use crate::error::{CommonError, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor configuration provides one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Wrapper for pretty-printing types in logs as YAML
///
/// ```ignore
/// use encoded_common::Pretty;
/// use tracing::debug;
///
/// debug!("Declared slots: {}", Pretty(&specs));
/// ```
///
/// Outputs YAML with a leading newline. Debug is used as a fallback if YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `Ok(false)` when
/// a subscriber was already installed, which is the normal case for a second
/// call from tests.
pub fn init_tracing(default_filter: &str) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| CommonError::InvalidLogFilter {
            filter: default_filter.to_string(),
            message: e.to_string(),
        })?,
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(filter = default_filter, "tracing subscriber installed");
    }
    Ok(installed)
}
