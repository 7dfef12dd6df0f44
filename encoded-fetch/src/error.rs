//! Fetch errors and the payloads they turn into
//!
//! A failed fetch is never handed to view code as an `Err`. The coordinator
//! converts it with [`FetchError::to_payload`] and stores the payload as the
//! slot's value, so an error view can be picked by the view registry like any
//! other object.

use crate::types::ErrorPayload;
use encoded_common::{ErrorSeverity, Severity};
use encoded_config::ConfigError;
use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Everything that can go wrong between issuing a GET and parsing its body
#[derive(Debug, Error)]
pub enum FetchError {
    /// The slot URL could not be parsed or joined onto the base URL
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: u16,
        reason: Option<&'static str>,
    },

    /// Connection, timeout or body transfer failure
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body did not parse as the expected type
    #[error("Could not parse response from {url}: {message}")]
    Parse { url: String, message: String },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// HTTP settings were rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FetchError {
    /// HTTP status code, when the server sent one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Network { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short human-readable heading for an error view.
    pub fn title(&self) -> String {
        match self {
            FetchError::InvalidUrl { .. } => "Invalid URL".to_string(),
            FetchError::Status { status, reason, .. } => match reason {
                Some(reason) => format!("{status} {reason}"),
                None => format!("HTTP error {status}"),
            },
            FetchError::Network { source, .. } if source.is_timeout() => {
                "Request timed out".to_string()
            }
            FetchError::Network { .. } => "Network error".to_string(),
            FetchError::Parse { .. } => "Invalid response".to_string(),
            FetchError::ClientBuild(_) | FetchError::Config(_) => "Client error".to_string(),
        }
    }

    /// The uniform error value stored in place of a result.
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.title(), self.status_code(), Some(self.to_string()))
    }
}

impl Severity for FetchError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            FetchError::ClientBuild(_) | FetchError::Config(_) => ErrorSeverity::Critical,
            FetchError::Status { .. } | FetchError::Network { .. } | FetchError::Parse { .. } => {
                ErrorSeverity::Error
            }
            FetchError::InvalidUrl { .. } => ErrorSeverity::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ERROR_TYPES;
    use serde_json::json;

    #[test]
    fn test_status_error_payload() {
        let err = FetchError::Status {
            url: "https://www.encodeproject.org/files/ENCFF000XXX/".into(),
            status: 404,
            reason: Some("Not Found"),
        };
        let payload = err.to_payload();

        assert_eq!(payload.title, "404 Not Found");
        assert_eq!(payload.code, Some(404));
        assert_eq!(payload.types, ERROR_TYPES);
        assert_eq!(
            payload.to_value(),
            json!({
                "@type": ["AjaxError", "Error"],
                "status": "error",
                "code": 404,
                "title": "404 Not Found",
                "description": "HTTP 404 for https://www.encodeproject.org/files/ENCFF000XXX/",
            })
        );
    }

    #[test]
    fn test_parse_error_has_no_code() {
        let err = FetchError::Parse {
            url: "/search/".into(),
            message: "expected value at line 1 column 1".into(),
        };
        let value = err.to_payload().to_value();
        assert!(value.get("code").is_none());
        assert_eq!(value["title"], "Invalid response");
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_config_error_is_critical() {
        let err = FetchError::from(ConfigError::invalid_value("http.base_url", "bad"));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.status_code(), None);
    }
}
