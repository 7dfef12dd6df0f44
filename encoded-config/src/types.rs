//! Typed configuration values

use crate::error::ConfigError;
use crate::ConfigResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const MIN_TIMEOUT_SECONDS: u64 = 1;
const MAX_TIMEOUT_SECONDS: u64 = 120;

/// Complete portal configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// HTTP transport used by the fetch coordinator
    pub http: HttpSettings,
    /// Color assignment settings
    pub colors: ColorSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl PortalConfig {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        self.http.validate()?;
        self.colors.validate()?;
        Ok(())
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Base URL that relative request paths are joined onto
    pub base_url: Option<String>,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum redirects followed per request
    pub max_redirects: u32,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            max_redirects: 10,
            user_agent: concat!("encoded-portal/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpSettings {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parsed base URL, if one is configured.
    pub fn base_url(&self) -> ConfigResult<Option<Url>> {
        let Some(raw) = self.base_url.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(raw)
            .map_err(|e| ConfigError::invalid_value("http.base_url", e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(Some(url)),
            scheme => Err(ConfigError::invalid_value(
                "http.base_url",
                format!("unsupported scheme '{scheme}'"),
            )),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(MIN_TIMEOUT_SECONDS..=MAX_TIMEOUT_SECONDS).contains(&self.timeout_secs) {
            return Err(ConfigError::invalid_value(
                "http.timeout_secs",
                format!(
                    "must be between {MIN_TIMEOUT_SECONDS} and {MAX_TIMEOUT_SECONDS} seconds"
                ),
            ));
        }
        self.base_url()?;
        Ok(())
    }
}

/// Color service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    /// Number of hex→HSV conversions kept in the memo cache
    pub hsv_cache_capacity: usize,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            hsv_cache_capacity: 256,
        }
    }
}

impl ColorSettings {
    fn validate(&self) -> ConfigResult<()> {
        if self.hsv_cache_capacity == 0 {
            return Err(ConfigError::invalid_value(
                "colors.hsv_cache_capacity",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive; `RUST_LOG` overrides it
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: encoded_common::DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl LoggingSettings {
    /// Install the global tracing subscriber with this filter as the default.
    /// Returns whether this call installed it.
    pub fn init(&self) -> ConfigResult<bool> {
        encoded_common::init_tracing(&self.filter)
            .map_err(|e| ConfigError::invalid_value("logging.filter", e.to_string()))
    }
}
