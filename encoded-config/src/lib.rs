//! ENCODE portal configuration using Figment
//!
//! Configuration is merged from, in increasing precedence:
//!
//! - compiled defaults,
//! - `~/.encoded/encoded.{toml,yaml,yml,json}`,
//! - `./.encoded/encoded.{toml,yaml,yml,json}`,
//! - `ENCODED_` environment variables, with `__` separating nested keys
//!   (`ENCODED_HTTP__TIMEOUT_SECS=10`).
//!
//! ```no_run
//! let config = encoded_config::load_configuration()?;
//! println!("timeout: {:?}", config.http.timeout());
//! # Ok::<(), encoded_config::ConfigError>(())
//! ```

pub mod discovery;
pub mod error;
pub mod provider;
pub mod types;

pub use discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery};
pub use error::ConfigError;
pub use provider::{ConfigProvider, ENV_PREFIX};
pub use types::{ColorSettings, HttpSettings, LoggingSettings, PortalConfig};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load configuration from all standard sources.
pub fn load_configuration() -> ConfigResult<PortalConfig> {
    ConfigProvider::new().load()
}
