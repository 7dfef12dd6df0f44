//! Configuration provider using Figment

use crate::discovery::{ConfigFile, ConfigFormat, FileDiscovery};
use crate::types::PortalConfig;
use crate::ConfigResult;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tracing::{debug, info, trace};

/// Prefix for environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "ENCODED_";

/// Loads `PortalConfig` from all sources.
///
/// No caching is performed; each `load` reads the sources fresh.
#[derive(Debug, Default, Clone)]
pub struct ConfigProvider {
    discovery: FileDiscovery,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that discovers files through `discovery` instead of the
    /// standard directories.
    pub fn with_discovery(discovery: FileDiscovery) -> Self {
        Self { discovery }
    }

    /// Load and validate the configuration.
    pub fn load(&self) -> ConfigResult<PortalConfig> {
        debug!("Loading portal configuration");

        let config: PortalConfig = self.build_figment().extract()?;
        config.validate()?;

        info!(
            timeout_secs = config.http.timeout_secs,
            base_url = config.http.base_url.as_deref().unwrap_or("<none>"),
            "Loaded portal configuration"
        );
        Ok(config)
    }

    /// Sources in precedence order, later ones overriding earlier ones:
    /// 1. compiled defaults
    /// 2. discovered configuration files (global, then project)
    /// 3. `ENCODED_` environment variables
    fn build_figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(PortalConfig::default()));

        for file in self.discovery.discover_all() {
            trace!("Merging config file: {}", file.path.display());
            figment = figment.merge(file_provider(&file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

fn file_provider(file: &ConfigFile) -> Figment {
    let path = &file.path;
    match file.format {
        ConfigFormat::Toml => Figment::from(Toml::file(path)),
        ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
        ConfigFormat::Json => Figment::from(Json::file(path)),
    }
}
