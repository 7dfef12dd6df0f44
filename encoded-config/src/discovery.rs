//! Configuration file discovery
//!
//! Looks for `encoded.{toml,yaml,yml,json}` in the global (`~/.encoded/`) and
//! project (`./.encoded/`) directories. Project files override global ones.

use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Directory name searched under the home and current directories
pub const CONFIG_DIR_NAME: &str = ".encoded";

const CONFIG_FILE_NAMES: [&str; 4] = [
    "encoded.toml",
    "encoded.yaml",
    "encoded.yml",
    "encoded.json",
];

/// A discovered configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Full path to the configuration file
    pub path: PathBuf,
    /// Detected format of the file
    pub format: ConfigFormat,
    /// Where the file was found
    pub scope: ConfigScope,
}

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration scope indicating where the file was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigScope {
    /// `~/.encoded/`
    Global,
    /// `./.encoded/`
    Project,
}

/// File discovery service for finding configuration files
#[derive(Debug, Default, Clone)]
pub struct FileDiscovery {
    project_dir: Option<PathBuf>,
    global_dir: Option<PathBuf>,
}

impl FileDiscovery {
    /// Discovery that resolves the standard directories at discovery time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovery rooted at explicit directories instead of cwd and home.
    pub fn with_directories(project_dir: Option<PathBuf>, global_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            global_dir,
        }
    }

    /// Discover all configuration files, lowest precedence first.
    pub fn discover_all(&self) -> Vec<ConfigFile> {
        let project_dir = self.project_dir.clone().or_else(Self::resolve_project_dir);
        let global_dir = self.global_dir.clone().or_else(Self::resolve_global_dir);

        let mut files = Vec::new();
        if let Some(ref dir) = global_dir {
            files.extend(search_directory(dir, ConfigScope::Global));
        }
        if let Some(ref dir) = project_dir {
            files.extend(search_directory(dir, ConfigScope::Project));
        }
        files.sort_by_key(|f| f.scope);

        debug!("Discovered {} configuration files", files.len());
        for file in &files {
            trace!("Found config: {} ({:?})", file.path.display(), file.format);
        }
        files
    }

    fn resolve_project_dir() -> Option<PathBuf> {
        let dir = std::env::current_dir().ok()?.join(CONFIG_DIR_NAME);
        dir.is_dir().then_some(dir)
    }

    fn resolve_global_dir() -> Option<PathBuf> {
        let dir = dirs::home_dir()?.join(CONFIG_DIR_NAME);
        dir.is_dir().then_some(dir)
    }
}

fn search_directory(dir: &Path, scope: ConfigScope) -> Vec<ConfigFile> {
    if !dir.exists() {
        debug!("Directory does not exist: {}", dir.display());
        return Vec::new();
    }
    if !dir.is_dir() {
        warn!("Path exists but is not a directory: {}", dir.display());
        return Vec::new();
    }

    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .filter(|candidate| candidate.is_file())
        .filter_map(|path| {
            let format = ConfigFormat::from_extension(path.extension()?.to_str()?)?;
            Some(ConfigFile {
                path,
                format,
                scope,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("YML"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_discover_orders_global_before_project() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(project.path().join("encoded.toml"), "").unwrap();
        fs::write(global.path().join("encoded.yaml"), "").unwrap();

        let discovery = FileDiscovery::with_directories(
            Some(project.path().to_path_buf()),
            Some(global.path().to_path_buf()),
        );
        let files = discovery.discover_all();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].scope, ConfigScope::Global);
        assert_eq!(files[0].format, ConfigFormat::Yaml);
        assert_eq!(files[1].scope, ConfigScope::Project);
        assert_eq!(files[1].format, ConfigFormat::Toml);
    }

    #[test]
    fn test_discover_ignores_unrelated_files() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("sah.toml"), "").unwrap();
        fs::write(project.path().join("encoded.txt"), "").unwrap();

        let discovery = FileDiscovery::with_directories(
            Some(project.path().to_path_buf()),
            Some(project.path().join("missing")),
        );
        assert!(discovery.discover_all().is_empty());
    }
}
