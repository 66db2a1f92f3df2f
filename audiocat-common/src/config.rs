//! Bootstrap configuration and root folder resolution
//!
//! Settings are resolved once at startup, in priority order:
//! 1. Command-line arguments (which clap also fills from environment variables)
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing or unreadable TOML file never stops startup; it is logged and
//! the remaining sources are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default upload body limit (256 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// What happens when an upload's sanitized name is already catalogued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Replace both the stored file and the catalog record (last write wins)
    #[default]
    Overwrite,
    /// Refuse the upload, leaving the existing file and record untouched
    Reject,
}

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Directory holding uploaded files (default: `<root>/uploads`)
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// SQLite catalog file (default: `<root>/audiocat.db`)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub bind: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    #[serde(default)]
    pub duplicate_policy: Option<DuplicatePolicy>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the explicit file if given, else the platform config file if one
    /// exists. Falls back to an empty config on any failure; the returned
    /// status says which case applied so it can be logged once tracing runs.
    pub fn load_or_default(explicit: Option<&Path>) -> (Self, ConfigFileStatus) {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_file() {
                Some(path) => path,
                None => return (Self::default(), ConfigFileStatus::Absent),
            },
        };

        match Self::load(&path) {
            Ok(config) => (config, ConfigFileStatus::Loaded(path)),
            Err(e) => (
                Self::default(),
                ConfigFileStatus::Ignored {
                    path,
                    reason: e.to_string(),
                },
            ),
        }
    }
}

/// Outcome of looking for a TOML config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFileStatus {
    Loaded(PathBuf),
    /// No file given and none found at the platform locations
    Absent,
    /// File given or found but unreadable or invalid
    Ignored { path: PathBuf, reason: String },
}

impl ConfigFileStatus {
    pub fn log(&self) {
        match self {
            ConfigFileStatus::Loaded(path) => info!("Loaded config file: {}", path.display()),
            ConfigFileStatus::Absent => info!("No config file found, using defaults"),
            ConfigFileStatus::Ignored { path, reason } => {
                warn!("Ignoring config file {}: {}", path.display(), reason)
            }
        }
    }
}

/// First existing config file among `<user config dir>/audiocat/config.toml`
/// and `/etc/audiocat/config.toml`
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("audiocat").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/audiocat/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Values used when neither the command line nor the TOML file sets a key
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub bind: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("audiocat"))
            .unwrap_or_else(|| PathBuf::from("./audiocat_data"));

        Self {
            root_folder,
            bind: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Values given on the command line or through their environment variables
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub storage_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub storage_dir: PathBuf,
    pub database_path: PathBuf,
    pub bind: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub duplicate_policy: DuplicatePolicy,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge command line, TOML and compiled defaults
    pub fn resolve(cli: CliOverrides, file: TomlConfig, defaults: CompiledDefaults) -> Self {
        let root_folder = cli
            .root_folder
            .or(file.root_folder)
            .unwrap_or(defaults.root_folder);

        let storage_dir = cli
            .storage_dir
            .or(file.storage_dir)
            .unwrap_or_else(|| root_folder.join("uploads"));

        let database_path = cli
            .database_path
            .or(file.database_path)
            .unwrap_or_else(|| root_folder.join("audiocat.db"));

        Self {
            storage_dir,
            database_path,
            bind: cli.bind.or(file.bind).unwrap_or(defaults.bind),
            port: cli.port.or(file.port).unwrap_or(defaults.port),
            max_upload_bytes: file.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
            duplicate_policy: file.duplicate_policy.unwrap_or_default(),
            log_level: cli.log_level.unwrap_or(file.logging.level),
            root_folder,
        }
    }

    /// Address the HTTP listener binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", self.bind, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Create the root folder and storage directory if missing
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.root_folder, &self.storage_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
                info!("Created directory: {}", dir.display());
            }
        }
        Ok(())
    }
}
