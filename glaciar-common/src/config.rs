//! Configuration loading and root folder resolution
//!
//! Settings come from an optional TOML bootstrap file. A missing file is
//! not an error: every key has a default. The root folder (which holds
//! the database) is resolved separately so that it can be overridden from
//! the command line or the environment.

use crate::model::DEFAULT_MONTO_MAX;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "GLACIAR_CONFIG";

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV_VAR: &str = "GLACIAR_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "glaciar.db";

/// TOML bootstrap configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Inclusive ceiling for project amounts
    #[serde(default = "default_monto_max")]
    pub monto_max: f64,

    /// Idle lifetime of a login session
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u64,

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

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            host: default_host(),
            port: default_port(),
            monto_max: default_monto_max(),
            session_ttl_minutes: default_session_ttl_minutes(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_monto_max() -> f64 {
    DEFAULT_MONTO_MAX
}

fn default_session_ttl_minutes() -> u64 {
    480
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.check()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    fn check(&self) -> Result<()> {
        if !(self.monto_max.is_finite() && self.monto_max > 0.0) {
            return Err(Error::Config(format!(
                "monto_max must be a positive number, got {}",
                self.monto_max
            )));
        }
        if self.session_ttl_minutes == 0 {
            return Err(Error::Config("session_ttl_minutes must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Load the bootstrap configuration
///
/// Priority: explicit `cli_path`, then [`CONFIG_ENV_VAR`], then the user
/// config file. An explicitly named file must exist and parse; the user
/// file is optional and falls back to defaults with a warning when broken.
pub fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = cli_path {
        info!("Loading configuration from {}", path.display());
        return TomlConfig::from_file(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        info!("Loading configuration from {} ({})", path.display(), CONFIG_ENV_VAR);
        return TomlConfig::from_file(&path);
    }

    match default_config_path() {
        Some(path) if path.exists() => match TomlConfig::from_file(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("{} - using default configuration", e);
                Ok(TomlConfig::default())
            }
        },
        _ => {
            info!("No configuration file found - using defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// `~/.config/glaciar/config.toml` (platform equivalent elsewhere)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("glaciar").join("config.toml"))
}

/// Root folder resolution, in priority order:
/// 1. Command-line argument
/// 2. [`ROOT_FOLDER_ENV_VAR`]
/// 3. `root_folder` from the TOML config
/// 4. OS-dependent default
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/glaciar
        dirs::data_local_dir()
            .map(|d| d.join("glaciar"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/glaciar"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("glaciar"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/glaciar"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("glaciar"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\glaciar"))
    } else {
        PathBuf::from("./glaciar_data")
    }
}

/// Database file inside `root_folder`
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}
