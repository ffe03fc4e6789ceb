//! Configuration module for the offload tool
//!
//! Supports loading configuration from a TOML file.
//! Configuration is stored in a standard location:
//! - Windows: %APPDATA%\dcim-offload\config.toml
//! - Linux/macOS: ~/.config/dcim-offload/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application name used for the config directory
const APP_NAME: &str = "dcim-offload";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default copy chunk size: 1 MiB
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Errors from loading or writing the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the configuration directory")]
    ConfigDirNotFound,

    #[error("Failed to read config file '{0}': {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to write config file '{0}': {1}")]
    WriteError(PathBuf, String),

    #[error("Failed to parse config file '{0}': {1}")]
    ParseError(PathBuf, String),
}

/// Get the standard configuration directory for the application
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Get the standard configuration file path
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extension sets for media classification
    pub extensions: ExtensionsConfig,

    /// Copy behavior
    pub copy: CopyConfig,

    /// Volume discovery
    pub volumes: VolumesConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// External-application integration
    pub integration: IntegrationConfig,
}

/// Extension sets used by the classifier.
///
/// Matching is case-insensitive; the sets are conventionally written
/// uppercase the way cameras name their files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Plain still-image extensions
    pub jpeg: Vec<String>,

    /// Camera raw still-image extensions
    pub raw: Vec<String>,

    /// Motion clip extensions
    pub video: Vec<String>,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            jpeg: vec!["JPG".to_string()],
            raw: vec!["NEF".to_string()],
            video: vec!["MOV".to_string(), "MP4".to_string(), "NEV".to_string()],
        }
    }
}

/// Copy behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyConfig {
    /// Chunk size in bytes for the copy loop
    pub chunk_size: usize,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Volume discovery configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumesConfig {
    /// Directories whose children are candidate volume roots.
    /// Empty means the platform default (/Volumes, /media/..., drive letters).
    pub search_roots: Vec<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// External-application integration configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    /// Photo editor launched by --automate. Empty uses the system opener.
    pub editor_app: String,

    /// Command invoked by --resolve with the destination directory appended.
    /// Empty disables media-pool import.
    pub importer_command: String,
}

impl Config {
    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Load configuration from the standard location, falling back to
    /// defaults when no config file exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        match get_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Render the default configuration as a commented TOML document
    pub fn generate_default_config() -> String {
        let config = Self::default();
        let body = toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::new());
        format!(
            "# dcim-offload configuration\n\
             # Extension matching is case-insensitive.\n\n{}",
            body
        )
    }

    /// Write the default configuration to the standard location,
    /// creating the directory if needed. Returns the path written.
    pub fn init_default_file() -> Result<PathBuf, ConfigError> {
        let dir = get_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .map_err(|e| ConfigError::WriteError(dir.clone(), e.to_string()))?;
        }
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            fs::write(&path, Self::generate_default_config())
                .map_err(|e| ConfigError::WriteError(path.clone(), e.to_string()))?;
        }
        Ok(path)
    }
}
