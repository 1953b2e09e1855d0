//! Configuration loading and data folder resolution
//!
//! Bootstrap settings come from a TOML file. Resolution priority for each
//! value:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable overriding the data folder
pub const DATA_DIR_ENV: &str = "IDEAHUB_DATA_DIR";

/// Environment variable holding the generator API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Interface to bind (default 127.0.0.1)
    #[serde(default)]
    pub bind_address: Option<String>,

    /// HTTP port (default 3001)
    #[serde(default)]
    pub port: Option<u16>,

    /// Folder holding `project_ideas/` and `settings.json`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Markdown guide served to authors preparing an archive
    #[serde(default)]
    pub context_file: Option<PathBuf>,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Text-generation backend settings
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout; a generation taking longer is cancelled
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
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

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

impl TomlConfig {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS)
    }
}

/// Parse a TOML config document
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load configuration.
///
/// An explicitly requested file must exist. Without one, the platform
/// default location is tried and a missing file means compiled defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!("Config file not found: {}", path.display())));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            Some(path) => {
                warn!("No config file at {}, using defaults", path.display());
                return Ok(TomlConfig::default());
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = parse_toml_config(&content)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// `<config_dir>/ideahub/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ideahub").join("config.toml"))
}

/// Resolve the data folder: CLI → `IDEAHUB_DATA_DIR` → TOML → platform default
pub fn resolve_data_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.data_dir {
        return path.clone();
    }

    default_data_dir()
}

/// OS-dependent default data folder
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ideahub"))
        .unwrap_or_else(|| PathBuf::from("./ideahub_data"))
}

/// Folder holding one subfolder per idea
pub fn ideas_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("project_ideas")
}

/// Settings document location
pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

/// Resolve the generator API key: environment → TOML
pub fn resolve_api_key(config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = config.generator.api_key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("Generator API key found in both environment and TOML. Using environment.");
    }

    match (env_key, toml_key) {
        (Some(key), _) => {
            info!("Generator API key loaded from environment variable");
            Some(key)
        }
        (None, Some(key)) => {
            info!("Generator API key loaded from TOML config");
            Some(key)
        }
        (None, None) => None,
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
