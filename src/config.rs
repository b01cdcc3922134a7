//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::adapters::live::banana::DEFAULT_ENDPOINT;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "BANANA_API_KEY";

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "BANANA_CONFIG";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Endpoint configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Default node inputs, used when a CLI flag is not given.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// o1key API key.
    pub o1key: Option<String>,
}

/// Endpoint configuration.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// Generation endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { endpoint: default_endpoint() }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Default node inputs from the config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Default model name or alias.
    pub model: String,
    /// Default aspect ratio.
    pub aspect_ratio: String,
    /// Default image size.
    pub image_size: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: "nano-banana-pro-svip".to_string(),
            aspect_ratio: "1:1".to_string(),
            image_size: "2K".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Resolve the API key: explicit value, then environment, then file.
    ///
    /// Empty strings count as absent.
    #[must_use]
    pub fn api_key(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_string)
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .or_else(|| self.keys.o1key.clone())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `BANANA_CONFIG` environment variable
/// 3. `~/.config/banana/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/banana/config.toml")
    } else {
        PathBuf::from("banana.toml")
    }
}
