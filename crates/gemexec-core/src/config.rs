//! Configuration management for gemexec.
//!
//! Loads configuration from ${GEMEXEC_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::driver::{DEFAULT_MODEL, DEFAULT_PROMPT, DriverSettings};
use crate::providers::gemini::DEFAULT_BASE_URL;
use crate::providers::{resolve_api_key, resolve_base_url};

/// Environment variables consulted for the credential, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY"];
pub const BASE_URL_ENV_VAR: &str = "GEMINI_BASE_URL";

pub mod paths {
    //! Path resolution for gemexec configuration.
    //!
    //! GEMEXEC_HOME resolution order:
    //! 1. GEMEXEC_HOME environment variable (if set)
    //! 2. ~/.config/gemexec (default)
    //! 3. ./.gemexec when no home directory can be determined

    use std::path::PathBuf;

    pub fn gemexec_home() -> PathBuf {
        if let Ok(home) = std::env::var("GEMEXEC_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".gemexec"),
            |h| h.join(".config").join("gemexec"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        gemexec_home().join("config.toml")
    }
}

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini model identifier
    pub model: String,

    /// Prompt sent with code execution enabled
    pub prompt: String,

    /// Optional output path for the rendered page
    pub output: Option<String>,

    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gemini: ProviderConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            output: None,
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the default path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default config to `path`.
    ///
    /// # Errors
    /// Fails if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Credential with precedence config > `API_KEY` > `GEMINI_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(self.providers.gemini.api_key.as_deref(), API_KEY_ENV_VARS)
    }

    /// Gemini base URL with precedence env > config > default.
    ///
    /// # Errors
    /// Returns an error if the resolved URL is malformed.
    pub fn gemini_base_url(&self) -> Result<String> {
        resolve_base_url(
            self.providers.gemini.base_url.as_deref(),
            BASE_URL_ENV_VAR,
            DEFAULT_BASE_URL,
            "Gemini",
        )
    }

    /// Driver inputs for this config, with the credential resolved now.
    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            api_key: self.api_key(),
            model: self.model.clone(),
            prompt: self.prompt.clone(),
        }
    }
}
