//! Configuration management for Guardião Digital.
//!
//! Loads configuration from ${GUARDIAO_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::content::Persona;

/// Returns the default config template with comments.
///
/// Embedded from `default_config.toml` at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for configuration and data files.
    //!
    //! GUARDIAO_HOME resolution order:
    //! 1. GUARDIAO_HOME environment variable (if set)
    //! 2. ~/.config/guardiao (default)

    use std::path::PathBuf;

    /// Returns the Guardião home directory.
    pub fn guardiao_home() -> PathBuf {
        if let Ok(home) = std::env::var("GUARDIAO_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".guardiao"),
            |h| h.join(".config").join("guardiao"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        guardiao_home().join("config.toml")
    }

    /// Returns the path where the signed-in session is persisted.
    pub fn session_path() -> PathBuf {
        guardiao_home().join("session.json")
    }

    /// Returns the log directory.
    pub fn logs_dir() -> PathBuf {
        guardiao_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Web API key of the identity provider project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the identity provider REST API.
    pub auth_base_url: String,
    /// Upper bound for a single sign-in / sign-up / sign-out call.
    pub auth_timeout_secs: u64,
    /// Persona selected when the content screens open.
    pub default_persona: Persona,
    /// Log filter directive (`EnvFilter` syntax).
    pub log_level: String,
}

impl Config {
    pub const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
    const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 15;
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Loads configuration from the default config path and applies
    /// environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&paths::config_path())?;
        config.apply_overrides(
            non_empty_env("GUARDIAO_API_KEY"),
            non_empty_env("GUARDIAO_AUTH_URL"),
        );
        Ok(config)
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

    /// Applies overrides that take precedence over the file values.
    pub fn apply_overrides(&mut self, api_key: Option<String>, auth_base_url: Option<String>) {
        if let Some(key) = api_key {
            self.api_key = Some(key);
        }
        if let Some(url) = auth_base_url {
            self.auth_base_url = url;
        }
    }

    /// Returns the timeout applied to every session store call.
    ///
    /// Never zero: a store call without a bound would leave the form stuck.
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs.max(1))
    }

    /// Creates a config file from the default template.
    ///
    /// # Errors
    /// Fails if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Saves only the `default_persona` field to a specific config path.
    ///
    /// Creates the file from the template if it doesn't exist. Existing
    /// fields and comments are preserved.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed or written.
    pub fn save_default_persona_to(path: &Path, persona: Persona) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["default_persona"] = value(persona.as_str());

        Self::write_config(path, &doc.to_string())
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
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            auth_base_url: Self::DEFAULT_AUTH_BASE_URL.to_string(),
            auth_timeout_secs: Self::DEFAULT_AUTH_TIMEOUT_SECS,
            default_persona: Persona::default(),
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
