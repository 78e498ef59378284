//! Configuration file support for LockIn.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lockin/config.toml`.

use crate::window::parse_hhmm;
use crate::{Error, Result, ValidationWindow};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Calendar display configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// First day of the week strip
    #[serde(default = "default_week_starts_on")]
    pub week_starts_on: Weekday,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            week_starts_on: default_week_starts_on(),
        }
    }
}

/// Defaults for goals that carry no validation window of their own
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_window_start")]
    pub window_start: String,

    #[serde(default = "default_window_end")]
    pub window_end: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            window_start: default_window_start(),
            window_end: default_window_end(),
        }
    }
}

impl ValidationConfig {
    /// The configured default window, checked for `HH:MM` format and order
    pub fn window(&self) -> Result<ValidationWindow> {
        parse_hhmm(&self.window_start)
            .and_then(|start| ValidationWindow::new(start, parse_hhmm(&self.window_end)?))
            .map_err(|e| Error::Config(format!("[validation] {}", e)))
    }
}

// Default value functions
fn default_week_starts_on() -> Weekday {
    Weekday::Mon
}

fn default_window_start() -> String {
    "19:00".into()
}

fn default_window_end() -> String {
    "21:00".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validation.window()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from(".config"));
        base.join("lockin").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
