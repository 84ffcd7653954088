//! Configuration
//!
//! Loaded with the following precedence (highest to lowest):
//! 1. CLI flags (--trace, --config)
//! 2. Environment variables (VT102_TRACE, VT102_ANSWERBACK, ...)
//! 3. Config file (~/.config/vt102/config.toml or XDG_CONFIG_HOME)
//! 4. Built-in defaults

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use vt102_core::ANSWERBACK_LEN;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
}

/// CLI arguments for configuration overrides
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Path to config file (overrides the XDG default)
    pub config_path: Option<PathBuf>,
    /// Enable interpreter tracing
    pub trace: bool,
    /// Dump a JSON screen snapshot at end of input
    pub snapshot: bool,
}

/// Emulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trace interpreter decisions to the diagnostic stream
    pub trace: bool,
    /// Power-up answerback message (at most 20 bytes)
    pub answerback: String,
    /// Power up in 132-column mode
    pub columns_132: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trace: false,
            answerback: String::new(),
            columns_132: false,
        }
    }
}

impl Config {
    /// Load configuration with full precedence handling
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let config_path = args.config_path.clone().or_else(Self::default_config_path);
        if let Some(path) = config_path {
            if path.exists() {
                config = Self::load_from_path(&path)?;
            } else if args.config_path.is_some() {
                return Err(ConfigError::NotFound(path));
            }
        }

        config.apply_env_overrides();

        if args.trace {
            config.trace = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_path(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The default configuration file path, following XDG conventions
    pub fn default_config_path() -> Option<PathBuf> {
        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("vt102").join("config.toml"));
            }
        }
        dirs::config_dir().map(|p| p.join("vt102").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("VT102_TRACE") {
            self.trace = val == "1" || val.to_lowercase() == "true";
        }
        if let Ok(val) = env::var("VT102_ANSWERBACK") {
            self.answerback = val;
        }
        if let Ok(val) = env::var("VT102_132_COLUMNS") {
            self.columns_132 = val == "1" || val.to_lowercase() == "true";
        }
    }

    /// Validate the final configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.answerback.len() > ANSWERBACK_LEN {
            return Err(ConfigError::Validation(format!(
                "answerback must be at most {ANSWERBACK_LEN} bytes, got {}",
                self.answerback.len()
            )));
        }
        if !self.answerback.bytes().all(|b| (0x20..0x7F).contains(&b)) {
            return Err(ConfigError::Validation(
                "answerback must be printable ASCII".to_string(),
            ));
        }
        Ok(())
    }
}
