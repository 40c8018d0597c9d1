//! Shield settings and configuration management.
//!
//! Settings come from defaults, an optional TOML or JSON file, `PLUGIN_SHIELD_*`
//! environment variables and command line arguments, in that order.

use crate::stealth::{LevelError, PluginInfo, ProtectionLevel, SessionRandom, StaticHost};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Protection level out of range or unrecognised.
    #[error(transparent)]
    Level(#[from] LevelError),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Settings for one plugin shield.
///
/// # Configuration Precedence
///
/// Settings are applied in the following order (later sources override earlier):
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
/// 4. CLI arguments
///
/// # Example
///
/// ```rust
/// use plugin_shield::config::ShieldSettings;
/// use plugin_shield::stealth::ProtectionLevel;
///
/// let settings = ShieldSettings::default()
///     .with_protection_level(ProtectionLevel::Minimal)
///     .with_session_seed("tab-42");
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldSettings {
    /// Protection level: 0 (minimal), 1 (balanced) or 2 (maximum).
    #[serde(default)]
    pub protection_level: ProtectionLevel,

    /// Session token the randomness source is derived from.
    /// A fresh random seed is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_seed: Option<String>,

    /// JSON file with the genuine plugin list used at level 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genuine_plugins_path: Option<PathBuf>,

    /// Audit the synthesized surface before reporting it.
    #[serde(default)]
    pub verify: bool,
}

impl Default for ShieldSettings {
    fn default() -> Self {
        Self {
            protection_level: ProtectionLevel::default(),
            session_seed: None,
            genuine_plugins_path: None,
            verify: false,
        }
    }
}

fn is_truthy(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

impl ShieldSettings {
    /// Creates new settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a configuration file.
    ///
    /// Supports both TOML and JSON formats, detected by file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match file_extension(path).as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Saves settings to a configuration file.
    ///
    /// The format is determined by the file extension.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        let content = match file_extension(path).as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            ext => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Loads settings from environment variables.
    ///
    /// Recognised variables:
    /// - `PLUGIN_SHIELD_LEVEL` (`0`-`2` or `minimal`/`balanced`/`maximum`)
    /// - `PLUGIN_SHIELD_SEED`
    /// - `PLUGIN_SHIELD_GENUINE`
    /// - `PLUGIN_SHIELD_VERIFY`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Level`] if `PLUGIN_SHIELD_LEVEL` is not a
    /// recognised level.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_with_env()
    }

    /// Merges current settings with environment variable overrides.
    pub fn merge_with_env(self) -> Result<Self, ConfigError> {
        self.merge_with_lookup(|key| env::var(key).ok())
    }

    /// Applies overrides read through `lookup` instead of the process
    /// environment. An unrecognised level is an error.
    pub fn merge_with_lookup<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("PLUGIN_SHIELD_LEVEL") {
            self.protection_level = val.parse::<ProtectionLevel>()?;
        }

        if let Some(val) = lookup("PLUGIN_SHIELD_SEED") {
            self.session_seed = Some(val);
        }

        if let Some(val) = lookup("PLUGIN_SHIELD_GENUINE") {
            self.genuine_plugins_path = Some(PathBuf::from(val));
        }

        if let Some(val) = lookup("PLUGIN_SHIELD_VERIFY") {
            self.verify = is_truthy(&val);
        }

        Ok(self)
    }

    /// Merges settings with CLI arguments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use plugin_shield::config::{CliArgs, ShieldSettings};
    /// use plugin_shield::stealth::ProtectionLevel;
    ///
    /// let args = CliArgs {
    ///     protection_level: Some(ProtectionLevel::Maximum),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = ShieldSettings::default().merge_with_args(&args);
    /// assert_eq!(settings.protection_level, ProtectionLevel::Maximum);
    /// ```
    pub fn merge_with_args(mut self, args: &CliArgs) -> Self {
        if let Some(level) = args.protection_level {
            self.protection_level = level;
        }
        if let Some(ref seed) = args.session_seed {
            self.session_seed = Some(seed.clone());
        }
        if let Some(ref path) = args.genuine_plugins_path {
            self.genuine_plugins_path = Some(path.clone());
        }
        if let Some(verify) = args.verify {
            self.verify = verify;
        }
        self
    }

    /// Validates all settings.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty session seed or a genuine plugin file
    /// that does not exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref seed) = self.session_seed {
            if seed.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "Session seed cannot be empty".to_string(),
                ));
            }
        }

        if let Some(ref path) = self.genuine_plugins_path {
            if !path.is_file() {
                return Err(ConfigError::ValidationError(format!(
                    "Genuine plugin file does not exist: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// Randomness source for these settings.
    pub fn session_random(&self) -> SessionRandom {
        match self.session_seed {
            Some(ref seed) => SessionRandom::from_seed_str(seed),
            None => SessionRandom::from_entropy(),
        }
    }

    /// Genuine plugins from the configured file, or the default Chrome set.
    pub fn genuine_plugins(&self) -> Result<Vec<PluginInfo>, ConfigError> {
        match self.genuine_plugins_path {
            Some(ref path) => load_genuine_plugins(path),
            None => Ok(PluginInfo::chrome_defaults()),
        }
    }

    /// Host environment described by these settings.
    pub fn host(&self) -> Result<StaticHost, ConfigError> {
        Ok(StaticHost::new(self.protection_level, self.genuine_plugins()?))
    }

    // Builder-style methods for convenient configuration

    /// Sets the protection level.
    pub fn with_protection_level(mut self, level: ProtectionLevel) -> Self {
        self.protection_level = level;
        self
    }

    /// Sets the session seed.
    pub fn with_session_seed(mut self, seed: impl Into<String>) -> Self {
        self.session_seed = Some(seed.into());
        self
    }

    /// Sets the genuine plugin file.
    pub fn with_genuine_plugins_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.genuine_plugins_path = Some(path.into());
        self
    }

    /// Enables or disables the consistency audit.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

/// Reads a JSON array of plugin records.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of
/// plugin records. Records without a `mimeTypes` field parse fine and are
/// skipped later by the shield.
pub fn load_genuine_plugins<P: AsRef<Path>>(path: P) -> Result<Vec<PluginInfo>, ConfigError> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

/// CLI argument structure for parsing command line options.
///
/// All fields are optional to allow partial overrides.
#[derive(Debug, Default, Clone)]
pub struct CliArgs {
    /// Protection level.
    pub protection_level: Option<ProtectionLevel>,
    /// Session seed.
    pub session_seed: Option<String>,
    /// Genuine plugin file.
    pub genuine_plugins_path: Option<PathBuf>,
    /// Run the consistency audit.
    pub verify: Option<bool>,
    /// Configuration file path.
    pub config_file: Option<PathBuf>,
}

impl CliArgs {
    /// Creates an empty CliArgs instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the final settings by applying the full configuration chain.
    pub fn load_settings(&self) -> Result<ShieldSettings, ConfigError> {
        let mut settings = if let Some(ref config_file) = self.config_file {
            ShieldSettings::from_file(config_file)?
        } else {
            ShieldSettings::default()
        };

        settings = settings.merge_with_env()?;
        settings = settings.merge_with_args(self);
        settings.validate()?;

        Ok(settings)
    }
}
