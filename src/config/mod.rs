//! Configuration module for plugin-shield.
//!
//! This module provides configuration management for the shield, including:
//! - Loading settings from files (TOML/JSON)
//! - Environment variable overrides
//! - CLI argument merging
//! - Loading genuine plugin lists
//!
//! # Example
//!
//! ```rust,no_run
//! use plugin_shield::config::ShieldSettings;
//!
//! let settings = ShieldSettings::from_file("shield.toml").unwrap();
//!
//! // Override with environment variables
//! let settings = settings.merge_with_env().unwrap();
//! ```

mod settings;

pub use settings::{load_genuine_plugins, CliArgs, ConfigError, ShieldSettings};
