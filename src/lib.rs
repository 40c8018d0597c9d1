//! # Plugin Shield
//!
//! Plugin and mime type fingerprint protection for embedded browser engines.
//!
//! Pages can enumerate the plugins and content types a browser reports and
//! use the result to identify it. This library replaces both lists with
//! synthesized collections that look and behave like the host's own objects
//! while revealing less, at one of three protection levels.
//!
//! ## Features
//!
//! - **Protection Levels**: farble genuine plugins (0), fabricate everything (1), report nothing (2)
//! - **Host-Faithful Collections**: index and name addressing, stable identity, consistent back-references
//! - **Session Randomness**: reproducible from a session token, unlinkable by default
//! - **Consistency Audit**: checks every structural invariant of a synthesized surface
//! - **Flexible Configuration**: TOML/JSON files, environment variables, CLI arguments
//!
//! ## Quick Start
//!
//! ```rust
//! use plugin_shield::prelude::*;
//!
//! let settings = ShieldSettings::default()
//!     .with_protection_level(ProtectionLevel::Minimal)
//!     .with_session_seed("tab-1");
//!
//! let shield = PluginShield::with_random(settings.host().unwrap(), settings.session_random());
//! let surface = shield.surface().unwrap();
//!
//! assert!(surface.verify().is_ok());
//! assert_eq!(surface.plugins().len(), 7);
//! ```
//!
//! ## Module Overview
//!
//! - [`stealth`]: Plugin synthesis, collections and the per-context shield
//! - [`config`]: Configuration loading and management
//!
//! ## Configuration
//!
//! Configuration follows a precedence chain:
//! 1. Default values
//! 2. Configuration file (TOML/JSON)
//! 3. Environment variables (`PLUGIN_SHIELD_*`)
//! 4. CLI arguments
//!
//! See [`config::ShieldSettings`] for all available options.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Plugin and mime type synthesis, collections and orchestration.
pub mod stealth;

/// Configuration management for loading settings from files, env, and CLI.
pub mod config;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

// Stealth types
pub use stealth::{
    Addressable, CapabilitySurface, ConsistencyError, HostEnvironment, MimeType, MimeTypeArray,
    MimeTypeInfo, Plugin, PluginArray, PluginInfo, PluginShield, ProtectionLevel, SessionRandom,
    ShieldError, StaticHost, SurfaceSnapshot,
};

// Config types
pub use config::{CliArgs, ConfigError, ShieldSettings};

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use plugin_shield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{CliArgs, ShieldSettings};
    pub use crate::stealth::{
        Addressable, HostEnvironment, PluginShield, ProtectionLevel, SessionRandom, StaticHost,
    };
    pub use crate::{FULL_VERSION, NAME, VERSION};
}
