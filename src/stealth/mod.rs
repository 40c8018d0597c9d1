//! Plugin and Mime Type Capability Obfuscation
//!
//! This module replaces the plugin and mime type lists a page can read
//! (`navigator.plugins` and `navigator.mimeTypes`) with synthesized
//! collections that keep the host's object model intact while hiding the
//! real configuration.
//!
//! # Modules
//!
//! - `level` - Protection levels 0 (minimal), 1 (balanced) and 2 (maximum)
//! - `random` - Per-session randomness source
//! - `descriptor` - Plugin and mime type entries with shared back-references
//! - `addressing` - Index and key addressing shared by all collections
//! - `collection` - The plugin and mime type collections
//! - `factory` - Fabricated plugins
//! - `farble` - Reworded copies of genuine plugins
//! - `surface` - Per-level assembly, verification and snapshots
//! - `shield` - Lazy, cached, reentrancy-safe orchestration
//!
//! # Example
//!
//! ```rust
//! use plugin_shield::stealth::{
//!     Addressable, PluginShield, ProtectionLevel, SessionRandom, StaticHost,
//! };
//!
//! let shield = PluginShield::with_random(
//!     StaticHost::chrome(ProtectionLevel::Balanced),
//!     SessionRandom::from_seed_str("my-session-seed"),
//! );
//!
//! let plugins = shield.plugin_surface().unwrap();
//! let mime_types = shield.mime_type_surface().unwrap();
//!
//! // Two fabricated plugins, neither reachable by name.
//! assert_eq!(plugins.len(), 2);
//! assert_eq!(mime_types.len(), 0);
//! ```

pub mod addressing;
pub mod collection;
pub mod descriptor;
pub mod factory;
pub mod farble;
pub mod level;
pub mod random;
pub mod shield;
pub mod surface;

// Re-export commonly used types for convenience
pub use addressing::{parse_index, Addressable};
pub use collection::{MimeTypeArray, PluginArray};
pub use descriptor::{DescriptorError, MimeType, MimeTypeInfo, Plugin, PluginInfo};
pub use factory::{synthesize, synthesize_pair, FakeProfile};
pub use farble::farble;
pub use level::{LevelError, ProtectionLevel};
pub use random::{RandomSource, SessionRandom};
pub use shield::{HostEnvironment, PluginShield, ShieldError, StaticHost};
pub use surface::{
    CapabilitySurface, ConsistencyError, MimeTypeSnapshot, PluginSnapshot, SurfaceSnapshot,
};
