//! Protection-level orchestration.
//!
//! [`PluginShield`] is the object the property-interception layer holds
//! for one execution context. On the first read of either surface it asks
//! the host for the protection level (and, at level 0, for the genuine
//! plugins), synthesizes both collections once, and from then on hands
//! out the same collections on every read.
//!
//! # Example
//!
//! ```rust
//! use plugin_shield::stealth::{PluginShield, ProtectionLevel, SessionRandom, StaticHost};
//! use plugin_shield::stealth::Addressable;
//! use std::rc::Rc;
//!
//! let host = StaticHost::chrome(ProtectionLevel::Minimal);
//! let shield = PluginShield::with_random(host, SessionRandom::from_seed_str("session"));
//!
//! let plugins = shield.plugin_surface().unwrap();
//! assert_eq!(plugins.len(), 7);
//! assert!(Rc::ptr_eq(&plugins, &shield.plugin_surface().unwrap()));
//! ```

use super::addressing::Addressable;
use super::collection::{MimeTypeArray, PluginArray};
use super::descriptor::{Plugin, PluginInfo};
use super::level::ProtectionLevel;
use super::random::{RandomSource, SessionRandom};
use super::surface::CapabilitySurface;
use once_cell::unsync::OnceCell;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors returned by [`PluginShield`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShieldError {
    /// A surface was read while that same surface was being assembled.
    #[error("Plugin surface requested while it is still being assembled")]
    Reentrant,
}

/// What the shield needs from the surrounding environment.
pub trait HostEnvironment {
    /// Protection level for this context. Read once.
    fn protection_level(&self) -> ProtectionLevel;

    /// The plugins the host genuinely reports. Only read at level 0.
    fn genuine_plugins(&self) -> Vec<PluginInfo>;
}

/// Host with a fixed level and a fixed genuine plugin list.
#[derive(Debug, Clone)]
pub struct StaticHost {
    level: ProtectionLevel,
    plugins: Vec<PluginInfo>,
}

impl StaticHost {
    pub fn new(level: ProtectionLevel, plugins: Vec<PluginInfo>) -> Self {
        Self { level, plugins }
    }

    /// Host reporting the default Chromium plugin list.
    pub fn chrome(level: ProtectionLevel) -> Self {
        Self::new(level, PluginInfo::chrome_defaults())
    }
}

impl HostEnvironment for StaticHost {
    fn protection_level(&self) -> ProtectionLevel {
        self.level
    }

    fn genuine_plugins(&self) -> Vec<PluginInfo> {
        self.plugins.clone()
    }
}

/// Clears the assembling flag when dropped, including on unwind.
struct AssemblyGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> AssemblyGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for AssemblyGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Lazily synthesized, cached plugin surface for one execution context.
pub struct PluginShield<H, R = SessionRandom> {
    host: H,
    random: RefCell<R>,
    surface: OnceCell<CapabilitySurface>,
    assembling: Cell<bool>,
}

impl<H: HostEnvironment> PluginShield<H, SessionRandom> {
    /// Shield with a fresh, unlinkable session seed.
    pub fn new(host: H) -> Self {
        Self::with_random(host, SessionRandom::from_entropy())
    }
}

impl<H: HostEnvironment, R: RandomSource> PluginShield<H, R> {
    /// Shield drawing from the given randomness source.
    pub fn with_random(host: H, random: R) -> Self {
        Self {
            host,
            random: RefCell::new(random),
            surface: OnceCell::new(),
            assembling: Cell::new(false),
        }
    }

    /// Both collections, synthesized on first call.
    ///
    /// # Errors
    ///
    /// Returns [`ShieldError::Reentrant`] when called from inside the
    /// host while the surface is being assembled.
    pub fn surface(&self) -> Result<&CapabilitySurface, ShieldError> {
        if let Some(surface) = self.surface.get() {
            return Ok(surface);
        }

        let _guard = AssemblyGuard::enter(&self.assembling).ok_or_else(|| {
            warn!("Rejected nested plugin surface read during assembly");
            ShieldError::Reentrant
        })?;

        let surface = self.assemble();
        Ok(self.surface.get_or_init(|| surface))
    }

    /// Value for `navigator.plugins`.
    pub fn plugin_surface(&self) -> Result<Rc<PluginArray>, ShieldError> {
        Ok(Rc::clone(self.surface()?.plugins()))
    }

    /// Value for `navigator.mimeTypes`.
    pub fn mime_type_surface(&self) -> Result<Rc<MimeTypeArray>, ShieldError> {
        Ok(Rc::clone(self.surface()?.mime_types()))
    }

    /// Whether the surface has been synthesized yet.
    pub fn is_assembled(&self) -> bool {
        self.surface.get().is_some()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Current state of the randomness source.
    pub fn random(&self) -> Ref<'_, R> {
        self.random.borrow()
    }

    fn assemble(&self) -> CapabilitySurface {
        let level = self.host.protection_level();

        // Host calls happen before the randomness source is borrowed.
        let genuine = if level.uses_genuine_plugins() {
            self.genuine_descriptors()
        } else {
            Vec::new()
        };

        let mut random = self.random.borrow_mut();
        let surface = CapabilitySurface::synthesize(level, &genuine, &mut *random);

        info!(
            "Plugin surface assembled at level {} ({}): {} plugins, {} mime types",
            level.as_u8(),
            level,
            surface.plugins().len(),
            surface.mime_types().len()
        );

        surface
    }

    fn genuine_descriptors(&self) -> Vec<Rc<Plugin>> {
        let records = self.host.genuine_plugins();
        debug!(count = records.len(), "Read genuine plugins");

        records
            .iter()
            .filter_map(|record| match Plugin::from_info(record) {
                Ok(plugin) => Some(plugin),
                Err(e) => {
                    warn!("Skipping genuine plugin: {}", e);
                    None
                }
            })
            .collect()
    }
}

impl<H: std::fmt::Debug, R> std::fmt::Debug for PluginShield<H, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginShield")
            .field("host", &self.host)
            .field("assembled", &self.surface.get().is_some())
            .field("assembling", &self.assembling.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stealth::descriptor::MimeTypeInfo;
    use std::rc::Weak;

    /// Host that counts how often it is asked for things.
    struct CountingHost {
        level: ProtectionLevel,
        level_reads: Cell<usize>,
        genuine_reads: Cell<usize>,
    }

    impl CountingHost {
        fn new(level: ProtectionLevel) -> Self {
            Self {
                level,
                level_reads: Cell::new(0),
                genuine_reads: Cell::new(0),
            }
        }
    }

    impl HostEnvironment for CountingHost {
        fn protection_level(&self) -> ProtectionLevel {
            self.level_reads.set(self.level_reads.get() + 1);
            self.level
        }

        fn genuine_plugins(&self) -> Vec<PluginInfo> {
            self.genuine_reads.set(self.genuine_reads.get() + 1);
            PluginInfo::chrome_defaults()
        }
    }

    /// Host that reads the surface back while it is being built.
    struct ReentrantHost {
        shield: Weak<PluginShield<ReentrantHost>>,
        nested: RefCell<Option<Result<(), ShieldError>>>,
    }

    impl HostEnvironment for ReentrantHost {
        fn protection_level(&self) -> ProtectionLevel {
            ProtectionLevel::Minimal
        }

        fn genuine_plugins(&self) -> Vec<PluginInfo> {
            if let Some(shield) = self.shield.upgrade() {
                let nested = shield.plugin_surface().map(|_| ());
                *self.nested.borrow_mut() = Some(nested);
            }
            PluginInfo::chrome_defaults()
        }
    }

    #[test]
    fn test_surface_is_cached() {
        let shield = PluginShield::with_random(
            CountingHost::new(ProtectionLevel::Minimal),
            SessionRandom::from_seed(1),
        );

        let first = shield.plugin_surface().unwrap();
        let draws = shield.random().draws();
        let second = shield.plugin_surface().unwrap();
        let mime_first = shield.mime_type_surface().unwrap();
        let mime_second = shield.mime_type_surface().unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert!(Rc::ptr_eq(&mime_first, &mime_second));
        assert_eq!(shield.random().draws(), draws);
        assert_eq!(shield.host().level_reads.get(), 1);
        assert_eq!(shield.host().genuine_reads.get(), 1);
    }

    #[test]
    fn test_lazy_until_first_read() {
        let shield = PluginShield::with_random(
            CountingHost::new(ProtectionLevel::Balanced),
            SessionRandom::from_seed(2),
        );
        assert!(!shield.is_assembled());
        assert_eq!(shield.host().level_reads.get(), 0);

        shield.mime_type_surface().unwrap();
        assert!(shield.is_assembled());
    }

    #[test]
    fn test_genuine_plugins_only_read_at_minimal() {
        for level in [ProtectionLevel::Balanced, ProtectionLevel::Maximum] {
            let shield = PluginShield::with_random(CountingHost::new(level), SessionRandom::from_seed(3));
            shield.surface().unwrap();
            assert_eq!(shield.host().genuine_reads.get(), 0, "level {level}");
        }
    }

    #[test]
    fn test_malformed_genuine_plugin_is_skipped() {
        let host = StaticHost::new(
            ProtectionLevel::Minimal,
            vec![
                PluginInfo::new("Broken", "", "broken.so").without_mime_types(),
                PluginInfo::new("Chrome PDF Viewer", "", "internal-pdf-viewer")
                    .with_mime_type(MimeTypeInfo::pdf()),
            ],
        );
        let shield = PluginShield::with_random(host, SessionRandom::from_seed(4));
        let surface = shield.surface().unwrap();

        assert_eq!(surface.plugins().len(), 3);
        assert_eq!(surface.mime_types().len(), 1);
        assert!(surface.verify().is_ok());
    }

    #[test]
    fn test_nested_read_is_rejected() {
        let shield = Rc::new_cyclic(|weak| {
            PluginShield::with_random(
                ReentrantHost {
                    shield: weak.clone(),
                    nested: RefCell::new(None),
                },
                SessionRandom::from_seed(5),
            )
        });

        let plugins = shield.plugin_surface().unwrap();
        assert_eq!(*shield.host().nested.borrow(), Some(Err(ShieldError::Reentrant)));

        // The rejected read consumed nothing: a plain shield with the same
        // seed produces the same surface.
        let plain = PluginShield::with_random(
            StaticHost::chrome(ProtectionLevel::Minimal),
            SessionRandom::from_seed(5),
        );
        let expected = plain.plugin_surface().unwrap();
        let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
        let expected_names: Vec<&str> = expected.iter().map(|p| p.name()).collect();
        assert_eq!(names, expected_names);
        assert_eq!(shield.random().draws(), plain.random().draws());
    }

    #[test]
    fn test_guard_released_after_assembly() {
        let shield = PluginShield::with_random(
            StaticHost::chrome(ProtectionLevel::Maximum),
            SessionRandom::from_seed(6),
        );
        shield.surface().unwrap();
        assert!(!shield.assembling.get());
        assert!(format!("{shield:?}").contains("assembled: true"));
    }

    #[test]
    fn test_chrome_host_at_minimal() {
        let shield = PluginShield::with_random(
            StaticHost::chrome(ProtectionLevel::Minimal),
            SessionRandom::from_seed(7),
        );
        let plugins = shield.plugin_surface().unwrap();
        let mime_types = shield.mime_type_surface().unwrap();

        assert_eq!(plugins.len(), 7);
        assert_eq!(mime_types.len(), 2);
        assert!(shield.surface().unwrap().verify().is_ok());
    }
}
