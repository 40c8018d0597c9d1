//! The synthesized plugin surface.
//!
//! A [`CapabilitySurface`] is the pair of collections a page sees through
//! `navigator.plugins` and `navigator.mimeTypes`, built once for one
//! protection level. This module also carries the consistency audit that
//! checks the surface the way a probing script would, and a serializable
//! snapshot for diagnostics.

use super::addressing::Addressable;
use super::collection::{MimeTypeArray, PluginArray};
use super::descriptor::{MimeType, Plugin};
use super::factory::synthesize_pair;
use super::farble::farble;
use super::level::ProtectionLevel;
use super::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

/// A structural tell found by [`CapabilitySurface::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("Mime type {mime_type:?} has no live enabled plugin")]
    DanglingBackReference { mime_type: String },

    #[error("Mime type {mime_type:?} points at a plugin outside the plugin collection")]
    ForeignPlugin { mime_type: String },

    #[error("Mime type {mime_type:?} is listed by {owners} plugins instead of exactly one")]
    OwnerCount { mime_type: String, owners: usize },

    #[error("Mime type {0:?} is admitted more than once")]
    DuplicateType(String),

    #[error("A mime type with an empty type was admitted")]
    EmptyTypeAdmitted,

    #[error("Mime type {mime_type:?} is not reachable under its own type key")]
    TypeBinding { mime_type: String },

    #[error("Plugin #{position} ({name:?}) has the wrong name binding (expected addressable: {expected})")]
    NameBinding {
        position: usize,
        name: String,
        expected: bool,
    },

    #[error("Plugin #{position} lists a mime type that points at another plugin")]
    ForeignMimeType { position: usize },

    #[error("Level {level} must not report any plugins, found {count}")]
    NotEmpty { level: ProtectionLevel, count: usize },
}

/// Both collections produced for one protection-level decision.
#[derive(Debug, Clone)]
pub struct CapabilitySurface {
    level: ProtectionLevel,
    plugins: Rc<PluginArray>,
    mime_types: Rc<MimeTypeArray>,
}

impl CapabilitySurface {
    /// Build the surface for `level`.
    ///
    /// `genuine` is only read at [`ProtectionLevel::Minimal`]. Levels that add
    /// fakes shuffle the final plugin order with `random`.
    pub fn synthesize<R: RandomSource>(
        level: ProtectionLevel,
        genuine: &[Rc<Plugin>],
        random: &mut R,
    ) -> Self {
        let mut plugins: Vec<Rc<Plugin>> = Vec::new();

        if level.uses_genuine_plugins() {
            for plugin in genuine {
                plugins.push(farble(random, plugin));
            }
        }

        if level.adds_fake_plugins() {
            plugins.extend(synthesize_pair(random));
            random.shuffle(&mut plugins);
        }

        Self::from_plugins(level, plugins)
    }

    /// Assemble a surface from plugins already in their final order.
    pub fn from_plugins(level: ProtectionLevel, plugins: Vec<Rc<Plugin>>) -> Self {
        let plugins = PluginArray::assemble(plugins);
        let mime_types = MimeTypeArray::assemble(&plugins);
        Self {
            level,
            plugins: Rc::new(plugins),
            mime_types: Rc::new(mime_types),
        }
    }

    pub fn level(&self) -> ProtectionLevel {
        self.level
    }

    /// Value for `navigator.plugins`.
    pub fn plugins(&self) -> &Rc<PluginArray> {
        &self.plugins
    }

    /// Value for `navigator.mimeTypes`.
    pub fn mime_types(&self) -> &Rc<MimeTypeArray> {
        &self.mime_types
    }

    /// Check every invariant a consistency probe could test.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn verify(&self) -> Result<(), ConsistencyError> {
        if self.level == ProtectionLevel::Maximum && !self.plugins.is_empty() {
            return Err(ConsistencyError::NotEmpty {
                level: self.level,
                count: self.plugins.len(),
            });
        }

        for (position, plugin) in self.plugins.iter().enumerate() {
            if plugin.mime_types().iter().any(|mime| !mime.is_enabled_by(plugin)) {
                return Err(ConsistencyError::ForeignMimeType { position });
            }

            let bound = self.plugins.named_item(plugin.name());
            let bound_to_self = bound.as_ref().is_some_and(|b| Rc::ptr_eq(b, plugin));
            let consistent = if plugin.is_name_addressable() {
                bound.is_some_and(|b| b.name() == plugin.name() && b.is_name_addressable())
            } else {
                !bound_to_self
            };
            if !consistent {
                return Err(ConsistencyError::NameBinding {
                    position,
                    name: plugin.name().to_string(),
                    expected: plugin.is_name_addressable(),
                });
            }
        }

        let mut seen = HashSet::new();
        for mime in self.mime_types.iter() {
            let ty = mime.mime_type();
            if ty.is_empty() {
                return Err(ConsistencyError::EmptyTypeAdmitted);
            }
            if !seen.insert(ty) {
                return Err(ConsistencyError::DuplicateType(ty.to_string()));
            }

            let owner = mime
                .enabled_plugin()
                .ok_or_else(|| ConsistencyError::DanglingBackReference {
                    mime_type: ty.to_string(),
                })?;
            if !self.plugins.contains(&owner) {
                return Err(ConsistencyError::ForeignPlugin {
                    mime_type: ty.to_string(),
                });
            }

            let owners = self.plugins.iter().filter(|p| p.owns(mime)).count();
            if owners != 1 {
                return Err(ConsistencyError::OwnerCount {
                    mime_type: ty.to_string(),
                    owners,
                });
            }

            let bound = self.mime_types.named_item(ty);
            if !bound.is_some_and(|b| Rc::ptr_eq(&b, mime)) {
                return Err(ConsistencyError::TypeBinding {
                    mime_type: ty.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Plain-data view of the surface.
    pub fn snapshot(&self) -> SurfaceSnapshot {
        let plugins = self
            .plugins
            .iter()
            .map(|plugin| PluginSnapshot {
                name: plugin.name().to_string(),
                filename: plugin.filename().to_string(),
                description: plugin.description().to_string(),
                version: plugin.version().map(str::to_string),
                named: plugin.is_name_addressable(),
                mime_types: plugin
                    .mime_types()
                    .iter()
                    .map(|mime| self.mime_snapshot(mime))
                    .collect(),
            })
            .collect();

        let mime_types = self
            .mime_types
            .iter()
            .map(|mime| self.mime_snapshot(mime))
            .collect();

        SurfaceSnapshot {
            level: self.level,
            plugins,
            mime_types,
        }
    }

    fn mime_snapshot(&self, mime: &MimeType) -> MimeTypeSnapshot {
        MimeTypeSnapshot {
            mime_type: mime.mime_type().to_string(),
            suffixes: mime.suffixes().to_string(),
            description: mime.description().to_string(),
            enabled_plugin: mime
                .enabled_plugin()
                .and_then(|owner| self.plugins.position_of(&owner)),
        }
    }
}

/// Serializable view of a [`CapabilitySurface`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSnapshot {
    pub level: ProtectionLevel,
    pub plugins: Vec<PluginSnapshot>,
    pub mime_types: Vec<MimeTypeSnapshot>,
}

/// One plugin in a [`SurfaceSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSnapshot {
    pub name: String,
    pub filename: String,
    pub description: String,
    pub version: Option<String>,
    /// Whether the plugin is reachable by name.
    pub named: bool,
    pub mime_types: Vec<MimeTypeSnapshot>,
}

/// One mime type in a [`SurfaceSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MimeTypeSnapshot {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub suffixes: String,
    pub description: String,
    /// Index of the owning plugin in the plugin collection.
    pub enabled_plugin: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stealth::descriptor::{MimeTypeInfo, PluginInfo};
    use crate::stealth::random::SessionRandom;

    fn genuine_pdf() -> Vec<Rc<Plugin>> {
        vec![Plugin::from_info(
            &PluginInfo::new("Chrome PDF Viewer", "Portable Document Format", "internal-pdf-viewer")
                .with_mime_type(MimeTypeInfo::pdf()),
        )
        .unwrap()]
    }

    #[test]
    fn test_maximum_is_empty() {
        let mut random = SessionRandom::from_seed(1);
        let surface = CapabilitySurface::synthesize(ProtectionLevel::Maximum, &genuine_pdf(), &mut random);

        assert_eq!(surface.plugins().len(), 0);
        assert_eq!(surface.mime_types().len(), 0);
        assert_eq!(random.draws(), 0);
        assert!(surface.verify().is_ok());
    }

    #[test]
    fn test_balanced_has_two_fakes_and_no_mime_types() {
        let mut random = SessionRandom::from_seed(2);
        let surface = CapabilitySurface::synthesize(ProtectionLevel::Balanced, &genuine_pdf(), &mut random);

        assert_eq!(surface.plugins().len(), 2);
        assert_eq!(surface.mime_types().len(), 0);

        let mut filename_lens: Vec<usize> =
            surface.plugins().iter().map(|p| p.filename().len()).collect();
        filename_lens.sort_unstable();
        assert_eq!(filename_lens, vec![15, 16]);

        for plugin in surface.plugins().iter() {
            assert!(surface.plugins().named_item(plugin.name()).is_none());
        }
        assert!(surface.verify().is_ok());
    }

    #[test]
    fn test_minimal_farbles_and_adds_fakes() {
        let mut random = SessionRandom::from_seed(3);
        let surface = CapabilitySurface::synthesize(ProtectionLevel::Minimal, &genuine_pdf(), &mut random);

        assert_eq!(surface.plugins().len(), 3);
        assert_eq!(surface.mime_types().len(), 1);

        let pdf = surface.mime_types().named_item("application/pdf").unwrap();
        let owner = pdf.enabled_plugin().unwrap();
        assert!(surface.plugins().contains(&owner));
        assert!(Rc::ptr_eq(&owner.item(0).unwrap(), &pdf));
        assert!(surface.verify().is_ok());
    }

    #[test]
    fn test_verify_accepts_shadowed_plugin_name() {
        // The second "Same" is shadowed by the first; the name still resolves.
        let a = Plugin::build("Same", "a", "", None, vec![MimeTypeInfo::new("application/x-a", "", "")]);
        let b = Plugin::build("Same", "b", "", None, vec![MimeTypeInfo::new("application/x-b", "", "")]);
        let surface = CapabilitySurface::from_plugins(ProtectionLevel::Minimal, vec![a, b]);
        assert!(surface.verify().is_ok());
    }

    #[test]
    fn test_verify_rejects_plugins_at_maximum() {
        let surface = CapabilitySurface::from_plugins(ProtectionLevel::Maximum, genuine_pdf());
        assert_eq!(
            surface.verify(),
            Err(ConsistencyError::NotEmpty {
                level: ProtectionLevel::Maximum,
                count: 1
            })
        );
    }

    #[test]
    fn test_snapshot_records_owner_positions() {
        let mut random = SessionRandom::from_seed(4);
        let surface = CapabilitySurface::synthesize(ProtectionLevel::Minimal, &genuine_pdf(), &mut random);
        let snapshot = surface.snapshot();

        assert_eq!(snapshot.level, ProtectionLevel::Minimal);
        assert_eq!(snapshot.plugins.len(), 3);
        assert_eq!(snapshot.mime_types.len(), 1);

        let owner = snapshot.mime_types[0].enabled_plugin.unwrap();
        assert!(snapshot.plugins[owner].named);
        assert_eq!(snapshot.plugins[owner].mime_types[0].mime_type, "application/pdf");
        assert_eq!(snapshot.plugins.iter().filter(|p| p.named).count(), 1);
    }

    #[test]
    fn test_snapshot_json_uses_host_field_names() {
        let mut random = SessionRandom::from_seed(5);
        let surface = CapabilitySurface::synthesize(ProtectionLevel::Minimal, &genuine_pdf(), &mut random);
        let json = serde_json::to_value(surface.snapshot()).unwrap();

        assert_eq!(json["level"], 0);
        assert!(json["mimeTypes"][0]["type"].is_string());
        assert!(json["mimeTypes"][0]["enabledPlugin"].is_number());
    }
}
