//! Plugin and mime type collections.
//!
//! [`PluginArray`] and [`MimeTypeArray`] reproduce the host's addressing
//! contract: total integer addressing, string keys only where the host
//! would bind them, and `len()` equal to what iteration yields. The mime
//! type collection is always derived from a plugin collection and shares
//! its entries by identity.

use super::addressing::{Addressable, KeyIndex};
use super::descriptor::{MimeType, Plugin};
use std::rc::Rc;
use tracing::trace;

/// Ordered plugin collection, addressable by index and by name.
#[derive(Debug, Clone, Default)]
pub struct PluginArray {
    plugins: Vec<Rc<Plugin>>,
    by_name: KeyIndex,
}

impl PluginArray {
    /// Collection with no plugins.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble plugins in the given order.
    ///
    /// A plugin is bound under its name only when its primary mime type has
    /// a non-empty type. A repeated name stays bound to the first plugin.
    pub fn assemble(plugins: Vec<Rc<Plugin>>) -> Self {
        let mut by_name = KeyIndex::new();
        for (position, plugin) in plugins.iter().enumerate() {
            if plugin.is_name_addressable() && !by_name.bind_first(plugin.name(), position) {
                trace!(position, "Plugin name already bound, keeping first");
            }
        }
        Self { plugins, by_name }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Plugin>> {
        self.plugins.iter()
    }

    pub fn as_slice(&self) -> &[Rc<Plugin>] {
        &self.plugins
    }

    /// Position of `plugin` in this collection (by identity).
    pub fn position_of(&self, plugin: &Rc<Plugin>) -> Option<usize> {
        self.plugins.iter().position(|own| Rc::ptr_eq(own, plugin))
    }

    /// Whether `plugin` is one of this collection's entries (by identity).
    pub fn contains(&self, plugin: &Rc<Plugin>) -> bool {
        self.position_of(plugin).is_some()
    }

    /// Number of plugins reachable by name.
    pub fn named_len(&self) -> usize {
        self.by_name.len()
    }
}

impl Addressable for PluginArray {
    type Entry = Plugin;

    fn len(&self) -> usize {
        self.plugins.len()
    }

    fn item(&self, index: usize) -> Option<Rc<Plugin>> {
        self.plugins.get(index).cloned()
    }

    fn named_item(&self, key: &str) -> Option<Rc<Plugin>> {
        self.by_name.get(key).and_then(|position| self.item(position))
    }
}

/// Ordered mime type collection, addressable by index and by type.
#[derive(Debug, Clone, Default)]
pub struct MimeTypeArray {
    mime_types: Vec<Rc<MimeType>>,
    by_type: KeyIndex,
    // Keeps every `enabled_plugin` back-reference resolvable even when the
    // plugin collection is dropped first.
    owners: Vec<Rc<Plugin>>,
}

impl MimeTypeArray {
    /// Collection with no mime types.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collect the mime types of every plugin in `plugins`.
    ///
    /// Plugins are scanned in order, each plugin's mime types in order. An
    /// entry is skipped when its type is empty or already admitted; the
    /// scan then continues with the rest of that plugin's entries.
    pub fn assemble(plugins: &PluginArray) -> Self {
        let mut mime_types = Vec::new();
        let mut by_type = KeyIndex::new();

        for plugin in plugins.iter() {
            for mime in plugin.mime_types() {
                let ty = mime.mime_type();
                if ty.is_empty() || by_type.contains(ty) {
                    continue;
                }
                by_type.bind_first(ty, mime_types.len());
                mime_types.push(Rc::clone(mime));
            }
        }

        Self {
            mime_types,
            by_type,
            owners: plugins.as_slice().to_vec(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<MimeType>> {
        self.mime_types.iter()
    }

    pub fn as_slice(&self) -> &[Rc<MimeType>] {
        &self.mime_types
    }

    /// Whether `mime` is one of this collection's entries (by identity).
    pub fn contains(&self, mime: &Rc<MimeType>) -> bool {
        self.mime_types.iter().any(|own| Rc::ptr_eq(own, mime))
    }
}

impl Addressable for MimeTypeArray {
    type Entry = MimeType;

    fn len(&self) -> usize {
        self.mime_types.len()
    }

    fn item(&self, index: usize) -> Option<Rc<MimeType>> {
        self.mime_types.get(index).cloned()
    }

    fn named_item(&self, key: &str) -> Option<Rc<MimeType>> {
        self.by_type.get(key).and_then(|position| self.item(position))
    }
}
