//! Plugin and mime type descriptors.
//!
//! Two families of types live here:
//!
//! - [`PluginInfo`] / [`MimeTypeInfo`]: plain records describing what the
//!   host genuinely reports. They come from outside (host collaborator,
//!   JSON file) and may be malformed.
//! - [`Plugin`] / [`MimeType`]: the linked object graph handed to page
//!   scripts. A plugin owns its mime types; each mime type points back at
//!   its plugin by identity.
//!
//! # Example
//!
//! ```rust
//! use plugin_shield::stealth::descriptor::{MimeTypeInfo, Plugin, PluginInfo};
//! use plugin_shield::stealth::Addressable;
//! use std::rc::Rc;
//!
//! let info = PluginInfo::chrome_pdf_viewer();
//! let plugin = Plugin::from_info(&info).unwrap();
//!
//! let pdf = plugin.named_item("application/pdf").unwrap();
//! assert!(Rc::ptr_eq(&pdf.enabled_plugin().unwrap(), &plugin));
//! ```

use super::addressing::{Addressable, KeyIndex};
use serde::{Deserialize, Serialize};
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Errors raised while turning host records into descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The host record carries no mime type list at all.
    #[error("Plugin {name:?} has no mime type list")]
    MissingMimeTypes { name: String },
}

/// Information about a genuine browser plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    /// Plugin name
    #[serde(default)]
    pub name: String,
    /// Plugin description
    #[serde(default)]
    pub description: String,
    /// Plugin filename
    #[serde(default)]
    pub filename: String,
    /// Plugin version (if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// MIME types supported by this plugin. `None` marks a malformed record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_types: Option<Vec<MimeTypeInfo>>,
}

impl PluginInfo {
    /// Create a new plugin info with an empty MIME type list
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            filename: filename.into(),
            version: None,
            mime_types: Some(Vec::new()),
        }
    }

    /// Add a MIME type
    pub fn with_mime_type(mut self, mime_type: MimeTypeInfo) -> Self {
        self.mime_types.get_or_insert_with(Vec::new).push(mime_type);
        self
    }

    /// Set version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Drop the MIME type list, as some broken hosts report it
    pub fn without_mime_types(mut self) -> Self {
        self.mime_types = None;
        self
    }

    /// Generic PDF viewer entry in the shape Chromium reports it
    pub fn pdf_viewer(name: impl Into<String>) -> Self {
        Self::new(name, "Portable Document Format", "internal-pdf-viewer")
            .with_mime_type(MimeTypeInfo::pdf())
            .with_mime_type(MimeTypeInfo::text_pdf())
    }

    /// Chrome PDF Viewer plugin
    pub fn chrome_pdf_viewer() -> Self {
        Self::pdf_viewer("Chrome PDF Viewer")
    }

    /// Chromium PDF Viewer plugin
    pub fn chromium_pdf_viewer() -> Self {
        Self::pdf_viewer("Chromium PDF Viewer")
    }

    /// The plugin list current Chromium-based browsers report.
    pub fn chrome_defaults() -> Vec<PluginInfo> {
        vec![
            Self::pdf_viewer("PDF Viewer"),
            Self::chrome_pdf_viewer(),
            Self::chromium_pdf_viewer(),
            Self::pdf_viewer("Microsoft Edge PDF Viewer"),
            Self::pdf_viewer("WebKit built-in PDF"),
        ]
    }
}

/// Information about a genuine MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeTypeInfo {
    /// MIME type string (e.g., "application/pdf")
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// Description of the MIME type
    #[serde(default)]
    pub description: String,
    /// File extensions (e.g., "pdf")
    #[serde(default)]
    pub suffixes: String,
}

impl MimeTypeInfo {
    /// Create a new MIME type info
    pub fn new(
        mime_type: impl Into<String>,
        description: impl Into<String>,
        suffixes: impl Into<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            description: description.into(),
            suffixes: suffixes.into(),
        }
    }

    /// PDF MIME type
    pub fn pdf() -> Self {
        Self::new("application/pdf", "Portable Document Format", "pdf")
    }

    /// Text PDF MIME type
    pub fn text_pdf() -> Self {
        Self::new("text/pdf", "Portable Document Format", "pdf")
    }
}

/// A plugin as exposed through the plugin surface.
///
/// Immutable once built. Its mime types are addressable by position and by
/// their `type` string; a repeated type stays bound to its first entry.
#[derive(Debug)]
pub struct Plugin {
    name: String,
    filename: String,
    description: String,
    version: Option<String>,
    mime_types: Vec<Rc<MimeType>>,
    by_type: KeyIndex,
}

impl Plugin {
    /// Build a plugin together with its mime types.
    ///
    /// The mime types are created while the plugin is still under
    /// construction and receive their back-reference exactly once.
    pub fn build<I>(
        name: impl Into<String>,
        filename: impl Into<String>,
        description: impl Into<String>,
        version: Option<String>,
        mime_types: I,
    ) -> Rc<Plugin>
    where
        I: IntoIterator<Item = MimeTypeInfo>,
    {
        let (name, filename, description) = (name.into(), filename.into(), description.into());

        Rc::new_cyclic(|owner: &Weak<Plugin>| {
            let mime_types: Vec<Rc<MimeType>> = mime_types
                .into_iter()
                .map(|info| Rc::new(MimeType::owned_by(info, owner.clone())))
                .collect();

            let mut by_type = KeyIndex::new();
            for (position, mime) in mime_types.iter().enumerate() {
                by_type.bind_first(mime.mime_type(), position);
            }

            Plugin {
                name,
                filename,
                description,
                version,
                mime_types,
                by_type,
            }
        })
    }

    /// Build the descriptor for a genuine host record.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::MissingMimeTypes`] when the record has no
    /// mime type list.
    pub fn from_info(info: &PluginInfo) -> Result<Rc<Plugin>, DescriptorError> {
        let mime_types = info
            .mime_types
            .as_ref()
            .ok_or_else(|| DescriptorError::MissingMimeTypes {
                name: info.name.clone(),
            })?;

        Ok(Self::build(
            info.name.as_str(),
            info.filename.as_str(),
            info.description.as_str(),
            info.version.clone(),
            mime_types.iter().cloned(),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Mime types in index order.
    pub fn mime_types(&self) -> &[Rc<MimeType>] {
        &self.mime_types
    }

    /// Type of the index-0 mime type, if there is one.
    pub fn primary_type(&self) -> Option<&str> {
        self.mime_types.first().map(|mime| mime.mime_type())
    }

    /// Hosts hide plugins whose primary mime type is anonymous from name
    /// lookup.
    pub fn is_name_addressable(&self) -> bool {
        self.primary_type().is_some_and(|ty| !ty.is_empty())
    }

    /// Whether `mime` is one of this plugin's own entries (by identity).
    pub fn owns(&self, mime: &Rc<MimeType>) -> bool {
        self.mime_types.iter().any(|own| Rc::ptr_eq(own, mime))
    }

    /// Plain record with the same values.
    pub fn to_info(&self) -> PluginInfo {
        PluginInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            filename: self.filename.clone(),
            version: self.version.clone(),
            mime_types: Some(self.mime_types.iter().map(|m| m.to_info()).collect()),
        }
    }
}

impl Addressable for Plugin {
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

/// A mime type as exposed through the plugin surface.
#[derive(Debug)]
pub struct MimeType {
    mime_type: String,
    suffixes: String,
    description: String,
    enabled_plugin: Weak<Plugin>,
}

impl MimeType {
    fn owned_by(info: MimeTypeInfo, owner: Weak<Plugin>) -> Self {
        Self {
            mime_type: info.mime_type,
            suffixes: info.suffixes,
            description: info.description,
            enabled_plugin: owner,
        }
    }

    /// The `type` string. Empty for fabricated entries.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn suffixes(&self) -> &str {
        &self.suffixes
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The plugin this mime type belongs to.
    ///
    /// Resolves for as long as the plugin is held by a collection.
    pub fn enabled_plugin(&self) -> Option<Rc<Plugin>> {
        self.enabled_plugin.upgrade()
    }

    /// Whether this entry belongs to `plugin` (by identity).
    pub fn is_enabled_by(&self, plugin: &Rc<Plugin>) -> bool {
        std::ptr::eq(self.enabled_plugin.as_ptr(), Rc::as_ptr(plugin))
    }

    /// Plain record with the same values.
    pub fn to_info(&self) -> MimeTypeInfo {
        MimeTypeInfo::new(
            self.mime_type.as_str(),
            self.description.as_str(),
            self.suffixes.as_str(),
        )
    }
}
