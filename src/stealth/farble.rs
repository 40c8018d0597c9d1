//! Farbling of genuine plugins.
//!
//! A farbled plugin keeps the shape of its source (same mime types, same
//! order, same types) but never echoes the real filename, and PDF viewers
//! get a name and description recomposed from fixed word lists. PDF
//! viewers are the default plugin in nearly every browser, which makes
//! their exact naming a strong vendor tell.

use super::addressing::Addressable;
use super::descriptor::{MimeTypeInfo, Plugin};
use super::random::RandomSource;
use std::rc::Rc;
use tracing::debug;

/// Length of the random filename given to every farbled plugin.
pub const FARBLED_FILENAME_LEN: usize = 32;

/// Substring that marks a plugin as a PDF viewer.
pub const PDF_MARKER: &str = "PDF";

/// Vendor / brand prefix. Includes an empty option.
pub const VENDOR_TOKENS: &[&str] = &[
    "Chrome ",
    "Chromium ",
    "Web ",
    "Browser ",
    "OpenSource ",
    "Online ",
    "JavaScript ",
    "",
];

/// Ways of saying "PDF".
pub const PDF_TOKENS: &[&str] = &[
    "PDF ",
    "Portable Document Format ",
    "portable-document-format ",
    "document ",
    "doc ",
    "PDF and PS ",
    "com.adobe.pdf ",
];

/// Ways of saying "viewer". Includes an empty option.
pub const VIEWER_TOKENS: &[&str] = &[
    "Viewer",
    "Renderer",
    "Display",
    "Plugin",
    "plug-in",
    "plug in",
    "extension",
    "",
];

/// Whether `name` is one of the PDF viewer names that get reworded.
pub fn is_pdf_viewer(name: &str) -> bool {
    name.contains(PDF_MARKER)
}

/// Build the farbled copy of `source`.
pub fn farble<R: RandomSource>(random: &mut R, source: &Plugin) -> Rc<Plugin> {
    let (name, description) = if is_pdf_viewer(source.name()) {
        let name = format!(
            "{}{}{}",
            random.pick(VENDOR_TOKENS),
            random.pick(PDF_TOKENS),
            random.pick(VIEWER_TOKENS)
        );
        (name, random.pick(PDF_TOKENS).to_string())
    } else {
        (source.name().to_string(), source.description().to_string())
    };

    // Index scan; the first gap ends it.
    let mime_types: Vec<MimeTypeInfo> = (0..)
        .map_while(|index| source.item(index))
        .map(|mime| mime.to_info())
        .collect();

    let filename = random.random_string(FARBLED_FILENAME_LEN);

    debug!(
        mime_types = mime_types.len(),
        reworded = is_pdf_viewer(source.name()),
        "Farbled plugin"
    );

    Plugin::build(name, filename, description, None, mime_types)
}
