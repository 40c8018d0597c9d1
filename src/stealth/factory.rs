//! Fabricated plugins.
//!
//! A fake plugin carries random text fields and a single anonymous mime
//! type (empty `type`), so hosts would never list it by name and it never
//! reaches the mime type collection.

use super::descriptor::{MimeTypeInfo, Plugin};
use super::random::RandomSource;
use std::rc::Rc;
use tracing::debug;

/// Length of the fake mime type's description.
pub const FAKE_MIME_DESCRIPTION_LEN: usize = 32;

/// Text field lengths of a fabricated plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeProfile {
    pub name_len: usize,
    pub filename_len: usize,
    pub description_len: usize,
}

impl FakeProfile {
    /// First fake added at levels 0 and 1.
    pub const PRIMARY: FakeProfile = FakeProfile::new(8, 16, 32);

    /// Second fake. One shorter in every field so the two never look alike.
    pub const SECONDARY: FakeProfile = FakeProfile::new(7, 15, 31);

    pub const fn new(name_len: usize, filename_len: usize, description_len: usize) -> Self {
        Self {
            name_len,
            filename_len,
            description_len,
        }
    }
}

/// Fabricate one plugin with the given field lengths.
///
/// Draws the mime description first, then name, filename and description.
pub fn synthesize<R: RandomSource>(random: &mut R, profile: FakeProfile) -> Rc<Plugin> {
    let mime = MimeTypeInfo::new("", random.random_string(FAKE_MIME_DESCRIPTION_LEN), "");
    let name = random.random_string(profile.name_len);
    let filename = random.random_string(profile.filename_len);
    let description = random.random_string(profile.description_len);

    debug!(
        name_len = profile.name_len,
        filename_len = profile.filename_len,
        "Synthesized fake plugin"
    );

    Plugin::build(name, filename, description, None, [mime])
}

/// The pair of fakes used at levels 0 and 1, in profile order.
pub fn synthesize_pair<R: RandomSource>(random: &mut R) -> [Rc<Plugin>; 2] {
    let primary = synthesize(random, FakeProfile::PRIMARY);
    let secondary = synthesize(random, FakeProfile::SECONDARY);
    [primary, secondary]
}
