//! Index and key addressing shared by plugins and both collections.
//!
//! Host plugin objects answer `item(i)`, `namedItem(key)` and plain
//! property access (`plugins[0]`, `plugins["Chrome PDF Viewer"]`). Every
//! lookup that misses returns `None`; nothing here fails.

use std::collections::HashMap;
use std::rc::Rc;

/// Integer- and key-addressable sequence.
pub trait Addressable {
    /// What the sequence holds.
    type Entry;

    /// Number of entries reachable by index.
    fn len(&self) -> usize;

    /// Entry at `index`, or `None` past the end.
    fn item(&self, index: usize) -> Option<Rc<Self::Entry>>;

    /// Entry bound under `key`, or `None`.
    fn named_item(&self, key: &str) -> Option<Rc<Self::Entry>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// No-op. Collections never change after assembly.
    fn refresh(&self) {}

    /// `item` for a raw, untyped index argument.
    ///
    /// Anything that is not a non-negative integer yields `None`.
    fn item_from_str(&self, raw: &str) -> Option<Rc<Self::Entry>> {
        parse_index(raw).and_then(|index| self.item(index))
    }

    /// Property-style access: canonical integers address by index,
    /// everything else by key.
    fn lookup(&self, key: &str) -> Option<Rc<Self::Entry>> {
        match parse_index(key) {
            Some(index) => self.item(index),
            None => self.named_item(key),
        }
    }
}

/// Parse a canonical array index (`"0"`, `"17"`; not `"01"`, `"-1"`, `"1.5"`).
pub fn parse_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if raw.len() > 1 && raw.starts_with('0') {
        return None;
    }
    raw.parse().ok()
}

/// Key to position map where the first binding of a key wins.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyIndex {
    positions: HashMap<String, usize>,
}

impl KeyIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `position` unless it is already bound.
    ///
    /// Returns `false` when the key was taken.
    pub(crate) fn bind_first(&mut self, key: &str, position: usize) -> bool {
        if self.positions.contains_key(key) {
            return false;
        }
        self.positions.insert(key.to_string(), position);
        true
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    pub(crate) fn get(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }
}
