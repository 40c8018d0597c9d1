//! Protection levels for the plugin surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A protection level outside `0..=2`, or an unknown level name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown protection level: {0}. Valid levels are: 0 (minimal), 1 (balanced), 2 (maximum)")]
pub struct LevelError(pub String);

/// How aggressively the genuine plugin model is hidden.
///
/// The numeric values are the ones the settings layer stores and the
/// interception layer passes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProtectionLevel {
    /// Farble the genuine plugins and mix in two fakes.
    Minimal,
    /// Replace everything with two fakes.
    Balanced,
    /// Report no plugins and no mime types at all.
    Maximum,
}

impl ProtectionLevel {
    /// All levels, weakest first.
    pub fn all() -> [ProtectionLevel; 3] {
        [
            ProtectionLevel::Minimal,
            ProtectionLevel::Balanced,
            ProtectionLevel::Maximum,
        ]
    }

    /// Numeric level as used by the settings layer.
    pub fn as_u8(self) -> u8 {
        match self {
            ProtectionLevel::Minimal => 0,
            ProtectionLevel::Balanced => 1,
            ProtectionLevel::Maximum => 2,
        }
    }

    /// Whether this level needs the genuine plugin list at all.
    pub fn uses_genuine_plugins(self) -> bool {
        self == ProtectionLevel::Minimal
    }

    /// Whether this level adds fabricated plugins.
    pub fn adds_fake_plugins(self) -> bool {
        self != ProtectionLevel::Maximum
    }
}

impl Default for ProtectionLevel {
    fn default() -> Self {
        Self::Balanced
    }
}

impl TryFrom<u8> for ProtectionLevel {
    type Error = LevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ProtectionLevel::Minimal),
            1 => Ok(ProtectionLevel::Balanced),
            2 => Ok(ProtectionLevel::Maximum),
            other => Err(LevelError(other.to_string())),
        }
    }
}

impl From<ProtectionLevel> for u8 {
    fn from(level: ProtectionLevel) -> Self {
        level.as_u8()
    }
}

impl std::fmt::Display for ProtectionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtectionLevel::Minimal => write!(f, "minimal"),
            ProtectionLevel::Balanced => write!(f, "balanced"),
            ProtectionLevel::Maximum => write!(f, "maximum"),
        }
    }
}

impl std::str::FromStr for ProtectionLevel {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "minimal" => Ok(ProtectionLevel::Minimal),
            "1" | "balanced" => Ok(ProtectionLevel::Balanced),
            "2" | "maximum" => Ok(ProtectionLevel::Maximum),
            other => Err(LevelError(other.to_string())),
        }
    }
}
