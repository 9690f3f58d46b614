use serde::{Deserialize, Serialize};

/// Locator profile: how far and how eagerly the synthesizer walks up the DOM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorProfile {
    /// Maximum number of ancestor levels in a locator
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Stop at the first ancestor carrying an id
    #[serde(default)]
    pub stop_at_id: bool,
}

pub const FULL_PROFILE: &str = "full";
pub const COMPACT_PROFILE: &str = "compact";

fn default_max_depth() -> usize {
    10
}

impl Default for LocatorProfile {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            stop_at_id: false,
        }
    }
}

impl LocatorProfile {
    /// Short locators anchored on the nearest id
    pub fn compact() -> Self {
        Self {
            max_depth: 4,
            stop_at_id: true,
        }
    }

    /// Built-in profile by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            FULL_PROFILE => Some(Self::default()),
            COMPACT_PROFILE => Some(Self::compact()),
            _ => None,
        }
    }
}
