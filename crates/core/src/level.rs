//! Framework Compatibility Matrix (FCM) level
//!
//! A level is a release generation. Manifests declare the level they target;
//! matrices declare the level that introduced their requirements.
//!
//! Levels form a simple total order. [`Level::UNSPECIFIED`] is the terminal
//! sentinel: it sorts after every concrete level and is the `Default`.
//! Callers must check [`Level::is_specified`] before treating an ordering
//! comparison as meaningful.

use serde::{Deserialize, Serialize};
use std::fmt;

/// FCM level (release generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(u32);

impl Level {
    /// Devices launched before FCM levels existed
    pub const LEGACY: Level = Level(0);
    /// Level 1
    pub const O: Level = Level(1);
    /// Level 2
    pub const O_MR1: Level = Level(2);
    /// Level 3
    pub const P: Level = Level(3);
    /// Level 4
    pub const Q: Level = Level(4);
    /// Level 5
    pub const R: Level = Level(5);
    /// No level declared
    pub const UNSPECIFIED: Level = Level(u32::MAX);

    /// Level from its numeric value
    pub const fn new(value: u32) -> Self {
        Level(value)
    }

    /// Numeric value
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// False only for [`Level::UNSPECIFIED`]
    #[inline]
    pub const fn is_specified(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Map a shipping API level to the FCM level it launched with
    ///
    /// API levels below 26 predate FCM versioning and map to `LEGACY`;
    /// unknown future API levels map to `UNSPECIFIED`.
    pub const fn from_api_level(api_level: u32) -> Self {
        match api_level {
            0..=25 => Level::LEGACY,
            26 => Level::O,
            27 => Level::O_MR1,
            28 => Level::P,
            29 => Level::Q,
            30 => Level::R,
            _ => Level::UNSPECIFIED,
        }
    }

    /// `Some(self)` if specified
    pub const fn specified(self) -> Option<Level> {
        if self.is_specified() {
            Some(self)
        } else {
            None
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::UNSPECIFIED
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_specified() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "unspecified")
        }
    }
}
