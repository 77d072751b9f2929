//! Interface version types
//!
//! ## Version
//!
//! A concrete `major.minor` pair, as served by a manifest entry.
//!
//! ## VersionRange
//!
//! A single major version with an inclusive span of minor versions,
//! `[min_minor, max_minor]`, as required by a matrix entry.
//!
//! Text forms:
//! - `1.2`: exact version / single-minor range
//! - `1.0-1.2`: canonical range form
//! - `1.0-2`: short range form (accepted by the parser)
//!
//! ## Comparison
//!
//! `Version` is totally ordered by (major, minor). `VersionRange` orders by
//! (major, min_minor, max_minor) so it can key deterministic collections; that
//! ordering carries no compatibility meaning.

use crate::error::{Result, VintfError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Concrete interface version `major.minor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    /// Major version; different majors are incompatible
    pub major: u32,
    /// Minor version; higher minors extend lower ones
    pub minor: u32,
}

impl Version {
    /// Create a version
    pub const fn new(major: u32, minor: u32) -> Self {
        Version { major, minor }
    }

    /// True if this version can stand in for `required`:
    /// same major and at least the required minor.
    #[inline]
    pub const fn minor_at_least(&self, required: &Version) -> bool {
        self.major == required.major && self.minor >= required.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn parse_number(input: &str, part: &str, what: &str) -> Result<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VintfError::identifier(
            input,
            format!("{} \"{}\" is not a non-negative integer", what, part),
        ));
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(VintfError::identifier(
            input,
            format!("{} \"{}\" has a leading zero", what, part),
        ));
    }
    part.parse::<u32>()
        .map_err(|e| VintfError::identifier(input, format!("{} \"{}\": {}", what, part, e)))
}

impl FromStr for Version {
    type Err = VintfError;

    fn from_str(s: &str) -> Result<Self> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| VintfError::identifier(s, "version must be MAJOR.MINOR"))?;
        Ok(Version {
            major: parse_number(s, major, "major version")?,
            minor: parse_number(s, minor, "minor version")?,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VintfError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

/// Inclusive span of minor versions within one major version
///
/// ## Invariants
///
/// - `min_minor <= max_minor` (enforced by [`VersionRange::new`])
/// - Immutable once constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    major: u32,
    min_minor: u32,
    max_minor: u32,
}

impl VersionRange {
    /// Create a range, rejecting `min_minor > max_minor`
    ///
    /// # Errors
    ///
    /// Returns `VintfError::InvalidVersionRange` if the bounds are inverted.
    pub fn new(major: u32, min_minor: u32, max_minor: u32) -> Result<Self> {
        if min_minor > max_minor {
            return Err(VintfError::InvalidVersionRange {
                major,
                min_minor,
                max_minor,
            });
        }
        Ok(VersionRange {
            major,
            min_minor,
            max_minor,
        })
    }

    /// Range covering exactly one minor version
    pub const fn exact(major: u32, minor: u32) -> Self {
        VersionRange {
            major,
            min_minor: minor,
            max_minor: minor,
        }
    }

    /// Major version
    #[inline]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Lowest minor version in range
    #[inline]
    pub const fn min_minor(&self) -> u32 {
        self.min_minor
    }

    /// Highest minor version in range
    #[inline]
    pub const fn max_minor(&self) -> u32 {
        self.max_minor
    }

    /// `major.min_minor`
    pub const fn min_version(&self) -> Version {
        Version::new(self.major, self.min_minor)
    }

    /// `major.max_minor`
    pub const fn max_version(&self) -> Version {
        Version::new(self.major, self.max_minor)
    }

    /// True iff same major and `min_minor <= minor <= max_minor`
    #[inline]
    pub const fn contains(&self, major: u32, minor: u32) -> bool {
        self.major == major && self.min_minor <= minor && minor <= self.max_minor
    }

    /// [`contains`](Self::contains) for a [`Version`]
    #[inline]
    pub const fn contains_version(&self, version: &Version) -> bool {
        self.contains(version.major, version.minor)
    }

    /// True iff same major and `minor >= min_minor`
    ///
    /// The upper bound is not a ceiling here: a higher minor of the same major
    /// extends every lower minor.
    #[inline]
    pub const fn supported_by(&self, version: &Version) -> bool {
        self.major == version.major && version.minor >= self.min_minor
    }

    /// True iff same major and the minor spans intersect
    pub fn overlaps(&self, other: &VersionRange) -> bool {
        self.major == other.major
            && self.min_minor.max(other.min_minor) <= self.max_minor.min(other.max_minor)
    }

    /// Smallest range covering both, or `None` when the majors differ
    pub fn union(&self, other: &VersionRange) -> Option<VersionRange> {
        if self.major != other.major {
            return None;
        }
        Some(VersionRange {
            major: self.major,
            min_minor: self.min_minor.min(other.min_minor),
            max_minor: self.max_minor.max(other.max_minor),
        })
    }

    /// Every version in range, lowest minor first
    pub fn versions(&self) -> impl Iterator<Item = Version> + Clone {
        let major = self.major;
        (self.min_minor..=self.max_minor).map(move |minor| Version::new(major, minor))
    }

    /// Number of minor versions in range
    pub fn len(&self) -> usize {
        (self.max_minor - self.min_minor) as usize + 1
    }

    /// Always false; a range holds at least one minor version
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl From<Version> for VersionRange {
    fn from(v: Version) -> Self {
        VersionRange::exact(v.major, v.minor)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min_minor == self.max_minor {
            write!(f, "{}.{}", self.major, self.min_minor)
        } else {
            write!(
                f,
                "{}.{}-{}.{}",
                self.major, self.min_minor, self.major, self.max_minor
            )
        }
    }
}

impl FromStr for VersionRange {
    type Err = VintfError;

    fn from_str(s: &str) -> Result<Self> {
        let (low, high) = match s.split_once('-') {
            Some((low, high)) => (low, Some(high)),
            None => (s, None),
        };
        let min = low.parse::<Version>().map_err(|_| {
            VintfError::identifier(s, "version range must start with MAJOR.MINOR")
        })?;
        let max_minor = match high {
            None => min.minor,
            Some(high) if high.contains('.') => {
                let max = high.parse::<Version>()?;
                if max.major != min.major {
                    return Err(VintfError::identifier(
                        s,
                        "version range must not span major versions",
                    ));
                }
                max.minor
            }
            Some(high) => parse_number(s, high, "maximum minor version")?,
        };
        VersionRange::new(min.major, min.minor, max_minor)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = VintfError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<VersionRange> for String {
    fn from(r: VersionRange) -> Self {
        r.to_string()
    }
}
