//! Kernel value types
//!
//! - `KernelVersion`: `version.major_rev.minor_rev`, e.g. `4.9.112`
//! - `KernelConfig`: one required `CONFIG_*` key/value pair
//! - `KernelRequirement`: a matrix entry, the configs required from a kernel
//!   branch at or above `min_lts`
//! - `KernelInfo`: what a device manifest declares about its kernel
//!
//! Config values are kept as the literal text (`y`, `m`, `n`, `0x10`, `"str"`);
//! typed interpretation of `.config` files is out of scope.

use crate::error::{Result, VintfError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kernel release `version.major_rev.minor_rev`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KernelVersion {
    /// e.g. 4 in 4.9.112
    pub version: u32,
    /// e.g. 9 in 4.9.112
    pub major_rev: u32,
    /// e.g. 112 in 4.9.112
    pub minor_rev: u32,
}

impl KernelVersion {
    /// Create a kernel version
    pub const fn new(version: u32, major_rev: u32, minor_rev: u32) -> Self {
        KernelVersion {
            version,
            major_rev,
            minor_rev,
        }
    }

    /// True if both belong to the same LTS branch (`version.major_rev`)
    #[inline]
    pub const fn same_branch(&self, other: &KernelVersion) -> bool {
        self.version == other.version && self.major_rev == other.major_rev
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.version, self.major_rev, self.minor_rev)
    }
}

impl FromStr for KernelVersion {
    type Err = VintfError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(VintfError::malformed(format!(
                "kernel version \"{}\" must be VERSION.MAJOR_REV.MINOR_REV",
                s
            )));
        }
        let mut nums = [0u32; 3];
        for (slot, part) in nums.iter_mut().zip(parts.iter()) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VintfError::malformed(format!(
                    "kernel version \"{}\" has non-numeric component \"{}\"",
                    s, part
                )));
            }
            if part.len() > 1 && part.starts_with('0') {
                return Err(VintfError::malformed(format!(
                    "kernel version \"{}\" has leading zero in \"{}\"",
                    s, part
                )));
            }
            *slot = part
                .parse()
                .map_err(|e| VintfError::malformed(format!("kernel version \"{}\": {}", s, e)))?;
        }
        Ok(KernelVersion::new(nums[0], nums[1], nums[2]))
    }
}

impl TryFrom<String> for KernelVersion {
    type Error = VintfError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<KernelVersion> for String {
    fn from(v: KernelVersion) -> Self {
        v.to_string()
    }
}

/// Literal value meaning "not set"
pub const CONFIG_NOT_SET: &str = "n";

fn validate_config_key(key: &str) -> Result<()> {
    let valid = key.len() > "CONFIG_".len()
        && key.starts_with("CONFIG_")
        && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if !valid {
        return Err(VintfError::malformed(format!(
            "kernel config key \"{}\" must match CONFIG_[A-Za-z0-9_]+",
            key
        )));
    }
    Ok(())
}

/// One required kernel config key/value pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawKernelConfig")]
pub struct KernelConfig {
    key: String,
    value: String,
}

#[derive(Deserialize)]
struct RawKernelConfig {
    key: String,
    value: String,
}

impl TryFrom<RawKernelConfig> for KernelConfig {
    type Error = VintfError;

    fn try_from(raw: RawKernelConfig) -> Result<Self> {
        KernelConfig::new(raw.key, raw.value)
    }
}

impl KernelConfig {
    /// Create a config requirement
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if the key is not `CONFIG_*`.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_config_key(&key)?;
        Ok(KernelConfig {
            key,
            value: value.into(),
        })
    }

    /// Config key, e.g. `CONFIG_64BIT`
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Required literal value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// True if `actual` (None = key absent) satisfies this requirement
    ///
    /// A required `n` is met by an absent key.
    pub fn satisfied_by(&self, actual: Option<&str>) -> bool {
        match actual {
            Some(actual) => actual == self.value,
            None => self.value == CONFIG_NOT_SET,
        }
    }
}

/// Kernel configs required from an LTS branch at or above `min_lts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelRequirement {
    /// Minimum LTS release of the branch
    pub min_lts: KernelVersion,
    /// Required configs, in declaration order
    #[serde(default)]
    pub configs: Vec<KernelConfig>,
}

impl KernelRequirement {
    /// Create a requirement
    pub fn new(min_lts: KernelVersion, configs: Vec<KernelConfig>) -> Self {
        KernelRequirement { min_lts, configs }
    }
}

/// Kernel a device manifest declares
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawKernelInfo")]
pub struct KernelInfo {
    /// Running kernel release
    pub version: KernelVersion,
    /// Effective config values by key
    #[serde(default)]
    pub configs: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RawKernelInfo {
    version: KernelVersion,
    #[serde(default)]
    configs: BTreeMap<String, String>,
}

impl TryFrom<RawKernelInfo> for KernelInfo {
    type Error = VintfError;

    fn try_from(raw: RawKernelInfo) -> Result<Self> {
        raw.configs
            .into_iter()
            .try_fold(KernelInfo::new(raw.version), |info, (key, value)| {
                info.with_config(key, value)
            })
    }
}

impl KernelInfo {
    /// Create kernel info with no configs
    pub fn new(version: KernelVersion) -> Self {
        KernelInfo {
            version,
            configs: BTreeMap::new(),
        }
    }

    /// Add a config value
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if the key is not `CONFIG_*`.
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_config_key(&key)?;
        self.configs.insert(key, value.into());
        Ok(self)
    }

    /// Value of a config key, if declared
    pub fn config(&self, key: &str) -> Option<&str> {
        self.configs.get(key).map(String::as_str)
    }
}
