//! Checker configuration via `vintf.toml`
//!
//! A default `vintf.toml` can be written next to the device image; edit it to
//! change how checks run. Values that stand in for device properties
//! (`product_sku`, `first_api_level`) are optional.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use vintf_core::{Result, VintfError};

use crate::check::{CheckOptions, VersionPolicy};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "vintf.toml";

/// Configuration loaded from `vintf.toml`.
///
/// # Example
///
/// ```toml
/// # "forward-compatible" (default) or "strict-ceiling"
/// version_policy = "forward-compatible"
/// check_kernel = true
/// # product_sku = "sku1"
/// # first_api_level = 28
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VintfConfig {
    /// Version policy: `"forward-compatible"` or `"strict-ceiling"`.
    #[serde(default = "default_version_policy")]
    pub version_policy: String,
    /// Run the kernel pass.
    #[serde(default = "default_check_kernel")]
    pub check_kernel: bool,
    /// ODM SKU used to pick `manifest_<sku>.xml`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_sku: Option<String>,
    /// API level the device first shipped with, used to infer its FCM level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_api_level: Option<u32>,
}

fn default_version_policy() -> String {
    "forward-compatible".to_string()
}

fn default_check_kernel() -> bool {
    true
}

impl Default for VintfConfig {
    fn default() -> Self {
        Self {
            version_policy: default_version_policy(),
            check_kernel: default_check_kernel(),
            product_sku: None,
            first_api_level: None,
        }
    }
}

impl VintfConfig {
    /// Parse the policy string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for anything but `"forward-compatible"` or
    /// `"strict-ceiling"`.
    pub fn version_policy(&self) -> Result<VersionPolicy> {
        match self.version_policy.as_str() {
            "forward-compatible" => Ok(VersionPolicy::ForwardCompatible),
            "strict-ceiling" => Ok(VersionPolicy::StrictCeiling),
            other => Err(VintfError::InvalidConfig(format!(
                "Invalid version_policy '{}' in vintf.toml. Expected \"forward-compatible\" or \"strict-ceiling\".",
                other
            ))),
        }
    }

    /// Options for [`check_compatibility`](crate::check::check_compatibility).
    pub fn check_options(&self) -> Result<CheckOptions> {
        Ok(CheckOptions {
            version_policy: self.version_policy()?,
            check_kernel: self.check_kernel,
        })
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# VINTF compatibility check configuration
#
# How a matrix range's upper minor bound is read:
#   "forward-compatible" (default) = any minor at or above the minimum is accepted
#   "strict-ceiling"               = the minor must lie inside the range
version_policy = "forward-compatible"

# Check the device kernel against framework kernel requirements (default: true)
check_kernel = true

# ODM SKU; selects /odm/etc/vintf/manifest_<sku>.xml when present.
# product_sku = "sku1"

# API level the device first shipped with; used when the device manifest
# does not declare a target FCM level.
# first_api_level = 28
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `InvalidConfig` if it does
    /// not parse or names an unknown policy.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            )
        })?;
        let config: VintfConfig = toml::from_str(&content).map_err(|e| {
            VintfError::InvalidConfig(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        // Validate the policy eagerly
        config.version_policy()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to write default config file '{}': {}",
                        path.display(),
                        e
                    ),
                )
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            VintfError::InvalidConfig(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to write config file '{}': {}", path.display(), e),
            )
        })?;
        Ok(())
    }
}
