//! Fully-qualified HAL instance identifier
//!
//! An instance is addressed by five fields:
//! package, major version, minor version, interface, instance name.
//!
//! ## Text Form
//!
//! ```text
//! android.hardware.foo@1.0::IFoo/default
//! └──── package ─────┘ └┬┘  └┬─┘ └─┬──┘
//!                    version iface instance
//! ```
//!
//! Parsing is strict: a missing `@`, `::` or `/`, or a non-numeric version,
//! fails with `MalformedIdentifier`. `parse(format(x)) == x` for every valid `x`.
//!
//! ## Validation
//!
//! - package: one or more dot-separated identifiers (`[A-Za-z_][A-Za-z0-9_]*`)
//! - interface: a single identifier
//! - instance: non-empty, no whitespace, no `/`

use crate::error::{Result, VintfError};
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fully-qualified instance `package@major.minor::Interface/instance`
///
/// Ordered lexicographically by (package, major, minor, interface, instance),
/// which is the order diagnostics and deduplication rely on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FqInstance {
    package: String,
    version: Version,
    interface: String,
    instance: String,
}

impl FqInstance {
    /// Create an identifier, validating every component
    ///
    /// # Errors
    ///
    /// Returns `VintfError::MalformedIdentifier` if a component is empty or
    /// contains characters not allowed in that position.
    pub fn new(
        package: impl Into<String>,
        version: Version,
        interface: impl Into<String>,
        instance: impl Into<String>,
    ) -> Result<Self> {
        let fq = FqInstance {
            package: package.into(),
            version,
            interface: interface.into(),
            instance: instance.into(),
        };
        fq.validate()?;
        Ok(fq)
    }

    /// Create an identifier without validation
    ///
    /// The caller must ensure every component is valid, e.g. because it was
    /// taken from an already-validated manifest or matrix entry. Use `new()`
    /// for untrusted input.
    pub fn new_unchecked(
        package: impl Into<String>,
        version: Version,
        interface: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        FqInstance {
            package: package.into(),
            version,
            interface: interface.into(),
            instance: instance.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        let describe = || {
            format!(
                "{}@{}::{}/{}",
                self.package, self.version, self.interface, self.instance
            )
        };
        validate_package(&self.package).map_err(|reason| VintfError::identifier(describe(), reason))?;
        validate_interface(&self.interface)
            .map_err(|reason| VintfError::identifier(describe(), reason))?;
        validate_instance(&self.instance).map_err(|reason| VintfError::identifier(describe(), reason))?;
        Ok(())
    }

    /// Parse `package@major.minor::Interface/instance`
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Package name, e.g. `android.hardware.foo`
    #[inline]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Concrete version
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Major version
    #[inline]
    pub fn major(&self) -> u32 {
        self.version.major
    }

    /// Minor version
    #[inline]
    pub fn minor(&self) -> u32 {
        self.version.minor
    }

    /// Interface name, e.g. `IFoo`
    #[inline]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Instance name, e.g. `default`
    #[inline]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Same identifier at another version of the package
    pub fn with_version(&self, version: Version) -> Self {
        FqInstance {
            version,
            ..self.clone()
        }
    }
}

impl fmt::Display for FqInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}::{}/{}",
            self.package, self.version, self.interface, self.instance
        )
    }
}

impl FromStr for FqInstance {
    type Err = VintfError;

    fn from_str(s: &str) -> Result<Self> {
        let (package, rest) = s
            .split_once('@')
            .ok_or_else(|| VintfError::identifier(s, "missing '@' after package"))?;
        let (version, rest) = rest
            .split_once("::")
            .ok_or_else(|| VintfError::identifier(s, "missing \"::\" before interface"))?;
        let (interface, instance) = rest
            .split_once('/')
            .ok_or_else(|| VintfError::identifier(s, "missing '/' before instance"))?;
        let version: Version = version
            .parse()
            .map_err(|_| VintfError::identifier(s, format!("bad version \"{}\"", version)))?;

        FqInstance::new(package, version, interface, instance)
            .map_err(|e| match e {
                VintfError::MalformedIdentifier { reason, .. } => VintfError::identifier(s, reason),
                other => other,
            })
    }
}

impl TryFrom<String> for FqInstance {
    type Error = VintfError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FqInstance> for String {
    fn from(fq: FqInstance) -> Self {
        fq.to_string()
    }
}

/// Check a single identifier `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a reverse-DNS package name
pub fn validate_package(package: &str) -> std::result::Result<(), String> {
    if package.is_empty() {
        return Err("package is empty".to_string());
    }
    for (pos, component) in package.split('.').enumerate() {
        if !is_identifier(component) {
            return Err(format!(
                "package component {} (\"{}\") is not an identifier",
                pos, component
            ));
        }
    }
    Ok(())
}

/// Validate an interface name
pub fn validate_interface(interface: &str) -> std::result::Result<(), String> {
    if interface.is_empty() {
        return Err("interface is empty".to_string());
    }
    if !is_identifier(interface) {
        return Err(format!("interface \"{}\" is not an identifier", interface));
    }
    Ok(())
}

/// Validate an instance name
pub fn validate_instance(instance: &str) -> std::result::Result<(), String> {
    if instance.is_empty() {
        return Err("instance is empty".to_string());
    }
    if let Some((position, c)) = instance
        .chars()
        .enumerate()
        .find(|(_, c)| c.is_whitespace() || *c == '/')
    {
        return Err(format!(
            "invalid character {:?} at position {} in instance",
            c, position
        ));
    }
    Ok(())
}
