//! Compatibility matrix: the instance patterns a build requires
//!
//! A `Matrix` is an immutable value object holding `MatrixInstance`s in
//! declaration order. Order is significant: the checker walks entries in this
//! order and diagnostics reference entries in the same order.
//!
//! ## Expansion
//!
//! A `MatrixInstance` with range `M.a-b` stands for the concrete identifiers
//! `pkg@M.a`, `pkg@M.(a+1)`, ..., `pkg@M.b`. Expansion is lazy:
//! [`MatrixInstance::expand`] and [`Matrix::expanded_instances`] produce one
//! `FqInstance` at a time, and [`Matrix::for_each_instance`] stops as soon as
//! the callback returns false.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use vintf_core::fq_instance::{validate_instance, validate_interface, validate_package};
use vintf_core::{
    FqInstance, KernelRequirement, Level, Result, SchemaType, VersionRange, VintfError,
};

use crate::manifest::level_is_unspecified;

/// One required instance pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMatrixInstance")]
pub struct MatrixInstance {
    package: String,
    #[serde(rename = "versions")]
    range: VersionRange,
    interface: String,
    instance: String,
    #[serde(default)]
    optional: bool,
}

#[derive(Deserialize)]
struct RawMatrixInstance {
    package: String,
    versions: VersionRange,
    interface: String,
    instance: String,
    #[serde(default)]
    optional: bool,
}

impl TryFrom<RawMatrixInstance> for MatrixInstance {
    type Error = VintfError;

    fn try_from(raw: RawMatrixInstance) -> Result<Self> {
        MatrixInstance::new(raw.package, raw.versions, raw.interface, raw.instance, raw.optional)
    }
}

/// Identity of a requirement for merging: (package, major, interface, instance)
pub type RequirementKey<'a> = (&'a str, u32, &'a str, &'a str);

impl MatrixInstance {
    /// Create a requirement, validating every name
    ///
    /// # Errors
    ///
    /// Returns `MalformedIdentifier` if a name is empty or invalid.
    pub fn new(
        package: impl Into<String>,
        range: VersionRange,
        interface: impl Into<String>,
        instance: impl Into<String>,
        optional: bool,
    ) -> Result<Self> {
        let mi = MatrixInstance {
            package: package.into(),
            range,
            interface: interface.into(),
            instance: instance.into(),
            optional,
        };
        let check = |r: std::result::Result<(), String>| {
            r.map_err(|reason| VintfError::identifier(mi.to_string(), reason))
        };
        check(validate_package(&mi.package))?;
        check(validate_interface(&mi.interface))?;
        check(validate_instance(&mi.instance))?;
        Ok(mi)
    }

    /// Parse `package@M.a-b::Interface/instance` (or `@M.a`, `@M.a-M.b`)
    pub fn parse(s: &str, optional: bool) -> Result<Self> {
        let (package, rest) = s
            .split_once('@')
            .ok_or_else(|| VintfError::identifier(s, "missing '@' after package"))?;
        let (range, rest) = rest
            .split_once("::")
            .ok_or_else(|| VintfError::identifier(s, "missing \"::\" before interface"))?;
        let (interface, instance) = rest
            .split_once('/')
            .ok_or_else(|| VintfError::identifier(s, "missing '/' before instance"))?;
        let range: VersionRange = range.parse().map_err(|e| match e {
            VintfError::InvalidVersionRange { .. } => e,
            _ => VintfError::identifier(s, format!("bad version range \"{}\"", range)),
        })?;
        MatrixInstance::new(package, range, interface, instance, optional)
    }

    /// Package name
    #[inline]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Required version range
    #[inline]
    pub fn range(&self) -> VersionRange {
        self.range
    }

    /// Interface name
    #[inline]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Instance name
    #[inline]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// True if a missing instance does not break compatibility
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Merge identity
    pub fn key(&self) -> RequirementKey<'_> {
        (
            &self.package,
            self.range.major(),
            &self.interface,
            &self.instance,
        )
    }

    /// One identifier per minor version in range, lowest first
    pub fn expand(&self) -> impl Iterator<Item = FqInstance> + '_ {
        self.range.versions().map(move |version| {
            FqInstance::new_unchecked(
                self.package.as_str(),
                version,
                self.interface.as_str(),
                self.instance.as_str(),
            )
        })
    }

    pub(crate) fn widen(&mut self, other: &MatrixInstance) {
        if let Some(union) = self.range.union(&other.range) {
            self.range = union;
        }
        self.optional &= other.optional;
    }
}

impl fmt::Display for MatrixInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}::{}/{}",
            self.package, self.range, self.interface, self.instance
        )
    }
}

/// Collection of required instance patterns plus metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MatrixDocument")]
pub struct Matrix {
    #[serde(rename = "type")]
    schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "level_is_unspecified")]
    level: Level,
    #[serde(rename = "hals")]
    instances: Vec<MatrixInstance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    kernels: Vec<KernelRequirement>,
}

#[derive(Deserialize)]
struct MatrixDocument {
    #[serde(rename = "type")]
    schema_type: SchemaType,
    #[serde(default)]
    level: Level,
    #[serde(default)]
    hals: Vec<MatrixInstance>,
    #[serde(default)]
    kernels: Vec<KernelRequirement>,
}

impl TryFrom<MatrixDocument> for Matrix {
    type Error = VintfError;

    fn try_from(doc: MatrixDocument) -> Result<Self> {
        MatrixBuilder::new(doc.schema_type)
            .level(doc.level)
            .instances(doc.hals)
            .kernels(doc.kernels)
            .build()
    }
}

impl Matrix {
    /// Start building a matrix
    pub fn builder(schema_type: SchemaType) -> MatrixBuilder {
        MatrixBuilder::new(schema_type)
    }

    pub(crate) fn from_parts(
        schema_type: SchemaType,
        level: Level,
        instances: Vec<MatrixInstance>,
        kernels: Vec<KernelRequirement>,
    ) -> Self {
        Matrix {
            schema_type,
            level,
            instances,
            kernels,
        }
    }

    /// Device or framework
    #[inline]
    pub fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    /// FCM level that introduced these requirements, or `UNSPECIFIED`
    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Requirements in declaration order
    #[inline]
    pub fn instances(&self) -> &[MatrixInstance] {
        &self.instances
    }

    /// Kernel requirements
    #[inline]
    pub fn kernels(&self) -> &[KernelRequirement] {
        &self.kernels
    }

    /// Number of requirements
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True if nothing is required
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Every expanded identifier with the requirement it came from
    pub fn expanded_instances(&self) -> impl Iterator<Item = (&MatrixInstance, FqInstance)> + '_ {
        self.instances
            .iter()
            .flat_map(|mi| mi.expand().map(move |fq| (mi, fq)))
    }

    /// Visit every expanded identifier; `f` returns false to stop early.
    ///
    /// Returns false if enumeration was stopped.
    pub fn for_each_instance<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&MatrixInstance, &FqInstance) -> bool,
    {
        for (mi, fq) in self.expanded_instances() {
            if !f(mi, &fq) {
                return false;
            }
        }
        true
    }

    /// Visit requirements of one package; `f` returns false to stop early.
    pub fn for_each_instance_of_package<F>(&self, package: &str, mut f: F) -> bool
    where
        F: FnMut(&MatrixInstance) -> bool,
    {
        self.instances
            .iter()
            .filter(|mi| mi.package() == package)
            .all(|mi| f(mi))
    }

    /// Distinct package names, sorted
    pub fn packages(&self) -> BTreeSet<&str> {
        self.instances.iter().map(|mi| mi.package()).collect()
    }
}

/// Builder for [`Matrix`]
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    schema_type: SchemaType,
    level: Level,
    instances: Vec<MatrixInstance>,
    kernels: Vec<KernelRequirement>,
}

impl MatrixBuilder {
    /// New builder for a device or framework matrix
    pub fn new(schema_type: SchemaType) -> Self {
        MatrixBuilder {
            schema_type,
            level: Level::UNSPECIFIED,
            instances: Vec::new(),
            kernels: Vec::new(),
        }
    }

    /// Set the FCM level
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Add a requirement
    pub fn instance(mut self, instance: MatrixInstance) -> Self {
        self.instances.push(instance);
        self
    }

    /// Add several requirements
    pub fn instances(mut self, instances: impl IntoIterator<Item = MatrixInstance>) -> Self {
        self.instances.extend(instances);
        self
    }

    /// Add a requirement from its text form
    pub fn hal(self, pattern: &str, optional: bool) -> Result<Self> {
        Ok(self.instance(MatrixInstance::parse(pattern, optional)?))
    }

    /// Add a kernel requirement
    pub fn kernel(mut self, kernel: KernelRequirement) -> Self {
        self.kernels.push(kernel);
        self
    }

    /// Add several kernel requirements
    pub fn kernels(mut self, kernels: impl IntoIterator<Item = KernelRequirement>) -> Self {
        self.kernels.extend(kernels);
        self
    }

    /// Validate and produce the matrix
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if a device matrix declares kernel requirements.
    pub fn build(self) -> Result<Matrix> {
        if !self.kernels.is_empty() && self.schema_type == SchemaType::Device {
            return Err(VintfError::malformed(
                "device compatibility matrix cannot declare kernel requirements",
            ));
        }
        Ok(Matrix::from_parts(
            self.schema_type,
            self.level,
            self.instances,
            self.kernels,
        ))
    }
}
