//! HAL manifest: the instances a device or framework build provides
//!
//! A `Manifest` is an immutable value object. Build one with
//! [`ManifestBuilder`], or merge fragments with [`Manifest::add_all`]; both
//! validate the uniqueness invariant before a `Manifest` exists.
//!
//! ## Uniqueness
//!
//! (package, major, interface, instance) maps to exactly one served minor.
//! Different majors of the same instance may coexist (`@1.0` and `@2.0`).
//! Re-adding an identical entry is a no-op.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use vintf_core::{
    FqInstance, KernelInfo, Level, Result, SchemaType, Transport, Version, VintfError,
};

use crate::check::{check_compatibility, CheckOptions, Verdict};
use crate::matrix::Matrix;

/// One provided HAL instance at a concrete version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestInstance {
    #[serde(rename = "fqname")]
    fq_instance: FqInstance,
    #[serde(default)]
    transport: Transport,
}

impl ManifestInstance {
    /// Wrap an identifier with its transport
    pub fn new(fq_instance: FqInstance, transport: Transport) -> Self {
        ManifestInstance {
            fq_instance,
            transport,
        }
    }

    /// Parse `package@M.m::Interface/instance`
    pub fn parse(fq: &str, transport: Transport) -> Result<Self> {
        Ok(ManifestInstance::new(FqInstance::parse(fq)?, transport))
    }

    /// Full identifier
    #[inline]
    pub fn fq_instance(&self) -> &FqInstance {
        &self.fq_instance
    }

    /// Package name
    #[inline]
    pub fn package(&self) -> &str {
        self.fq_instance.package()
    }

    /// Served version
    #[inline]
    pub fn version(&self) -> Version {
        self.fq_instance.version()
    }

    /// Interface name
    #[inline]
    pub fn interface(&self) -> &str {
        self.fq_instance.interface()
    }

    /// Instance name
    #[inline]
    pub fn instance(&self) -> &str {
        self.fq_instance.instance()
    }

    /// Transport
    #[inline]
    pub fn transport(&self) -> Transport {
        self.transport
    }
}

type InstanceKey = (String, u32, String, String);

fn instance_key(mi: &ManifestInstance) -> InstanceKey {
    (
        mi.package().to_string(),
        mi.version().major,
        mi.interface().to_string(),
        mi.instance().to_string(),
    )
}

/// Instance list with the uniqueness invariant enforced on insert
#[derive(Default)]
struct InstanceSet {
    minors: BTreeMap<InstanceKey, u32>,
    instances: Vec<ManifestInstance>,
}

impl InstanceSet {
    /// Insert, returning a description of the conflict on failure
    fn insert(&mut self, mi: ManifestInstance) -> std::result::Result<(), String> {
        let key = instance_key(&mi);
        match self.minors.get(&key).copied() {
            Some(minor) if minor == mi.version().minor => Ok(()),
            Some(minor) => Err(format!(
                "{} conflicts with already declared {}",
                mi.fq_instance(),
                mi.fq_instance().with_version(Version::new(key.1, minor))
            )),
            None => {
                self.minors.insert(key, mi.version().minor);
                self.instances.push(mi);
                Ok(())
            }
        }
    }
}

/// Collection of provided HAL instances plus metadata
///
/// # Example
///
/// ```
/// use vintf_engine::{ManifestBuilder, SchemaType, Transport};
///
/// let manifest = ManifestBuilder::new(SchemaType::Device)
///     .hal("android.hardware.foo@1.1::IFoo/default", Transport::Hwbinder)?
///     .build()?;
/// assert_eq!(manifest.len(), 1);
/// # Ok::<(), vintf_engine::VintfError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ManifestDocument")]
pub struct Manifest {
    #[serde(rename = "type")]
    schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "level_is_unspecified")]
    level: Level,
    #[serde(rename = "hals")]
    instances: Vec<ManifestInstance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kernel: Option<KernelInfo>,
}

pub(crate) fn level_is_unspecified(level: &Level) -> bool {
    !level.is_specified()
}

#[derive(Deserialize)]
struct ManifestDocument {
    #[serde(rename = "type")]
    schema_type: SchemaType,
    #[serde(default)]
    level: Level,
    #[serde(default)]
    hals: Vec<ManifestInstance>,
    #[serde(default)]
    kernel: Option<KernelInfo>,
}

impl TryFrom<ManifestDocument> for Manifest {
    type Error = VintfError;

    fn try_from(doc: ManifestDocument) -> Result<Self> {
        let mut builder = ManifestBuilder::new(doc.schema_type).level(doc.level);
        if let Some(kernel) = doc.kernel {
            builder = builder.kernel(kernel);
        }
        builder.instances(doc.hals).build()
    }
}

impl Manifest {
    /// Start building a manifest
    pub fn builder(schema_type: SchemaType) -> ManifestBuilder {
        ManifestBuilder::new(schema_type)
    }

    /// Empty manifest of the given type
    pub fn empty(schema_type: SchemaType) -> Self {
        Manifest {
            schema_type,
            level: Level::UNSPECIFIED,
            instances: Vec::new(),
            kernel: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Device or framework
    #[inline]
    pub fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    /// Target FCM level (device manifests) or `UNSPECIFIED`
    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Declared kernel, if any
    #[inline]
    pub fn kernel(&self) -> Option<&KernelInfo> {
        self.kernel.as_ref()
    }

    /// All instances, in the order they were added
    #[inline]
    pub fn instances(&self) -> &[ManifestInstance] {
        &self.instances
    }

    /// Number of instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True if no instance is declared
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Visit every instance; `f` returns false to stop early.
    ///
    /// Returns false if enumeration was stopped.
    pub fn for_each_instance<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&ManifestInstance) -> bool,
    {
        self.instances.iter().all(|mi| f(mi))
    }

    /// Visit instances of `package@version::interface` served at the same
    /// major and at least the requested minor.
    pub fn for_each_instance_of_interface<F>(
        &self,
        package: &str,
        version: Version,
        interface: &str,
        mut f: F,
    ) -> bool
    where
        F: FnMut(&ManifestInstance) -> bool,
    {
        self.instances
            .iter()
            .filter(|mi| {
                mi.package() == package
                    && mi.interface() == interface
                    && mi.version().minor_at_least(&version)
            })
            .all(|mi| f(mi))
    }

    /// Every instance of (package, interface, instance), across majors
    pub fn instances_of<'a>(
        &'a self,
        package: &'a str,
        interface: &'a str,
        instance: &'a str,
    ) -> impl Iterator<Item = &'a ManifestInstance> + 'a {
        self.instances.iter().filter(move |mi| {
            mi.package() == package && mi.interface() == interface && mi.instance() == instance
        })
    }

    /// True if exactly this identifier is declared
    pub fn provides(&self, fq: &FqInstance) -> bool {
        self.instances.iter().any(|mi| mi.fq_instance() == fq)
    }

    /// Transport of `package@version::interface/instance`
    ///
    /// Matches an instance at the same major with at least the requested
    /// minor. Returns `Transport::Empty` if none is declared.
    pub fn transport(
        &self,
        package: &str,
        version: Version,
        interface: &str,
        instance: &str,
    ) -> Transport {
        self.instances_of(package, interface, instance)
            .find(|mi| mi.version().minor_at_least(&version))
            .map(|mi| mi.transport())
            .unwrap_or_default()
    }

    /// Distinct package names, sorted
    pub fn packages(&self) -> BTreeSet<&str> {
        self.instances.iter().map(|mi| mi.package()).collect()
    }

    /// Distinct `package@major.minor` strings, sorted
    pub fn package_versions(&self) -> BTreeSet<String> {
        self.instances
            .iter()
            .map(|mi| format!("{}@{}", mi.package(), mi.version()))
            .collect()
    }

    /// Check this manifest against `matrix`
    pub fn check_compatibility(&self, matrix: &Matrix, options: &CheckOptions) -> Verdict {
        check_compatibility(self, matrix, options)
    }

    // =========================================================================
    // Fragments
    // =========================================================================

    /// Union this manifest with a fragment, producing a new manifest
    ///
    /// # Errors
    ///
    /// Returns `VintfError::Conflict` if the schema types differ, both
    /// declare different levels, both declare kernels with different
    /// versions or config values, or an instance is served at two minors.
    pub fn add_all(&self, other: &Manifest) -> Result<Manifest> {
        if self.schema_type != other.schema_type {
            return Err(VintfError::conflict(format!(
                "Cannot add {} manifest to {} manifest",
                other.schema_type, self.schema_type
            )));
        }

        let level = match (self.level.specified(), other.level.specified()) {
            (Some(a), Some(b)) if a != b => {
                return Err(VintfError::conflict(format!(
                    "Conflicting target-level: {} vs. {}",
                    a, b
                )));
            }
            (Some(a), _) => a,
            (None, Some(b)) => b,
            (None, None) => Level::UNSPECIFIED,
        };

        let kernel = match (&self.kernel, &other.kernel) {
            (Some(a), Some(b)) => Some(merge_kernel_info(a, b)?),
            (Some(k), None) | (None, Some(k)) => Some(k.clone()),
            (None, None) => None,
        };

        let mut set = InstanceSet::default();
        for mi in self.instances.iter().chain(other.instances.iter()) {
            set.insert(mi.clone()).map_err(VintfError::conflict)?;
        }

        Ok(Manifest {
            schema_type: self.schema_type,
            level,
            instances: set.instances,
            kernel,
        })
    }
}

fn merge_kernel_info(a: &KernelInfo, b: &KernelInfo) -> Result<KernelInfo> {
    if a.version != b.version {
        return Err(VintfError::conflict(format!(
            "Conflicting kernel: {} vs. {}",
            a.version, b.version
        )));
    }
    let mut merged = a.clone();
    for (key, value) in &b.configs {
        match merged.configs.get(key) {
            Some(existing) if existing != value => {
                return Err(VintfError::conflict(format!(
                    "Conflicting kernel config {}: {} vs. {}",
                    key, existing, value
                )));
            }
            Some(_) => {}
            None => {
                merged.configs.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(merged)
}

/// Builder for [`Manifest`]
///
/// Collects entries, then validates them all in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    schema_type: SchemaType,
    level: Level,
    instances: Vec<ManifestInstance>,
    kernel: Option<KernelInfo>,
}

impl ManifestBuilder {
    /// New builder for a device or framework manifest
    pub fn new(schema_type: SchemaType) -> Self {
        ManifestBuilder {
            schema_type,
            level: Level::UNSPECIFIED,
            instances: Vec::new(),
            kernel: None,
        }
    }

    /// Set the target FCM level
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Declare the device kernel
    pub fn kernel(mut self, kernel: KernelInfo) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Add an instance
    pub fn instance(mut self, instance: ManifestInstance) -> Self {
        self.instances.push(instance);
        self
    }

    /// Add several instances
    pub fn instances(mut self, instances: impl IntoIterator<Item = ManifestInstance>) -> Self {
        self.instances.extend(instances);
        self
    }

    /// Add an instance from its text form
    ///
    /// # Errors
    ///
    /// Returns `MalformedIdentifier` if `fq` does not parse.
    pub fn hal(self, fq: &str, transport: Transport) -> Result<Self> {
        Ok(self.instance(ManifestInstance::parse(fq, transport)?))
    }

    /// Validate and produce the manifest
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if an instance is served at two minors of the
    /// same major, or a framework manifest declares a kernel.
    pub fn build(self) -> Result<Manifest> {
        if self.kernel.is_some() && self.schema_type == SchemaType::Framework {
            return Err(VintfError::malformed(
                "framework manifest cannot declare a kernel",
            ));
        }
        let mut set = InstanceSet::default();
        for mi in self.instances {
            set.insert(mi).map_err(VintfError::malformed)?;
        }
        Ok(Manifest {
            schema_type: self.schema_type,
            level: self.level,
            instances: set.instances,
            kernel: self.kernel,
        })
    }
}
