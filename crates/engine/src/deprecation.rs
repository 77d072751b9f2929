//! Deprecated HAL detection
//!
//! An instance required by an older framework matrix is deprecated on a
//! device when the device keeps serving it but the matrix at the device's own
//! level either dropped it or requires a newer minor version that the device
//! does not serve.
//!
//! What the device serves is asked through [`InstanceLister`], so the check
//! works the same against a parsed manifest or a live service registry.

use std::collections::BTreeSet;

use vintf_core::{FqInstance, Level, Result, Version, VintfError};

use crate::combine::Named;
use crate::manifest::Manifest;
use crate::matrix::{Matrix, MatrixInstance};

/// Source of served instances
pub trait InstanceLister {
    /// Instances of `package@version::interface` served at the same major and
    /// at least the requested minor, as (instance name, served version)
    fn list_instances(&self, package: &str, version: Version, interface: &str) -> Vec<(String, Version)>;
}

impl InstanceLister for Manifest {
    fn list_instances(&self, package: &str, version: Version, interface: &str) -> Vec<(String, Version)> {
        let mut served = Vec::new();
        self.for_each_instance_of_interface(package, version, interface, |mi| {
            served.push((mi.instance().to_string(), mi.version()));
            true
        });
        served
    }
}

impl<F> InstanceLister for F
where
    F: Fn(&str, Version, &str) -> Vec<(String, Version)>,
{
    fn list_instances(&self, package: &str, version: Version, interface: &str) -> Vec<(String, Version)> {
        self(package, version, interface)
    }
}

/// Why a served instance is deprecated
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeprecationReason {
    /// The matrix at the device level no longer requires it
    NotInTargetMatrix {
        /// Level of the target matrix
        target_level: Level,
    },
    /// The target matrix requires at least this version, which is not served
    RequiresAtLeast(Version),
}

/// One deprecated instance the device still serves
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeprecatedInstance {
    /// Instance as served
    pub served: FqInstance,
    /// Why it is deprecated
    pub reason: DeprecationReason,
}

/// Result of a deprecation check, sorted by served instance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeprecationReport {
    /// Deprecated instances
    pub deprecated: Vec<DeprecatedInstance>,
}

impl DeprecationReport {
    /// True if any served instance is deprecated
    pub fn has_deprecated(&self) -> bool {
        !self.deprecated.is_empty()
    }
}

/// Find served instances that older matrices required but the matrix at
/// `device_level` has deprecated
///
/// # Errors
///
/// - `MalformedInput` if `device_level` is unspecified
/// - `NotFound` if no fragment is at exactly `device_level`
pub fn check_deprecation<L>(
    fragments: &[Named<Matrix>],
    device_level: Level,
    lister: &L,
) -> Result<DeprecationReport>
where
    L: InstanceLister + ?Sized,
{
    if !device_level.is_specified() {
        return Err(VintfError::malformed(
            "device manifest does not specify a target FCM level",
        ));
    }
    let target = fragments
        .iter()
        .rev()
        .find(|f| f.object.level() == device_level)
        .map(|f| &f.object)
        .ok_or_else(|| {
            VintfError::not_found(format!("framework matrix at FCM level {}", device_level))
        })?;

    let mut found = BTreeSet::new();
    for fragment in fragments {
        let level = fragment.object.level();
        if !level.is_specified() || level >= device_level {
            continue;
        }
        for old in fragment.object.instances() {
            check_instance(old, target, lister, &mut found);
        }
    }

    Ok(DeprecationReport {
        deprecated: found.into_iter().collect(),
    })
}

fn check_instance<L>(
    old: &MatrixInstance,
    target: &Matrix,
    lister: &L,
    found: &mut BTreeSet<DeprecatedInstance>,
) where
    L: InstanceLister + ?Sized,
{
    let version = old.range().min_version();
    let served = lister
        .list_instances(old.package(), version, old.interface())
        .into_iter()
        .filter(|(instance, _)| instance == old.instance());

    for (instance, served_version) in served {
        let fq = FqInstance::new_unchecked(old.package(), served_version, old.interface(), &instance);

        let mut target_min = None;
        target.for_each_instance_of_package(old.package(), |mi| {
            if mi.range().major() == version.major
                && mi.interface() == old.interface()
                && mi.instance() == instance
            {
                target_min = Some(mi.range().min_version());
            }
            target_min.is_none()
        });

        let reason = match target_min {
            None => Some(DeprecationReason::NotInTargetMatrix {
                target_level: target.level(),
            }),
            Some(min) => {
                let still_served = lister
                    .list_instances(old.package(), min, old.interface())
                    .iter()
                    .any(|(name, _)| *name == instance);
                (!still_served).then_some(DeprecationReason::RequiresAtLeast(min))
            }
        };
        if let Some(reason) = reason {
            found.insert(DeprecatedInstance { served: fq, reason });
        }
    }
}
