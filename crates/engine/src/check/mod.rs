//! Compatibility checker
//!
//! `check_compatibility` is a pure function of `(Manifest, Matrix, CheckOptions)`.
//! It never fails fast: every unmet requirement is collected so one run reports
//! everything an integrator must fix.
//!
//! ## Report order
//!
//! 1. `LevelTooLow` (at most one)
//! 2. `MissingRequirement`, in matrix declaration order
//! 3. `KernelRequirementUnmet`, in kernel requirement order
//!
//! ## Version policy
//!
//! A requirement `pkg@M.a-b::I/inst` is met by a manifest entry with the same
//! package, interface, instance and major `M` whose minor `v` satisfies:
//!
//! | Policy | Accepted minors |
//! |--------|-----------------|
//! | `ForwardCompatible` (default) | `v >= a` |
//! | `StrictCeiling` | `a <= v <= b` |

mod diagnostic;
mod kernel;

pub use diagnostic::{Diagnostic, DiagnosticKind, KernelIssue, Verdict};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vintf_core::{Version, VersionRange};

use crate::manifest::Manifest;
use crate::matrix::Matrix;

/// How a matrix's upper minor bound is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionPolicy {
    /// Any minor at or above the range minimum is accepted
    #[default]
    ForwardCompatible,
    /// The minor must lie inside the range
    StrictCeiling,
}

impl VersionPolicy {
    /// True if a served `version` meets `range` under this policy
    pub fn accepts(&self, range: &VersionRange, version: &Version) -> bool {
        match self {
            VersionPolicy::ForwardCompatible => range.supported_by(version),
            VersionPolicy::StrictCeiling => range.contains_version(version),
        }
    }
}

/// Knobs for a compatibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Upper-bound interpretation
    pub version_policy: VersionPolicy,
    /// Run the kernel pass
    pub check_kernel: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            version_policy: VersionPolicy::ForwardCompatible,
            check_kernel: true,
        }
    }
}

impl CheckOptions {
    /// Options with the given version policy and the kernel pass enabled
    pub fn with_policy(version_policy: VersionPolicy) -> Self {
        CheckOptions {
            version_policy,
            ..CheckOptions::default()
        }
    }

    /// Disable the kernel pass
    pub fn without_kernel(mut self) -> Self {
        self.check_kernel = false;
        self
    }
}

type InstanceKey<'a> = (&'a str, &'a str, &'a str);

/// Served versions by (package, interface, instance)
fn index_manifest(manifest: &Manifest) -> FxHashMap<InstanceKey<'_>, Vec<Version>> {
    let mut index: FxHashMap<InstanceKey<'_>, Vec<Version>> = FxHashMap::default();
    for mi in manifest.instances() {
        index
            .entry((mi.package(), mi.interface(), mi.instance()))
            .or_default()
            .push(mi.version());
    }
    for versions in index.values_mut() {
        versions.sort();
        versions.dedup();
    }
    index
}

/// Decide whether `manifest` satisfies `matrix`
///
/// Assumes both inputs are well formed; construction already rejected
/// malformed documents.
pub fn check_compatibility(manifest: &Manifest, matrix: &Matrix, options: &CheckOptions) -> Verdict {
    let mut diagnostics = Vec::new();

    if let (Some(manifest_level), Some(matrix_level)) =
        (manifest.level().specified(), matrix.level().specified())
    {
        if manifest_level < matrix_level {
            diagnostics.push(Diagnostic::LevelTooLow {
                manifest_level,
                matrix_level,
            });
        }
    }

    let index = index_manifest(manifest);
    let mut optional_unmet = 0usize;
    for requirement in matrix.instances() {
        let range = requirement.range();
        let provided = index
            .get(&(requirement.package(), requirement.interface(), requirement.instance()))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        if provided
            .iter()
            .any(|version| options.version_policy.accepts(&range, version))
        {
            continue;
        }
        if requirement.is_optional() {
            optional_unmet += 1;
            continue;
        }
        diagnostics.push(Diagnostic::MissingRequirement {
            requirement: requirement.clone(),
            provided: provided.to_vec(),
        });
    }

    let mut kernel_issues = 0usize;
    if options.check_kernel && !matrix.kernels().is_empty() {
        if let Some(kernel) = manifest.kernel() {
            let issues = kernel::check_kernel(kernel, matrix.kernels());
            kernel_issues = issues.len();
            diagnostics.extend(issues.into_iter().map(Diagnostic::KernelRequirementUnmet));
        }
    }

    debug!(
        manifest_instances = manifest.len(),
        matrix_instances = matrix.len(),
        optional_unmet,
        kernel_issues,
        diagnostics = diagnostics.len(),
        "Compatibility check finished"
    );

    Verdict::from_diagnostics(diagnostics)
}
