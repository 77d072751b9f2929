//! VINTF model, checker and loader
//!
//! This crate builds on the value types in `vintf-core`:
//! - Manifest / Matrix: provided and required HAL instances
//! - Checker: pure `(Manifest, Matrix) -> Verdict`, collect-all diagnostics
//! - Combine: level-based merging of framework matrix fragments
//! - Deprecation: served instances dropped by newer matrices
//! - Loader: `VintfObject` reads documents through `FileSystem` + `Converter`
//!
//! Only the loader performs I/O; everything else works on immutable values.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod check;
pub mod combine;
pub mod config;
pub mod converter;
pub mod deprecation;
pub mod fs;
pub mod manifest;
pub mod matrix;
pub mod object;
pub mod paths;

pub use check::{
    check_compatibility, CheckOptions, Diagnostic, DiagnosticKind, KernelIssue, Verdict,
    VersionPolicy,
};
pub use combine::{combine, infer_device_level, Named};
pub use config::{VintfConfig, CONFIG_FILE_NAME};
pub use converter::{Converter, Document, JsonConverter};
pub use deprecation::{
    check_deprecation, DeprecatedInstance, DeprecationReason, DeprecationReport, InstanceLister,
};
pub use fs::{FileSystem, InMemoryFileSystem, RootedFileSystem};
pub use manifest::{Manifest, ManifestBuilder, ManifestInstance};
pub use matrix::{Matrix, MatrixBuilder, MatrixInstance};
pub use object::{CompatibilityReport, VintfObject, VintfObjectBuilder};

pub use vintf_core::{
    FqInstance, KernelConfig, KernelInfo, KernelRequirement, KernelVersion, Level, Result,
    SchemaType, Transport, Version, VersionRange, VintfError, CONFIG_NOT_SET,
};
