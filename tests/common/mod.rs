//! Shared test utilities for all integration test suites.
//!
//! Include from a suite's main.rs with `#[path = "../common/mod.rs"] mod common;`.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::Arc;

pub use vintf::{
    check_compatibility, CheckOptions, Converter, Diagnostic, DiagnosticKind, FqInstance,
    InMemoryFileSystem, JsonConverter, Level, Manifest, ManifestBuilder, Matrix, MatrixBuilder,
    MatrixInstance, Named, SchemaType, Transport, Verdict, Version, VersionPolicy, VersionRange,
    VintfConfig, VintfError, VintfObject,
};

// ============================================================================
// Model builders
// ============================================================================

/// Manifest serving `instances` over hwbinder.
pub fn manifest_of(schema_type: SchemaType, level: Level, instances: &[&str]) -> Manifest {
    let mut builder = ManifestBuilder::new(schema_type).level(level);
    for fq in instances {
        builder = builder
            .hal(fq, Transport::Hwbinder)
            .expect("valid test instance");
    }
    builder.build().expect("valid test manifest")
}

/// Device manifest with no level.
pub fn device_manifest(instances: &[&str]) -> Manifest {
    manifest_of(SchemaType::Device, Level::UNSPECIFIED, instances)
}

/// Matrix from `(pattern, optional)` pairs.
pub fn matrix_of(schema_type: SchemaType, level: Level, required: &[(&str, bool)]) -> Matrix {
    let mut builder = MatrixBuilder::new(schema_type).level(level);
    for (pattern, optional) in required {
        builder = builder.hal(pattern, *optional).expect("valid test pattern");
    }
    builder.build().expect("valid test matrix")
}

/// Framework matrix with no level.
pub fn framework_matrix(required: &[(&str, bool)]) -> Matrix {
    matrix_of(SchemaType::Framework, Level::UNSPECIFIED, required)
}

/// Framework matrix fragment at `level`, named like the files on a device.
pub fn fragment(level: Level, required: &[(&str, bool)]) -> Named<Matrix> {
    Named::new(
        format!("/system/etc/vintf/compatibility_matrix.{}.xml", level),
        matrix_of(SchemaType::Framework, level, required),
    )
}

/// Package names of the `MissingRequirement` diagnostics, in report order.
pub fn missing(verdict: &Verdict) -> Vec<String> {
    verdict
        .diagnostics()
        .iter()
        .filter_map(Diagnostic::requirement)
        .map(|r| r.to_string())
        .collect()
}

// ============================================================================
// DeviceImage - in-memory device file tree
// ============================================================================

/// In-memory device image with documents stored as JSON.
pub struct DeviceImage {
    pub fs: Arc<InMemoryFileSystem>,
}

impl DeviceImage {
    pub fn new() -> Self {
        DeviceImage {
            fs: Arc::new(InMemoryFileSystem::new()),
        }
    }

    pub fn manifest(self, path: &str, manifest: &Manifest) -> Self {
        let text = JsonConverter::new()
            .serialize_manifest(manifest)
            .expect("serializable manifest");
        self.fs.insert(path, text);
        self
    }

    pub fn matrix(self, path: &str, matrix: &Matrix) -> Self {
        let text = JsonConverter::new()
            .serialize_matrix(matrix)
            .expect("serializable matrix");
        self.fs.insert(path, text);
        self
    }

    pub fn raw(self, path: &str, text: &str) -> Self {
        self.fs.insert(path, text);
        self
    }

    pub fn vintf(&self) -> VintfObject {
        self.vintf_with(VintfConfig::default())
    }

    pub fn vintf_with(&self, config: VintfConfig) -> VintfObject {
        VintfObject::builder()
            .file_system(self.fs.clone())
            .config(config)
            .build()
            .expect("valid loader config")
    }
}

impl Default for DeviceImage {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test subscriber once so `RUST_LOG`-style output shows up with --nocapture.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
