//! Device-level entry point: load, cache and check VINTF documents
//!
//! `VintfObject` assembles the four documents of a device image from a
//! [`FileSystem`] and checks them pairwise:
//!
//! | Check | Manifest | Matrix |
//! |-------|----------|--------|
//! | device side | device manifest | combined framework matrix |
//! | framework side | framework manifest | device matrix |
//!
//! # Fetch priorities
//!
//! Device manifest:
//! 1. vendor manifest + vendor fragments + ODM manifest (if any) + ODM fragments
//! 2. ODM manifest + ODM fragments
//! 3. legacy `/vendor/manifest.xml`
//!
//! ODM manifest: `manifest_<sku>.xml` before `manifest.xml`, `etc/vintf/`
//! before legacy `etc/`.
//!
//! Framework manifest:
//! 1. system manifest + system fragments + product manifest (if any) + product fragments
//! 2. legacy `/system/manifest.xml`
//!
//! Framework matrix: every parseable framework matrix under
//! `/system/etc/vintf/` plus the product matrix, combined at the device level;
//! legacy `/system/compatibility_matrix.xml` when none exist.
//!
//! # Caching
//!
//! Each document is fetched once and shared as `Arc`; `clear_cache` forces
//! the next call to fetch again. Failed fetches are not cached.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, warn};
use vintf_core::{Result, SchemaType, VintfError};

use crate::check::{check_compatibility, CheckOptions, Verdict};
use crate::combine::{combine, infer_device_level, Named};
use crate::config::VintfConfig;
use crate::converter::{Converter, Document, JsonConverter};
use crate::deprecation::{self, DeprecationReport, InstanceLister};
use crate::fs::{FileSystem, RootedFileSystem};
use crate::manifest::Manifest;
use crate::matrix::Matrix;
use crate::paths;

// ============================================================================
// Cache slot
// ============================================================================

struct Cached<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Cached {
            slot: Mutex::new(None),
        }
    }
}

impl<T> Cached<T> {
    /// Return the cached object, fetching it under the slot lock if absent
    fn get_or_fetch(&self, fetch: impl FnOnce() -> Result<T>) -> Result<Arc<T>> {
        let mut slot = self.slot.lock();
        if let Some(object) = slot.as_ref() {
            return Ok(Arc::clone(object));
        }
        let object = Arc::new(fetch()?);
        *slot = Some(Arc::clone(&object));
        Ok(object)
    }

    fn clear(&self) {
        *self.slot.lock() = None;
    }
}

fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Attach the source path to an error
fn at_path(path: &str, e: VintfError) -> VintfError {
    match e {
        VintfError::Parse { message, .. } => VintfError::parse(path, message),
        VintfError::NotFound(_) => VintfError::not_found(path),
        other => other.with_context(path),
    }
}

// ============================================================================
// Report
// ============================================================================

/// Verdicts of both sides of a full compatibility check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompatibilityReport {
    /// Device manifest against the combined framework matrix
    pub device: Verdict,
    /// Framework manifest against the device matrix
    pub framework: Verdict,
}

impl CompatibilityReport {
    /// True if both sides are compatible
    pub fn is_compatible(&self) -> bool {
        self.device.is_compatible() && self.framework.is_compatible()
    }
}

/// The four documents a full check needs
struct Documents {
    device_manifest: Arc<Manifest>,
    framework_manifest: Arc<Manifest>,
    device_matrix: Arc<Matrix>,
    framework_matrix: Arc<Matrix>,
}

impl Documents {
    fn check(&self, options: &CheckOptions) -> CompatibilityReport {
        CompatibilityReport {
            device: check_compatibility(&self.device_manifest, &self.framework_matrix, options),
            framework: check_compatibility(&self.framework_manifest, &self.device_matrix, options),
        }
    }
}

/// Documents supplied by an update package, replacing those on the device
#[derive(Default)]
struct Overrides {
    device_manifest: Option<Arc<Manifest>>,
    framework_manifest: Option<Arc<Manifest>>,
    device_matrix: Option<Arc<Matrix>>,
    framework_matrix: Option<Arc<Matrix>>,
}

impl Overrides {
    fn set(&mut self, document: Document) -> Result<()> {
        fn put<T>(slot: &mut Option<Arc<T>>, object: T, what: String) -> Result<()> {
            if slot.is_some() {
                return Err(VintfError::conflict(format!("duplicated {}", what)));
            }
            *slot = Some(Arc::new(object));
            Ok(())
        }
        match document {
            Document::Manifest(manifest) => {
                let what = format!("{} manifest", manifest.schema_type());
                let slot = match manifest.schema_type() {
                    SchemaType::Device => &mut self.device_manifest,
                    SchemaType::Framework => &mut self.framework_manifest,
                };
                put(slot, manifest, what)
            }
            Document::Matrix(matrix) => {
                let what = format!("{} compatibility matrix", matrix.schema_type());
                let slot = match matrix.schema_type() {
                    SchemaType::Device => &mut self.device_matrix,
                    SchemaType::Framework => &mut self.framework_matrix,
                };
                put(slot, matrix, what)
            }
        }
    }
}

// ============================================================================
// VintfObject
// ============================================================================

/// Loader and cache for the VINTF documents of one device image
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use vintf_engine::{InMemoryFileSystem, VintfObject};
///
/// let fs = Arc::new(InMemoryFileSystem::new());
/// let vintf = VintfObject::builder().file_system(fs).build()?;
/// assert!(vintf.device_manifest().unwrap_err().is_not_found());
/// # Ok::<(), vintf_engine::VintfError>(())
/// ```
pub struct VintfObject {
    fs: Arc<dyn FileSystem>,
    converter: Arc<dyn Converter>,
    config: VintfConfig,
    options: CheckOptions,
    device_manifest: Cached<Manifest>,
    framework_manifest: Cached<Manifest>,
    device_matrix: Cached<Matrix>,
    framework_matrix: Cached<Matrix>,
}

impl std::fmt::Debug for VintfObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VintfObject")
            .field("config", &self.config)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl VintfObject {
    /// Start configuring a loader
    pub fn builder() -> VintfObjectBuilder {
        VintfObjectBuilder::new()
    }

    /// Configuration in effect
    pub fn config(&self) -> &VintfConfig {
        &self.config
    }

    /// Drop every cached document
    pub fn clear_cache(&self) {
        self.device_manifest.clear();
        self.framework_manifest.clear();
        self.device_matrix.clear();
        self.framework_matrix.clear();
    }

    // ------------------------------------------------------------------------
    // Cached documents
    // ------------------------------------------------------------------------

    /// Device HAL manifest
    pub fn device_manifest(&self) -> Result<Arc<Manifest>> {
        self.device_manifest
            .get_or_fetch(|| self.fetch_device_manifest())
    }

    /// Framework HAL manifest
    pub fn framework_manifest(&self) -> Result<Arc<Manifest>> {
        self.framework_manifest
            .get_or_fetch(|| self.fetch_framework_manifest())
    }

    /// Device compatibility matrix
    pub fn device_matrix(&self) -> Result<Arc<Matrix>> {
        self.device_matrix.get_or_fetch(|| self.fetch_device_matrix())
    }

    /// Framework compatibility matrix combined for the device level
    pub fn framework_matrix(&self) -> Result<Arc<Matrix>> {
        // Fetch the device manifest before taking the framework matrix lock.
        let device_manifest = match self.device_manifest() {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                debug!(target: "vintf::object", error = %e, "No device manifest for FCM level inference");
                None
            }
        };

        self.framework_matrix.get_or_fetch(|| {
            match self.combined_framework_matrix(device_manifest.as_deref()) {
                Err(e) if e.is_not_found() => {
                    debug!(
                        target: "vintf::object",
                        error = %e,
                        "Falling back to {}", paths::SYSTEM_LEGACY_MATRIX
                    );
                    self.fetch_matrix(paths::SYSTEM_LEGACY_MATRIX)
                }
                other => other,
            }
        })
    }

    // ------------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------------

    /// Check the documents on the device against each other
    ///
    /// Both sides are always checked and reported.
    ///
    /// # Errors
    ///
    /// Fails if any of the four documents cannot be loaded.
    pub fn check_compatibility(&self) -> Result<CompatibilityReport> {
        let documents = self.load_documents(Overrides::default())?;
        Ok(documents.check(&self.options))
    }

    /// Check as if the given documents replaced their counterparts on the device
    ///
    /// Each text is a manifest or matrix document, e.g. from an update package.
    ///
    /// # Errors
    ///
    /// - `Parse` if a document cannot be parsed
    /// - `Conflict` if two documents of the same kind and schema type are given
    /// - any error loading a document that was not supplied
    pub fn check_compatibility_with<S: AsRef<str>>(&self, documents: &[S]) -> Result<CompatibilityReport> {
        let mut overrides = Overrides::default();
        for (index, text) in documents.iter().enumerate() {
            let document = self
                .converter
                .parse_document(text.as_ref())
                .map_err(|e| at_path(&format!("update package document {}", index), e))?;
            overrides.set(document)?;
        }
        let documents = self.load_documents(overrides)?;
        Ok(documents.check(&self.options))
    }

    /// Served instances the matrix at the device level has deprecated
    ///
    /// # Errors
    ///
    /// - `MalformedInput` if the device manifest declares no level
    /// - `NotFound` if no framework matrix exists at that level
    pub fn check_deprecation(&self) -> Result<DeprecationReport> {
        let manifest = self.device_manifest()?;
        self.check_deprecation_with(manifest.as_ref())
    }

    /// Deprecation check with served instances taken from `lister`
    pub fn check_deprecation_with<L>(&self, lister: &L) -> Result<DeprecationReport>
    where
        L: InstanceLister + ?Sized,
    {
        let fragments = self.framework_matrix_levels()?;
        let manifest = self.device_manifest()?;
        deprecation::check_deprecation(&fragments, manifest.level(), lister)
    }

    // ------------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------------

    fn load_documents(&self, overrides: Overrides) -> Result<Documents> {
        Ok(Documents {
            device_manifest: match overrides.device_manifest {
                Some(m) => m,
                None => self.device_manifest()?,
            },
            framework_manifest: match overrides.framework_manifest {
                Some(m) => m,
                None => self.framework_manifest()?,
            },
            device_matrix: match overrides.device_matrix {
                Some(m) => m,
                None => self.device_matrix()?,
            },
            framework_matrix: match overrides.framework_matrix {
                Some(m) => m,
                None => self.framework_matrix()?,
            },
        })
    }

    fn fetch_manifest(&self, path: &str) -> Result<Manifest> {
        let text = self.fs.fetch(path).map_err(|e| at_path(path, e))?;
        self.converter
            .parse_manifest(&text)
            .map_err(|e| at_path(path, e))
    }

    fn fetch_matrix(&self, path: &str) -> Result<Matrix> {
        let text = self.fs.fetch(path).map_err(|e| at_path(path, e))?;
        self.converter
            .parse_matrix(&text)
            .map_err(|e| at_path(path, e))
    }

    /// Add every manifest fragment in `dir`; a missing directory adds nothing
    fn add_directory_manifests(&self, dir: &str, mut manifest: Manifest) -> Result<Manifest> {
        let files = match optional(self.fs.list_files(dir))? {
            Some(files) => files,
            None => return Ok(manifest),
        };
        for file in files {
            let path = format!("{}{}", dir, file);
            let fragment = self.fetch_manifest(&path)?;
            manifest = manifest
                .add_all(&fragment)
                .map_err(|e| e.with_context(format!("Cannot add manifest fragment {}", path)))?;
        }
        Ok(manifest)
    }

    fn fetch_odm_manifest(&self) -> Result<Option<Manifest>> {
        for path in paths::odm_manifest_candidates(self.config.product_sku.as_deref()) {
            if let Some(manifest) = optional(self.fetch_manifest(&path))? {
                return Ok(Some(manifest));
            }
        }
        Ok(None)
    }

    fn fetch_device_manifest(&self) -> Result<Manifest> {
        let vendor = optional(self.fetch_manifest(paths::VENDOR_MANIFEST))?;
        let vendor = match vendor {
            Some(vendor) => Some(self.add_directory_manifests(paths::VENDOR_MANIFEST_FRAGMENT_DIR, vendor)?),
            None => None,
        };
        let odm = self.fetch_odm_manifest()?;

        match (vendor, odm) {
            (Some(vendor), odm) => {
                let manifest = match odm {
                    Some(odm) => vendor
                        .add_all(&odm)
                        .map_err(|e| e.with_context("Cannot add ODM manifest"))?,
                    None => vendor,
                };
                self.add_directory_manifests(paths::ODM_MANIFEST_FRAGMENT_DIR, manifest)
            }
            (None, Some(odm)) => self.add_directory_manifests(paths::ODM_MANIFEST_FRAGMENT_DIR, odm),
            (None, None) => self.fetch_manifest(paths::VENDOR_LEGACY_MANIFEST),
        }
    }

    fn fetch_framework_manifest(&self) -> Result<Manifest> {
        let system = match self.fetch_manifest(paths::SYSTEM_MANIFEST) {
            Ok(system) => system,
            Err(e) => {
                warn!(
                    target: "vintf::object",
                    error = %e,
                    "Cannot fetch {}; using {}",
                    paths::SYSTEM_MANIFEST,
                    paths::SYSTEM_LEGACY_MANIFEST
                );
                return self.fetch_manifest(paths::SYSTEM_LEGACY_MANIFEST);
            }
        };
        let mut manifest = self.add_directory_manifests(paths::SYSTEM_MANIFEST_FRAGMENT_DIR, system)?;
        if let Some(product) = optional(self.fetch_manifest(paths::PRODUCT_MANIFEST))? {
            manifest = manifest
                .add_all(&product)
                .map_err(|e| e.with_context(format!("Cannot add {}", paths::PRODUCT_MANIFEST)))?;
        }
        self.add_directory_manifests(paths::PRODUCT_MANIFEST_FRAGMENT_DIR, manifest)
    }

    fn fetch_device_matrix(&self) -> Result<Matrix> {
        match self.fetch_matrix(paths::VENDOR_MATRIX) {
            Ok(matrix) => Ok(matrix),
            Err(e) => {
                debug!(target: "vintf::object", error = %e, "Falling back to {}", paths::VENDOR_LEGACY_MATRIX);
                self.fetch_matrix(paths::VENDOR_LEGACY_MATRIX)
            }
        }
    }

    /// Every framework matrix fragment, one per file, in listing order
    ///
    /// Files under the system directory that cannot be fetched or are not
    /// framework matrices (the system manifest lives there too) are skipped.
    ///
    /// # Errors
    ///
    /// `NotFound` if no fragment could be loaded.
    pub fn framework_matrix_levels(&self) -> Result<Vec<Named<Matrix>>> {
        let mut fragments = Vec::new();
        for file in self.fs.list_files(paths::SYSTEM_VINTF_DIR)? {
            let path = format!("{}{}", paths::SYSTEM_VINTF_DIR, file);
            let text = match self.fs.fetch(&path) {
                Ok(text) => text,
                Err(e) => {
                    error!(target: "vintf::object", path = %path, error = %e, "Framework matrix: ignoring file");
                    continue;
                }
            };
            match self.converter.parse_matrix(&text) {
                Ok(matrix) if matrix.schema_type() == SchemaType::Framework => {
                    fragments.push(Named::new(path, matrix));
                }
                Ok(_) => {
                    debug!(target: "vintf::object", path = %path, "Framework matrix: ignoring device matrix");
                }
                Err(e) => {
                    debug!(target: "vintf::object", path = %path, error = %e, "Framework matrix: ignoring file");
                }
            }
        }

        match self.fetch_matrix(paths::PRODUCT_MATRIX) {
            Ok(matrix) => fragments.push(Named::new(paths::PRODUCT_MATRIX, matrix)),
            Err(e) if e.is_not_found() => {
                debug!(target: "vintf::object", "Framework matrix: missing {}", paths::PRODUCT_MATRIX);
            }
            Err(e) => return Err(e),
        }

        if fragments.is_empty() {
            return Err(VintfError::not_found(format!(
                "framework matrices under {}",
                paths::SYSTEM_VINTF_DIR
            )));
        }
        Ok(fragments)
    }

    fn combined_framework_matrix(&self, device_manifest: Option<&Manifest>) -> Result<Matrix> {
        let fragments = self.framework_matrix_levels()?;
        let manifest_level = device_manifest.map(Manifest::level).unwrap_or_default();
        let device_level = infer_device_level(manifest_level, self.config.first_api_level, &fragments)?;
        combine(device_level, &fragments)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`VintfObject`]
///
/// Defaults: the real file system at `/`, [`JsonConverter`], and
/// [`VintfConfig::default`].
#[derive(Default)]
pub struct VintfObjectBuilder {
    fs: Option<Arc<dyn FileSystem>>,
    converter: Option<Arc<dyn Converter>>,
    config: VintfConfig,
}

impl VintfObjectBuilder {
    /// Builder with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read documents from `fs`
    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Parse documents with `converter`
    pub fn converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Use `config`
    pub fn config(mut self, config: VintfConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and produce the loader
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configured version policy is unknown.
    pub fn build(self) -> Result<VintfObject> {
        let options = self.config.check_options()?;
        Ok(VintfObject {
            fs: self
                .fs
                .unwrap_or_else(|| Arc::new(RootedFileSystem::new("/"))),
            converter: self
                .converter
                .unwrap_or_else(|| Arc::new(JsonConverter::new())),
            config: self.config,
            options,
            device_manifest: Cached::default(),
            framework_manifest: Cached::default(),
            device_matrix: Cached::default(),
            framework_matrix: Cached::default(),
        })
    }
}
