//! File system boundary used by the loader
//!
//! The model and checker never touch files. [`VintfObject`](crate::VintfObject)
//! reads documents through this trait so the same loader runs against a
//! mounted device image ([`RootedFileSystem`]) or an in-memory image
//! ([`InMemoryFileSystem`]), e.g. the contents of an update package.
//!
//! Both calls are synchronous and fail with an error for which
//! [`VintfError::is_not_found`] is true when the path does not exist.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use vintf_core::{Result, VintfError};

/// Read access to a file tree addressed by absolute, `/`-separated paths
pub trait FileSystem: Send + Sync {
    /// Whole contents of the file at `path`
    fn fetch(&self, path: &str) -> Result<String>;

    /// Names of the files directly inside `dir` (which ends with `/`), sorted
    ///
    /// A directory that exists but holds no files (only subdirectories, or
    /// nothing) lists as empty; `NotFound` means the directory is absent.
    fn list_files(&self, dir: &str) -> Result<Vec<String>>;
}

/// File tree held in memory
#[derive(Debug, Default)]
pub struct InMemoryFileSystem {
    files: RwLock<BTreeMap<String, String>>,
}

impl InMemoryFileSystem {
    /// Empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style
    pub fn with_file(self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file
    pub fn insert(&self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.write().insert(path.into(), contents.into());
    }

    /// Remove a file; returns true if it existed
    pub fn remove(&self, path: &str) -> bool {
        self.files.write().remove(path).is_some()
    }
}

impl FileSystem for InMemoryFileSystem {
    fn fetch(&self, path: &str) -> Result<String> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| VintfError::not_found(path))
    }

    /// A directory exists here when some file lies anywhere beneath it
    fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let files = self.files.read();
        let mut below = files
            .range(dir.to_string()..)
            .take_while(|(path, _)| path.starts_with(dir))
            .peekable();
        if below.peek().is_none() {
            return Err(VintfError::not_found(dir));
        }
        Ok(below
            .filter_map(|(path, _)| {
                let name = &path[dir.len()..];
                (!name.is_empty() && !name.contains('/')).then(|| name.to_string())
            })
            .collect())
    }
}

/// Real file system, with every path resolved under `root`
#[derive(Debug, Clone)]
pub struct RootedFileSystem {
    root: PathBuf,
}

impl RootedFileSystem {
    /// Resolve paths under `root` (`/` for the running device)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        RootedFileSystem { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

fn io_error(path: &str, e: std::io::Error) -> VintfError {
    if e.kind() == std::io::ErrorKind::NotFound {
        VintfError::not_found(path)
    } else {
        VintfError::Io(std::io::Error::new(e.kind(), format!("{}: {}", path, e)))
    }
}

impl FileSystem for RootedFileSystem {
    fn fetch(&self, path: &str) -> Result<String> {
        std::fs::read_to_string(self.resolve(path)).map_err(|e| io_error(path, e))
    }

    fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(self.resolve(dir)).map_err(|e| io_error(dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(dir, e))?;
            if entry.file_type().map_err(|e| io_error(dir, e))?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}
