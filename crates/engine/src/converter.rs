//! Document conversion boundary
//!
//! The loader turns fetched text into model objects through a [`Converter`].
//! [`JsonConverter`] reads and writes a JSON rendition of the documents:
//!
//! ```json
//! {"manifest": {"type": "device", "level": 3, "hals": [
//!     {"fqname": "android.hardware.foo@1.0::IFoo/default", "transport": "hwbinder"}]}}
//!
//! {"compatibility-matrix": {"type": "framework", "level": 3, "hals": [
//!     {"package": "android.hardware.foo", "versions": "1.0-1.2",
//!      "interface": "IFoo", "instance": "default", "optional": false}]}}
//! ```
//!
//! Documents pass through the validating constructors, so a structurally
//! invalid document is rejected rather than coerced.

use serde::{Deserialize, Serialize};
use vintf_core::{Result, VintfError};

use crate::manifest::Manifest;
use crate::matrix::Matrix;

/// Source name used in errors for text that did not come from a file
pub const IN_MEMORY: &str = "<memory>";

/// Either kind of document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Document {
    /// HAL manifest
    #[serde(rename = "manifest")]
    Manifest(Manifest),
    /// Compatibility matrix
    #[serde(rename = "compatibility-matrix")]
    Matrix(Matrix),
}

/// Text <-> model conversion
pub trait Converter: Send + Sync {
    /// Parse a document of either kind
    fn parse_document(&self, text: &str) -> Result<Document>;

    /// Render a document
    fn serialize_document(&self, document: &Document) -> Result<String>;

    /// Parse a manifest
    ///
    /// # Errors
    ///
    /// Returns `Parse` if the text is not a manifest document.
    fn parse_manifest(&self, text: &str) -> Result<Manifest> {
        match self.parse_document(text)? {
            Document::Manifest(manifest) => Ok(manifest),
            Document::Matrix(_) => Err(VintfError::parse(
                IN_MEMORY,
                "expected a manifest, found a compatibility matrix",
            )),
        }
    }

    /// Parse a compatibility matrix
    ///
    /// # Errors
    ///
    /// Returns `Parse` if the text is not a matrix document.
    fn parse_matrix(&self, text: &str) -> Result<Matrix> {
        match self.parse_document(text)? {
            Document::Matrix(matrix) => Ok(matrix),
            Document::Manifest(_) => Err(VintfError::parse(
                IN_MEMORY,
                "expected a compatibility matrix, found a manifest",
            )),
        }
    }

    /// Render a manifest
    fn serialize_manifest(&self, manifest: &Manifest) -> Result<String> {
        self.serialize_document(&Document::Manifest(manifest.clone()))
    }

    /// Render a compatibility matrix
    fn serialize_matrix(&self, matrix: &Matrix) -> Result<String> {
        self.serialize_document(&Document::Matrix(matrix.clone()))
    }
}

/// JSON documents via `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter {
    pretty: bool,
}

impl JsonConverter {
    /// Compact output
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output
    pub fn pretty() -> Self {
        JsonConverter { pretty: true }
    }
}

impl Converter for JsonConverter {
    fn parse_document(&self, text: &str) -> Result<Document> {
        serde_json::from_str(text).map_err(|e| VintfError::parse(IN_MEMORY, e.to_string()))
    }

    fn serialize_document(&self, document: &Document) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(document)
        } else {
            serde_json::to_string(document)
        };
        text.map_err(|e| VintfError::parse(IN_MEMORY, e.to_string()))
    }
}
