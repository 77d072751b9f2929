//! VINTF - vendor interface compatibility checking
//!
//! A device image carries HAL manifests (what each side provides) and
//! compatibility matrices (what each side requires). This crate decides
//! whether they fit together.
//!
//! # Quick Start
//!
//! ```
//! use vintf::{check_compatibility, CheckOptions, ManifestBuilder, MatrixBuilder, SchemaType, Transport};
//!
//! let manifest = ManifestBuilder::new(SchemaType::Device)
//!     .hal("android.hardware.foo@1.1::IFoo/default", Transport::Hwbinder)?
//!     .build()?;
//! let matrix = MatrixBuilder::new(SchemaType::Framework)
//!     .hal("android.hardware.foo@1.0-2::IFoo/default", false)?
//!     .build()?;
//!
//! let verdict = check_compatibility(&manifest, &matrix, &CheckOptions::default());
//! assert!(verdict.is_compatible());
//! # Ok::<(), vintf::VintfError>(())
//! ```
//!
//! # Architecture
//!
//! - `vintf-core`: value types (versions, identifiers, levels, kernel info)
//!   and the error type
//! - `vintf-engine`: manifests, matrices, the checker, level merging, and
//!   the [`VintfObject`] loader
//!
//! Everything is re-exported here.

pub use vintf_core::{error, fq_instance, hal, kernel, level, version};
pub use vintf_engine::*;
