//! Core value types for VINTF
//!
//! This crate defines the foundational types used throughout the system:
//! - Version / VersionRange: served versions and required minor spans
//! - FqInstance: `package@major.minor::Interface/instance` identifiers
//! - Level: FCM release generation with an `UNSPECIFIED` sentinel
//! - SchemaType / Transport: document side and HAL transport
//! - Kernel types: KernelVersion, KernelConfig, KernelRequirement, KernelInfo
//! - VintfError: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fq_instance;
pub mod hal;
pub mod kernel;
pub mod level;
pub mod version;

pub use error::{Result, VintfError};
pub use fq_instance::FqInstance;
pub use hal::{SchemaType, Transport};
pub use kernel::{KernelConfig, KernelInfo, KernelRequirement, KernelVersion, CONFIG_NOT_SET};
pub use level::Level;
pub use version::{Version, VersionRange};
