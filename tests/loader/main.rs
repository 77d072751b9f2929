//! Loader Tests
//!
//! Tests for `VintfObject` assembling documents from a device image.
//!
//! ## Test Modules
//!
//! - `manifests`: device and framework manifest fetch priorities
//! - `matrices`: framework matrix levels, combination and legacy fallbacks
//! - `checks`: full checks, update-package overrides and deprecation
//! - `caching`: shared objects and cache invalidation
//! - `rooted`: real files under a temporary root

#[path = "../common/mod.rs"]
mod common;

mod caching;
mod matrices;
