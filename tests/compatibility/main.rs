//! Compatibility checker integration tests
//!
//! Manifest/matrix checks end to end: scenarios, version policies, level
//! merging, kernel requirements, deprecation and property tests.

#[path = "../common/mod.rs"]
mod common;

mod deprecation;
mod kernel;
mod merge;
mod version_policy;
