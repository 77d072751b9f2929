//! Error types for VINTF model construction and loading
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Compatibility violations are NOT errors: they are accumulated as
//! diagnostics by the checker. Errors here are reserved for input that cannot
//! be represented at all (bad ranges, unparseable identifiers, conflicting
//! fragments) and for failures at the file-system and converter boundaries.

use std::io;
use thiserror::Error;

/// Result type alias for VINTF operations
pub type Result<T> = std::result::Result<T, VintfError>;

/// Error types for VINTF model construction and loading
#[derive(Debug, Error)]
pub enum VintfError {
    /// Version range with `min_minor > max_minor`
    #[error("Invalid version range: {major}.{min_minor}-{max_minor} (minimum minor exceeds maximum)")]
    InvalidVersionRange {
        /// Major version of the rejected range
        major: u32,
        /// Lower minor bound
        min_minor: u32,
        /// Upper minor bound
        max_minor: u32,
    },

    /// Identifier text does not follow `pkg@M.m::Interface/instance`
    #[error("Malformed identifier \"{input}\": {reason}")]
    MalformedIdentifier {
        /// The rejected text
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// Structurally invalid manifest or matrix
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Two fragments or levels cannot be merged
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Path or object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Document could not be converted into a manifest or matrix
    #[error("Cannot parse {path}: {message}")]
    Parse {
        /// Source the text came from (a path, or "<memory>")
        path: String,
        /// Converter message
        message: String,
    },

    /// Configuration value is not acceptable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl VintfError {
    /// Build a `MalformedInput` error
    pub fn malformed(message: impl Into<String>) -> Self {
        VintfError::MalformedInput(message.into())
    }

    /// Build a `MalformedIdentifier` error
    pub fn identifier(input: impl Into<String>, reason: impl Into<String>) -> Self {
        VintfError::MalformedIdentifier {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Build a `Conflict` error
    pub fn conflict(message: impl Into<String>) -> Self {
        VintfError::Conflict(message.into())
    }

    /// Build a `NotFound` error
    pub fn not_found(what: impl Into<String>) -> Self {
        VintfError::NotFound(what.into())
    }

    /// Build a `Parse` error
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        VintfError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors that mean "nothing there", which loaders fall back on.
    pub fn is_not_found(&self) -> bool {
        match self {
            VintfError::NotFound(_) => true,
            VintfError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// True for errors raised while building the in-memory model.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            VintfError::InvalidVersionRange { .. }
                | VintfError::MalformedIdentifier { .. }
                | VintfError::MalformedInput(_)
        )
    }

    /// Prefix the message with context, keeping the variant where it carries text.
    pub fn with_context(self, context: impl AsRef<str>) -> Self {
        let context = context.as_ref();
        match self {
            VintfError::MalformedInput(m) => VintfError::MalformedInput(format!("{}: {}", context, m)),
            VintfError::Conflict(m) => VintfError::Conflict(format!("{}: {}", context, m)),
            VintfError::NotFound(m) => VintfError::NotFound(format!("{}: {}", context, m)),
            other => other,
        }
    }
}
