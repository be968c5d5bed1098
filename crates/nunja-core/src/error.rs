// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Nunja mold registry.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across the registry crates.
#[derive(Debug, Error)]
pub enum NunjaError {
    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A textual plugin declaration could not be parsed.
    #[error("invalid declaration '{input}': {reason}")]
    InvalidDeclaration { input: String, reason: String },

    /// A declaration parsed fine but does not have the shape a registry needs
    /// (exactly one anchor subpath segment).
    #[error("declaration '{declaration}' incompatible with registry '{registry}'")]
    IncompatibleDeclaration {
        declaration: String,
        registry: String,
    },

    /// The anchor module of a declaration could not be located on disk.
    #[error("module '{module}' could not be located")]
    ModuleNotFound { module: String },

    /// An identifier did not resolve to an existing resource.
    ///
    /// Unknown molds, rejected traversal attempts and missing files all
    /// surface as this variant so callers cannot probe for forbidden paths.
    #[error("no such file or directory: '{identifier}'")]
    NotFound { identifier: String },

    /// Filesystem errors while indexing an anchor directory.
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NunjaError {
    /// Shorthand for the collapsed resolution failure.
    pub fn not_found(identifier: impl Into<String>) -> Self {
        NunjaError::NotFound {
            identifier: identifier.into(),
        }
    }

    /// Returns true for resolution failures (`NotFound`).
    pub fn is_not_found(&self) -> bool {
        matches!(self, NunjaError::NotFound { .. })
    }
}

impl From<NunjaError> for std::io::Error {
    fn from(err: NunjaError) -> Self {
        match err {
            NunjaError::NotFound { .. } => {
                std::io::Error::new(std::io::ErrorKind::NotFound, err.to_string())
            }
            NunjaError::Io { source, .. } => source,
            other => std::io::Error::other(other.to_string()),
        }
    }
}
