// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifier resolution trait consumed by the rendering layer.

use std::path::PathBuf;

use crate::error::NunjaError;

/// Resolves logical identifiers to filesystem paths.
///
/// Every miss is reported as [`NunjaError::NotFound`].
pub trait PathResolver: Send + Sync {
    /// Name the resolver was registered under.
    fn name(&self) -> &str;

    /// Translate an identifier to a path without checking it exists.
    fn lookup_path(&self, identifier: &str) -> Result<PathBuf, NunjaError>;

    /// Translate an identifier to a path that exists on disk.
    fn verify_path(&self, identifier: &str) -> Result<PathBuf, NunjaError>;
}
