// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Module location trait.

use std::path::PathBuf;

/// Resolves a dotted module reference to the directory holding it.
pub trait ModuleLocator: Send + Sync {
    /// Returns the absolute directory of `module`, or `None` if it cannot be
    /// located.
    fn locate(&self, module: &str) -> Option<PathBuf>;
}
