// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource walker trait.

use std::path::Path;

use crate::error::NunjaError;
use crate::types::{ExtensionFilter, ResourceMap};

/// Naming function turning path fragments into a logical name.
pub type NameFn<'a> = dyn Fn(&[String]) -> String + 'a;

/// Recursively enumerates files under an anchor directory.
pub trait ResourceWalker: Send + Sync {
    /// Walk `anchor_dir`, producing `logical name -> absolute path`.
    ///
    /// The fragments handed to `name` are `module_fragments` followed by the
    /// path components relative to `anchor_dir`.
    fn walk(
        &self,
        anchor_dir: &Path,
        module_fragments: &[String],
        filter: &ExtensionFilter,
        name: &NameFn<'_>,
    ) -> Result<ResourceMap, NunjaError>;
}
