// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem resource walker.

use std::path::{Component, Path};

use nunja_core::{ExtensionFilter, NameFn, NunjaError, ResourceMap, ResourceWalker};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Recursive walker over the real filesystem.
///
/// Entries are visited in file-name order. Symlinked files are indexed under
/// the link's own path; symlinked directories are not descended into.
/// Unreadable entries below the anchor are logged and skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWalker;

impl ResourceWalker for FsWalker {
    fn walk(
        &self,
        anchor_dir: &Path,
        module_fragments: &[String],
        filter: &ExtensionFilter,
        name: &NameFn<'_>,
    ) -> Result<ResourceMap, NunjaError> {
        let mut map = ResourceMap::new();

        if !anchor_dir.is_dir() {
            debug!(anchor = %anchor_dir.display(), "anchor directory missing, nothing to index");
            return Ok(map);
        }

        for entry in WalkDir::new(anchor_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(NunjaError::Io {
                        path: anchor_dir.to_path_buf(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    warn!(
                        path = ?e.path(),
                        error = %e,
                        "skipping unreadable entry"
                    );
                    continue;
                }
            };
            // A symlinked file counts when its target is a regular file.
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(anchor_dir) else {
                continue;
            };
            let Some(mut fragments) = relative_fragments(relative) else {
                debug!(path = %entry.path().display(), "skipping non utf-8 path");
                continue;
            };

            let Some(last) = fragments.last_mut() else {
                continue;
            };
            match filter {
                ExtensionFilter::Only(ext) => match last.strip_suffix(ext.as_str()) {
                    Some(stem) if !stem.is_empty() => *last = stem.to_string(),
                    _ => continue,
                },
                ExtensionFilter::Except(ext) => {
                    if last.ends_with(ext.as_str()) {
                        continue;
                    }
                }
            }

            let mut full = module_fragments.to_vec();
            full.extend(fragments);
            map.insert(name(&full), entry.into_path());
        }

        Ok(map)
    }
}

fn relative_fragments(relative: &Path) -> Option<Vec<String>> {
    relative
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str().map(str::to_string),
            _ => None,
        })
        .collect()
}
