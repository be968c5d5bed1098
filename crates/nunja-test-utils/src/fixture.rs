// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary module trees for registry tests.
//!
//! Module `a.b` lives at `<root>/a/b`. Declarations then point at an anchor
//! directory inside the module, e.g. `ns = a.b:mold` scans `<root>/a/b/mold`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nunja_core::ModuleLocator;
use tempfile::TempDir;
use tracing::debug;

/// Template contents written by [`MoldFixture::mold`].
pub const DEFAULT_TEMPLATE: &str = "<div>{{ value }}</div>\n";

/// A temporary directory holding modules and molds.
///
/// The directory is removed when the fixture is dropped.
pub struct MoldFixture {
    dir: TempDir,
}

impl MoldFixture {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// The layout used across the registry tests.
    ///
    /// Module `nunja.testing` with anchor `mold` holding six molds (seven
    /// templates, five scripts) and anchor `badmold` holding one directory
    /// without a canonical template.
    pub fn testing_molds() -> io::Result<Self> {
        let fixture = Self::new()?;
        let module = "nunja.testing";
        fixture.mold(module, "mold", "basic", &[])?;
        fixture.mold(module, "mold", "include_by_name", &["index.js"])?;
        fixture.file(module, "mold/include_by_name/empty.nja", "")?;
        fixture.mold(module, "mold", "include_by_value", &["index.js"])?;
        fixture.mold(module, "mold", "itemlist", &["index.js"])?;
        fixture.mold(module, "mold", "noinit", &["index.js"])?;
        fixture.mold(module, "mold", "problem", &["index.js"])?;
        fixture.file(module, "badmold/nomold/empty.nja", "")?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Directory of a dotted module name (not necessarily created yet).
    pub fn module_dir(&self, module: &str) -> PathBuf {
        module
            .split('.')
            .fold(self.root().to_path_buf(), |dir, segment| dir.join(segment))
    }

    /// Create the directory for `module`.
    pub fn module(&self, module: &str) -> io::Result<PathBuf> {
        let dir = self.module_dir(module);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write `contents` to `relative` (slash separated) inside `module`.
    pub fn file(&self, module: &str, relative: &str, contents: &str) -> io::Result<PathBuf> {
        let path = relative
            .split('/')
            .fold(self.module_dir(module), |dir, piece| dir.join(piece));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        debug!(path = %path.display(), "fixture file written");
        Ok(path)
    }

    /// Create mold `basename` under `module`'s `anchor` directory with a
    /// canonical `template.nja` and the named companion scripts.
    ///
    /// Returns the mold's base directory.
    pub fn mold(
        &self,
        module: &str,
        anchor: &str,
        basename: &str,
        scripts: &[&str],
    ) -> io::Result<PathBuf> {
        let base = format!("{anchor}/{basename}");
        self.file(module, &format!("{base}/template.nja"), DEFAULT_TEMPLATE)?;
        for script in scripts {
            self.file(module, &format!("{base}/{script}"), "define([], function() {});\n")?;
        }
        Ok(self.module_dir(module).join(anchor).join(basename))
    }

    /// A locator resolving modules under this fixture's root.
    pub fn locator(&self) -> FixtureLocator {
        FixtureLocator {
            root: self.root().to_path_buf(),
        }
    }
}

impl ModuleLocator for MoldFixture {
    fn locate(&self, module: &str) -> Option<PathBuf> {
        self.locator().locate(module)
    }
}

/// Resolves dotted module names to existing directories under a root.
#[derive(Debug, Clone)]
pub struct FixtureLocator {
    root: PathBuf,
}

impl ModuleLocator for FixtureLocator {
    fn locate(&self, module: &str) -> Option<PathBuf> {
        if module.split('.').any(|s| s.is_empty() || s == "..") {
            return None;
        }
        let dir = module
            .split('.')
            .fold(self.root.clone(), |dir, segment| dir.join(segment));
        dir.is_dir().then_some(dir)
    }
}
