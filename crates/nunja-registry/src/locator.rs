// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Module locators mapping dotted module references to directories.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nunja_config::model::ModulesConfig;
use nunja_core::ModuleLocator;

/// Explicit `module -> directory` table.
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    modules: HashMap<String, PathBuf>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a module mapping.
    pub fn insert(&mut self, module: impl Into<String>, dir: impl Into<PathBuf>) {
        self.modules.insert(module.into(), dir.into());
    }

    pub fn with(mut self, module: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.insert(module, dir);
        self
    }
}

impl ModuleLocator for StaticLocator {
    fn locate(&self, module: &str) -> Option<PathBuf> {
        self.modules.get(module).cloned()
    }
}

/// Resolves `a.b.c` to the first `<root>/a/b/c` directory found.
#[derive(Debug, Clone, Default)]
pub struct RootLocator {
    roots: Vec<PathBuf>,
}

impl RootLocator {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ModuleLocator for RootLocator {
    fn locate(&self, module: &str) -> Option<PathBuf> {
        if module.is_empty() || module.split('.').any(|s| s.is_empty() || s == "..") {
            return None;
        }
        self.roots
            .iter()
            .map(|root| module.split('.').fold(root.clone(), |dir, s| dir.join(s)))
            .find(|dir| dir.is_dir())
    }
}

/// Explicit mappings first, then search roots.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocator {
    explicit: StaticLocator,
    roots: RootLocator,
}

impl ConfiguredLocator {
    pub fn from_config(config: &ModulesConfig) -> Self {
        let mut explicit = StaticLocator::new();
        for (module, dir) in &config.paths {
            explicit.insert(module.clone(), Path::new(dir));
        }
        Self {
            explicit,
            roots: RootLocator::new(config.roots.iter().map(PathBuf::from)),
        }
    }
}

impl ModuleLocator for ConfiguredLocator {
    fn locate(&self, module: &str) -> Option<PathBuf> {
        self.explicit
            .locate(module)
            .or_else(|| self.roots.locate(module))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn static_locator_returns_registered_dirs() {
        let locator = StaticLocator::new().with("tmp", "/tmp/base");
        assert_eq!(locator.locate("tmp"), Some(PathBuf::from("/tmp/base")));
        assert_eq!(locator.locate("other"), None);
    }

    #[test]
    fn root_locator_walks_dotted_segments() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("acme").join("widgets")).unwrap();

        let missing = tmp.path().join("missing");
        let locator = RootLocator::new([missing, tmp.path().to_path_buf()]);
        assert_eq!(
            locator.locate("acme.widgets"),
            Some(tmp.path().join("acme").join("widgets"))
        );
        assert_eq!(locator.locate("acme.gadgets"), None);
        assert_eq!(locator.locate("acme..widgets"), None);
        assert_eq!(locator.locate(""), None);
    }

    #[test]
    fn configured_locator_prefers_explicit_paths() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("acme")).unwrap();

        let config = ModulesConfig {
            roots: vec![tmp.path().display().to_string()],
            paths: BTreeMap::from([("acme".to_string(), "/pkg/acme".to_string())]),
        };
        let locator = ConfiguredLocator::from_config(&config);
        assert_eq!(locator.locate("acme"), Some(PathBuf::from("/pkg/acme")));

        let config = ModulesConfig {
            roots: vec![tmp.path().display().to_string()],
            paths: BTreeMap::new(),
        };
        let locator = ConfiguredLocator::from_config(&config);
        assert_eq!(locator.locate("acme"), Some(tmp.path().join("acme")));
    }
}
