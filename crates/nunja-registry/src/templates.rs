// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-side template registry.
//!
//! Indexes template files only, by their full logical name
//! (`prefix/dir/file.ext`, no marker). Nothing is exported as a record, so
//! raw templates never show up next to the mold records.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use nunja_core::{
    ExtensionFilter, ModuleLocator, NunjaError, PathResolver, PluginDeclaration, ResourceMap,
    ResourceWalker,
};
use tracing::{debug, info, warn};

use crate::locator::StaticLocator;
use crate::naming::NamingScheme;
use crate::registry::{RegistrySettings, ensure_compatible, lock};
use crate::walker::FsWalker;

#[derive(Debug, Clone, Default)]
struct TemplateTable {
    templates: ResourceMap,
    tracked: HashMap<String, PluginDeclaration>,
}

/// Registry of individual template files.
pub struct TemplateRegistry {
    name: String,
    settings: RegistrySettings,
    locator: Arc<dyn ModuleLocator>,
    walker: Arc<dyn ResourceWalker>,
    table: ArcSwap<TemplateTable>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("name", &self.name)
            .field("extension", &self.settings.extension)
            .field("templates", &self.table.load().templates.len())
            .finish()
    }
}

impl TemplateRegistry {
    /// Empty registry using the filesystem walker and `locator`.
    pub fn new(
        name: impl Into<String>,
        settings: RegistrySettings,
        locator: Arc<dyn ModuleLocator>,
    ) -> Self {
        Self {
            name: name.into(),
            settings,
            locator,
            walker: Arc::new(FsWalker),
            table: ArcSwap::from_pointee(TemplateTable::default()),
            write_lock: Mutex::new(()),
        }
    }

    /// Empty registry with default settings and no known modules.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(
            name,
            RegistrySettings::default(),
            Arc::new(StaticLocator::new()),
        )
    }

    pub fn with_walker(mut self, walker: impl ResourceWalker + 'static) -> Self {
        self.walker = Arc::new(walker);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn auto_reload(&self) -> bool {
        self.settings.auto_reload
    }

    /// Index every template under `declaration`'s anchor directory.
    ///
    /// Returns the number of templates the declaration provided.
    pub fn register(&self, declaration: &PluginDeclaration) -> Result<usize, NunjaError> {
        ensure_compatible(&self.name, declaration)?;

        let _guard = lock(&self.write_lock);
        let mut table = TemplateTable::clone(&self.table.load());
        if self.settings.auto_reload {
            table
                .tracked
                .insert(declaration.namespace_prefix.clone(), declaration.clone());
        }

        let result = self.scan(declaration).map(|found| {
            let count = found.len();
            table.templates.extend(found);
            info!(
                declaration = %declaration,
                package = declaration.package_label(),
                registry = %self.name,
                "declaration '{}' from package '{}' provided {} templates to registry '{}'",
                declaration,
                declaration.package_label(),
                count,
                self.name,
            );
            count
        });
        if let Err(e) = &result {
            warn!(declaration = %declaration, registry = %self.name, error = %e, "failed to scan declaration");
        }

        self.table.store(Arc::new(table));
        result
    }

    fn scheme(&self, declaration: &PluginDeclaration) -> NamingScheme {
        NamingScheme::new(declaration, &self.settings.extension, "")
    }

    fn scan(&self, declaration: &PluginDeclaration) -> Result<ResourceMap, NunjaError> {
        let scheme = self.scheme(declaration);
        let anchor = scheme
            .resolve_anchor(self.locator.as_ref(), declaration)
            .ok_or_else(|| NunjaError::ModuleNotFound {
                module: declaration.anchor_module.clone(),
            })?;
        self.walker.walk(
            &anchor,
            &declaration.module_segments(),
            &ExtensionFilter::Only(self.settings.extension.clone()),
            &|fragments: &[String]| scheme.template_name(fragments),
        )
    }

    /// Path of the template named exactly `name`.
    ///
    /// With auto-reload, names under a tracked prefix that were not indexed
    /// are derived from the declaration's anchor directory on every call.
    pub fn lookup_path(&self, name: &str) -> Result<PathBuf, NunjaError> {
        let table = self.table.load();
        if let Some(path) = table.templates.get(name) {
            return Ok(path.clone());
        }
        self.tracked_path(&table, name)
            .ok_or_else(|| NunjaError::not_found(name))
    }

    fn tracked_path(&self, table: &TemplateTable, name: &str) -> Option<PathBuf> {
        let (prefix, rest) = name.split_once('/')?;
        let declaration = table.tracked.get(prefix)?;
        if !rest.ends_with(self.settings.extension.as_str()) {
            return None;
        }
        let pieces: Vec<&str> = rest.split('/').collect();
        if pieces
            .iter()
            .any(|p| p.is_empty() || *p == "." || *p == ".." || p.contains('\\'))
        {
            debug!(name, registry = %self.name, "template name rejected");
            return None;
        }
        let anchor = self
            .scheme(declaration)
            .resolve_anchor(self.locator.as_ref(), declaration)?;
        Some(pieces.into_iter().fold(anchor, |path, piece| path.join(piece)))
    }

    pub fn lookup_path_or(&self, name: &str, default: impl Into<PathBuf>) -> PathBuf {
        self.lookup_path(name).unwrap_or_else(|_| default.into())
    }

    /// Like [`lookup_path`](Self::lookup_path), requiring the file to exist.
    pub fn verify_path(&self, name: &str) -> Result<PathBuf, NunjaError> {
        let path = self.lookup_path(name)?;
        if !path.exists() {
            debug!(name, path = %path.display(), "template file does not exist");
            return Err(NunjaError::not_found(name));
        }
        Ok(path)
    }

    pub fn verify_path_or(&self, name: &str, default: impl Into<PathBuf>) -> PathBuf {
        self.verify_path(name).unwrap_or_else(|_| default.into())
    }

    /// Always empty: this registry exports nothing.
    pub fn get_record(&self, _name: &str) -> ResourceMap {
        ResourceMap::new()
    }

    /// Sorted snapshot of every indexed template.
    pub fn templates(&self) -> BTreeMap<String, PathBuf> {
        self.table.load().templates.clone()
    }

    pub fn tracked_prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self.table.load().tracked.keys().cloned().collect();
        prefixes.sort();
        prefixes
    }

    pub fn len(&self) -> usize {
        self.table.load().templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PathResolver for TemplateRegistry {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup_path(&self, identifier: &str) -> Result<PathBuf, NunjaError> {
        TemplateRegistry::lookup_path(self, identifier)
    }

    fn verify_path(&self, identifier: &str) -> Result<PathBuf, NunjaError> {
        TemplateRegistry::verify_path(self, identifier)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tracing_test::traced_test;

    use super::*;

    fn layout() -> (tempfile::TempDir, Arc<dyn ModuleLocator>) {
        let tmp = tempfile::tempdir().unwrap();
        let tmpl = tmp.path().join("tmpl");
        fs::create_dir_all(tmpl.join("page")).unwrap();
        fs::write(tmpl.join("page").join("base.nja"), "{{ body }}").unwrap();
        fs::write(tmpl.join("page").join("style.css"), "").unwrap();
        let locator: Arc<dyn ModuleLocator> =
            Arc::new(StaticLocator::new().with("site", tmp.path()));
        (tmp, locator)
    }

    #[test]
    fn indexes_templates_by_full_name() {
        let (tmp, locator) = layout();
        let registry = TemplateRegistry::new("nunja.tmpl", RegistrySettings::default(), locator);
        let decl: PluginDeclaration = "site.tmpl = site:tmpl".parse().unwrap();

        assert_eq!(registry.register(&decl).unwrap(), 1);
        let expected = tmp.path().join("tmpl").join("page").join("base.nja");
        assert_eq!(registry.lookup_path("site.tmpl/page/base.nja").unwrap(), expected);
        assert_eq!(registry.verify_path("site.tmpl/page/base.nja").unwrap(), expected);
        assert!(registry.lookup_path("site.tmpl/page/style.css").unwrap_err().is_not_found());
        assert!(registry.get_record("site.tmpl/page").is_empty());
    }

    #[test]
    fn tracked_prefix_resolves_new_templates() {
        let (tmp, locator) = layout();
        let settings = RegistrySettings {
            auto_reload: true,
            ..RegistrySettings::default()
        };
        let registry = TemplateRegistry::new("nunja.tmpl", settings, locator);
        let decl: PluginDeclaration = "site.tmpl = site:tmpl".parse().unwrap();
        registry.register(&decl).unwrap();

        let fresh = tmp.path().join("tmpl").join("fresh.nja");
        assert_eq!(registry.lookup_path("site.tmpl/fresh.nja").unwrap(), fresh);
        assert!(registry.verify_path("site.tmpl/fresh.nja").is_err());
        fs::write(&fresh, "new").unwrap();
        assert_eq!(registry.verify_path("site.tmpl/fresh.nja").unwrap(), fresh);

        assert!(registry.lookup_path("site.tmpl/../secret.nja").is_err());
        assert!(registry.lookup_path("site.tmpl/fresh.txt").is_err());
    }

    #[test]
    #[traced_test]
    fn rejects_declaration_without_anchor() {
        let (_tmp, locator) = layout();
        let registry = TemplateRegistry::new("nunja.tmpl", RegistrySettings::default(), locator);
        let decl: PluginDeclaration = "site.tmpl = site".parse().unwrap();
        assert!(matches!(
            registry.register(&decl),
            Err(NunjaError::IncompatibleDeclaration { .. })
        ));
        assert!(registry.is_empty());
        assert!(logs_contain("incompatible with registry"));
    }

    #[test]
    fn default_variants_return_fallback() {
        let registry = TemplateRegistry::empty("nunja.tmpl");
        assert_eq!(
            registry.lookup_path_or("missing/x.nja", "/fallback"),
            PathBuf::from("/fallback")
        );
        assert_eq!(
            registry.verify_path_or("missing/x.nja", "/fallback"),
            PathBuf::from("/fallback")
        );
    }
}
