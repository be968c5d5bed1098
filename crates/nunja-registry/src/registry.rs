// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The mold registry.
//!
//! `MoldRegistry` scans each declaration's anchor directory, partitions what
//! it finds into molds, and resolves `prefix/basename[/subpath...]`
//! identifiers to paths under the mold's base directory.
//!
//! The mold table is published as an immutable snapshot through `ArcSwap`;
//! registrations serialize on a mutex, build a new snapshot, and swap it in,
//! so readers never see a half-applied registration.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use nunja_config::model::RegistryConfig;
use nunja_core::{
    ExtensionFilter, ModuleLocator, NunjaError, PathResolver, PluginDeclaration, ResourceMap,
    ResourceWalker,
};
use tracing::{debug, info, warn};

use crate::locator::StaticLocator;
use crate::naming::NamingScheme;
use crate::partition::{Partition, partition};
use crate::walker::FsWalker;

/// Naming and lookup settings shared by the registries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Template extension including the dot, e.g. `.nja`.
    pub extension: String,
    /// Basename of the canonical template, without extension.
    pub required_template: String,
    /// Marker prepended to template logical names.
    pub marker_prefix: String,
    /// Track declarations for live lookups of molds added after the scan.
    pub auto_reload: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            extension: ".nja".to_string(),
            required_template: "template".to_string(),
            marker_prefix: "text!".to_string(),
            auto_reload: false,
        }
    }
}

impl RegistrySettings {
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            extension: config.extension.clone(),
            required_template: config.required_template.clone(),
            marker_prefix: config.marker_prefix.clone(),
            auto_reload: config.auto_reload,
        }
    }

    /// File name of the canonical template, e.g. `template.nja`.
    pub fn required_template_file(&self) -> String {
        format!("{}{}", self.required_template, self.extension)
    }
}

/// Reject declarations without exactly one anchor segment.
pub(crate) fn ensure_compatible(
    registry: &str,
    declaration: &PluginDeclaration,
) -> Result<(), NunjaError> {
    if declaration.anchor_segment().is_some() {
        return Ok(());
    }
    warn!(
        declaration = %declaration,
        package = declaration.package_label(),
        registry = registry,
        "declaration '{}' from package '{}' incompatible with registry '{}'; a target dir must be provided after the module",
        declaration,
        declaration.package_label(),
        registry,
    );
    Err(NunjaError::IncompatibleDeclaration {
        declaration: declaration.to_string(),
        registry: registry.to_string(),
    })
}

pub(crate) fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Snapshot of everything a registration produces.
#[derive(Debug, Clone, Default)]
struct MoldTable {
    /// `mold_id -> base directory`.
    molds: HashMap<String, PathBuf>,
    /// `namespace_prefix -> declaration`, only with auto-reload.
    tracked: HashMap<String, PluginDeclaration>,
    /// Record name (mold id, or anchor module for the discard bucket) to resources.
    records: HashMap<String, ResourceMap>,
    /// Package name to the record names it contributed.
    packages: HashMap<String, BTreeSet<String>>,
}

/// Registry of molds discovered from plugin declarations.
pub struct MoldRegistry {
    name: String,
    settings: RegistrySettings,
    locator: Arc<dyn ModuleLocator>,
    walker: Arc<dyn ResourceWalker>,
    table: ArcSwap<MoldTable>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for MoldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.load();
        f.debug_struct("MoldRegistry")
            .field("name", &self.name)
            .field("settings", &self.settings)
            .field("molds", &table.molds.len())
            .field("tracked", &table.tracked.len())
            .finish()
    }
}

/// Builder for [`MoldRegistry`].
pub struct MoldRegistryBuilder {
    name: String,
    settings: RegistrySettings,
    locator: Arc<dyn ModuleLocator>,
    walker: Arc<dyn ResourceWalker>,
}

impl MoldRegistryBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: RegistrySettings::default(),
            locator: Arc::new(StaticLocator::new()),
            walker: Arc::new(FsWalker),
        }
    }

    pub fn settings(mut self, settings: RegistrySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.settings.extension = extension.into();
        self
    }

    pub fn required_template(mut self, required_template: impl Into<String>) -> Self {
        self.settings.required_template = required_template.into();
        self
    }

    pub fn marker_prefix(mut self, marker_prefix: impl Into<String>) -> Self {
        self.settings.marker_prefix = marker_prefix.into();
        self
    }

    pub fn auto_reload(mut self, auto_reload: bool) -> Self {
        self.settings.auto_reload = auto_reload;
        self
    }

    pub fn locator(mut self, locator: impl ModuleLocator + 'static) -> Self {
        self.locator = Arc::new(locator);
        self
    }

    pub fn shared_locator(mut self, locator: Arc<dyn ModuleLocator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn walker(mut self, walker: impl ResourceWalker + 'static) -> Self {
        self.walker = Arc::new(walker);
        self
    }

    /// Build an empty registry.
    pub fn build(self) -> MoldRegistry {
        MoldRegistry {
            name: self.name,
            settings: self.settings,
            locator: self.locator,
            walker: self.walker,
            table: ArcSwap::from_pointee(MoldTable::default()),
            write_lock: Mutex::new(()),
        }
    }

    /// Build the registry and register `declarations` in order.
    ///
    /// Declarations that fail to register are logged and skipped.
    pub fn with_declarations<'a, I>(self, declarations: I) -> MoldRegistry
    where
        I: IntoIterator<Item = &'a PluginDeclaration>,
    {
        let registry = self.build();
        for declaration in declarations {
            // Failures are already logged by `register`.
            let _ = registry.register(declaration);
        }
        registry
    }
}

impl MoldRegistry {
    /// Start building a registry named `name`.
    pub fn builder(name: impl Into<String>) -> MoldRegistryBuilder {
        MoldRegistryBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn auto_reload(&self) -> bool {
        self.settings.auto_reload
    }

    /// Scan `declaration` and merge its molds into the table.
    ///
    /// Returns the number of molds the declaration generated. Declarations
    /// without exactly one anchor segment are rejected without effect.
    /// Mold ids that are already present are overwritten by the later
    /// declaration.
    pub fn register(&self, declaration: &PluginDeclaration) -> Result<usize, NunjaError> {
        ensure_compatible(&self.name, declaration)?;

        let _guard = lock(&self.write_lock);
        let mut table = MoldTable::clone(&self.table.load());

        if self.settings.auto_reload {
            table
                .tracked
                .insert(declaration.namespace_prefix.clone(), declaration.clone());
        }

        let scanned = self.scan(declaration);
        let result = match scanned {
            Ok(found) => {
                let count = found.molds.len();
                self.merge(&mut table, declaration, found);
                info!(
                    declaration = %declaration,
                    module = %declaration.anchor_module,
                    registry = %self.name,
                    "declaration '{}' from module '{}' generated {} molds for registry '{}'",
                    declaration,
                    declaration.anchor_module,
                    count,
                    self.name,
                );
                Ok(count)
            }
            Err(e) => {
                warn!(declaration = %declaration, registry = %self.name, error = %e, "failed to scan declaration");
                Err(e)
            }
        };

        self.table.store(Arc::new(table));
        result
    }

    fn scan(&self, declaration: &PluginDeclaration) -> Result<Partition, NunjaError> {
        let scheme = NamingScheme::new(
            declaration,
            &self.settings.extension,
            &self.settings.marker_prefix,
        );
        let anchor = scheme
            .resolve_anchor(self.locator.as_ref(), declaration)
            .ok_or_else(|| NunjaError::ModuleNotFound {
                module: declaration.anchor_module.clone(),
            })?;
        let module_fragments = declaration.module_segments();

        let template_map = self.walker.walk(
            &anchor,
            &module_fragments,
            &ExtensionFilter::Only(self.settings.extension.clone()),
            &|fragments: &[String]| scheme.template_name(fragments),
        )?;
        let script_map = self.walker.walk(
            &anchor,
            &module_fragments,
            &ExtensionFilter::Except(self.settings.extension.clone()),
            &|fragments: &[String]| scheme.script_name(fragments),
        )?;

        info!(
            declaration = %declaration,
            package = declaration.package_label(),
            registry = %self.name,
            "declaration '{}' from package '{}' provided {} templates and {} scripts to registry '{}'",
            declaration,
            declaration.package_label(),
            template_map.len(),
            script_map.len(),
            self.name,
        );

        Ok(partition(
            &template_map,
            &script_map,
            &self.settings.required_template_file(),
            &self.settings.marker_prefix,
        ))
    }

    fn merge(&self, table: &mut MoldTable, declaration: &PluginDeclaration, found: Partition) {
        for (mold_id, base) in found.molds {
            if let Some(previous) = table.molds.get(&mold_id) {
                warn!(
                    mold_id = %mold_id,
                    previous = %previous.display(),
                    replacement = %base.display(),
                    declaration = %declaration,
                    registry = %self.name,
                    "mold registered again; the later declaration wins"
                );
            }
            table.molds.insert(mold_id, base);
        }

        let names = table
            .packages
            .entry(declaration.package_label().to_string())
            .or_default();
        for (mold_id, related) in found.related {
            names.insert(mold_id.clone());
            table.records.insert(mold_id, related);
        }
        names.insert(declaration.anchor_module.clone());
        table
            .records
            .entry(declaration.anchor_module.clone())
            .or_default()
            .extend(found.discard);
    }

    /// Anchor directory of a tracked declaration, derived on every call.
    fn anchor_dir(&self, declaration: &PluginDeclaration) -> Option<PathBuf> {
        NamingScheme::new(
            declaration,
            &self.settings.extension,
            &self.settings.marker_prefix,
        )
        .resolve_anchor(self.locator.as_ref(), declaration)
    }

    /// Filesystem path of a mold's base directory.
    ///
    /// Falls back to the tracked declaration for the id's prefix when the
    /// mold was not in the scanned table; that result is never cached.
    pub fn mold_id_to_path(&self, mold_id: &str) -> Result<PathBuf, NunjaError> {
        let table = self.table.load();
        if let Some(path) = table.molds.get(mold_id) {
            return Ok(path.clone());
        }

        if table.tracked.is_empty() {
            debug!(mold_id, registry = %self.name, "mold_id not registered");
            return Err(NunjaError::not_found(mold_id));
        }

        let Some((prefix, basename)) = split_mold_id(mold_id) else {
            debug!(mold_id, registry = %self.name, "mold_id not found and not in standard format");
            return Err(NunjaError::not_found(mold_id));
        };

        let Some(declaration) = table.tracked.get(prefix) else {
            debug!(mold_id, prefix, registry = %self.name, "no tracked declaration for prefix");
            return Err(NunjaError::not_found(mold_id));
        };

        self.anchor_dir(declaration)
            .map(|anchor| anchor.join(basename))
            .ok_or_else(|| NunjaError::not_found(mold_id))
    }

    /// Like [`mold_id_to_path`](Self::mold_id_to_path), returning `default` on a miss.
    pub fn mold_id_to_path_or(&self, mold_id: &str, default: impl Into<PathBuf>) -> PathBuf {
        self.mold_id_to_path(mold_id)
            .unwrap_or_else(|_| default.into())
    }

    /// Translate `prefix/basename[/subpath...]` to a path under the mold's
    /// base directory, without checking that it exists.
    ///
    /// Subpath fragments equal to `..` or containing a path separator reject
    /// the whole identifier; empty and `.` fragments are dropped.
    pub fn lookup_path(&self, mold_id_path: &str) -> Result<PathBuf, NunjaError> {
        let (mold_id, subpath) = split_identifier(mold_id_path).ok_or_else(|| {
            debug!(identifier = mold_id_path, registry = %self.name, "traversal rejected");
            NunjaError::not_found(mold_id_path)
        })?;

        let base = self
            .mold_id_to_path(mold_id)
            .map_err(|_| NunjaError::not_found(mold_id_path))?;
        Ok(subpath.into_iter().fold(base, |path, piece| path.join(piece)))
    }

    /// Like [`lookup_path`](Self::lookup_path), returning `default` on a miss.
    pub fn lookup_path_or(&self, mold_id_path: &str, default: impl Into<PathBuf>) -> PathBuf {
        self.lookup_path(mold_id_path)
            .unwrap_or_else(|_| default.into())
    }

    /// Translate an identifier to a path and require it to exist.
    pub fn verify_path(&self, mold_id_path: &str) -> Result<PathBuf, NunjaError> {
        let path = self.lookup_path(mold_id_path)?;
        if !path.exists() {
            debug!(identifier = mold_id_path, path = %path.display(), "resolved path does not exist");
            return Err(NunjaError::not_found(mold_id_path));
        }
        Ok(path)
    }

    /// Like [`verify_path`](Self::verify_path), returning `default` on a miss.
    pub fn verify_path_or(&self, mold_id_path: &str, default: impl Into<PathBuf>) -> PathBuf {
        self.verify_path(mold_id_path)
            .unwrap_or_else(|_| default.into())
    }

    /// Resources recorded under `name`: a mold id, or an anchor module for
    /// its discard bucket. Empty when unknown.
    pub fn get_record(&self, name: &str) -> ResourceMap {
        self.table
            .load()
            .records
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// All resources contributed by `package`, merged.
    pub fn records_for_package(&self, package: &str) -> ResourceMap {
        let table = self.table.load();
        let Some(names) = table.packages.get(package) else {
            return ResourceMap::new();
        };
        names
            .iter()
            .filter_map(|name| table.records.get(name))
            .flat_map(|records| records.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }

    /// Sorted snapshot of `mold_id -> base directory`.
    pub fn molds(&self) -> BTreeMap<String, PathBuf> {
        self.table
            .load()
            .molds
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Sorted mold ids.
    pub fn mold_ids(&self) -> Vec<String> {
        self.molds().into_keys().collect()
    }

    /// Sorted prefixes of tracked declarations.
    pub fn tracked_prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self.table.load().tracked.keys().cloned().collect();
        prefixes.sort();
        prefixes
    }

    /// The tracked declaration for `prefix`, if any.
    pub fn tracked(&self, prefix: &str) -> Option<PluginDeclaration> {
        self.table.load().tracked.get(prefix).cloned()
    }

    /// Anchor directory of the declaration tracked under `prefix`.
    pub fn tracked_anchor(&self, prefix: &str) -> Option<PathBuf> {
        self.tracked(prefix).and_then(|d| self.anchor_dir(&d))
    }

    /// Number of molds in the table.
    pub fn len(&self) -> usize {
        self.table.load().molds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PathResolver for MoldRegistry {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup_path(&self, identifier: &str) -> Result<PathBuf, NunjaError> {
        MoldRegistry::lookup_path(self, identifier)
    }

    fn verify_path(&self, identifier: &str) -> Result<PathBuf, NunjaError> {
        MoldRegistry::verify_path(self, identifier)
    }
}

/// Split a mold id into `(prefix, basename)`.
///
/// The basename must be a single plain directory name.
fn split_mold_id(mold_id: &str) -> Option<(&str, &str)> {
    let (prefix, basename) = mold_id.split_once('/')?;
    if prefix.is_empty() || !is_plain_fragment(basename) {
        return None;
    }
    Some((prefix, basename))
}

/// Split an identifier into its mold id and validated subpath fragments.
///
/// `None` means a fragment tried to leave the mold directory.
fn split_identifier(identifier: &str) -> Option<(&str, Vec<&str>)> {
    let mut cut = identifier.match_indices('/').map(|(i, _)| i);
    let mold_end = match (cut.next(), cut.next()) {
        (Some(_), Some(second)) => second,
        _ => return Some((identifier, Vec::new())),
    };

    let mut subpath = Vec::new();
    for piece in identifier[mold_end + 1..].split('/') {
        if piece == ".." || piece.contains(['/', '\\']) {
            return None;
        }
        if !piece.is_empty() && piece != "." {
            subpath.push(piece);
        }
    }
    Some((&identifier[..mold_end], subpath))
}

fn is_plain_fragment(fragment: &str) -> bool {
    !fragment.is_empty()
        && fragment != "."
        && fragment != ".."
        && !fragment.contains(['/', '\\'])
}
