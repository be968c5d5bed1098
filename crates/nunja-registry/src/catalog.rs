// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named registries and typed references to them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use nunja_config::NunjaConfig;
use nunja_core::{ModuleLocator, NunjaError, PathResolver, RegistryKind};
use tracing::{debug, info};

use crate::locator::ConfiguredLocator;
use crate::registry::{MoldRegistry, RegistrySettings};
use crate::source::DeclarationSource;
use crate::templates::TemplateRegistry;

/// A registry given either by name or directly.
#[derive(Clone)]
pub enum RegistryRef {
    /// Look the registry up in a catalog.
    Named(String),
    /// Use this resolver as is.
    Instance(Arc<dyn PathResolver>),
}

impl fmt::Debug for RegistryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Instance(resolver) => f.debug_tuple("Instance").field(&resolver.name()).finish(),
        }
    }
}

impl From<&str> for RegistryRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<Arc<dyn PathResolver>> for RegistryRef {
    fn from(resolver: Arc<dyn PathResolver>) -> Self {
        Self::Instance(resolver)
    }
}

/// Registries keyed by name.
#[derive(Clone, Default)]
pub struct RegistryCatalog {
    resolvers: BTreeMap<String, Arc<dyn PathResolver>>,
    molds: BTreeMap<String, Arc<MoldRegistry>>,
    templates: BTreeMap<String, Arc<TemplateRegistry>>,
}

impl fmt::Debug for RegistryCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCatalog")
            .field("registries", &self.names())
            .finish()
    }
}

impl RegistryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build both registries described by `config` and register every
    /// configured declaration into them.
    pub fn from_config(config: &NunjaConfig) -> Self {
        let locator: Arc<dyn ModuleLocator> =
            Arc::new(ConfiguredLocator::from_config(&config.modules));
        Self::from_config_with_locator(config, locator)
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied locator.
    pub fn from_config_with_locator(config: &NunjaConfig, locator: Arc<dyn ModuleLocator>) -> Self {
        let settings = RegistrySettings::from_config(&config.registry);
        let source = DeclarationSource::from_config(&config.declarations);

        let molds = MoldRegistry::builder(config.registry.mold_registry.clone())
            .settings(settings.clone())
            .shared_locator(Arc::clone(&locator))
            .with_declarations(&source.declarations(RegistryKind::Mold));

        let templates = TemplateRegistry::new(
            config.registry.template_registry.clone(),
            settings,
            locator,
        );
        for declaration in source.declarations(RegistryKind::Template) {
            // Failures are logged by `register`.
            let _ = templates.register(&declaration);
        }

        info!(
            molds = molds.len(),
            templates = templates.len(),
            "registries built from configuration"
        );

        let mut catalog = Self::new();
        catalog.insert_molds(Arc::new(molds));
        catalog.insert_templates(Arc::new(templates));
        catalog
    }

    /// Add a resolver under its own name, replacing any previous one.
    pub fn insert(&mut self, resolver: Arc<dyn PathResolver>) {
        let name = resolver.name().to_string();
        self.molds.remove(&name);
        self.templates.remove(&name);
        self.resolvers.insert(name, resolver);
    }

    pub fn insert_molds(&mut self, registry: Arc<MoldRegistry>) {
        let name = registry.name().to_string();
        self.insert(Arc::clone(&registry) as Arc<dyn PathResolver>);
        self.molds.insert(name, registry);
    }

    pub fn insert_templates(&mut self, registry: Arc<TemplateRegistry>) {
        let name = registry.name().to_string();
        self.insert(Arc::clone(&registry) as Arc<dyn PathResolver>);
        self.templates.insert(name, registry);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PathResolver>> {
        self.resolvers.get(name).cloned()
    }

    /// The mold registry named `name`, if that is what it is.
    pub fn molds(&self, name: &str) -> Option<Arc<MoldRegistry>> {
        self.molds.get(name).cloned()
    }

    /// The template registry named `name`, if that is what it is.
    pub fn templates(&self, name: &str) -> Option<Arc<TemplateRegistry>> {
        self.templates.get(name).cloned()
    }

    /// Resolve a registry reference. Unknown names are `NotFound`.
    pub fn resolve(&self, registry: &RegistryRef) -> Result<Arc<dyn PathResolver>, NunjaError> {
        match registry {
            RegistryRef::Instance(resolver) => Ok(Arc::clone(resolver)),
            RegistryRef::Named(name) => self.get(name).ok_or_else(|| {
                debug!(registry = %name, "no registry with that name");
                NunjaError::not_found(name.clone())
            }),
        }
    }

    /// Sorted registry names.
    pub fn names(&self) -> Vec<String> {
        self.resolvers.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}
