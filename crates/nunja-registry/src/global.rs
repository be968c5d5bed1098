// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide default catalog.
//!
//! Starts empty. Hosts build a catalog explicitly and [`install`] it; nothing
//! is registered as a side effect of loading this crate.

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use nunja_core::{NunjaError, PathResolver};
use tracing::info;

use crate::catalog::{RegistryCatalog, RegistryRef};

static CATALOG: LazyLock<ArcSwap<RegistryCatalog>> =
    LazyLock::new(|| ArcSwap::from_pointee(RegistryCatalog::new()));

/// Current default catalog.
pub fn catalog() -> Arc<RegistryCatalog> {
    CATALOG.load_full()
}

/// Replace the default catalog, returning the previous one.
pub fn install(catalog: RegistryCatalog) -> Arc<RegistryCatalog> {
    info!(registries = ?catalog.names(), "installing default registry catalog");
    CATALOG.swap(Arc::new(catalog))
}

/// Resolve `registry` against the default catalog.
pub fn resolve(registry: &RegistryRef) -> Result<Arc<dyn PathResolver>, NunjaError> {
    CATALOG.load().resolve(registry)
}
