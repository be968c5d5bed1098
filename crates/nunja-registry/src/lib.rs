// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mold discovery and path resolution for the Nunja framework.
//!
//! A declaration names an anchor directory. The registry walks it, names
//! every file it finds, groups the names into molds, and resolves
//! `prefix/basename[/subpath...]` identifiers to paths inside those molds.
//!
//! - [`MoldRegistry`] -- molds (a template plus companion scripts)
//! - [`TemplateRegistry`] -- individual server-side templates
//! - [`RegistryCatalog`] -- registries by name, with [`global`] as the default
//! - [`partition()`] -- the grouping step on its own

pub mod catalog;
pub mod global;
pub mod locator;
pub mod naming;
pub mod partition;
pub mod registry;
pub mod source;
pub mod templates;
pub mod walker;

pub use catalog::{RegistryCatalog, RegistryRef};
pub use locator::{ConfiguredLocator, RootLocator, StaticLocator};
pub use naming::NamingScheme;
pub use partition::{Partition, partition};
pub use registry::{MoldRegistry, MoldRegistryBuilder, RegistrySettings};
pub use source::DeclarationSource;
pub use templates::TemplateRegistry;
pub use walker::FsWalker;
