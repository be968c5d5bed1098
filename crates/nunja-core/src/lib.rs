// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Nunja mold registry.
//!
//! This crate provides the error type, the declaration and resource types,
//! and the collaborator traits shared by the registry, configuration, and
//! CLI crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::NunjaError;
pub use types::{ExtensionFilter, PluginDeclaration, RegistryKind, ResourceMap};

pub use traits::{ModuleLocator, NameFn, PathResolver, ResourceWalker};
