// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Nunja mold registry.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use nunja_core::RegistryKind;
use serde::{Deserialize, Serialize};

/// Top-level Nunja configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NunjaConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Registry naming and lookup behavior.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Where anchor modules live on disk.
    #[serde(default)]
    pub modules: ModulesConfig,

    /// Plugin declarations, grouped per registry kind.
    #[serde(default)]
    pub declarations: DeclarationsConfig,
}

impl Default for NunjaConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            registry: RegistryConfig::default(),
            modules: ModulesConfig::default(),
            declarations: DeclarationsConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Registry naming and lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Name of the mold registry.
    #[serde(default = "default_mold_registry")]
    pub mold_registry: String,

    /// Name of the template-only registry.
    #[serde(default = "default_template_registry")]
    pub template_registry: String,

    /// Template file extension, including the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Basename (without extension) of the file that defines a mold.
    #[serde(default = "default_required_template")]
    pub required_template: String,

    /// Marker prepended to template logical names.
    #[serde(default = "default_marker_prefix")]
    pub marker_prefix: String,

    /// Keep declarations around so molds created after startup resolve.
    #[serde(default)]
    pub auto_reload: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            mold_registry: default_mold_registry(),
            template_registry: default_template_registry(),
            extension: default_extension(),
            required_template: default_required_template(),
            marker_prefix: default_marker_prefix(),
            auto_reload: false,
        }
    }
}

fn default_mold_registry() -> String {
    RegistryKind::Mold.default_registry_name().to_string()
}

fn default_template_registry() -> String {
    RegistryKind::Template.default_registry_name().to_string()
}

fn default_extension() -> String {
    ".nja".to_string()
}

fn default_required_template() -> String {
    "template".to_string()
}

fn default_marker_prefix() -> String {
    "text!".to_string()
}

/// Module location configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModulesConfig {
    /// Search roots; module `a.b` resolves to `<root>/a/b`.
    #[serde(default)]
    pub roots: Vec<String>,

    /// Explicit module directories, checked before the roots.
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
}

/// Declarations in entry-point form (`prefix = module:subdir`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationsConfig {
    /// Package name reported for these declarations.
    #[serde(default)]
    pub package: Option<String>,

    /// Declarations feeding the mold registry.
    #[serde(default)]
    pub mold: Vec<String>,

    /// Declarations feeding the template-only registry.
    #[serde(default)]
    pub template: Vec<String>,
}
