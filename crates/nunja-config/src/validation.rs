// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::path::Path;

use nunja_core::PluginDeclaration;
use tracing::warn;

use crate::diagnostic::ConfigError;
use crate::model::NunjaConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &NunjaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        fail(format!(
            "log_level `{}` must be one of {}",
            config.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let registry = &config.registry;
    if registry.extension.len() < 2 || !registry.extension.starts_with('.') {
        fail(format!(
            "registry.extension `{}` must start with `.` and name an extension",
            registry.extension
        ));
    }
    if registry.extension.contains(['/', '\\']) {
        fail("registry.extension must not contain path separators".to_string());
    }

    if registry.required_template.trim().is_empty() {
        fail("registry.required_template must not be empty".to_string());
    } else if registry.required_template.contains(['/', '\\']) {
        fail(format!(
            "registry.required_template `{}` must be a bare file name",
            registry.required_template
        ));
    }

    if registry.marker_prefix.contains(['/', '\\']) {
        fail(format!(
            "registry.marker_prefix `{}` must not contain path separators",
            registry.marker_prefix
        ));
    }

    if registry.mold_registry.trim().is_empty() || registry.template_registry.trim().is_empty() {
        fail("registry names must not be empty".to_string());
    } else if registry.mold_registry == registry.template_registry {
        fail(format!(
            "registry.mold_registry and registry.template_registry must differ, both are `{}`",
            registry.mold_registry
        ));
    }

    for root in &config.modules.roots {
        if !Path::new(root).is_dir() {
            warn!(root = %root, "module root is not a directory, modules under it will not be found");
        }
    }

    for (module, dir) in &config.modules.paths {
        if dir.trim().is_empty() {
            fail(format!("modules.paths.{module} must not be empty"));
        }
    }

    let declarations = &config.declarations;
    for (group, entries) in [("mold", &declarations.mold), ("template", &declarations.template)] {
        for entry in entries {
            if let Err(e) = entry.parse::<PluginDeclaration>() {
                fail(format!("declarations.{group}: {e}"));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
