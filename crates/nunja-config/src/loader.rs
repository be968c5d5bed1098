// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./nunja.toml` > `~/.config/nunja/nunja.toml` > `/etc/nunja/nunja.toml`
//! with environment variable overrides via `NUNJA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::debug;

use crate::model::NunjaConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/nunja/nunja.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "nunja.toml";

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nunja/nunja.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/nunja/nunja.toml` (system-wide)
/// 3. `~/.config/nunja/nunja.toml` (user XDG config)
/// 4. `./nunja.toml` (local directory)
/// 5. `NUNJA_*` environment variables
pub fn load_config() -> Result<NunjaConfig, figment::Error> {
    debug!(
        system = SYSTEM_CONFIG_PATH,
        local = LOCAL_CONFIG_PATH,
        "loading layered configuration"
    );
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<NunjaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NunjaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NunjaConfig, figment::Error> {
    debug!(path = %path.display(), "loading configuration file");
    Figment::new()
        .merge(Serialized::defaults(NunjaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(NunjaConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `NUNJA_REGISTRY_AUTO_RELOAD` to
/// `registry.auto_reload` and so on.
///
/// Keys arrive uppercase and are lowered before mapping. Uses `Env::map()`
/// rather than `Env::split("_")` since key names themselves contain underscores.
fn env_provider() -> Env {
    Env::prefixed("NUNJA_").map(|key| {
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("registry_", "registry.", 1)
            .replacen("modules_", "modules.", 1)
            .replacen("declarations_", "declarations.", 1);
        mapped.into()
    })
}
