// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.
//!
//! Every command writes to the given writer so the output can be captured.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use nunja_config::NunjaConfig;
use nunja_core::NunjaError;
use nunja_registry::{RegistryCatalog, RegistryRef};
use serde::Serialize;

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every registered mold and its base directory.
    Molds,
    /// Translate an identifier to a path without checking that it exists.
    Resolve {
        identifier: String,
        /// Registry to resolve against (defaults to the mold registry).
        #[arg(long)]
        registry: Option<String>,
    },
    /// Translate an identifier to a path and require it to exist.
    Verify {
        identifier: String,
        /// Registry to resolve against (defaults to the mold registry).
        #[arg(long)]
        registry: Option<String>,
    },
    /// Show the resources recorded for a mold, or for a whole package.
    Records {
        name: String,
        /// Treat the name as a package name.
        #[arg(long)]
        package: bool,
    },
    /// Resolve a template by name, or list all templates.
    Templates { name: Option<String> },
}

/// Single resolved path for `--json` output.
#[derive(Debug, Serialize)]
struct Resolved<'a> {
    identifier: &'a str,
    registry: &'a str,
    path: &'a Path,
}

/// Run `command` against `catalog`.
pub fn run(
    command: &Command,
    catalog: &RegistryCatalog,
    config: &NunjaConfig,
    json: bool,
    out: &mut impl Write,
) -> Result<(), NunjaError> {
    let molds_name = config.registry.mold_registry.as_str();
    let templates_name = config.registry.template_registry.as_str();

    match command {
        Command::Molds => {
            let molds = catalog
                .molds(molds_name)
                .map(|registry| registry.molds())
                .unwrap_or_default();
            write_map(out, &molds, json)
        }
        Command::Resolve {
            identifier,
            registry,
        } => {
            let name = registry.as_deref().unwrap_or(molds_name);
            let resolver = catalog.resolve(&RegistryRef::from(name))?;
            let path = resolver.lookup_path(identifier)?;
            write_resolved(out, identifier, name, &path, json)
        }
        Command::Verify {
            identifier,
            registry,
        } => {
            let name = registry.as_deref().unwrap_or(molds_name);
            let resolver = catalog.resolve(&RegistryRef::from(name))?;
            let path = resolver.verify_path(identifier)?;
            write_resolved(out, identifier, name, &path, json)
        }
        Command::Records { name, package } => {
            let registry = catalog
                .molds(molds_name)
                .ok_or_else(|| NunjaError::not_found(molds_name))?;
            let records = if *package {
                registry.records_for_package(name)
            } else {
                registry.get_record(name)
            };
            write_map(out, &records, json)
        }
        Command::Templates { name } => {
            let registry = catalog
                .templates(templates_name)
                .ok_or_else(|| NunjaError::not_found(templates_name))?;
            match name {
                Some(name) => {
                    let path = registry.lookup_path(name)?;
                    write_resolved(out, name, templates_name, &path, json)
                }
                None => write_map(out, &registry.templates(), json),
            }
        }
    }
}

fn io_error(e: std::io::Error) -> NunjaError {
    NunjaError::Io {
        path: PathBuf::from("<stdout>"),
        source: e,
    }
}

fn write_map(
    out: &mut impl Write,
    map: &BTreeMap<String, PathBuf>,
    json: bool,
) -> Result<(), NunjaError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, map)
            .map_err(|e| NunjaError::Internal(format!("failed to encode output: {e}")))?;
        writeln!(out).map_err(io_error)
    } else {
        for (name, path) in map {
            writeln!(out, "{name}\t{}", path.display()).map_err(io_error)?;
        }
        Ok(())
    }
}

fn write_resolved(
    out: &mut impl Write,
    identifier: &str,
    registry: &str,
    path: &Path,
    json: bool,
) -> Result<(), NunjaError> {
    if json {
        let resolved = Resolved {
            identifier,
            registry,
            path,
        };
        serde_json::to_writer(&mut *out, &resolved)
            .map_err(|e| NunjaError::Internal(format!("failed to encode output: {e}")))?;
        writeln!(out).map_err(io_error)
    } else {
        writeln!(out, "{}", path.display()).map_err(io_error)
    }
}
