// SPDX-FileCopyrightText: 2026 Nunja Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nunja - mold discovery and path resolution.
//!
//! This is the binary entry point for inspecting configured registries.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use commands::Command;
use nunja_config::NunjaConfig;
use nunja_registry::{RegistryCatalog, global};
use tracing::debug;

/// Nunja - mold discovery and path resolution.
#[derive(Parser, Debug)]
#[command(name = "nunja", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of plain text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => nunja_config::load_and_validate_path(path),
        None => nunja_config::load_and_validate(),
    };
    let config: NunjaConfig = match loaded {
        Ok(config) => config,
        Err(errors) => {
            nunja_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log_level);

    global::install(RegistryCatalog::from_config(&config));
    let catalog = global::catalog();
    debug!(command = ?cli.command, json = cli.json, "running command");

    let mut stdout = std::io::stdout().lock();
    match commands::run(&cli.command, &catalog, &config, cli.json, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("nunja: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "nunja={log_level},nunja_registry={log_level},nunja_config={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_verify_with_registry() {
        let cli = Cli::try_parse_from([
            "nunja",
            "--config",
            "/tmp/nunja.toml",
            "verify",
            "acme.widgets/button/template.nja",
            "--registry",
            "nunja.tmpl",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/nunja.toml")));
        assert!(matches!(
            cli.command,
            Command::Verify { ref identifier, registry: Some(ref r) }
                if identifier == "acme.widgets/button/template.nja" && r == "nunja.tmpl"
        ));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = nunja_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.registry.mold_registry, "nunja.mold");
    }
}
