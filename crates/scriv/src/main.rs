// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriv - plugin-driven document conversion.
//!
//! This is the binary entry point. It loads configuration, discovers the
//! installed plugins, and drives them through the configuration lifecycle
//! before the conversion pipeline takes over.

use std::path::PathBuf;

use clap::Parser;
use scriv::{list, run};
use serde_json::Value;

/// Scriv - plugin-driven document conversion.
#[derive(Parser, Debug)]
#[command(name = "scriv", version, about, long_about = None)]
struct Cli {
    /// Additional configuration file, layered after the standard ones.
    #[arg(long = "config", value_name = "FILE")]
    config_files: Vec<PathBuf>,

    /// Plugin to load in addition to the discovered ones.
    #[arg(long = "plugins", value_name = "NAME")]
    plugins: Vec<String>,

    /// Leave discovered plugins out of the recorded plugin list.
    #[arg(long)]
    no_add_plugins: bool,

    /// Set a command-line option, e.g. `--set html.theme=dark`.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_set)]
    sets: Vec<(String, Value)>,

    /// List installed plugins and their config modules, then exit.
    #[arg(long)]
    list_plugins: bool,

    /// With `--list-plugins`, print JSON.
    #[arg(long, requires = "list_plugins")]
    json: bool,

    /// With `--list-plugins`, disable colored output.
    #[arg(long, requires = "list_plugins")]
    plain: bool,

    /// Input document. Standard input is read when omitted.
    file: Option<PathBuf>,
}

/// Parse `KEY=VALUE`. The value is taken as JSON when it parses as JSON,
/// otherwise as a plain string.
fn parse_set(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scriv={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let config = match scriv_config::load_and_validate(&cli.config_files) {
        Ok(config) => config,
        Err(errors) => {
            scriv_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.general.log_level);

    if cli.list_plugins {
        if let Err(e) = list::run_list(&config, cli.json, cli.plain) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let args = run::RunArgs {
        file: cli.file,
        plugins: cli.plugins,
        no_add_plugins: cli.no_add_plugins,
        sets: cli.sets,
    };
    match run::run_lifecycle(&config, &args) {
        Ok(outcome) => {
            tracing::debug!(
                source = %outcome.document.source().display(),
                keys = outcome.config.len(),
                "pipeline input ready"
            );
            println!("Plugins: {}", outcome.plugins.join(", "));
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
