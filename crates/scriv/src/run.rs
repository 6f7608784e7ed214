// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration lifecycle run by a plain `scriv FILE` invocation.
//!
//! Discovers plugins, records the plugin list, then dispatches the four
//! phases in order. Only discovery and input errors abort the run;
//! individual plugin failures are reported by the host and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use scriv_config::{PluginsConfig, ScrivConfig};
use scriv_core::{CommandLineOptions, Document, ScrivError, SharedConfig, PLUGINS_KEY};
use scriv_plugin::{
    add_builtin_renderer_config, linked_catalog, merge_plugin_list, verbose_loading_requested,
    ConfigConventions, IndexSource, ModuleLoader, PluginHost,
};
use serde_json::Value;
use tracing::info;

/// Source file name used when the document is read from standard input.
const STDIN_SOURCE: &str = "<stdin>";

/// Command-line inputs to a lifecycle run.
#[derive(Debug, Default)]
pub struct RunArgs {
    pub file: Option<PathBuf>,
    pub plugins: Vec<String>,
    pub no_add_plugins: bool,
    pub sets: Vec<(String, Value)>,
}

/// State handed to the conversion pipeline.
#[derive(Debug)]
pub struct RunOutcome {
    pub config: SharedConfig,
    pub document: Document,
    pub plugins: Vec<String>,
}

/// Registration source for the configured (or default) index directories.
pub fn registration_source(plugins: &PluginsConfig) -> IndexSource {
    match plugins.resolved_index_paths() {
        (dirs, true) => IndexSource::new(dirs),
        (dirs, false) => IndexSource::with_defaults(dirs),
    }
}

pub fn conventions(plugins: &PluginsConfig) -> ConfigConventions {
    ConfigConventions::new(&plugins.new_style_file, &plugins.legacy_file)
}

/// Discover plugins and build a host that loads from `loader`.
pub fn build_host(
    config: &ScrivConfig,
    loader: impl ModuleLoader + 'static,
) -> Result<PluginHost, ScrivError> {
    let plugins = &config.plugins;
    let source = registration_source(plugins);
    let verbose = plugins.verbose_loading || verbose_loading_requested();

    Ok(PluginHost::discover(&source, &plugins.group, loader)?
        .with_conventions(conventions(plugins))
        .with_verbose(verbose))
}

/// Shared-config key holding the input document path given on the command line.
pub const SOURCE_FILE_KEY: &str = "general.file";

/// Options object passed to `updateCommandLineOptions`.
///
/// Keys live in the shared config's namespace: the plugin list is the
/// merged one already recorded under `general.plugins`, so merging the
/// options back never leaves a second, disagreeing list behind.
fn command_line_options(args: &RunArgs, plugins: &[String]) -> CommandLineOptions {
    let mut options = CommandLineOptions::new();
    options.set(
        SOURCE_FILE_KEY,
        args.file
            .as_ref()
            .map_or(Value::Null, |f| Value::String(f.display().to_string())),
    );
    options.set(
        PLUGINS_KEY,
        Value::Array(plugins.iter().cloned().map(Value::String).collect()),
    );
    for (key, value) in &args.sets {
        options.set(key.clone(), value.clone());
    }
    options
}

fn open_input(file: Option<&Path>) -> Result<Box<dyn BufRead>, ScrivError> {
    match file {
        Some(path) => {
            let f = File::open(path).map_err(|source| ScrivError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufReader::new(f)))
        }
        None => Ok(Box::new(std::io::stdin().lock())),
    }
}

/// Run the lifecycle with the built-in renderers plus every config module
/// linked into the binary.
pub fn run_lifecycle(config: &ScrivConfig, args: &RunArgs) -> Result<RunOutcome, ScrivError> {
    run_lifecycle_with(config, args, linked_catalog())
}

/// Run the lifecycle loading config modules through `loader`.
pub fn run_lifecycle_with(
    config: &ScrivConfig,
    args: &RunArgs,
    loader: impl ModuleLoader + 'static,
) -> Result<RunOutcome, ScrivError> {
    let host = build_host(config, loader)?;
    run_with_host(host, config, args)
}

/// Run the lifecycle on an already-built host.
pub fn run_with_host(
    mut host: PluginHost,
    config: &ScrivConfig,
    args: &RunArgs,
) -> Result<RunOutcome, ScrivError> {
    let mut shared = SharedConfig::new();

    let discovered = if config.plugins.add_discovered && !args.no_add_plugins {
        host.plugin_names()
    } else {
        Vec::new()
    };
    let external: Vec<String> = config
        .plugins
        .extra
        .iter()
        .chain(&args.plugins)
        .cloned()
        .collect();
    let plugins = merge_plugin_list(&mut shared, &discovered, &external);

    add_builtin_renderer_config(&mut shared)?;
    host.add_config(&mut shared);

    let mut options = command_line_options(args, &plugins);
    host.update_command_line_options(&mut options);
    shared.merge_options(&options);

    let source_file = args
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(STDIN_SOURCE));
    host.update_config(&mut shared, &source_file);

    let mut input = open_input(args.file.as_deref())?;
    let mut document = Document::new(&source_file);
    host.init_plugin(&mut shared, &source_file, &mut *input, &mut document);

    info!(
        source = %source_file.display(),
        plugins = plugins.len(),
        keys = shared.len(),
        "configuration complete, handing off to pipeline"
    );

    Ok(RunOutcome {
        config: shared,
        document,
        plugins,
    })
}
