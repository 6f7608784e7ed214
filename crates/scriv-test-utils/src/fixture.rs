// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin fixtures.
//!
//! `PluginFixture` pairs in-memory registrations with the config modules
//! they resolve to, so a [`PluginHost`] can be built without touching the
//! filesystem.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use scriv_core::{Phase, ScrivError};
use scriv_plugin::{
    HookError, HookResult, ModuleCatalog, PluginHooks, PluginHost, PluginRegistration, StaticSource,
};

use crate::capture::SharedBuffer;
use crate::recording::{recording_hooks, CallLog};

/// Group fixtures register under.
pub const TEST_GROUP: &str = "scriv.plugin";

/// Builder for registrations plus config modules.
pub struct PluginFixture {
    source: StaticSource,
    catalog: ModuleCatalog,
    log: CallLog,
}

impl Default for PluginFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginFixture {
    pub fn new() -> Self {
        Self {
            source: StaticSource::new(),
            catalog: ModuleCatalog::new(),
            log: CallLog::new(),
        }
    }

    /// Register a distribution declaring `declared_value` with `files`.
    ///
    /// The distribution is named after the declared value.
    pub fn plugin(mut self, declared_value: &str, files: &[&str]) -> Self {
        self.source.register(
            TEST_GROUP,
            PluginRegistration::new(
                format!("dist-{declared_value}"),
                declared_value,
                files.iter().map(|f| PathBuf::from(*f)).collect(),
            ),
        );
        self
    }

    /// Provide the config module at `module_path`.
    pub fn hooks<F>(mut self, module_path: &str, factory: F) -> Self
    where
        F: Fn() -> Result<PluginHooks, HookError> + Send + Sync + 'static,
    {
        self.catalog.register(module_path, factory);
        self
    }

    /// Provide a recording module at `module_path` that logs as `plugin`.
    pub fn recording(self, module_path: &str, plugin: &str) -> Self {
        let log = self.log.clone();
        let plugin = plugin.to_string();
        self.hooks(module_path, move || Ok(recording_hooks(&plugin, &log)))
    }

    /// Provide a module whose `phase` hook returns an error.
    pub fn failing(self, module_path: &str, phase: Phase, message: &str) -> Self {
        let message = message.to_string();
        self.hooks(module_path, move || {
            let message = message.clone();
            Ok(single_phase(phase, move || Err(message.clone().into())))
        })
    }

    /// Provide a module whose `phase` hook panics.
    pub fn panicking(self, module_path: &str, phase: Phase, message: &str) -> Self {
        let message = message.to_string();
        self.hooks(module_path, move || {
            let message = message.clone();
            Ok(single_phase(phase, move || panic!("{message}")))
        })
    }

    /// Provide a module that fails to load.
    pub fn broken(self, module_path: &str, message: &str) -> Self {
        let message = message.to_string();
        self.hooks(module_path, move || Err(message.clone().into()))
    }

    /// Discover and build a host whose diagnostics go to `output`.
    ///
    /// The returned log is shared by every recording module.
    pub fn host(self, output: SharedBuffer) -> Result<(PluginHost, CallLog), ScrivError> {
        let Self { source, catalog, log } = self;
        let host = PluginHost::discover(&source, TEST_GROUP, catalog)?.with_output(output);
        Ok((host, log))
    }
}

/// Hooks implementing only `phase`, each ignoring its arguments.
fn single_phase<F>(phase: Phase, f: F) -> PluginHooks
where
    F: Fn() -> HookResult + Send + Sync + 'static,
{
    let hooks = PluginHooks::new();
    match phase {
        Phase::AddConfig => hooks.on_add_config(move |_| f()),
        Phase::UpdateCommandLineOptions => hooks.on_update_command_line_options(move |_| f()),
        Phase::UpdateConfig => hooks.on_update_config(move |_, _| f()),
        Phase::InitPlugin => hooks.on_init_plugin(move |_, _, _, _| f()),
    }
}

/// Write a distribution record into an index directory.
///
/// `entry_points` are `(group, value)` pairs.
pub fn write_index_record(
    dir: &Path,
    file_name: &str,
    distribution: &str,
    files: &[&str],
    entry_points: &[(&str, &str)],
) -> std::io::Result<PathBuf> {
    let mut record = String::new();
    let files: Vec<String> = files.iter().map(|f| format!("{f:?}")).collect();
    // Infallible for String.
    let _ = writeln!(
        record,
        "[distribution]\nname = {distribution:?}\nfiles = [{}]",
        files.join(", ")
    );
    for (group, value) in entry_points {
        let _ = writeln!(record, "\n[[entry_points]]\ngroup = {group:?}\nvalue = {value:?}");
    }

    let path = dir.join(file_name);
    std::fs::write(&path, record)?;
    Ok(path)
}
