// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Scriv.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Registration group plugins declare themselves under.
pub const DEFAULT_PLUGIN_GROUP: &str = "scriv.plugin";

/// File name of a new-style plugin config module.
pub const DEFAULT_NEW_STYLE_FILE: &str = "ConfigScrivPlugin.rs";

/// File name of an old-style (per-renderer) plugin config module.
pub const DEFAULT_LEGACY_FILE: &str = "Config.rs";

/// Top-level Scriv configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScrivConfig {
    /// General tool settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Plugin discovery and loading settings.
    #[serde(default)]
    pub plugins: PluginsConfig,
}

/// General tool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Plugin discovery and loading configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Registration group scanned for plugins.
    #[serde(default = "default_group")]
    pub group: String,

    /// Directories holding distribution records. Empty means the default
    /// system and user index directories.
    #[serde(default)]
    pub index_paths: Vec<PathBuf>,

    /// Whether discovered plugins are added to the recorded plugin list.
    #[serde(default = "default_true")]
    pub add_discovered: bool,

    /// Additional plugin names appended after the discovered ones.
    #[serde(default)]
    pub extra: Vec<String>,

    /// File name identifying a new-style config module.
    #[serde(default = "default_new_style_file")]
    pub new_style_file: String,

    /// File name identifying an old-style config module.
    #[serde(default = "default_legacy_file")]
    pub legacy_file: String,

    /// Print every hook invocation to stdout, as `SCRIV_LOG_PLUGIN_LOADING` does.
    #[serde(default)]
    pub verbose_loading: bool,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            group: default_group(),
            index_paths: Vec::new(),
            add_discovered: true,
            extra: Vec::new(),
            new_style_file: default_new_style_file(),
            legacy_file: default_legacy_file(),
            verbose_loading: false,
        }
    }
}

impl PluginsConfig {
    /// Index directories to scan, falling back to the defaults when none
    /// are configured.
    ///
    /// The flag is `true` when the directories were explicitly configured.
    pub fn resolved_index_paths(&self) -> (Vec<PathBuf>, bool) {
        if !self.index_paths.is_empty() {
            return (self.index_paths.clone(), true);
        }
        let mut paths = Vec::new();
        if let Some(data_dir) = dirs::data_dir() {
            paths.push(data_dir.join("scriv/plugins"));
        }
        paths.push(PathBuf::from("/usr/share/scriv/plugins"));
        (paths, false)
    }
}

fn default_group() -> String {
    DEFAULT_PLUGIN_GROUP.to_string()
}

fn default_true() -> bool {
    true
}

fn default_new_style_file() -> String {
    DEFAULT_NEW_STYLE_FILE.to_string()
}

fn default_legacy_file() -> String {
    DEFAULT_LEGACY_FILE.to_string()
}
