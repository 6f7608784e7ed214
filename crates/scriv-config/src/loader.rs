// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./scriv.toml` > `~/.config/scriv/scriv.toml` > `/etc/scriv/scriv.toml`
//! with environment variable overrides via `SCRIV_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ScrivConfig;

// Shares the `SCRIV_` prefix but is not a config key, so the env provider
// skips it.
pub use scriv_core::LOG_PLUGIN_LOADING_ENV;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/scriv/scriv.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "scriv.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/scriv/scriv.toml` (system-wide)
/// 3. `~/.config/scriv/scriv.toml` (user XDG config)
/// 4. `./scriv.toml` (local directory)
/// 5. `extra_files`, in order (`--config` on the command line)
/// 6. `SCRIV_*` environment variables
///
/// Missing files are silently skipped.
pub fn load_config(extra_files: &[PathBuf]) -> Result<ScrivConfig, figment::Error> {
    build_figment(extra_files).extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ScrivConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScrivConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ScrivConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScrivConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment(extra_files: &[PathBuf]) -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(ScrivConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE));
    for path in extra_files {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Path of the per-user configuration file, if a config dir is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scriv/scriv.toml"))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SCRIV_PLUGINS_NEW_STYLE_FILE` must map to
/// `plugins.new_style_file`, not `plugins.new.style.file`.
fn env_provider() -> Env {
    Env::prefixed("SCRIV_")
        .ignore(&["log_plugin_loading"])
        .map(|key| {
            // `key` keeps the env var's case with the prefix stripped.
            // Example: SCRIV_GENERAL_LOG_LEVEL -> "GENERAL_LOG_LEVEL"
            let mapped = key
                .as_str()
                .to_ascii_lowercase()
                .replacen("general_", "general.", 1)
                .replacen("plugins_", "plugins.", 1);
            mapped.into()
        })
}
