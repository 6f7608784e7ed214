// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared between the plugin host, plugin hooks, and the CLI.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Shared-config key under which the merged plugin list is recorded.
pub const PLUGINS_KEY: &str = "general.plugins";

/// Environment variable that turns on verbose output for every hook invocation.
pub const LOG_PLUGIN_LOADING_ENV: &str = "SCRIV_LOG_PLUGIN_LOADING";

/// A lifecycle phase a plugin's config module may implement.
///
/// Variants are declared in invocation order, so `Ord` follows the order in
/// which the CLI dispatches them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum Phase {
    /// Register plugin-specific configuration keys and defaults.
    #[strum(serialize = "addConfig")]
    #[serde(rename = "addConfig")]
    AddConfig,
    /// Inspect or rewrite raw parsed command-line options.
    #[strum(serialize = "updateCommandLineOptions")]
    #[serde(rename = "updateCommandLineOptions")]
    UpdateCommandLineOptions,
    /// React to the final, merged configuration.
    #[strum(serialize = "updateConfig")]
    #[serde(rename = "updateConfig")]
    UpdateConfig,
    /// Perform setup that needs the resolved input document.
    #[strum(serialize = "initPlugin")]
    #[serde(rename = "initPlugin")]
    InitPlugin,
}

impl Phase {
    /// All phases in dispatch order.
    pub const ALL: [Phase; 4] = [
        Phase::AddConfig,
        Phase::UpdateCommandLineOptions,
        Phase::UpdateConfig,
        Phase::InitPlugin,
    ];

    /// Critical phases always announce each invocation through the logger.
    pub fn is_critical(self) -> bool {
        matches!(self, Phase::UpdateConfig | Phase::InitPlugin)
    }
}

/// The single mutable configuration object shared by every plugin for one run.
///
/// Keys are dotted paths (`general.plugins`, `html.theme`); values are
/// arbitrary JSON. Plugins receive `&mut SharedConfig` and can change its
/// contents but never swap the object itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedConfig {
    values: BTreeMap<String, Value>,
}

impl SharedConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a string value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Mutable access to a value by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.values.get_mut(key)
    }

    /// Set a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Set a value only when the key is not present yet.
    ///
    /// Returns `true` if the default was inserted.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if self.values.contains_key(&key) {
            return false;
        }
        self.values.insert(key, value.into());
        true
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Apply parsed command-line options on top of the current values.
    ///
    /// Options whose value is `null` were not given on the command line and
    /// leave the existing value untouched.
    pub fn merge_options(&mut self, options: &CommandLineOptions) {
        for (key, value) in options.iter() {
            if value.is_null() {
                continue;
            }
            self.values.insert(key.to_string(), value.clone());
        }
    }

    /// The plugin list recorded under [`PLUGINS_KEY`], as flat strings.
    ///
    /// Non-string array members are ignored.
    pub fn plugins(&self) -> Vec<String> {
        match self.values.get(PLUGINS_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Parsed command-line options as handed to `updateCommandLineOptions`.
///
/// Keys use the same dotted form as [`SharedConfig`] so the options can be
/// merged into it unchanged once every plugin has seen them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandLineOptions {
    values: BTreeMap<String, Value>,
}

impl CommandLineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.values.get_mut(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Handle for the input document, passed to `initPlugin`.
///
/// The processing pipeline owns the real document model; plugins only get
/// the source location and a scratch map they can annotate.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    source: PathBuf,
    userdata: BTreeMap<String, Value>,
}

impl Document {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            userdata: BTreeMap::new(),
        }
    }

    /// Path of the document's source file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn userdata(&self) -> &BTreeMap<String, Value> {
        &self.userdata
    }

    pub fn userdata_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.userdata
    }
}
