// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin hooks and the loaders that produce them.
//!
//! A plugin's config module is represented by [`PluginHooks`]: one optional
//! callback per lifecycle phase. A [`ModuleLoader`] turns the module path
//! found by the resolver into hooks; [`ModuleCatalog`] is the compiled-in
//! loader keyed by module path.

use std::any::Any;
use std::collections::HashMap;
use std::io::BufRead;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use scriv_core::{CommandLineOptions, Document, Phase, SharedConfig};
use thiserror::Error;

/// Error type plugin hooks return.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Result type plugin hooks return.
pub type HookResult = Result<(), HookError>;

type AddConfigFn = dyn Fn(&mut SharedConfig) -> HookResult + Send + Sync;
type UpdateOptionsFn = dyn Fn(&mut CommandLineOptions) -> HookResult + Send + Sync;
type UpdateConfigFn = dyn Fn(&mut SharedConfig, &Path) -> HookResult + Send + Sync;
type InitPluginFn =
    dyn Fn(&mut SharedConfig, &Path, &mut dyn BufRead, &mut Document) -> HookResult + Send + Sync;
type HooksFactory = dyn Fn() -> Result<PluginHooks, HookError> + Send + Sync;

/// The lifecycle callbacks one config module provides.
///
/// Every phase is optional; a missing hook means the plugin contributes
/// nothing to that phase.
#[derive(Default)]
pub struct PluginHooks {
    pub(crate) add_config: Option<Box<AddConfigFn>>,
    pub(crate) update_command_line_options: Option<Box<UpdateOptionsFn>>,
    pub(crate) update_config: Option<Box<UpdateConfigFn>>,
    pub(crate) init_plugin: Option<Box<InitPluginFn>>,
}

impl PluginHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for `addConfig(config)`.
    pub fn on_add_config<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut SharedConfig) -> HookResult + Send + Sync + 'static,
    {
        self.add_config = Some(Box::new(f));
        self
    }

    /// Hook for `updateCommandLineOptions(options)`.
    pub fn on_update_command_line_options<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CommandLineOptions) -> HookResult + Send + Sync + 'static,
    {
        self.update_command_line_options = Some(Box::new(f));
        self
    }

    /// Hook for `updateConfig(config, source_file)`.
    pub fn on_update_config<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut SharedConfig, &Path) -> HookResult + Send + Sync + 'static,
    {
        self.update_config = Some(Box::new(f));
        self
    }

    /// Hook for `initPlugin(config, source_file, input, document)`.
    pub fn on_init_plugin<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut SharedConfig, &Path, &mut dyn BufRead, &mut Document) -> HookResult
            + Send
            + Sync
            + 'static,
    {
        self.init_plugin = Some(Box::new(f));
        self
    }

    /// Whether this module defines a hook for `phase`.
    pub fn implements(&self, phase: Phase) -> bool {
        match phase {
            Phase::AddConfig => self.add_config.is_some(),
            Phase::UpdateCommandLineOptions => self.update_command_line_options.is_some(),
            Phase::UpdateConfig => self.update_config.is_some(),
            Phase::InitPlugin => self.init_plugin.is_some(),
        }
    }
}

impl std::fmt::Debug for PluginHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let implemented: Vec<String> = Phase::ALL
            .iter()
            .filter(|p| self.implements(**p))
            .map(Phase::to_string)
            .collect();
        f.debug_struct("PluginHooks")
            .field("implements", &implemented)
            .finish()
    }
}

/// Why a config module could not be turned into hooks.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No module is known under this path.
    #[error("no module named `{0}`")]
    NotFound(String),

    /// The module's factory returned an error.
    #[error("module `{module}` failed to initialize: {source}")]
    Init { module: String, source: HookError },

    /// The module's factory panicked.
    #[error("module `{module}` panicked during initialization: {message}")]
    Panicked { module: String, message: String },
}

/// Loads config modules by dotted module path.
pub trait ModuleLoader {
    fn load(&self, module_path: &str) -> Result<Arc<PluginHooks>, LoadError>;
}

/// Outcome of resolving one plugin's config module.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The module was found and loaded.
    Found {
        module: String,
        hooks: Arc<PluginHooks>,
    },
    /// The distribution has no config module.
    Absent,
    /// A config module exists but could not be loaded.
    Failed {
        module: String,
        error: Arc<LoadError>,
    },
}

/// Compiled-in module loader: module paths mapped to hook factories.
#[derive(Default)]
pub struct ModuleCatalog {
    factories: HashMap<String, Box<HooksFactory>>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `module_path`, replacing any earlier one.
    pub fn register<F>(&mut self, module_path: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<PluginHooks, HookError> + Send + Sync + 'static,
    {
        self.factories.insert(module_path.into(), Box::new(factory));
    }

    pub fn with<F>(mut self, module_path: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<PluginHooks, HookError> + Send + Sync + 'static,
    {
        self.register(module_path, factory);
        self
    }

    /// Move every module of `other` into this catalog.
    pub fn extend(&mut self, other: ModuleCatalog) {
        self.factories.extend(other.factories);
    }

    pub fn contains(&self, module_path: &str) -> bool {
        self.factories.contains_key(module_path)
    }

    /// Registered module paths, sorted.
    pub fn module_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

impl std::fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("modules", &self.module_paths())
            .finish()
    }
}

impl ModuleLoader for ModuleCatalog {
    fn load(&self, module_path: &str) -> Result<Arc<PluginHooks>, LoadError> {
        let factory = self
            .factories
            .get(module_path)
            .ok_or_else(|| LoadError::NotFound(module_path.to_string()))?;

        match catch_unwind(AssertUnwindSafe(|| factory())) {
            Ok(Ok(hooks)) => Ok(Arc::new(hooks)),
            Ok(Err(source)) => Err(LoadError::Init {
                module: module_path.to_string(),
                source,
            }),
            Err(payload) => Err(LoadError::Panicked {
                module: module_path.to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

/// Extract the message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
