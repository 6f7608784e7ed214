// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin discovery, config-module resolution, and lifecycle dispatch.
//!
//! Installed plugins are enumerated from a [`RegistrationSource`], ordered
//! by priority in a [`PluginRegistry`], and driven through the four
//! lifecycle phases by a [`PluginHost`]. Each plugin's config module is
//! located by file-name convention and loaded through a [`ModuleLoader`].

pub mod catalog;
pub mod host;
pub mod linked;
pub mod loader;
pub mod manifest;
pub mod merge;
pub mod registry;
pub mod resolver;
pub mod source;

pub use catalog::{add_builtin_renderer_config, builtin_catalog, BUILTIN_RENDERERS};
pub use host::{verbose_loading_requested, DispatchReport, PhaseCall, PluginHost};
pub use linked::{linked_catalog, linked_modules, ConfigModuleFactory, ConfigModuleReg};
pub use loader::{HookError, HookResult, LoadError, ModuleCatalog, ModuleLoader, PluginHooks, Resolution};
pub use manifest::{parse_distribution_record, DistributionRecord, EntryPoint};
pub use merge::merge_plugin_list;
pub use registry::{list_installed, DiscoveredPlugin, PluginEntry, PluginRegistry, DEFAULT_PRIORITY};
pub use resolver::{find_config_file, module_path, resolve_config_module, ConfigConventions};
pub use source::{IndexSource, PluginRegistration, RegistrationSource, StaticSource};

#[doc(hidden)]
pub use inventory;
