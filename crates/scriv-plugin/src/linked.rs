// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config modules linked into the binary.
//!
//! A plugin crate linked into `scriv` makes its config module loadable by
//! registering a factory under the module's dotted path:
//!
//! ```ignore
//! fn hooks() -> Result<PluginHooks, HookError> {
//!     Ok(PluginHooks::new().on_add_config(|config| {
//!         config.set_default("acme.enabled", true);
//!         Ok(())
//!     }))
//! }
//!
//! scriv_plugin::submit_config_module!("acme.ConfigScrivPlugin", hooks);
//! ```
//!
//! The registration only makes the module loadable. The plugin still has
//! to be installed (registered under the plugin group) to be discovered.

use tracing::debug;

use crate::catalog::builtin_catalog;
use crate::loader::{HookError, ModuleCatalog, PluginHooks};

/// Factory signature for linked config modules.
pub type ConfigModuleFactory = fn() -> Result<PluginHooks, HookError>;

/// Link-time registration of one config module.
pub struct ConfigModuleReg {
    pub module_path: &'static str,
    pub factory: ConfigModuleFactory,
}

impl ConfigModuleReg {
    pub const fn new(module_path: &'static str, factory: ConfigModuleFactory) -> Self {
        Self {
            module_path,
            factory,
        }
    }
}

inventory::collect!(ConfigModuleReg);

/// Register a config module factory at link time.
#[macro_export]
macro_rules! submit_config_module {
    ($module_path:expr, $factory:path) => {
        $crate::inventory::submit! {
            $crate::ConfigModuleReg::new($module_path, $factory)
        }
    };
}

/// Module paths of every linked registration, sorted.
pub fn linked_modules() -> Vec<&'static str> {
    let mut paths: Vec<&'static str> = inventory::iter::<ConfigModuleReg>()
        .map(|r| r.module_path)
        .collect();
    paths.sort_unstable();
    paths
}

/// The built-in renderer modules plus every linked registration.
///
/// A linked module registered under a built-in path replaces it.
pub fn linked_catalog() -> ModuleCatalog {
    let mut catalog = builtin_catalog();
    for reg in inventory::iter::<ConfigModuleReg> {
        debug!(module = reg.module_path, "linked config module");
        catalog.register(reg.module_path, reg.factory);
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::HTML_RENDERER_MODULE;
    use crate::loader::ModuleLoader;
    use scriv_core::{Phase, SharedConfig};

    fn linked_hooks() -> Result<PluginHooks, HookError> {
        Ok(PluginHooks::new().on_add_config(|config| {
            config.set("linked.ran", true);
            Ok(())
        }))
    }

    crate::submit_config_module!("linked.ConfigScrivPlugin", linked_hooks);

    #[test]
    fn submitted_module_is_listed() {
        assert!(linked_modules().contains(&"linked.ConfigScrivPlugin"));
    }

    #[test]
    fn linked_catalog_loads_submitted_and_builtin_modules() {
        let catalog = linked_catalog();
        assert!(catalog.contains(HTML_RENDERER_MODULE));

        let hooks = catalog.load("linked.ConfigScrivPlugin").unwrap();
        assert!(hooks.implements(Phase::AddConfig));

        let mut config = SharedConfig::new();
        if let Some(hook) = &hooks.add_config {
            hook(&mut config).unwrap();
        }
        assert!(config.contains("linked.ran"));
    }
}
