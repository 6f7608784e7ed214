// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in renderer config modules.
//!
//! The renderers shipped with Scriv register their default keys through the
//! same hook types plugins use. They are compiled into the binary, are not
//! discovered, and never appear in the plugin list.

use scriv_core::{ScrivError, SharedConfig};
use tracing::debug;

use crate::loader::{ModuleCatalog, ModuleLoader, PluginHooks};

/// Config module of the HTML renderer.
pub const HTML_RENDERER_MODULE: &str = "scriv.renderers.html.Config";

/// Config module of the plain-text renderer.
pub const TEXT_RENDERER_MODULE: &str = "scriv.renderers.text.Config";

/// Built-in renderer modules in the order their `addConfig` runs.
pub const BUILTIN_RENDERERS: [&str; 2] = [HTML_RENDERER_MODULE, TEXT_RENDERER_MODULE];

/// Catalog holding the built-in renderer config modules.
pub fn builtin_catalog() -> ModuleCatalog {
    ModuleCatalog::new()
        .with(HTML_RENDERER_MODULE, || {
            Ok(PluginHooks::new().on_add_config(|config| {
                config.set_default("html.theme", "default");
                config.set_default("html.split_level", 2);
                Ok(())
            }))
        })
        .with(TEXT_RENDERER_MODULE, || {
            Ok(PluginHooks::new().on_add_config(|config| {
                config.set_default("text.width", 76);
                Ok(())
            }))
        })
}

/// Run `addConfig` of every built-in renderer.
///
/// Returns the modules that contributed. Unlike plugin hooks, a failure
/// here is a defect in the binary and is returned to the caller.
pub fn add_builtin_renderer_config(config: &mut SharedConfig) -> Result<Vec<&'static str>, ScrivError> {
    let catalog = builtin_catalog();
    let mut applied = Vec::new();

    for module in BUILTIN_RENDERERS {
        let hooks = catalog
            .load(module)
            .map_err(|e| ScrivError::Internal(format!("built-in renderer {module}: {e}")))?;
        if let Some(hook) = &hooks.add_config {
            hook(&mut *config)
                .map_err(|e| ScrivError::Internal(format!("built-in renderer {module}: {e}")))?;
            applied.push(module);
        }
    }

    debug!(?applied, "registered built-in renderer defaults");
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_catalog_holds_both_renderers() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.module_paths(), vec![HTML_RENDERER_MODULE, TEXT_RENDERER_MODULE]);
    }

    #[test]
    fn renderer_defaults_are_registered() {
        let mut config = SharedConfig::new();
        let applied = add_builtin_renderer_config(&mut config).unwrap();

        assert_eq!(applied, BUILTIN_RENDERERS.to_vec());
        assert_eq!(config.get("html.theme"), Some(&json!("default")));
        assert_eq!(config.get("html.split_level"), Some(&json!(2)));
        assert_eq!(config.get("text.width"), Some(&json!(76)));
    }

    #[test]
    fn existing_values_are_not_overwritten() {
        let mut config = SharedConfig::new();
        config.set("text.width", 100);
        add_builtin_renderer_config(&mut config).unwrap();
        assert_eq!(config.get("text.width"), Some(&json!(100)));
    }
}
