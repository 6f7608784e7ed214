// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config-module resolution from a distribution's file listing.
//!
//! Two naming conventions are recognized. A new-style module
//! (`ConfigScrivPlugin.rs` by default) anywhere in the listing always wins.
//! Otherwise the last old-style module (`Config.rs`, conventionally
//! `<pkg>/renderers/<Name>/Config.rs`) is used. A new-style module that
//! wants the old-style behaviour calls into it itself.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// File names that identify a plugin's config module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigConventions {
    pub new_style: String,
    pub legacy: String,
}

impl ConfigConventions {
    pub fn new(new_style: impl Into<String>, legacy: impl Into<String>) -> Self {
        Self {
            new_style: new_style.into(),
            legacy: legacy.into(),
        }
    }
}

impl Default for ConfigConventions {
    fn default() -> Self {
        Self::new("ConfigScrivPlugin.rs", "Config.rs")
    }
}

/// Pick the config module file out of `files`.
pub fn find_config_file<'a>(files: &'a [PathBuf], conventions: &ConfigConventions) -> Option<&'a Path> {
    let new_style = OsStr::new(&conventions.new_style);
    let legacy = OsStr::new(&conventions.legacy);

    let mut legacy_match = None;
    for file in files {
        match file.file_name() {
            Some(name) if name == new_style => return Some(file.as_path()),
            Some(name) if name == legacy => legacy_match = Some(file.as_path()),
            _ => {}
        }
    }
    legacy_match
}

/// Turn a file path into a dotted module path, dropping the extension.
///
/// `acme/renderers/Html/Config.rs` becomes `acme.renderers.Html.Config`.
/// Returns `None` for paths that are not plain relative UTF-8 paths.
pub fn module_path(file: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in file.parent().into_iter().flat_map(Path::components) {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    let stem = file.file_stem()?.to_str()?;
    parts.push(stem);
    Some(parts.join("."))
}

/// Resolve the module path of a plugin's config module, if it has one.
pub fn resolve_config_module(files: &[PathBuf], conventions: &ConfigConventions) -> Option<String> {
    find_config_file(files, conventions).and_then(module_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn new_style_wins_even_when_listed_last() {
        let files = paths(&[
            "acme/renderers/Html/Config.rs",
            "acme/__init__.rs",
            "acme/ConfigScrivPlugin.rs",
        ]);
        let resolved = resolve_config_module(&files, &ConfigConventions::default());
        assert_eq!(resolved.as_deref(), Some("acme.ConfigScrivPlugin"));
    }

    #[test]
    fn nested_legacy_module_is_selected() {
        let files = paths(&["beta/__init__.rs", "beta/renderers/Beta/Config.rs"]);
        let resolved = resolve_config_module(&files, &ConfigConventions::default());
        assert_eq!(resolved.as_deref(), Some("beta.renderers.Beta.Config"));
    }

    #[test]
    fn last_legacy_match_wins() {
        let files = paths(&[
            "gamma/renderers/A/Config.rs",
            "gamma/renderers/B/Config.rs",
            "gamma/util.rs",
        ]);
        let resolved = resolve_config_module(&files, &ConfigConventions::default());
        assert_eq!(resolved.as_deref(), Some("gamma.renderers.B.Config"));
    }

    #[test]
    fn no_match_is_absent() {
        let files = paths(&["delta/__init__.rs", "delta/MyConfig.rs", "delta/Config.toml"]);
        assert_eq!(resolve_config_module(&files, &ConfigConventions::default()), None);
    }

    #[test]
    fn custom_conventions_are_honoured() {
        let files = paths(&["acme/Settings.rs", "acme/ConfigScrivPlugin.rs"]);
        let conventions = ConfigConventions::new("Plugin.rs", "Settings.rs");
        assert_eq!(
            resolve_config_module(&files, &conventions).as_deref(),
            Some("acme.Settings")
        );
    }

    #[test]
    fn module_path_strips_only_final_extension() {
        assert_eq!(module_path(Path::new("./a/b.c/Config.rs")).as_deref(), Some("a.b.c.Config"));
        assert_eq!(module_path(Path::new("Config.rs")).as_deref(), Some("Config"));
        assert_eq!(module_path(Path::new("/abs/Config.rs")), None);
        assert_eq!(module_path(Path::new("../up/Config.rs")), None);
    }
}
