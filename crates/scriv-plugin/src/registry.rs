// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry: parses registrations and fixes the load order.
//!
//! Each registration's declared value may carry a priority after a `:`.
//! Plugins load in ascending priority (default `50.0`), with equal
//! priorities ordered by name.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use scriv_core::ScrivError;
use tracing::{debug, warn};

use crate::source::{PluginRegistration, RegistrationSource};

/// Priority assigned to registrations that do not declare one.
pub const DEFAULT_PRIORITY: f64 = 50.0;

/// A parsed declared value.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginEntry {
    /// Lower loads first.
    pub priority: f64,
    /// Module-path name of the plugin.
    pub name: String,
}

impl FromStr for PluginEntry {
    type Err = ScrivError;

    /// Parse `<module.path>` or `<module.path>:<priority>`.
    ///
    /// A priority that is present but not a number is an authoring error in
    /// the registration and is rejected, never silently defaulted.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ScrivError::InvalidRegistration {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let (name, priority) = match value.split_once(':') {
            Some((name, suffix)) => {
                let suffix = suffix.trim();
                if suffix.is_empty() {
                    return Err(invalid("priority after `:` is empty"));
                }
                if suffix.contains(':') {
                    return Err(invalid("expected at most one `:`"));
                }
                let priority: f64 = suffix
                    .parse()
                    .map_err(|_| invalid(&format!("priority `{suffix}` is not a number")))?;
                if priority.is_nan() {
                    return Err(invalid("priority must not be NaN"));
                }
                (name.trim(), priority)
            }
            None => (value.trim(), DEFAULT_PRIORITY),
        };

        if name.is_empty() {
            return Err(invalid("module path is empty"));
        }

        Ok(PluginEntry {
            priority,
            name: name.to_string(),
        })
    }
}

/// A plugin found during discovery, with everything needed to resolve its
/// config module later.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredPlugin {
    pub entry: PluginEntry,
    pub distribution: String,
    pub files: Vec<PathBuf>,
}

impl DiscoveredPlugin {
    pub fn name(&self) -> &str {
        &self.entry.name
    }
}

/// The ordered set of plugins discovered for one run.
///
/// Built fresh on every run and never persisted.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<DiscoveredPlugin>,
}

impl PluginRegistry {
    /// Enumerate `group` on `source` and order the result.
    ///
    /// Fails if the source cannot be read or any declared value is
    /// malformed; no partial registry is ever returned.
    pub fn discover(source: &dyn RegistrationSource, group: &str) -> Result<Self, ScrivError> {
        let registrations = source.registrations(group)?;
        Self::from_registrations(registrations)
    }

    /// Build a registry from already-enumerated registrations.
    ///
    /// When two registrations declare the same name the later one wins.
    pub fn from_registrations(
        registrations: Vec<PluginRegistration>,
    ) -> Result<Self, ScrivError> {
        let mut by_name: HashMap<String, DiscoveredPlugin> = HashMap::new();

        for registration in registrations {
            let entry: PluginEntry = registration.declared_value.parse()?;
            let plugin = DiscoveredPlugin {
                entry,
                distribution: registration.distribution,
                files: registration.distribution_files,
            };
            if let Some(previous) = by_name.insert(plugin.entry.name.clone(), plugin) {
                warn!(
                    plugin = %previous.entry.name,
                    replaced = %previous.distribution,
                    "duplicate plugin registration, keeping the later one"
                );
            }
        }

        let mut plugins: Vec<DiscoveredPlugin> = by_name.into_values().collect();
        plugins.sort_by(|a, b| {
            a.entry
                .priority
                .total_cmp(&b.entry.priority)
                .then_with(|| a.entry.name.cmp(&b.entry.name))
        });

        debug!(
            order = ?plugins.iter().map(DiscoveredPlugin::name).collect::<Vec<_>>(),
            "plugin load order"
        );

        Ok(Self { plugins })
    }

    /// Plugins in load order.
    pub fn plugins(&self) -> &[DiscoveredPlugin] {
        &self.plugins
    }

    /// Plugin names in load order.
    pub fn ordered_names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.entry.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&DiscoveredPlugin> {
        self.plugins.iter().find(|p| p.entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Every declared value registered under `group`, in enumeration order.
pub fn list_installed(
    source: &dyn RegistrationSource,
    group: &str,
) -> Result<Vec<String>, ScrivError> {
    Ok(source
        .registrations(group)?
        .into_iter()
        .map(|r| r.declared_value)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use proptest::prelude::*;

    fn reg(value: &str) -> PluginRegistration {
        PluginRegistration::new(format!("dist-{value}"), value, vec![])
    }

    #[test]
    fn parses_explicit_priority() {
        let entry: PluginEntry = "pkg.conf:10".parse().unwrap();
        assert_eq!(entry.priority, 10.0);
        assert_eq!(entry.name, "pkg.conf");
    }

    #[test]
    fn missing_priority_defaults_to_fifty() {
        let entry: PluginEntry = "pkg.conf".parse().unwrap();
        assert_eq!(entry.priority, 50.0);
        assert_eq!(entry.name, "pkg.conf");
    }

    #[test]
    fn fractional_and_negative_priorities_parse() {
        assert_eq!("a:2.5".parse::<PluginEntry>().unwrap().priority, 2.5);
        assert_eq!("a:-1".parse::<PluginEntry>().unwrap().priority, -1.0);
        assert_eq!("a: 7 ".parse::<PluginEntry>().unwrap().priority, 7.0);
    }

    #[test]
    fn malformed_priority_is_rejected() {
        for value in ["pkg:high", "pkg:", "pkg:1:2", "pkg:NaN"] {
            let err = value.parse::<PluginEntry>().unwrap_err();
            assert!(
                matches!(err, ScrivError::InvalidRegistration { .. }),
                "{value} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn extra_colon_segments_are_rejected() {
        let err = "pkg:1:2".parse::<PluginEntry>().unwrap_err();
        assert!(err.to_string().contains("at most one `:`"), "{err}");
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(":10".parse::<PluginEntry>().is_err());
        assert!("   ".parse::<PluginEntry>().is_err());
    }

    #[test]
    fn orders_by_priority_then_name() {
        let registry = PluginRegistry::from_registrations(vec![
            reg("zeta"),
            reg("late:90"),
            reg("alpha"),
            reg("early:5"),
        ])
        .unwrap();
        assert_eq!(registry.ordered_names(), vec!["early", "alpha", "zeta", "late"]);
    }

    #[test]
    fn later_duplicate_wins() {
        let registry = PluginRegistry::from_registrations(vec![
            PluginRegistration::new("first", "dup:10", vec!["first/Config.rs".into()]),
            PluginRegistration::new("second", "dup:90", vec!["second/Config.rs".into()]),
        ])
        .unwrap();
        assert_eq!(registry.len(), 1);
        let plugin = registry.get("dup").unwrap();
        assert_eq!(plugin.distribution, "second");
        assert_eq!(plugin.entry.priority, 90.0);
    }

    #[test]
    fn one_malformed_registration_fails_discovery() {
        let source = StaticSource::new()
            .with("scriv.plugin", reg("good"))
            .with("scriv.plugin", reg("bad:oops"));
        assert!(PluginRegistry::discover(&source, "scriv.plugin").is_err());
    }

    #[test]
    fn list_installed_keeps_declared_values() {
        let source = StaticSource::new()
            .with("scriv.plugin", reg("b:10"))
            .with("scriv.plugin", reg("a"));
        assert_eq!(
            list_installed(&source, "scriv.plugin").unwrap(),
            vec!["b:10", "a"]
        );
    }

    proptest! {
        #[test]
        fn order_is_independent_of_enumeration_order(
            mut entries in proptest::collection::vec((0u8..100, "[a-z]{1,6}"), 1..12),
            seed in any::<u64>(),
        ) {
            // Unique names so duplicate handling does not interfere.
            entries.sort_by(|a, b| a.1.cmp(&b.1));
            entries.dedup_by(|a, b| a.1 == b.1);

            let values: Vec<String> = entries.iter().map(|(p, n)| format!("{n}:{p}")).collect();
            let mut shuffled = values.clone();
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();

            let a = PluginRegistry::from_registrations(values.iter().map(|v| reg(v)).collect()).unwrap();
            let b = PluginRegistry::from_registrations(shuffled.iter().map(|v| reg(v)).collect()).unwrap();
            prop_assert_eq!(a.ordered_names(), b.ordered_names());

            for pair in a.plugins().windows(2) {
                let (x, y) = (&pair[0].entry, &pair[1].entry);
                prop_assert!(
                    x.priority < y.priority || (x.priority == y.priority && x.name < y.name)
                );
            }
        }
    }
}
