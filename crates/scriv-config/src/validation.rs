// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::path::Path;

use crate::diagnostic::ConfigError;
use crate::model::ScrivConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &ScrivConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.general.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "general.log_level `{}` is not one of: {}",
                config.general.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let plugins = &config.plugins;
    if plugins.group.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "plugins.group must not be empty".to_string(),
        });
    }

    for (key, name) in [
        ("plugins.new_style_file", &plugins.new_style_file),
        ("plugins.legacy_file", &plugins.legacy_file),
    ] {
        if let Some(message) = check_file_name(key, name) {
            errors.push(ConfigError::Validation { message });
        }
    }

    if plugins.new_style_file == plugins.legacy_file {
        errors.push(ConfigError::Validation {
            message: format!(
                "plugins.new_style_file and plugins.legacy_file must differ, both are `{}`",
                plugins.new_style_file
            ),
        });
    }

    for name in &plugins.extra {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "plugins.extra must not contain empty names".to_string(),
            });
            break;
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A config module file name must be a bare basename with an extension.
fn check_file_name(key: &str, name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some(format!("{key} must not be empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Some(format!("{key} `{name}` must be a file name, not a path"));
    }
    if Path::new(name).extension().is_none() {
        return Some(format!("{key} `{name}` must have a file extension"));
    }
    None
}
