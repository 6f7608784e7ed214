// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Final plugin list assembly.

use scriv_core::{SharedConfig, PLUGINS_KEY};
use serde_json::Value;
use tracing::info;

/// Combine discovered and externally requested plugin names and record the
/// result under `general.plugins`.
///
/// Discovered names come first in load order, followed by `external` in the
/// order given. Names are not de-duplicated. The list is stored flat; an
/// existing value under the key is replaced.
pub fn merge_plugin_list(
    config: &mut SharedConfig,
    discovered: &[String],
    external: &[String],
) -> Vec<String> {
    let merged: Vec<String> = discovered.iter().chain(external).cloned().collect();

    config.set(
        PLUGINS_KEY,
        Value::Array(merged.iter().cloned().map(Value::String).collect()),
    );
    info!(plugins = ?merged, "plugin list");
    merged
}
