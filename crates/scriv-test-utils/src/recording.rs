// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hooks that record their invocations.
//!
//! `recording_hooks` implements all four phases. Each hook appends to a
//! shared [`CallLog`] and leaves a marker behind so tests can check both
//! the order of calls and that later phases see earlier changes.

use std::sync::{Arc, Mutex, PoisonError};

use scriv_core::Phase;
use scriv_plugin::PluginHooks;
use serde_json::Value;

/// One recorded hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub plugin: String,
    pub phase: Phase,
}

/// Ordered record of hook invocations, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, plugin: &str, phase: Phase) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Call {
                plugin: plugin.to_string(),
                phase,
            });
    }

    /// All calls in the order they happened.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Plugins that ran `phase`, in call order.
    pub fn plugins_for(&self, phase: Phase) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.phase == phase)
            .map(|c| c.plugin)
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Hooks for every phase that record into `log` as `plugin`.
///
/// Markers left behind:
/// - `addConfig` sets `<plugin>.added = true`
/// - `updateCommandLineOptions` sets option `<plugin>.option = true`
/// - `updateConfig` copies `<plugin>.added` into `<plugin>.updated` and
///   stores the source file under `<plugin>.source`
/// - `initPlugin` sets document userdata `<plugin> = true`
pub fn recording_hooks(plugin: &str, log: &CallLog) -> PluginHooks {
    let (p1, l1) = (plugin.to_string(), log.clone());
    let (p2, l2) = (plugin.to_string(), log.clone());
    let (p3, l3) = (plugin.to_string(), log.clone());
    let (p4, l4) = (plugin.to_string(), log.clone());

    PluginHooks::new()
        .on_add_config(move |config| {
            l1.record(&p1, Phase::AddConfig);
            config.set(format!("{p1}.added"), true);
            Ok(())
        })
        .on_update_command_line_options(move |options| {
            l2.record(&p2, Phase::UpdateCommandLineOptions);
            options.set(format!("{p2}.option"), true);
            Ok(())
        })
        .on_update_config(move |config, source_file| {
            l3.record(&p3, Phase::UpdateConfig);
            let added = config.get(&format!("{p3}.added")).cloned().unwrap_or(Value::Null);
            config.set(format!("{p3}.updated"), added);
            config.set(format!("{p3}.source"), source_file.display().to_string());
            Ok(())
        })
        .on_init_plugin(move |_, _, _, document| {
            l4.record(&p4, Phase::InitPlugin);
            document.userdata_mut().insert(p4.clone(), Value::Bool(true));
            Ok(())
        })
}
