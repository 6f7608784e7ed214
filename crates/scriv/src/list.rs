// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `scriv --list-plugins` implementation.
//!
//! Shows every installed plugin in load order together with the config
//! module it resolves to. Nothing is loaded or invoked.

use std::io::IsTerminal;

use scriv_config::ScrivConfig;
use scriv_core::ScrivError;
use scriv_plugin::{list_installed, resolve_config_module, PluginRegistry};
use serde::Serialize;

use crate::run::{conventions, registration_source};

/// One row of the listing.
#[derive(Debug, Serialize)]
pub struct PluginListing {
    pub name: String,
    pub priority: f64,
    pub distribution: String,
    pub config_module: Option<String>,
}

/// Collect the listing rows in load order.
pub fn collect_listing(config: &ScrivConfig) -> Result<Vec<PluginListing>, ScrivError> {
    let source = registration_source(&config.plugins);
    let registry = PluginRegistry::discover(&source, &config.plugins.group)?;
    let conventions = conventions(&config.plugins);

    Ok(registry
        .plugins()
        .iter()
        .map(|p| PluginListing {
            name: p.name().to_string(),
            priority: p.entry.priority,
            distribution: p.distribution.clone(),
            config_module: resolve_config_module(&p.files, &conventions),
        })
        .collect())
}

/// Run the listing. `json` prints machine-readable output; `plain` or a
/// non-TTY stdout disables colors.
pub fn run_list(config: &ScrivConfig, json: bool, plain: bool) -> Result<(), ScrivError> {
    let listing = collect_listing(config)?;

    if json {
        let text = serde_json::to_string_pretty(&listing)
            .map_err(|e| ScrivError::Internal(format!("failed to serialize listing: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    let source = registration_source(&config.plugins);
    let installed = list_installed(&source, &config.plugins.group)?.len();
    let use_color = !plain && std::io::stdout().is_terminal();
    print_listing(&config.plugins.group, installed, &listing, use_color);
    Ok(())
}

fn print_listing(group: &str, installed: usize, listing: &[PluginListing], use_color: bool) {
    println!();
    println!("  scriv plugins ({group})");
    println!("  {}", "-".repeat(35));

    if listing.is_empty() {
        println!("    no plugins installed");
        println!();
        return;
    }

    for row in listing {
        let module = row.config_module.as_deref();
        if use_color {
            use colored::Colorize;
            let marker = if module.is_some() { "✓".green() } else { "-".dimmed() };
            println!(
                "    {} {:<24} {:>6}  {}",
                marker,
                row.name.bold(),
                row.priority,
                module.unwrap_or("(no config module)").dimmed()
            );
        } else {
            let marker = if module.is_some() { "[OK]" } else { "[--]" };
            println!(
                "    {marker} {:<24} {:>6}  {}",
                row.name,
                row.priority,
                module.unwrap_or("(no config module)")
            );
        }
    }

    println!();
    if installed != listing.len() {
        println!(
            "  {installed} registrations, {} after removing duplicates",
            listing.len()
        );
        println!();
    }
}
