// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Scriv plugin orchestration layer.
//!
//! This crate provides the error type, the shared configuration object
//! plugins mutate, and the lifecycle phase enumeration. Everything a plugin
//! hook receives as an argument is defined here.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ScrivError;
pub use types::{
    CommandLineOptions, Document, Phase, SharedConfig, LOG_PLUGIN_LOADING_ENV, PLUGINS_KEY,
};
