// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Scriv plugin orchestration core.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for fatal startup failures.
///
/// Anything surfaced as a `ScrivError` aborts the run. Per-plugin failures
/// during lifecycle dispatch are never represented here; they are reported
/// and isolated by the dispatcher.
#[derive(Debug, Error)]
pub enum ScrivError {
    /// Configuration errors (invalid TOML, bad values, unusable conventions).
    #[error("configuration error: {0}")]
    Config(String),

    /// The registration source could not enumerate installed plugins.
    #[error("plugin discovery failed for group `{group}`: {message}")]
    Discovery {
        group: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A registration's declared value is malformed (e.g. a priority suffix
    /// that is not a number).
    #[error("invalid plugin registration `{value}`: {reason}")]
    InvalidRegistration { value: String, reason: String },

    /// Filesystem errors outside of discovery (opening the input document).
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScrivError {
    /// Build a `Discovery` error that wraps an underlying cause.
    pub fn discovery(
        group: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ScrivError::Discovery {
            group: group.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }
}
