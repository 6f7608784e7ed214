// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration sources: where the installed plugin registrations come from.

use std::path::{Path, PathBuf};

use scriv_core::ScrivError;
use tracing::debug;

use crate::manifest::{parse_distribution_record, DistributionRecord};

/// One plugin registration as reported by a [`RegistrationSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct PluginRegistration {
    /// Name of the distribution that registered the plugin.
    pub distribution: String,
    /// Declared value: `<module.path>` or `<module.path>:<priority>`.
    pub declared_value: String,
    /// Files belonging to the registering distribution, in listing order.
    pub distribution_files: Vec<PathBuf>,
}

impl PluginRegistration {
    pub fn new(
        distribution: impl Into<String>,
        declared_value: impl Into<String>,
        distribution_files: Vec<PathBuf>,
    ) -> Self {
        Self {
            distribution: distribution.into(),
            declared_value: declared_value.into(),
            distribution_files,
        }
    }
}

/// Enumerates installed plugin registrations for a group.
///
/// An `Err` means the index could not be read at all; callers treat that as
/// fatal rather than working with a partial list.
pub trait RegistrationSource {
    fn registrations(&self, group: &str) -> Result<Vec<PluginRegistration>, ScrivError>;
}

/// In-memory registration source, grouped by namespace.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    entries: Vec<(String, PluginRegistration)>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration under `group`.
    pub fn register(&mut self, group: impl Into<String>, registration: PluginRegistration) {
        self.entries.push((group.into(), registration));
    }

    pub fn with(mut self, group: impl Into<String>, registration: PluginRegistration) -> Self {
        self.register(group, registration);
        self
    }
}

impl RegistrationSource for StaticSource {
    fn registrations(&self, group: &str) -> Result<Vec<PluginRegistration>, ScrivError> {
        Ok(self
            .entries
            .iter()
            .filter(|(g, _)| g == group)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

/// Registration source backed by index directories of distribution records.
///
/// Every `*.toml` file directly inside an index directory is one
/// distribution record. Files are read in file-name order so enumeration is
/// stable across runs.
#[derive(Debug, Clone)]
pub struct IndexSource {
    dirs: Vec<PathBuf>,
    require_existing: bool,
}

impl IndexSource {
    /// Source over explicitly configured directories; a missing directory is
    /// a discovery failure.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            require_existing: true,
        }
    }

    /// Source over default directories, where a missing directory just means
    /// nothing was installed there.
    pub fn with_defaults(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            require_existing: false,
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Read every distribution record in one directory, in file-name order.
    fn read_dir_records(
        &self,
        dir: &Path,
        group: &str,
    ) -> Result<Vec<DistributionRecord>, ScrivError> {
        if !dir.exists() {
            if self.require_existing {
                return Err(ScrivError::Discovery {
                    group: group.to_string(),
                    message: format!("index directory {} does not exist", dir.display()),
                    source: None,
                });
            }
            debug!(dir = %dir.display(), "skipping missing plugin index directory");
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| {
            ScrivError::discovery(group, format!("cannot read index directory {}", dir.display()), e)
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ScrivError::discovery(group, format!("cannot read index directory {}", dir.display()), e)
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        paths
            .iter()
            .map(|path| {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    ScrivError::discovery(group, format!("cannot read {}", path.display()), e)
                })?;
                parse_distribution_record(&content).map_err(|e| {
                    ScrivError::discovery(group, format!("malformed record {}", path.display()), e)
                })
            })
            .collect()
    }
}

impl RegistrationSource for IndexSource {
    fn registrations(&self, group: &str) -> Result<Vec<PluginRegistration>, ScrivError> {
        let mut registrations = Vec::new();
        for dir in &self.dirs {
            for record in self.read_dir_records(dir, group)? {
                for ep in record.entry_points.iter().filter(|ep| ep.group == group) {
                    registrations.push(PluginRegistration::new(
                        record.name.clone(),
                        ep.value.clone(),
                        record.files.clone(),
                    ));
                }
            }
        }
        debug!(group, count = registrations.len(), "enumerated plugin registrations");
        Ok(registrations)
    }
}
