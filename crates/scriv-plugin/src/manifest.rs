// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Distribution record parsing.
//!
//! Each installed distribution drops one TOML record into an index
//! directory. The record lists the files the distribution installed and the
//! entry points it registers:
//!
//! ```toml
//! [distribution]
//! name = "scriv-acme"
//! version = "1.0.0"
//! files = ["acme/__init__.rs", "acme/ConfigScrivPlugin.rs"]
//!
//! [[entry_points]]
//! group = "scriv.plugin"
//! name = "acme"
//! value = "acme:10"
//! ```

use std::path::PathBuf;

use scriv_core::ScrivError;
use serde::{Deserialize, Serialize};

/// Parsed distribution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRecord {
    /// Distribution name, used in diagnostics.
    pub name: String,
    pub version: Option<String>,
    /// Files installed by the distribution, relative to its install root.
    pub files: Vec<PathBuf>,
    pub entry_points: Vec<EntryPoint>,
}

/// A single entry point declared by a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Group (namespace) the entry point is registered under.
    pub group: String,
    pub name: Option<String>,
    /// Declared value: `<module.path>` or `<module.path>:<priority>`.
    pub value: String,
}

/// Intermediate TOML deserialization struct for a record file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordFile {
    distribution: DistributionSection,
    #[serde(default)]
    entry_points: Vec<EntryPoint>,
}

/// The `[distribution]` section of a record file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DistributionSection {
    name: String,
    version: Option<String>,
    #[serde(default)]
    files: Vec<PathBuf>,
}

/// Parse a distribution record from TOML content.
///
/// The distribution name must be non-empty, and so must every entry point's
/// group and value.
pub fn parse_distribution_record(toml_content: &str) -> Result<DistributionRecord, ScrivError> {
    let file: RecordFile = toml::from_str(toml_content)
        .map_err(|e| ScrivError::Config(format!("invalid distribution record: {e}")))?;

    let section = file.distribution;
    if section.name.trim().is_empty() {
        return Err(ScrivError::Config(
            "distribution record: name must not be empty".to_string(),
        ));
    }

    for ep in &file.entry_points {
        if ep.group.trim().is_empty() {
            return Err(ScrivError::Config(format!(
                "distribution record `{}`: entry point group must not be empty",
                section.name
            )));
        }
        if ep.value.trim().is_empty() {
            return Err(ScrivError::Config(format!(
                "distribution record `{}`: entry point value must not be empty",
                section.name
            )));
        }
    }

    Ok(DistributionRecord {
        name: section.name,
        version: section.version,
        files: section.files,
        entry_points: file.entry_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_record() {
        let toml = r#"
[distribution]
name = "scriv-acme"
version = "1.0.0"
files = ["acme/__init__.rs", "acme/ConfigScrivPlugin.rs"]

[[entry_points]]
group = "scriv.plugin"
name = "acme"
value = "acme:10"

[[entry_points]]
group = "other.group"
value = "acme.other"
"#;
        let record = parse_distribution_record(toml).unwrap();
        assert_eq!(record.name, "scriv-acme");
        assert_eq!(record.version.as_deref(), Some("1.0.0"));
        assert_eq!(record.files.len(), 2);
        assert_eq!(record.files[1], PathBuf::from("acme/ConfigScrivPlugin.rs"));
        assert_eq!(record.entry_points.len(), 2);
        assert_eq!(record.entry_points[0].value, "acme:10");
        assert_eq!(record.entry_points[1].name, None);
    }

    #[test]
    fn parse_minimal_record() {
        let record = parse_distribution_record("[distribution]\nname = \"bare\"\n").unwrap();
        assert_eq!(record.name, "bare");
        assert!(record.version.is_none());
        assert!(record.files.is_empty());
        assert!(record.entry_points.is_empty());
    }

    #[test]
    fn parse_missing_name() {
        let err = parse_distribution_record("[distribution]\nname = \"\"\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains("name must not be empty"));
    }

    #[test]
    fn parse_empty_entry_point_value() {
        let toml = r#"
[distribution]
name = "broken"

[[entry_points]]
group = "scriv.plugin"
value = "  "
"#;
        let err = parse_distribution_record(toml).unwrap_err().to_string();
        assert!(err.contains("value must not be empty"));
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        let toml = "[distribution]\nname = \"x\"\nfilez = []\n";
        let err = parse_distribution_record(toml).unwrap_err().to_string();
        assert!(err.contains("invalid distribution record"));
    }
}
