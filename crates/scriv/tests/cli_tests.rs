// SPDX-FileCopyrightText: 2026 Scriv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests running the `scriv` binary.

use std::path::Path;
use std::process::{Command, Output};

use scriv_test_utils::{write_index_record, TEST_GROUP};

/// Run the binary in `dir` with a clean environment.
fn scriv(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scriv"))
        .args(args)
        .current_dir(dir)
        .env_clear()
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg-config"))
        .env("XDG_DATA_HOME", dir.join("xdg-data"))
        .output()
        .unwrap()
}

fn write_config(dir: &Path, index: &Path) -> String {
    let path = dir.join("test.toml");
    std::fs::write(
        &path,
        format!("[plugins]\nindex_paths = [{:?}]\n", index.display().to_string()),
    )
    .unwrap();
    path.display().to_string()
}

#[test]
fn run_reports_broken_plugin_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index");
    std::fs::create_dir(&index).unwrap();
    write_index_record(
        &index,
        "ghost.toml",
        "scriv-ghost",
        &["ghost/ConfigScrivPlugin.rs"],
        &[(TEST_GROUP, "ghost:10")],
    )
    .unwrap();
    write_index_record(
        &index,
        "html.toml",
        "scriv-html",
        &["scriv/renderers/html/Config.rs"],
        &[(TEST_GROUP, "htmlplus:20")],
    )
    .unwrap();
    let config = write_config(dir.path(), &index);
    std::fs::write(dir.path().join("paper.tex"), "\\section{Intro}\n").unwrap();

    let out = scriv(dir.path(), &["--config", &config, "--plugins", "cli.extra", "paper.tex"]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout.contains("Failed to load ghost.ConfigScrivPlugin:\n"));
    assert!(stdout.contains("  ignoring plugin\n"));
    assert!(stdout.contains("Plugins: ghost, htmlplus, cli.extra"));
}

#[test]
fn verbose_env_prints_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index");
    std::fs::create_dir(&index).unwrap();
    write_index_record(
        &index,
        "html.toml",
        "scriv-html",
        &["scriv/renderers/html/Config.rs"],
        &[(TEST_GROUP, "htmlplus")],
    )
    .unwrap();
    let config = write_config(dir.path(), &index);
    std::fs::write(dir.path().join("paper.tex"), "").unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_scriv"))
        .args(["--config", &config, "paper.tex"])
        .current_dir(dir.path())
        .env_clear()
        .env("HOME", dir.path())
        .env("SCRIV_LOG_PLUGIN_LOADING", "1")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success());
    assert!(stdout.contains("Running addConfig from: scriv.renderers.html.Config"));
}

#[test]
fn malformed_priority_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index");
    std::fs::create_dir(&index).unwrap();
    write_index_record(&index, "bad.toml", "scriv-bad", &[], &[(TEST_GROUP, "bad:soon")]).unwrap();
    let config = write_config(dir.path(), &index);

    let out = scriv(dir.path(), &["--config", &config, "paper.tex"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("bad:soon"));
}

#[test]
fn unknown_config_key_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typo.toml");
    std::fs::write(&path, "[plugins]\ngrop = \"x\"\n").unwrap();

    let out = scriv(dir.path(), &["--config", &path.display().to_string(), "--list-plugins"]);

    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn list_plugins_plain_output() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index");
    std::fs::create_dir(&index).unwrap();
    write_index_record(
        &index,
        "acme.toml",
        "scriv-acme",
        &["acme/ConfigScrivPlugin.rs"],
        &[(TEST_GROUP, "acme:10")],
    )
    .unwrap();
    let config = write_config(dir.path(), &index);

    let out = scriv(dir.path(), &["--config", &config, "--list-plugins", "--plain"]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success());
    assert!(stdout.contains("[OK] acme"));
    assert!(stdout.contains("acme.ConfigScrivPlugin"));
}
