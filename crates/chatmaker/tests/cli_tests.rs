// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs the built binary with an isolated environment and working directory.

use std::path::Path;
use std::process::{Command, Output};

fn chatmaker(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chatmaker"))
        .args(args)
        .current_dir(dir)
        .env_clear()
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .envs(env.iter().copied())
        .output()
        .unwrap()
}

#[test]
fn config_prints_effective_toml() {
    let dir = tempfile::tempdir().unwrap();
    let output = chatmaker(dir.path(), &["config"], &[("PORT", "9100")]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let printed: toml::Value = toml::from_str(&stdout).unwrap();
    assert_eq!(printed["app"]["name"].as_str(), Some("Auto Chat Maker"));
    assert_eq!(printed["app"]["port"].as_integer(), Some(9100));
}

#[test]
fn config_redacts_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let output = chatmaker(
        dir.path(),
        &["config"],
        &[("CLAUDE_API_KEY", "sk-ant-very-secret")],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("sk-ant-very-secret"));
    let printed: toml::Value = toml::from_str(&stdout).unwrap();
    assert_eq!(printed["claude"]["api_key"].as_str(), Some("[redacted]"));
}

#[test]
fn config_reads_local_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("chatmaker.toml"),
        "[app]\nname = \"Team Bot\"\n",
    )
    .unwrap();
    let output = chatmaker(dir.path(), &["config"], &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("name = \"Team Bot\""));
}

#[test]
fn invalid_configuration_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("chatmaker.toml"), "[app]\nnmae = \"typo\"\n").unwrap();
    let output = chatmaker(dir.path(), &["config"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
}
