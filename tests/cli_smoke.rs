#![allow(clippy::unwrap_used)]
//! CLI smoke tests to verify basic command functionality.
//!
//! Every test points `XDG_CONFIG_HOME` at a temp dir so the user's own
//! config never leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[allow(deprecated)]
fn gazzi(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gazzi").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(config_home: &TempDir, contents: &str) {
    let dir = config_home.path().join("gazzi");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), contents).unwrap();
}

#[test]
fn test_help_displays_usage() {
    let home = TempDir::new().unwrap();
    gazzi(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chat with a local language model"))
        .stdout(predicate::str::contains("--model"))
        .stdout(predicate::str::contains("--temperature"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("ask"));
}

#[test]
fn test_version_displays_version() {
    let home = TempDir::new().unwrap();
    gazzi(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_providers_lists_builtin_ollama_without_config() {
    let home = TempDir::new().unwrap();
    gazzi(&home)
        .arg("providers")
        .assert()
        .success()
        .stdout(predicate::str::contains("ollama"))
        .stdout(predicate::str::contains("http://localhost:11434"));
}

#[test]
fn test_providers_show_configured() {
    let home = TempDir::new().unwrap();
    write_config(
        &home,
        r#"
[providers.lmstudio]
endpoint = "http://localhost:1234"
models = ["qwen2.5"]
"#,
    );

    gazzi(&home)
        .args(["providers", "lmstudio"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:1234"))
        .stdout(predicate::str::contains("qwen2.5"));
}

#[test]
fn test_providers_show_nonexistent() {
    let home = TempDir::new().unwrap();
    gazzi(&home)
        .args(["providers", "nonexistent_provider_xyz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_ask_empty_question_fails() {
    let home = TempDir::new().unwrap();
    gazzi(&home)
        .arg("ask")
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Question is empty"));
}

#[test]
fn test_ask_rejects_out_of_range_temperature() {
    let home = TempDir::new().unwrap();
    gazzi(&home)
        .args(["ask", "hello", "--temperature", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("temperature"));
}

#[test]
fn test_ask_reports_unreachable_backend() {
    let home = TempDir::new().unwrap();
    write_config(
        &home,
        r#"
[chat]
provider = "nowhere"
timeout_secs = 10

[providers.nowhere]
endpoint = "http://127.0.0.1:1"
"#,
    );

    gazzi(&home)
        .args(["ask", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unavailable"));
}

#[test]
fn test_broken_config_is_reported() {
    let home = TempDir::new().unwrap();
    write_config(&home, "[chat\nmodel = ");

    gazzi(&home)
        .args(["ask", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
