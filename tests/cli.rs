//! End-to-end tests for the `agentic-search` binary.
//!
//! Only commands that need no network access are exercised here.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG_VARS: &[&str] = &[
    "AGENTIC_SEARCH_PROVIDER",
    "AZURE_OPENAI_API_KEY",
    "OPENAI_API_KEY",
    "AZURE_OPENAI_ENDPOINT",
    "OPENAI_BASE_URL",
    "AZURE_SEARCH_ENDPOINT",
    "AZURE_SEARCH_API_KEY",
    "AGENTIC_SEARCH_PROMPT_DIR",
];

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("agentic-search").unwrap();
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("tools"));
}

#[test]
fn tools_lists_standard_schemas() {
    cmd()
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("search_index"))
        .stdout(predicate::str::contains("get_document"))
        .stdout(predicate::str::contains("get_index_stats"));
}

#[test]
fn tools_hybrid_json() {
    cmd()
        .args(["--format", "json", "tools", "--hybrid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"search_index\""))
        .stdout(predicate::str::contains("Hybrid Search"));
}

#[test]
fn ask_without_configuration_fails() {
    cmd()
        .args(["ask", "--index", "products-semantic", "which shoe?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key missing"));
}

#[test]
fn chat_without_search_endpoint_fails() {
    cmd()
        .env("AZURE_OPENAI_API_KEY", "test")
        .env("AZURE_OPENAI_ENDPOINT", "https://aoai.example.com")
        .args(["chat", "--index", "assets", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("search endpoint is missing"));
}

#[test]
fn ask_with_unsupported_index_names_it() {
    cmd()
        .env("AZURE_OPENAI_API_KEY", "test")
        .env("AZURE_OPENAI_ENDPOINT", "https://aoai.example.com")
        .env("AZURE_SEARCH_ENDPOINT", "https://search.example.com")
        .args(["ask", "--index", "products-v1", "which shoe?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'products-v1'"));
}

#[test]
fn prompts_init_writes_templates() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["prompts", "init", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 prompt template(s)"));
    assert!(dir.path().join("agent.md").exists());
    assert!(dir.path().join("grounded.md").exists());
}
