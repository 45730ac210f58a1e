//! Integration tests for the cbrates binary
//!
//! Every test that needs rates seeds a fresh cache file first, so the binary
//! never reaches the network.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

const SEEDED_CACHE: &str = r#"[
    {"name": "US Dollar", "code": "USD", "value": "90,5000", "nominal": "1"},
    {"name": "Euro", "code": "EUR", "value": "98,1000", "nominal": "1"},
    {"name": "Japanese Yen", "code": "JPY", "value": "60,2500", "nominal": "100"}
]"#;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cbrates"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute cbrates")
}

fn seeded_cache(temp_dir: &TempDir) -> PathBuf {
    let path = temp_dir.path().join("currencies.json");
    fs::write(&path, SEEDED_CACHE).expect("Should seed cache");
    path
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("Temp path should be UTF-8")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cbrates"));
    assert!(stdout.contains("find"));
    assert!(stdout.contains("chart"));
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_url_prints_error_and_exits() {
    let output = run_cli(&["--url", "ftp://example.test", "list"]);
    assert!(!output.status.success(), "Expected invalid URL to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid feed URL"), "stderr: {}", stderr);
}

#[test]
fn test_find_by_code_uses_fresh_cache() {
    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);

    let output = run_cli(&["find", "EUR", "--cache-file", path_arg(&cache)]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        "Name: Euro, Code: EUR, Value: 98,1000, Nominal: 1"
    );
}

#[test]
fn test_find_by_name_ignores_case() {
    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);

    let output = run_cli(&["find", "japanese yen", "--cache-file", path_arg(&cache)]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Code: JPY"));
}

#[test]
fn test_find_unknown_currency_exits_with_one() {
    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);

    let output = run_cli(&["find", "ZZZ", "--cache-file", path_arg(&cache)]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Currency not found: ZZZ"));
}

#[test]
fn test_list_json_matches_cache_format() {
    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);

    let output = run_cli(&["list", "--json", "--cache-file", path_arg(&cache)]);

    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let seeded: serde_json::Value = serde_json::from_str(SEEDED_CACHE).unwrap();
    assert_eq!(listed, seeded);
    // Same four-space layout as the cache file
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\n        \"code\": \"USD\""), "stdout was {}", stdout);
}

#[test]
fn test_list_table_has_every_code() {
    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);

    let output = run_cli(&["list", "--cache-file", path_arg(&cache)]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    for code in ["USD", "EUR", "JPY"] {
        assert!(stdout.contains(code), "Missing {} in {}", code, stdout);
    }
}

#[test]
fn test_corrupt_cache_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let cache = temp_dir.path().join("currencies.json");
    fs::write(&cache, "{ not json").unwrap();

    let output = run_cli(&["list", "--cache-file", path_arg(&cache)]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("corrupt"));
}

#[test]
fn test_chart_saves_image_without_showing() {
    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);
    let image = temp_dir.path().join("chart.png");

    let output = run_cli(&[
        "chart",
        "--no-show",
        "--output",
        path_arg(&image),
        "--cache-file",
        path_arg(&cache),
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(image.exists());
}

#[test]
fn test_cache_info_reports_fresh_file() {
    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);

    let output = run_cli(&["cache-info", "--cache-file", path_arg(&cache)]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fresh"));
    assert!(stdout.contains("3600s"));
}

#[test]
fn test_clear_cache_removes_file() {
    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);

    let output = run_cli(&["clear-cache", "--cache-file", path_arg(&cache)]);

    assert!(output.status.success());
    assert!(!cache.exists());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use cbrates::cli::{parse_identifier_arg, Cli, Command};
    use cbrates::RepositoryConfig;
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn test_cli_find_identifier() {
        let cli = Cli::parse_from(["cbrates", "find", "US Dollar"]);
        assert_eq!(
            cli.command,
            Command::Find {
                identifier: "US Dollar".to_string()
            }
        );
    }

    #[test]
    fn test_cli_find_blank_identifier_rejected() {
        assert!(Cli::try_parse_from(["cbrates", "find", "  "]).is_err());
        assert!(parse_identifier_arg("").is_err());
    }

    #[test]
    fn test_cli_max_age_flows_into_config() {
        let cli = Cli::parse_from(["cbrates", "--max-age", "120", "list"]);
        let config = RepositoryConfig::from_cli(&cli);
        assert_eq!(config.max_age, Duration::from_secs(120));
        assert!(config.save_cache);
    }
}
