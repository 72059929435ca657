use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const OFFLINE_CATALOG: &str = r#"{
    "name": "Test Catalog",
    "version": "1.2",
    "sources": [
        {
            "id": "fax-office",
            "name": "Fax Office",
            "category": "government",
            "strategy": "scrape_fax_machine",
            "description": "Notices sent by fax only"
        },
        {
            "id": "news-desk",
            "name": "News Desk",
            "category": "news",
            "strategy": "scrape_list",
            "selectors": { "item": "li" }
        },
        {
            "id": "archived",
            "name": "Archived Feed",
            "category": "news",
            "strategy": "discover_rss_on_page",
            "discovery_url": "https://archived.example.gov",
            "enabled": false
        }
    ]
}"#;

fn govscrape_cmd(dir: &Path) -> Command {
    let config = dir.join("sources.json");
    if !config.exists() {
        fs::write(&config, OFFLINE_CATALOG).unwrap();
    }

    let mut cmd = Command::cargo_bin("govscrape").unwrap();
    cmd.current_dir(dir)
        .env("SCRAPER_CONFIG", config.to_str().unwrap())
        .env("SCRAPER_DATA_DIR", dir.join("data").to_str().unwrap())
        .env("SCRAPER_DB_PATH", dir.join("data").join("history.db").to_str().unwrap())
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_run_help_shows_flags() {
    let temp_dir = TempDir::new().unwrap();

    govscrape_cmd(temp_dir.path())
        .arg("run")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--sources"))
        .stdout(predicate::str::contains("--no-save"))
        .stdout(predicate::str::contains("--workers"));
}

#[test]
fn test_sources_lists_enabled_sources() {
    let temp_dir = TempDir::new().unwrap();

    govscrape_cmd(temp_dir.path())
        .arg("sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Catalog (version 1.2)"))
        .stdout(predicate::str::contains(
            "fax-office [scrape_fax_machine] Fax Office (unrecognized strategy)",
        ))
        .stdout(predicate::str::contains(
            "news-desk [scrape_list] News Desk (misconfigured: missing list_url)",
        ))
        .stdout(predicate::str::contains("      Notices sent by fax only"))
        .stdout(predicate::str::contains("archived").not())
        .stdout(predicate::str::contains("Total: 2 source(s)"));
}

#[test]
fn test_run_no_save_prints_summary() {
    let temp_dir = TempDir::new().unwrap();

    govscrape_cmd(temp_dir.path())
        .arg("run")
        .arg("--no-save")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_items\": 0"))
        .stdout(predicate::str::contains("\"sources_processed\": 2"))
        .stdout(predicate::str::contains("\"errors\": 1"));

    assert!(!temp_dir.path().join("data").join("history.db").exists());
}

#[test]
fn test_run_with_source_filter() {
    let temp_dir = TempDir::new().unwrap();

    govscrape_cmd(temp_dir.path())
        .args(["run", "--no-save", "--sources", "fax-office,missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sources_processed\": 1"))
        .stdout(predicate::str::contains("\"errors\": 0"));
}

#[test]
fn test_run_saves_json_and_history() {
    let temp_dir = TempDir::new().unwrap();

    govscrape_cmd(temp_dir.path()).arg("run").assert().success();

    let written: Vec<_> = fs::read_dir(temp_dir.path().join("data"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("scrape_results_") && name.ends_with(".json"))
        .collect();
    assert_eq!(written.len(), 1);

    govscrape_cmd(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"))
        .stdout(predicate::str::contains("v1.2: 0 item(s) from 2 source(s), 1 error(s)"));

    govscrape_cmd(temp_dir.path())
        .args(["history", "--run", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fax-office [success] 0 item(s)"))
        .stdout(predicate::str::contains(
            "warning: unrecognized strategy 'scrape_fax_machine'",
        ))
        .stdout(predicate::str::contains("news-desk [error] 0 item(s)"))
        .stdout(predicate::str::contains("missing list_url"));
}

#[test]
fn test_history_unknown_run_fails() {
    let temp_dir = TempDir::new().unwrap();

    govscrape_cmd(temp_dir.path())
        .args(["history", "--run", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No run #9 recorded"));
}

#[test]
fn test_zero_workers_or_timeout_rejected() {
    let temp_dir = TempDir::new().unwrap();

    for flag in ["--workers", "--timeout", "--deadline"] {
        govscrape_cmd(temp_dir.path())
            .args(["run", "--no-save", flag, "0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value '0'"));
    }
}

#[test]
fn test_history_empty() {
    let temp_dir = TempDir::new().unwrap();

    govscrape_cmd(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No runs recorded."));
}

#[test]
fn test_missing_config_fails() {
    let temp_dir = TempDir::new().unwrap();

    Command::cargo_bin("govscrape")
        .unwrap()
        .current_dir(temp_dir.path())
        .env("SCRAPER_CONFIG", temp_dir.path().join("nope.json").to_str().unwrap())
        .env("RUST_LOG", "off")
        .arg("sources")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Configuration error"));
}

#[test]
fn test_invalid_worker_setting_fails() {
    let temp_dir = TempDir::new().unwrap();

    govscrape_cmd(temp_dir.path())
        .env("SCRAPER_WORKERS", "zero")
        .arg("sources")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SCRAPER_WORKERS must be a positive integer"));
}
