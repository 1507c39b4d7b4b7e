//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use std::sync::Arc;

use assert_cmd::Command;
use chrono::NaiveDate;
use tempfile::TempDir;

use fleetcare::core::{FixedClock, MemoryStore, ServiceDesk, Store};

/// Helper to get a fleetcare command
pub fn fleetcare() -> Command {
    let mut cmd = Command::cargo_bin("fleetcare").unwrap();
    cmd.env_remove("FLEETCARE_FORMAT")
        .env("FLEETCARE_AUTHOR", "test");
    cmd
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fleetcare()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

/// Register an asset and return its full ID
pub fn create_test_asset(tmp: &TempDir, name: &str, extra: &[&str]) -> String {
    let output = fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "new", "--name", name, "--format", "id"])
        .args(extra)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "asset new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Open a case on an asset and return its full ID
pub fn create_test_case(tmp: &TempDir, asset: &str, case_type: &str) -> String {
    let output = fleetcare()
        .current_dir(tmp.path())
        .args(["case", "new", asset, "--type", case_type, "--format", "id"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "case new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory desk pinned to 2026-10-18
pub fn memory_desk() -> (ServiceDesk, Arc<FixedClock>, Arc<MemoryStore>) {
    let clock = Arc::new(FixedClock::at_date(date(2026, 10, 18)));
    let store = Arc::new(MemoryStore::new());
    let desk = ServiceDesk::new(store.clone() as Arc<dyn Store>, clock.clone()).with_author("test");
    (desk, clock, store)
}
