//! CLI and basic command tests

mod common;

use common::{create_test_asset, create_test_case, fleetcare, setup_test_project};
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    fleetcare()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("After-sales service"));
}

#[test]
fn test_version_displays() {
    fleetcare()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleetcare"));
}

#[test]
fn test_unknown_command_fails() {
    fleetcare()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    fleetcare()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fleetcare"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    fleetcare()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".fleet").is_dir());
    assert!(tmp.path().join(".fleet/config.yaml").exists());
    assert!(tmp.path().join("assets").is_dir());
    assert!(tmp.path().join("cases").is_dir());
}

#[test]
fn test_init_twice_fails_without_force() {
    let tmp = setup_test_project();
    fleetcare().current_dir(tmp.path()).arg("init").assert().failure();
    fleetcare()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();
    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "list"])
        .assert()
        .failure();
}

// ============================================================================
// Asset Command Tests
// ============================================================================

#[test]
fn test_asset_new_writes_file() {
    let tmp = setup_test_project();
    let id = create_test_asset(&tmp, "Moving head MH-7", &["--code", "MH-7"]);

    assert!(id.starts_with("AST-"));
    let path = tmp.path().join("assets").join(format!("{}.fleet.yaml", id));
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("name: Moving head MH-7"));
    assert!(content.contains("code: MH-7"));
    assert!(content.contains("author: test"));
}

#[test]
fn test_asset_new_rejects_mileage_on_equipment() {
    let tmp = setup_test_project();
    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "new", "--name", "Console", "--mileage", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only applies to vehicles"));
}

#[test]
fn test_asset_list_and_show_by_alias() {
    let tmp = setup_test_project();
    create_test_asset(&tmp, "Console", &["--code", "GMA-2"]);
    create_test_asset(
        &tmp,
        "Van",
        &["--kind", "vehicle", "--insurance-expiry", "2020-01-01"],
    );

    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AST@1"))
        .stdout(predicate::str::contains("GMA-2"))
        .stdout(predicate::str::contains("insurance_expired"));

    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "list", "--alerts", "--count"])
        .assert()
        .success()
        .stdout("1\n");

    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "show", "gma-2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Console"));
}

#[test]
fn test_asset_list_json() {
    let tmp = setup_test_project();
    create_test_asset(&tmp, "Console", &[]);

    let output = fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    assert_eq!(parsed[0]["status"], "available");
}

#[test]
fn test_asset_alerts_for_single_asset() {
    let tmp = setup_test_project();
    let id = create_test_asset(
        &tmp,
        "Van",
        &["--kind", "vehicle", "--technical-control-expiry", "2020-06-30"],
    );

    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "alerts", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Technical control expired"));
}

#[test]
fn test_asset_maintain_sets_next_date() {
    let tmp = setup_test_project();
    let id = create_test_asset(&tmp, "Console", &["--interval-days", "90"]);

    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "maintain", &id, "--date", "2026-01-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-04-10"));
}

#[test]
fn test_asset_mileage_raises_distance_maintenance() {
    let tmp = setup_test_project();
    let id = create_test_asset(
        &tmp,
        "Van",
        &["--kind", "vehicle", "--interval-km", "15000", "--mileage", "0"],
    );
    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "maintain", &id, "--date", "2026-01-10", "--mileage", "0"])
        .assert()
        .success();

    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "mileage", &id, "16000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("16000 km"))
        .stdout(predicate::str::contains("Maintenance due"));

    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "mileage", &id, "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("below the current reading"));
}

#[test]
fn test_asset_delete_requires_no_open_case() {
    let tmp = setup_test_project();
    let asset = create_test_asset(&tmp, "Console", &[]);
    create_test_case(&tmp, &asset, "repair");

    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "delete", &asset, "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("retire it instead"));
}

// ============================================================================
// Case Command Tests
// ============================================================================

#[test]
fn test_case_lifecycle_through_cli() {
    let tmp = setup_test_project();
    let asset = create_test_asset(&tmp, "Console", &[]);
    let case = create_test_case(&tmp, &asset, "repair");
    assert!(case.starts_with("CASE-"));

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "move", &case, "in_progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("open → in_progress"));

    fleetcare()
        .current_dir(tmp.path())
        .args(["asset", "show", &asset, "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"maintenance\""));

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "move", &case, "waiting-parts", "-m", "PSU ordered"])
        .assert()
        .success();

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "move", &case, "in_progress"])
        .assert()
        .success();

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "move", &case, "completed", "--cost", "85.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is now available"));

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "show", &case])
        .assert()
        .success()
        .stdout(predicate::str::contains("PSU ordered"))
        .stdout(predicate::str::contains("Next: closed"));
}

#[test]
fn test_case_move_by_number_and_legacy_alias() {
    let tmp = setup_test_project();
    let asset = create_test_asset(&tmp, "Console", &[]);
    let case = create_test_case(&tmp, &asset, "repair");

    let output = fleetcare()
        .current_dir(tmp.path())
        .args(["case", "show", &case, "--format", "json"])
        .output()
        .unwrap();
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let number = shown["number"].as_str().unwrap().to_string();
    assert!(number.starts_with("REP-") && number.ends_with("-0001"));

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "move", &number, "diagnostic", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"in_progress\""));
}

#[test]
fn test_case_invalid_transition_reports_allowed() {
    let tmp = setup_test_project();
    let asset = create_test_asset(&tmp, "Console", &[]);
    let case = create_test_case(&tmp, &asset, "repair");

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "move", &case, "closed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid transition"))
        .stderr(predicate::str::contains("in_progress, cancelled"));
}

#[test]
fn test_case_stale_revision_is_rejected() {
    let tmp = setup_test_project();
    let asset = create_test_asset(&tmp, "Console", &[]);
    let case = create_test_case(&tmp, &asset, "repair");

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "move", &case, "in_progress", "--expect-revision", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected revision 3"));
}

#[test]
fn test_case_on_unknown_asset_fails() {
    let tmp = setup_test_project();
    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "new", "NOPE-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No asset found"));
}

#[test]
fn test_case_list_filters() {
    let tmp = setup_test_project();
    let asset = create_test_asset(&tmp, "Console", &[]);
    let repair = create_test_case(&tmp, &asset, "repair");
    create_test_case(&tmp, &asset, "training");

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "move", &repair, "cancelled"])
        .assert()
        .success();

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "list", "--phase", "all", "--count"])
        .assert()
        .success()
        .stdout("2\n");

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "list", "--type", "training", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TRN-"));
}

#[test]
fn test_case_stats_json() {
    let tmp = setup_test_project();
    let asset = create_test_asset(&tmp, "Console", &[]);
    create_test_case(&tmp, &asset, "repair");

    let output = fleetcare()
        .current_dir(tmp.path())
        .args(["case", "stats", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["by_phase"]["open"], 1);
}

#[test]
fn test_case_edit_requires_a_field() {
    let tmp = setup_test_project();
    let asset = create_test_asset(&tmp, "Console", &[]);
    let case = create_test_case(&tmp, &asset, "repair");

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "edit", &case])
        .assert()
        .failure();

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "edit", &case, "--technician", "Sam", "--priority", "urgent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));
}

#[test]
fn test_case_edit_return_details_and_track() {
    let tmp = setup_test_project();
    let asset = create_test_asset(&tmp, "Console", &[]);
    let rma = create_test_case(&tmp, &asset, "rma");
    let repair = create_test_case(&tmp, &asset, "repair");

    fleetcare()
        .current_dir(tmp.path())
        .args([
            "case",
            "edit",
            &rma,
            "--reason",
            "transport-damage",
            "--carrier",
            "DHL",
            "--tracking",
            "JD014600006281",
            "--shipping",
            "24.90",
        ])
        .assert()
        .success();

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "show", &rma])
        .assert()
        .success()
        .stdout(predicate::str::contains("transport_damage"))
        .stdout(predicate::str::contains("Shipping: 24.90"));

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "track", "jd014600006281", "--format", "id"])
        .assert()
        .success()
        .stdout(format!("{}\n", rma));

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "edit", &repair, "--tracking", "X1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only apply to RMA cases"));

    fleetcare()
        .current_dir(tmp.path())
        .args(["case", "edit", &repair, "--diagnosis", "Dry joint on PSU"])
        .assert()
        .success();
}
