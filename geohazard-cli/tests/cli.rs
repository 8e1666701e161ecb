//! End-to-end tests for the geohazard binary
//!
//! Every invocation either passes an explicit place name or `--offline`, so
//! no test touches the network.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn geohazard(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("geohazard").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

/// Temp dir holding a config that switches off the tsunami draw
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".geohazardrc.json"),
        r#"{ "hazards": { "tsunami_threshold": 1.0 }, "analysis_delay_ms": 0 }"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_analyze_text() {
    let dir = workspace();
    geohazard(&dir)
        .args(["analyze", "--lat", "14.5995", "--lon", "120.9842", "--name", "Metro Manila"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Metro Manila\n"))
        .stdout(predicate::str::contains("~13.5M"))
        .stdout(predicate::str::contains("50/100"))
        .stdout(predicate::str::contains("Earthquake   high"));
}

#[test]
fn test_analyze_json_offline_without_name() {
    let dir = workspace();
    let output = geohazard(&dir)
        .args(["analyze", "--lat", "9", "--lon", "118", "--offline", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["name"], "9.0000, 118.0000");
    assert_eq!(report["population_estimate"], "Unknown");
    assert_eq!(report["infrastructure"], "Moderate");
}

#[test]
fn test_analyze_geojson_includes_marker() {
    let dir = workspace();
    geohazard(&dir)
        .args([
            "analyze", "--lat", "10.3157", "--lon", "123.8854", "--name", "Cebu City", "--format",
            "geojson",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"FeatureCollection\""))
        .stdout(predicate::str::contains("Cebu City"))
        .stdout(predicate::str::contains("Taal Volcano"));
}

#[test]
fn test_analyze_accepts_negative_coordinates() {
    let dir = workspace();
    geohazard(&dir)
        .args(["analyze", "--lat", "-33.8688", "--lon", "151.2093", "--name", "Sydney"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-33.8688, 151.2093"));
}

#[test]
fn test_analyze_rejects_non_numeric_latitude() {
    let dir = workspace();
    geohazard(&dir)
        .args(["analyze", "--lat", "north", "--lon", "121", "--offline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a number"));
}

#[test]
fn test_ask_without_location() {
    let dir = workspace();
    geohazard(&dir)
        .args(["ask", "What is the population here?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Please select a location"));
}

#[test]
fn test_ask_with_location() {
    let dir = workspace();
    geohazard(&dir)
        .args([
            "ask", "how can we prepare?", "--lat", "7.0731", "--lon", "125.6128", "--name",
            "Davao City",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("in Davao City"));
}

#[test]
fn test_ask_blank_message_prints_nothing() {
    let dir = workspace();
    geohazard(&dir)
        .args(["ask", "   "])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_zones_filtered_by_layer() {
    let dir = workspace();
    geohazard(&dir)
        .args(["zones", "--layer", "volcano"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mayon Volcano"))
        .stdout(predicate::str::contains("West Valley Fault").not());
}

#[test]
fn test_zones_rejects_unknown_layer() {
    let dir = workspace();
    geohazard(&dir)
        .args(["zones", "--layer", "meteor"])
        .assert()
        .failure();
}

#[test]
fn test_config_validate() {
    let dir = workspace();
    geohazard(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config valid"));

    let empty = TempDir::new().unwrap();
    geohazard(&empty)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Using defaults"));
}

#[test]
fn test_config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".geohazardrc.json"),
        r#"{ "geocoder": { "limit": 0 } }"#,
    )
    .unwrap();

    geohazard(&dir)
        .args(["config", "validate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Config validation failed"));
}

#[test]
fn test_config_show() {
    let dir = workspace();
    geohazard(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tsunami_threshold: 1"))
        .stdout(predicate::str::contains("analysis_delay_ms: 0"));
}

#[test]
fn test_chat_session() {
    let dir = workspace();
    fs::write(dir.path().join("street.png"), [0x89, b'P', b'N', b'G']).unwrap();

    let input = "\n\
        what hazards are here?\n\
        /goto 14.5995 120.9842 Metro Manila\n\
        how many people live here?\n\
        /layer volcano\n\
        /zones\n\
        /image street.png\n\
        /image missing.png\n\
        /bogus\n\
        /history\n\
        /quit\n\
        never answered\n";

    geohazard(&dir)
        .arg("chat")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("assistant> Please select a location"))
        .stdout(predicate::str::contains("50/100"))
        .stdout(predicate::str::contains("Metro Manila has an estimated population of ~13.5M"))
        .stdout(predicate::str::contains("Layer volcano hidden"))
        .stdout(predicate::str::contains("Taal Volcano").not())
        .stdout(predicate::str::contains("Analyzing street.png..."))
        .stdout(predicate::str::contains("(image attached)"))
        .stdout(predicate::str::contains("error: "))
        .stdout(predicate::str::contains("unknown command /bogus"))
        .stdout(predicate::str::contains("never answered").not());
}
