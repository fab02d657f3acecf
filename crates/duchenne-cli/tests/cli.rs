//! End-to-end tests for the `duchenne` binary.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use duchenne_test_support::{batch_json, FaceBuilder};
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with no ambient configuration leaking in from the host.
fn duchenne(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("duchenne").unwrap();
    cmd.env_remove("DUCHENNE_CONFIG")
        .env_remove("DUCHENNE_MODE")
        .env_remove("DUCHENNE_CACHE_CAPACITY")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", home)
        .env("HOME", home);
    cmd
}

fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

fn reports(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8(stdout.to_vec())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_scores_detector_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        &dir,
        "faces.json",
        &batch_json(vec![
            FaceBuilder::duchenne_smile().detected(),
            FaceBuilder::social_smile().detected(),
        ]),
    );

    let output = duchenne(dir.path())
        .arg("score")
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let reports = reports(&output);
    assert_eq!(reports.len(), 1);
    let faces = reports[0]["faces"].as_array().unwrap();
    assert_eq!(faces.len(), 2);
    assert_eq!(faces[0]["isGenuine"], true);
    assert_eq!(faces[1]["isGenuine"], false);
    assert_eq!(faces[1]["verdict"], "Social smile");
    assert!(reports[0].get("rejected").is_none());
}

#[test]
fn test_degenerate_face_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        &dir,
        "faces.json",
        &batch_json(vec![
            FaceBuilder::neutral().collapse_left_eye().detected(),
            FaceBuilder::neutral().detected(),
        ]),
    );

    let output = duchenne(dir.path())
        .arg("score")
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let reports = reports(&output);
    let report = &reports[0];
    assert_eq!(report["faces"].as_array().unwrap().len(), 1);
    assert_eq!(report["rejected"][0]["index"], 0);
    assert_eq!(report["rejected"][0]["kind"], "degenerate_geometry");
}

#[test]
fn test_empty_detection_prints_empty_faces() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(&dir, "empty.json", r#"{"image":{"width":640,"height":480}}"#);

    duchenne(dir.path())
        .arg("score")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"faces\":[]"));
}

#[test]
fn test_missing_file_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    duchenne(dir.path())
        .arg("score")
        .arg(dir.path().join("nope.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("reading"));
}

#[test]
fn test_malformed_json_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(&dir, "bad.json", "{\"faces\": [");
    duchenne(dir.path())
        .arg("score")
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("parsing detector output"));
}

#[test]
fn test_wrong_landmark_count_rejects_only_that_face() {
    let dir = tempfile::tempdir().unwrap();
    let mut batch: serde_json::Value =
        serde_json::from_str(&batch_json(vec![FaceBuilder::duchenne_smile().detected()])).unwrap();
    batch["faces"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({
            "landmarks": [{"x": 1, "y": 2}],
            "boundingBox": {"x": 0, "y": 0, "width": 10, "height": 10}
        }));
    let input = write(&dir, "short.json", &batch.to_string());

    let output = duchenne(dir.path())
        .arg("score")
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let reports = reports(&output);
    let report = &reports[0];
    assert_eq!(report["faces"].as_array().unwrap().len(), 1);
    assert_eq!(report["faces"][0]["isGenuine"], true);
    assert_eq!(report["rejected"][0]["index"], 1);
    assert_eq!(report["rejected"][0]["kind"], "invalid_landmarks");
}

#[test]
fn test_negative_image_width_rejected_per_face() {
    let dir = tempfile::tempdir().unwrap();
    let mut batch: serde_json::Value =
        serde_json::from_str(&batch_json(vec![FaceBuilder::neutral().detected()])).unwrap();
    batch["image"]["width"] = serde_json::json!(-640);
    let input = write(&dir, "negative.json", &batch.to_string());

    let output = duchenne(dir.path())
        .arg("score")
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let reports = reports(&output);
    assert_eq!(reports[0]["faces"], serde_json::json!([]));
    assert_eq!(reports[0]["rejected"][0]["kind"], "invalid_dimensions");
}

#[test]
fn test_no_files_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    duchenne(dir.path()).arg("score").assert().failure();
}

#[test]
fn test_invalid_config_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        &dir,
        "config.toml",
        "[policy.weights]\neyeConstriction = 0.9\n",
    );
    let input = write(&dir, "empty.json", r#"{"image":{"width":1,"height":1}}"#);

    duchenne(dir.path())
        .arg("score")
        .arg("--config")
        .arg(&config)
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid [policy]"));
}

#[test]
fn test_blend_mode_uses_expression() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        &dir,
        "faces.json",
        &batch_json(vec![FaceBuilder::social_smile().happy(0.95).detected()]),
    );

    let geometry = duchenne(dir.path())
        .arg("score")
        .arg(&input)
        .output()
        .unwrap();
    let blend = duchenne(dir.path())
        .args(["score", "--mode", "blend"])
        .arg(&input)
        .output()
        .unwrap();

    let geometry = reports(&geometry.stdout);
    let blend = reports(&blend.stdout);
    let (geometry, blend) = (&geometry[0]["faces"][0], &blend[0]["faces"][0]);
    assert_eq!(geometry["isGenuine"], false);
    assert_eq!(blend["isGenuine"], true);
    assert!(blend["score"].as_u64() > geometry["score"].as_u64());
}

#[test]
fn test_stats_count_cache_hits() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        &dir,
        "faces.json",
        &batch_json(vec![FaceBuilder::neutral().detected()]),
    );

    duchenne(dir.path())
        .arg("score")
        .arg(&input)
        .arg(&input)
        .arg("--stats")
        .assert()
        .success()
        .stderr(
            predicate::str::contains("\"requests\":2")
                .and(predicate::str::contains("\"cache_hits\":1"))
                .and(predicate::str::contains("\"faces_scored\":1")),
        );
}

#[test]
fn test_policy_prints_effective_toml() {
    let dir = tempfile::tempdir().unwrap();
    duchenne(dir.path())
        .args(["policy", "--mode", "blend"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("mode = \"blend\"")
                .and(predicate::str::contains("[formulas]"))
                .and(predicate::str::contains("capacity = 256")),
        );
}

#[test]
fn test_policy_honors_env_and_xdg() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("duchenne");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[cache]\ncapacity = 12\n").unwrap();

    duchenne(dir.path())
        .arg("policy")
        .env("DUCHENNE_MODE", "blend")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("mode = \"blend\"")
                .and(predicate::str::contains("capacity = 12")),
        );
}

#[test]
fn test_printed_policy_is_loadable() {
    let dir = tempfile::tempdir().unwrap();
    let printed = duchenne(dir.path())
        .args(["policy", "--mode", "blend"])
        .output()
        .unwrap()
        .stdout;
    let config = dir.path().join("printed.toml");
    fs::write(&config, &printed).unwrap();

    let again = duchenne(dir.path())
        .arg("policy")
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(again.status.success());
    assert_eq!(again.stdout, printed);
}
