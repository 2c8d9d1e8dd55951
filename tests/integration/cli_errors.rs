use predicates::prelude::*;
use test_support::{cmd_bin, fixture_path, BIN};

#[test]
fn config_without_metrics_is_rejected() {
  cmd_bin(BIN)
    .args(["--config", &fixture_path("configs/no_metrics.json")])
    .assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("no_metrics.json").and(predicate::str::contains("at least one metric")));
}

#[test]
fn delimiter_inside_column_is_rejected() {
  cmd_bin(BIN)
    .args(["--config", &fixture_path("configs/bracket_column.json")])
    .assert()
    .failure()
    .stderr(predicate::str::contains("contains the delimiter ']'"));
}

#[test]
fn unordered_thresholds_need_opt_in() {
  cmd_bin(BIN)
    .args(["--config", &fixture_path("configs/unordered.json")])
    .assert()
    .failure()
    .stderr(predicate::str::contains("excellent >= good >= warning"));

  let out = cmd_bin(BIN)
    .args(["--config", &fixture_path("configs/unordered.json"), "--allow-unordered-thresholds"])
    .env("RUST_LOG", "warn")
    .output()
    .unwrap();
  assert!(out.status.success());
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("rendering bounds as configured"), "{stderr}");
  let text = String::from_utf8(out.stdout).unwrap();
  // bounds are emitted exactly as configured
  assert!(text.find("CSAT >= 5").unwrap() < text.find("CSAT >= 7").unwrap());
}

#[test]
fn unknown_theme_override_fails() {
  cmd_bin(BIN)
    .args(["--config", &fixture_path("configs/survey.json"), "--theme", "Neon"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown theme"));
}

#[test]
fn missing_config_file_is_reported() {
  cmd_bin(BIN)
    .args(["--config", "does/not/exist.json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("reading config"));
}

#[test]
fn no_mode_selected_is_an_error() {
  cmd_bin(BIN)
    .assert()
    .failure()
    .stderr(predicate::str::contains("--config"));
}

#[test]
fn unknown_section_flag_is_a_usage_error() {
  cmd_bin(BIN)
    .args(["--config", &fixture_path("configs/survey.json"), "--section", "sparkles"])
    .assert()
    .code(2);
}
