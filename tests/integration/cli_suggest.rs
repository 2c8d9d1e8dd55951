use test_support::{cmd_bin, fixture_path, BIN};

#[test]
fn suggest_prints_a_config_that_composes() {
  let out = cmd_bin(BIN)
    .args(["--suggest", "--profile", &fixture_path("profiles/survey_profile.json"), "--table", "Survey"])
    .output()
    .unwrap();
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let suggestion: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

  assert_eq!(suggestion["table"], "Survey");
  assert_eq!(suggestion["metrics"][0]["source_column"], "Score");
  assert_eq!(suggestion["metrics"][0]["threshold"]["direction"], "higher_better");
  assert_eq!(suggestion["metrics"][0]["threshold"]["excellent"], 8.5);
  assert_eq!(suggestion["categorical_columns"], serde_json::json!(["Channel", "Region"]));
  assert_eq!(suggestion["date_column"], "Date");
  assert_eq!(suggestion["theme"]["name"], "Ocean Blue");

  let td = test_support::tempdir();
  let cfg_path = test_support::write_json(td.path(), "suggested.json", &suggestion);
  let composed = cmd_bin(BIN).args(["--config", &cfg_path]).output().unwrap();
  assert!(composed.status.success(), "{}", String::from_utf8_lossy(&composed.stderr));
  let text = String::from_utf8(composed.stdout).unwrap();
  assert!(text.contains("VAR Score = ROUND(AVERAGE('Survey'[Score]), 2)"));
  assert!(text.contains("VAR TrendPct ="));
}

#[test]
fn suggest_without_profile_is_a_usage_error() {
  cmd_bin(BIN).args(["--suggest"]).assert().code(2);
}

#[test]
fn fixture_profile_parses() {
  let profile: serde_json::Value = test_support::read_fixture_json("profiles/survey_profile.json");
  assert_eq!(profile["columns"].as_array().unwrap().len(), 6);
}
