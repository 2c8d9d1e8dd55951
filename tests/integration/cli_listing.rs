use test_support::{cmd_bin, BIN};

#[test]
fn list_themes_prints_registry() {
  let out = cmd_bin(BIN).args(["--list-themes"]).output().unwrap();
  assert!(out.status.success());
  let themes: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let names: Vec<&str> = themes
    .as_array()
    .unwrap()
    .iter()
    .map(|t| t["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, ["Ocean Blue", "Forest Green", "Royal Purple", "Sunset Orange", "Slate Gray"]);
  let keys: Vec<Vec<&String>> = themes
    .as_array()
    .unwrap()
    .iter()
    .map(|t| t.as_object().unwrap().keys().collect())
    .collect();
  assert!(keys.windows(2).all(|w| w[0] == w[1]), "token sets differ");
}

#[test]
fn list_sections_reports_requirements() {
  let out = cmd_bin(BIN).args(["--list-sections"]).output().unwrap();
  assert!(out.status.success());
  let sections: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let sections = sections.as_array().unwrap();
  assert_eq!(sections.len(), 11);
  assert_eq!(sections[0]["id"], "header");
  let perf = sections.iter().find(|s| s["id"] == "performance").unwrap();
  assert_eq!(perf["requires_categorical"], true);
  let velocity = sections.iter().find(|s| s["id"] == "velocity").unwrap();
  assert_eq!(velocity["requires_date"], true);
}

#[test]
fn listing_flags_conflict() {
  cmd_bin(BIN).args(["--list-themes", "--list-sections"]).assert().failure();
}
