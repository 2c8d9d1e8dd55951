use predicates::prelude::*;
use test_support::{cmd_bin, fixture_path, BIN};

#[test]
fn survey_config_prints_artifact_to_stdout() {
  let out = cmd_bin(BIN)
    .args(["--config", &fixture_path("configs/survey.json")])
    .output()
    .unwrap();
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let text = String::from_utf8(out.stdout).unwrap();

  assert!(text.starts_with("// Customer Pulse\n"));
  assert!(text.contains("HTML_Narrative ="));
  assert!(text.contains("VAR CSAT = ROUND(AVERAGE('Survey'[Score]), 2)"));
  let tiers: Vec<usize> = ["CSAT >= 9", "CSAT >= 7", "CSAT >= 5"]
    .iter()
    .map(|n| text.find(n).unwrap())
    .collect();
  assert!(tiers[0] < tiers[1] && tiers[1] < tiers[2]);
  assert!(text.contains("& CSAT_Color &"));
  for absent in ["TrendPct", "PerfSummary", "PositiveHTML"] {
    assert!(!text.contains(absent), "unexpected {absent}");
  }
  assert!(text.trim_end().ends_with("RETURN HTML"));
}

#[test]
fn full_config_renders_sections_in_registry_order() {
  let out = cmd_bin(BIN)
    .args(["--config", &fixture_path("configs/support_desk.json")])
    .output()
    .unwrap();
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let text = String::from_utf8(out.stdout).unwrap();

  assert!(text.contains("Support_Narrative ="));
  assert!(text.contains("'Support Tickets'[Hours To Resolve]"));
  assert!(text.contains("ResolutionHours <= 4"));
  assert!(text.contains("QueueTemp >= 40 && QueueTemp <= 60"));
  assert!(text.contains("CONTAINSSTRING('Support Tickets'[Comment], \"refund\")"));

  let markers = [
    "Support Desk Weekly</h1>",
    "ResolutionHours_Color",
    "30-Day Trend",
    "Top Performer",
    "Top 3",
    "Action Dashboard",
    "Positive Feedback (",
    "Critical Feedback (",
    "Feedback Themes",
    "Score Distribution",
    "Response Velocity",
    "Auto-generated by Power BI DAX",
  ];
  let html_start = text.find("VAR HTML =").unwrap();
  let mut last = html_start;
  for m in markers {
    let pos = text[last..].find(m).map(|p| p + last);
    assert!(pos.is_some(), "missing or out of order: {m}");
    last = pos.unwrap();
  }
  // theme colours are emitted verbatim
  assert!(text.contains("#059669"));
  assert!(text.contains("🛠️"));
}

#[test]
fn section_and_theme_flags_override_the_file() {
  let out = cmd_bin(BIN)
    .args([
      "--config",
      &fixture_path("configs/support_desk.json"),
      "--section",
      "kpi_cards",
      "--section",
      "header",
      "--theme",
      "slate gray",
      "--title",
      "Override <Title>",
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let text = String::from_utf8(out.stdout).unwrap();
  assert!(text.contains("Override &lt;Title&gt;</h1>"));
  assert!(text.contains("#475569"));
  assert!(!text.contains("Top Performer"));
  assert!(!text.contains("Response Velocity"));
  assert!(text.find("</h1>").unwrap() < text.find("ResolutionHours_Status &").unwrap());
}

#[test]
fn out_path_writes_file_and_keeps_stdout_empty() {
  let td = test_support::tempdir();
  let target = td.path().join("reports").join("pulse.dax");
  cmd_bin(BIN)
    .args(["--config", &fixture_path("configs/survey.json"), "--out", target.to_str().unwrap()])
    .assert()
    .success()
    .stdout(predicate::str::is_empty());
  let text = std::fs::read_to_string(&target).unwrap();
  assert!(text.ends_with("RETURN HTML"));
}

#[test]
fn output_is_deterministic_across_runs() {
  let run = || {
    cmd_bin(BIN)
      .args(["--config", &fixture_path("configs/support_desk.json")])
      .output()
      .unwrap()
      .stdout
  };
  assert_eq!(run(), run());
}
