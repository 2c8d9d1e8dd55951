use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::cli::Overrides;
use crate::model::{DatasetProfile, GeneratorConfig};
use crate::theme;

/// Read one generator config and layer the CLI overrides on top of it.
pub fn load_generator_config(path: &str, overrides: &Overrides) -> Result<GeneratorConfig> {
  let bytes = std::fs::read(path).with_context(|| format!("reading config {path}"))?;
  let mut cfg: GeneratorConfig =
    serde_json::from_slice(&bytes).with_context(|| format!("parsing config {path}"))?;
  apply_overrides(&mut cfg, overrides)?;
  Ok(cfg)
}

pub fn apply_overrides(cfg: &mut GeneratorConfig, overrides: &Overrides) -> Result<()> {
  if let Some(name) = &overrides.theme {
    cfg.theme = theme::by_name(name)
      .cloned()
      .ok_or_else(|| anyhow!("unknown theme {name:?} (see --list-themes)"))?;
  }
  if let Some(title) = &overrides.title {
    cfg.title = title.clone();
  }
  if let Some(sections) = &overrides.sections {
    cfg.sections = sections.clone();
  }
  Ok(())
}

pub fn load_profile(path: &str) -> Result<DatasetProfile> {
  let bytes = std::fs::read(path).with_context(|| format!("reading profile {path}"))?;
  serde_json::from_slice(&bytes).with_context(|| format!("parsing profile {path}"))
}

/// `<stem>.dax` for a config path; falls back to the measure name.
pub fn artifact_file_name(config_path: &str, cfg: &GeneratorConfig) -> String {
  let stem = Path::new(config_path)
    .file_stem()
    .map(|s| s.to_string_lossy().to_string())
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| cfg.measure_name.clone());
  format!("{stem}.dax")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sections::SectionId;

  fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
    let p = dir.path().join(name);
    std::fs::write(&p, body).unwrap();
    p.to_string_lossy().to_string()
  }

  const SURVEY: &str = r#"{
    "table": "Survey",
    "metrics": [{ "name": "CSAT", "source_column": "Score", "aggregation": "average" }],
    "sections": ["header", "kpi_cards"]
  }"#;

  #[test]
  fn overrides_win_over_file_values() {
    let td = tempfile::TempDir::new().unwrap();
    let path = write(&td, "survey.json", SURVEY);
    let overrides = Overrides {
      theme: Some("royal purple".into()),
      title: Some("Weekly".into()),
      sections: Some(vec![SectionId::Header]),
    };
    let cfg = load_generator_config(&path, &overrides).unwrap();
    assert_eq!(cfg.theme.name, "Royal Purple");
    assert_eq!(cfg.title, "Weekly");
    assert_eq!(cfg.sections, vec![SectionId::Header]);
  }

  #[test]
  fn file_values_survive_without_overrides() {
    let td = tempfile::TempDir::new().unwrap();
    let path = write(&td, "survey.json", SURVEY);
    let cfg = load_generator_config(&path, &Overrides::default()).unwrap();
    assert_eq!(cfg.theme.name, "Ocean Blue");
    assert_eq!(cfg.sections, vec![SectionId::Header, SectionId::KpiCards]);
  }

  #[test]
  fn errors_name_the_file() {
    let td = tempfile::TempDir::new().unwrap();
    let path = write(&td, "broken.json", "{ not json");
    let err = load_generator_config(&path, &Overrides::default()).unwrap_err();
    assert!(format!("{err:#}").contains("broken.json"));

    let good = write(&td, "survey.json", SURVEY);
    let overrides = Overrides { theme: Some("Neon".into()), ..Default::default() };
    let err = load_generator_config(&good, &overrides).unwrap_err();
    assert!(err.to_string().contains("unknown theme"));
  }

  #[test]
  fn artifact_names_use_config_stem() {
    let cfg: GeneratorConfig = serde_json::from_str(SURVEY).unwrap();
    assert_eq!(artifact_file_name("/tmp/configs/survey.json", &cfg), "survey.dax");
    assert_eq!(artifact_file_name("/", &cfg), "HTML_Narrative.dax");
  }
}
