// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate per-config processing: load, validate, compose in parallel, then write artifacts and the manifest
// role: processing/orchestrator
// inputs: EffectiveConfig (compose mode), optional now
// outputs: Artifact text on stdout or files on disk; manifest.json and a {dir, manifest} pointer for directory runs
// side_effects: Creates directories; writes .dax and JSON files; prints to stdout; logs to stderr
// invariants:
// - every config is validated before any output is written; the first failure aborts the run
// - results keep the order of the --config arguments regardless of worker scheduling
// - directory runs ⇒ manifest.json exists and pointer {dir, manifest} printed
// errors: Propagates load/validation/write errors with config or file path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cli::EffectiveConfig;
use crate::compose;
use crate::manifest::{ArtifactEntry, MANIFEST_FILE, write_manifest};
use crate::model::GeneratorConfig;
use crate::params;
use crate::sections::{self, Capabilities};
use crate::validate::{self, ValidateOptions};

/// One composed artifact, ready to be written.
#[derive(Debug)]
pub struct Rendered {
  pub config_path: String,
  pub config: GeneratorConfig,
  pub artifact: compose::Artifact,
  pub text: String,
}

/// Load, validate and compose one config file.
pub fn render_one(path: &str, cfg: &EffectiveConfig) -> Result<Rendered> {
  let config = params::load_generator_config(path, &cfg.overrides)?;

  let opts = ValidateOptions { allow_unordered_thresholds: cfg.allow_unordered_thresholds };
  let warnings = validate::validate(&config, opts).with_context(|| format!("invalid config {path}"))?;
  for w in warnings {
    warn!(config = %path, "{w}");
  }

  for id in sections::dropped(&config.sections, &Capabilities::of(&config)) {
    info!(config = %path, section = id.as_str(), "section skipped: required columns not configured");
  }

  let artifact = compose::compose_artifact(&config);
  let text = artifact.render();
  debug!(
    config = %path,
    bytes = text.len(),
    bindings = artifact.binding_names().len(),
    sections = artifact.sections.len(),
    "composed"
  );
  Ok(Rendered { config_path: path.to_string(), config, artifact, text })
}

/// Compose every config in parallel; output order follows input order.
pub fn render_all(cfg: &EffectiveConfig) -> Result<Vec<Rendered>> {
  cfg.configs.par_iter().map(|path| render_one(path, cfg)).collect()
}

fn write_single(out: &str, rendered: &Rendered) -> Result<()> {
  if out == "-" {
    println!("{}", rendered.text);
    return Ok(());
  }
  let out_path = Path::new(out);
  if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(out_path, &rendered.text).with_context(|| format!("writing {out}"))?;
  info!(file = %out, bytes = rendered.text.len(), "artifact written");
  Ok(())
}

fn write_directory(cfg: &EffectiveConfig, rendered: &[Rendered], now_opt: Option<DateTime<Local>>) -> Result<()> {
  let base_dir = crate::util::prepare_out_dir(&cfg.out, now_opt)?;

  let mut names = BTreeSet::new();
  let mut entries = Vec::with_capacity(rendered.len());
  for r in rendered {
    let file = params::artifact_file_name(&r.config_path, &r.config);
    if !names.insert(file.clone()) {
      bail!("two configs would both write {file} (config {}); rename one of them", r.config_path);
    }
    let path = Path::new(&base_dir).join(&file);
    std::fs::write(&path, &r.text).with_context(|| format!("writing {}", path.display()))?;
    entries.push(ArtifactEntry {
      config: r.config_path.clone(),
      file,
      table: r.config.table.clone(),
      measure: r.config.measure_name.clone(),
      theme: r.config.theme.name.clone(),
      sections: r.artifact.sections.clone(),
      bytes: r.text.len(),
    });
  }

  write_manifest(
    crate::util::effective_now(now_opt),
    cfg.allow_unordered_thresholds,
    &base_dir,
    &entries,
  )?;
  info!(dir = %base_dir, artifacts = entries.len(), "manifest written");

  let pointer = serde_json::json!({ "dir": base_dir, "manifest": MANIFEST_FILE });
  println!("{}", serde_json::to_string_pretty(&pointer)?);
  Ok(())
}

pub fn process_configs(cfg: &EffectiveConfig, now_opt: Option<DateTime<Local>>) -> Result<()> {
  let rendered = render_all(cfg)?;

  if cfg.writes_directory() {
    write_directory(cfg, &rendered, now_opt)
  } else {
    match rendered.first() {
      Some(r) => write_single(&cfg.out, r),
      None => bail!("no configs to compose"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cli::{Mode, Overrides};

  const SURVEY: &str = r#"{
    "table": "Survey",
    "title": "Customer Pulse",
    "metrics": [{
      "name": "CSAT", "source_column": "Score", "aggregation": "average",
      "threshold": { "direction": "higher_better", "excellent": 9, "good": 7, "warning": 5 }
    }],
    "sections": ["header", "kpi_cards", "performance"]
  }"#;

  fn effective(configs: Vec<String>, out: String) -> EffectiveConfig {
    EffectiveConfig {
      mode: Mode::Compose,
      configs,
      out,
      overrides: Overrides::default(),
      allow_unordered_thresholds: false,
      now_override: None,
    }
  }

  fn write(dir: &Path, name: &str, body: &str) -> String {
    let p = dir.join(name);
    std::fs::write(&p, body).unwrap();
    p.to_string_lossy().to_string()
  }

  #[test]
  fn render_one_gates_and_composes() {
    let td = tempfile::TempDir::new().unwrap();
    let path = write(td.path(), "survey.json", SURVEY);
    let r = render_one(&path, &effective(vec![path.clone()], "-".into())).unwrap();
    assert_eq!(r.artifact.sections, vec![sections::SectionId::Header, sections::SectionId::KpiCards]);
    assert!(r.text.contains("VAR CSAT = ROUND(AVERAGE('Survey'[Score]), 2)"));
  }

  #[test]
  fn invalid_config_names_the_file() {
    let td = tempfile::TempDir::new().unwrap();
    let path = write(td.path(), "empty.json", r#"{ "table": "T", "metrics": [], "sections": [] }"#);
    let err = render_one(&path, &effective(vec![path.clone()], "-".into())).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("empty.json"), "{msg}");
    assert!(msg.contains("at least one metric"), "{msg}");
  }

  #[test]
  fn directory_run_writes_artifacts_and_manifest() {
    let td = tempfile::TempDir::new().unwrap();
    let a = write(td.path(), "survey.json", SURVEY);
    let b = write(td.path(), "pulse.json", SURVEY);
    let out = td.path().join("out");
    let cfg = effective(vec![a, b], out.to_string_lossy().to_string());
    process_configs(&cfg, None).unwrap();
    assert!(out.join("survey.dax").exists());
    assert!(out.join("pulse.dax").exists());
    let v: serde_json::Value = serde_json::from_slice(&std::fs::read(out.join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(v["artifacts"][0]["file"], "survey.dax");
    assert_eq!(v["artifacts"][1]["file"], "pulse.dax");
  }

  #[test]
  fn colliding_file_names_are_rejected() {
    let td = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(td.path().join("x")).unwrap();
    let a = write(td.path(), "survey.json", SURVEY);
    let b = write(&td.path().join("x"), "survey.json", SURVEY);
    let cfg = effective(vec![a, b], td.path().join("out").to_string_lossy().to_string());
    let err = process_configs(&cfg, None).unwrap_err();
    assert!(err.to_string().contains("survey.dax"));
  }

  #[test]
  fn single_config_writes_requested_file() {
    let td = tempfile::TempDir::new().unwrap();
    let a = write(td.path(), "survey.json", SURVEY);
    let target = td.path().join("nested").join("pulse.dax");
    let cfg = effective(vec![a], target.to_string_lossy().to_string());
    process_configs(&cfg, None).unwrap();
    let text = std::fs::read_to_string(target).unwrap();
    assert!(text.ends_with("RETURN HTML"));
  }
}
