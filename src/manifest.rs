// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Build and write the manifest for multi-config runs
// role: persistence/manifest
// inputs: generated_at, theme/section overrides snapshot, base_dir, ArtifactEntry[]
// outputs: manifest.json file written under base_dir
// side_effects: Writes to filesystem
// invariants:
// - artifacts[] keep the order of the --config arguments
// - file paths in entries are relative to base_dir and point to <stem>.dax
// - generated_at is serialized in %Y-%m-%dT%H:%M:%S (local)
// errors: IO errors surfaced with full path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::sections::SectionId;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactEntry {
  /// Absolute path of the config file the artifact came from.
  pub config: String,
  pub file: String,
  pub table: String,
  pub measure: String,
  pub theme: String,
  /// Sections actually rendered, after gating.
  pub sections: Vec<SectionId>,
  pub bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
  pub tool: &'static str,
  pub version: &'static str,
  pub generated_at: String,
  pub allow_unordered_thresholds: bool,
  pub artifacts: &'a [ArtifactEntry],
}

impl<'a> Manifest<'a> {
  pub fn new(generated_at: DateTime<Local>, allow_unordered_thresholds: bool, artifacts: &'a [ArtifactEntry]) -> Self {
    Self {
      tool: env!("CARGO_PKG_NAME"),
      version: env!("CARGO_PKG_VERSION"),
      generated_at: generated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
      allow_unordered_thresholds,
      artifacts,
    }
  }

  pub fn write_to(&self, base_dir: &str) -> Result<PathBuf> {
    let path = Path::new(base_dir).join(MANIFEST_FILE);
    let body = serde_json::to_vec_pretty(self)?;
    std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
  }
}

/// Build and write the manifest given pre-computed entries.
pub fn write_manifest(
  generated_at: DateTime<Local>,
  allow_unordered_thresholds: bool,
  base_dir: &str,
  entries: &[ArtifactEntry],
) -> Result<PathBuf> {
  Manifest::new(generated_at, allow_unordered_thresholds, entries).write_to(base_dir)
}
