// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Reject malformed GeneratorConfig values before they reach the composer
// role: validation/config
// inputs: GeneratorConfig, ValidateOptions
// outputs: Ok(warnings) or the first ConfigError found
// invariants:
// - checks run in a fixed order so the same config always reports the same error
// - never mutates the config; misordered bounds are reported, not corrected
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use thiserror::Error;

use crate::compose::bindings::{self, MetricNames};
use crate::model::{ColumnKind, DatasetProfile, GeneratorConfig};
use crate::theme;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("table name is empty")]
  EmptyTable,
  #[error("measure name is empty")]
  EmptyMeasureName,
  #[error("at least one metric is required")]
  NoMetrics,
  #[error("{role} {name:?} contains the delimiter {delimiter:?}")]
  EmbeddedDelimiter { role: &'static str, name: String, delimiter: char },
  #[error("metric {metric:?}: threshold bound {value} is not a finite number")]
  NonFiniteBound { metric: String, value: f64 },
  #[error("metric {metric:?}: {detail}")]
  UnorderedThresholds { metric: String, detail: String },
  #[error("metrics {first:?} and {second:?} both bind {binding}")]
  DuplicateBinding { first: String, second: String, binding: String },
  #[error("metric {metric:?} binds {binding}, which is reserved")]
  ReservedBinding { metric: String, binding: String },
  #[error("metric {metric:?}: decimals must be at most 15, got {decimals}")]
  DecimalsOutOfRange { metric: String, decimals: u32 },
  #[error("theme {theme:?}: {token} is not a colour literal: {value:?}")]
  InvalidThemeColor { theme: String, token: &'static str, value: String },
  #[error("{role} {column:?} is not in the dataset profile")]
  UnknownColumn { role: &'static str, column: String },
  #[error("{role} {column:?} must be {expected}, profile says {found}")]
  WrongColumnKind { role: &'static str, column: String, expected: ColumnKind, found: ColumnKind },
}

/// Largest `decimals` a metric may request; f64 carries no more significant digits.
pub const MAX_DECIMALS: u32 = 15;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
  /// Downgrade non-monotonic threshold bounds from an error to a warning.
  pub allow_unordered_thresholds: bool,
}

/// Validate `cfg`; on success returns human-readable warnings for the caller to log.
pub fn validate(cfg: &GeneratorConfig, opts: ValidateOptions) -> Result<Vec<String>, ConfigError> {
  let mut warnings = Vec::new();

  if cfg.table.trim().is_empty() {
    return Err(ConfigError::EmptyTable);
  }
  if cfg.measure_name.trim().is_empty() {
    return Err(ConfigError::EmptyMeasureName);
  }
  if cfg.metrics.is_empty() {
    return Err(ConfigError::NoMetrics);
  }

  if let Some(m) = cfg.metrics.iter().find(|m| m.decimals > MAX_DECIMALS) {
    return Err(ConfigError::DecimalsOutOfRange { metric: m.name.clone(), decimals: m.decimals });
  }

  check_delimiters(cfg)?;
  check_thresholds(cfg, opts, &mut warnings)?;
  check_bindings(cfg)?;

  if let Some((token, value)) = cfg.theme.invalid_token() {
    return Err(ConfigError::InvalidThemeColor {
      theme: cfg.theme.name.clone(),
      token,
      value: value.to_string(),
    });
  }
  if theme::by_name(&cfg.theme.name).is_some_and(|builtin| *builtin != cfg.theme) {
    warnings.push(format!("custom theme reuses the built-in name {:?}", cfg.theme.name));
  }

  if let Some(profile) = &cfg.profile {
    check_profile(cfg, profile)?;
  }

  Ok(warnings)
}

/// Every column reference with the role it plays, in config order.
fn column_roles(cfg: &GeneratorConfig) -> Vec<(&'static str, &str)> {
  let mut out = Vec::new();
  for m in &cfg.metrics {
    out.push(("metric column", m.source_column.as_str()));
  }
  if let Some(d) = &cfg.date_column {
    out.push(("date column", d.as_str()));
  }
  for c in &cfg.categorical_columns {
    out.push(("categorical column", c.as_str()));
  }
  for t in &cfg.text_columns {
    out.push(("text column", t.text_column.as_str()));
    out.push(("score column", t.score_column.as_str()));
  }
  out
}

fn check_delimiters(cfg: &GeneratorConfig) -> Result<(), ConfigError> {
  if cfg.table.contains('\'') {
    return Err(ConfigError::EmbeddedDelimiter { role: "table", name: cfg.table.clone(), delimiter: '\'' });
  }
  for (role, column) in column_roles(cfg) {
    if column.contains(']') {
      return Err(ConfigError::EmbeddedDelimiter { role, name: column.to_string(), delimiter: ']' });
    }
  }
  Ok(())
}

fn check_thresholds(
  cfg: &GeneratorConfig,
  opts: ValidateOptions,
  warnings: &mut Vec<String>,
) -> Result<(), ConfigError> {
  for metric in &cfg.metrics {
    let Some(threshold) = &metric.threshold else { continue };
    if let Some(value) = threshold.bounds().into_iter().find(|v| !v.is_finite()) {
      return Err(ConfigError::NonFiniteBound { metric: metric.name.clone(), value });
    }
    if let Some(detail) = threshold.ordering_problem() {
      if !opts.allow_unordered_thresholds {
        return Err(ConfigError::UnorderedThresholds { metric: metric.name.clone(), detail });
      }
      warnings.push(format!("metric {:?}: {detail}; rendering bounds as configured", metric.name));
    }
  }
  Ok(())
}

// DAX compares identifiers case-insensitively, so `seen` is keyed on the lowercased name.
fn check_bindings(cfg: &GeneratorConfig) -> Result<(), ConfigError> {
  let mut seen: BTreeMap<String, &str> = BTreeMap::new();
  for metric in &cfg.metrics {
    let names = MetricNames::of(metric);
    if bindings::is_reserved(&names.value) {
      return Err(ConfigError::ReservedBinding { metric: metric.name.clone(), binding: names.value });
    }
    let key = names.value.to_ascii_lowercase();
    if let Some(first) = seen.get(&key) {
      return Err(ConfigError::DuplicateBinding {
        first: first.to_string(),
        second: metric.name.clone(),
        binding: names.value,
      });
    }
    seen.insert(key, &metric.name);
  }
  Ok(())
}

fn expected_kind(role: &str) -> ColumnKind {
  match role {
    "date column" => ColumnKind::Date,
    "categorical column" => ColumnKind::Categorical,
    "text column" => ColumnKind::Text,
    _ => ColumnKind::Numeric,
  }
}

fn check_profile(cfg: &GeneratorConfig, profile: &DatasetProfile) -> Result<(), ConfigError> {
  for (role, column) in column_roles(cfg) {
    let Some(found) = profile.column(column) else {
      return Err(ConfigError::UnknownColumn { role, column: column.to_string() });
    };
    let expected = expected_kind(role);
    if found.kind != expected {
      return Err(ConfigError::WrongColumnKind {
        role,
        column: column.to_string(),
        expected,
        found: found.kind,
      });
    }
  }
  Ok(())
}
