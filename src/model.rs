// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the immutable configuration model (metrics, columns, profiles) consumed by the composer
// role: model/types
// outputs: Serializable structs with stable field names and serde defaults for optional inputs
// invariants: Values are constructed once from validated input and never mutated by the composer
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sections::SectionId;
use crate::theme::{self, ThemeSpec};
use crate::threshold::ThresholdConfig;

pub const DEFAULT_TITLE: &str = "Performance Intelligence Report";
pub const DEFAULT_MEASURE_NAME: &str = "HTML_Narrative";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
  Numeric,
  Categorical,
  Date,
  Text,
}

impl std::fmt::Display for ColumnKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      ColumnKind::Numeric => "numeric",
      ColumnKind::Categorical => "categorical",
      ColumnKind::Date => "date",
      ColumnKind::Text => "text",
    };
    f.write_str(s)
  }
}

/// Statistical profile of one column, as produced by an external profiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
  pub name: String,
  pub kind: ColumnKind,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mean: Option<f64>,
  #[serde(default)]
  pub missing_pct: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unique_count: Option<u64>,
}

impl ColumnProfile {
  /// Numeric column on a bounded 0..=10 scale with enough distinct values to look like a rating.
  ///
  /// Only used to rank default suggestions; never enforced.
  pub fn is_score_like(&self, row_count: u64) -> bool {
    if self.kind != ColumnKind::Numeric || row_count == 0 {
      return false;
    }
    let (Some(min), Some(max)) = (self.min, self.max) else {
      return false;
    };
    let unique_ratio = self.unique_count.unwrap_or(0) as f64 / row_count as f64;
    unique_ratio > 0.05 && min >= 0.0 && max <= 10.0
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
  pub row_count: u64,
  pub columns: Vec<ColumnProfile>,
}

impl DatasetProfile {
  pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
    self.columns.iter().find(|c| c.name == name)
  }

  pub fn of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &ColumnProfile> {
    self.columns.iter().filter(move |c| c.kind == kind)
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
  Average,
  Sum,
  Min,
  Max,
  Count,
}

impl Aggregation {
  pub fn dax_function(&self) -> &'static str {
    match self {
      Aggregation::Average => "AVERAGE",
      Aggregation::Sum => "SUM",
      Aggregation::Min => "MIN",
      Aggregation::Max => "MAX",
      Aggregation::Count => "COUNT",
    }
  }
}

fn default_decimals() -> u32 {
  2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
  pub name: String,
  pub source_column: String,
  pub aggregation: Aggregation,
  #[serde(default = "default_decimals")]
  pub decimals: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub threshold: Option<ThresholdConfig>,
  /// Suffix shown after the value on KPI cards, e.g. "%" or " ms".
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unit: Option<String>,
}

/// A free-text column and the numeric column used to rank its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMapping {
  pub text_column: String,
  pub score_column: String,
}

fn default_title() -> String {
  DEFAULT_TITLE.to_string()
}

fn default_measure_name() -> String {
  DEFAULT_MEASURE_NAME.to_string()
}

pub fn default_keywords() -> Vec<String> {
  ["price", "quality", "service", "support", "delivery"]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Complete input of one composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
  pub table: String,
  #[serde(default = "default_title")]
  pub title: String,
  #[serde(default = "default_measure_name")]
  pub measure_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date_column: Option<String>,
  pub metrics: Vec<MetricConfig>,
  #[serde(default)]
  pub categorical_columns: Vec<String>,
  #[serde(default)]
  pub text_columns: Vec<TextMapping>,
  #[serde(default = "theme::default_theme", deserialize_with = "theme::deserialize_theme")]
  pub theme: ThemeSpec,
  pub sections: Vec<SectionId>,
  /// Icon overrides keyed by section id or by `trend_up`, `trend_down`, `trend_flat`, `top`, `bottom`.
  #[serde(default)]
  pub icons: BTreeMap<String, String>,
  #[serde(default = "default_keywords")]
  pub keywords: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub profile: Option<DatasetProfile>,
}

impl GeneratorConfig {
  /// Metric driving trend, breakdown and verbatim bindings.
  pub fn primary_metric(&self) -> Option<&MetricConfig> {
    self.metrics.first()
  }

  /// First metric carrying a threshold; drives the tier distribution.
  pub fn first_thresholded(&self) -> Option<(&MetricConfig, &ThresholdConfig)> {
    self.metrics.iter().find_map(|m| m.threshold.as_ref().map(|t| (m, t)))
  }

  pub fn icon<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
    self.icons.get(key).map(String::as_str).unwrap_or(fallback)
  }
}
