// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Propose a starting GeneratorConfig from a precomputed DatasetProfile
// role: heuristics/defaults
// inputs: DatasetProfile, table name
// outputs: GeneratorConfig suggestion; data-quality score
// invariants:
// - deterministic for a given profile (stable sorts, profile order breaks ties)
// - suggested threshold bounds are always ordered for their direction
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use crate::model::{
  Aggregation, ColumnKind, ColumnProfile, DatasetProfile, GeneratorConfig, MetricConfig, TextMapping,
  DEFAULT_MEASURE_NAME, DEFAULT_TITLE,
};
use crate::sections::{self, Capabilities};
use crate::theme;
use crate::threshold::{Direction, Interval, ThresholdConfig};

const MAX_METRICS: usize = 3;
const MAX_CATEGORICAL: usize = 3;

fn round2(v: f64) -> f64 {
  (v * 100.0).round() / 100.0
}

/// Default bounds for a column under `direction`; `None` when the profile lacks min/max.
pub fn default_threshold(direction: Direction, column: &ColumnProfile) -> Option<ThresholdConfig> {
  match direction {
    Direction::HigherBetter => {
      let max = column.max?;
      Some(ThresholdConfig::HigherBetter {
        excellent: round2(max * 0.85),
        good: round2(max * 0.65),
        warning: round2(max * 0.45),
      })
    }
    Direction::LowerBetter => {
      let min = column.min?;
      Some(ThresholdConfig::LowerBetter {
        excellent: round2(min * 1.15),
        good: round2(min * 1.35),
        warning: round2(min * 1.65),
      })
    }
    Direction::RangeOptimal => {
      let (min, max) = (column.min?, column.max?);
      let span = max - min;
      let at = |lo: f64, hi: f64| Interval { min: round2(min + span * lo), max: round2(min + span * hi) };
      Some(ThresholdConfig::RangeOptimal {
        excellent: at(0.40, 0.60),
        good: at(0.30, 0.70),
        warning: at(0.20, 0.80),
      })
    }
  }
}

/// Numeric columns, score-like first, profile order otherwise.
fn ranked_numeric(profile: &DatasetProfile) -> Vec<&ColumnProfile> {
  let mut numeric: Vec<&ColumnProfile> = profile.of_kind(ColumnKind::Numeric).collect();
  numeric.sort_by_key(|c| !c.is_score_like(profile.row_count));
  numeric
}

pub fn suggest_config(profile: &DatasetProfile, table: &str) -> GeneratorConfig {
  let numeric = ranked_numeric(profile);

  let metrics: Vec<MetricConfig> = numeric
    .iter()
    .take(MAX_METRICS)
    .map(|c| MetricConfig {
      name: c.name.clone(),
      source_column: c.name.clone(),
      aggregation: Aggregation::Average,
      decimals: 2,
      threshold: default_threshold(Direction::HigherBetter, c),
      unit: None,
    })
    .collect();

  let mut categorical: Vec<&ColumnProfile> = profile.of_kind(ColumnKind::Categorical).collect();
  categorical.sort_by_key(|c| c.unique_count.unwrap_or(u64::MAX));

  let score_column = numeric.first().map(|c| c.name.clone());
  let text_columns: Vec<TextMapping> = match &score_column {
    Some(score) => profile
      .of_kind(ColumnKind::Text)
      .map(|c| TextMapping { text_column: c.name.clone(), score_column: score.clone() })
      .collect(),
    None => Vec::new(),
  };

  let mut cfg = GeneratorConfig {
    table: table.to_string(),
    title: DEFAULT_TITLE.to_string(),
    measure_name: DEFAULT_MEASURE_NAME.to_string(),
    date_column: profile.of_kind(ColumnKind::Date).next().map(|c| c.name.clone()),
    metrics,
    categorical_columns: categorical.iter().take(MAX_CATEGORICAL).map(|c| c.name.clone()).collect(),
    text_columns,
    theme: theme::default_theme(),
    sections: Vec::new(),
    icons: BTreeMap::new(),
    keywords: crate::model::default_keywords(),
    profile: Some(profile.clone()),
  };
  let every: Vec<_> = sections::REGISTRY.iter().map(|s| s.id).collect();
  cfg.sections = sections::gate(&every, &Capabilities::of(&cfg));
  cfg
}

/// 0..=100 score: 100 minus the mean missing percentage across columns.
pub fn data_quality(profile: &DatasetProfile) -> f64 {
  if profile.columns.is_empty() {
    return 100.0;
  }
  let total: f64 = profile.columns.iter().map(|c| c.missing_pct).sum();
  (100.0 - total / profile.columns.len() as f64).max(0.0)
}
