// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Tiered threshold rules and the nested-IF expressions that colour and label a metric value
// role: model/evaluation
// inputs: ThresholdConfig, the expression holding the value (a VAR name or a column reference), ThemeSpec
// outputs: Colour and status DAX expressions; an in-process classifier mirroring them
// invariants:
// - tiers are tested excellent -> good -> warning, anything else is critical; first match wins
// - comparisons are inclusive in the favourable direction (>=, <=, closed intervals)
// - bounds are rendered exactly as configured; misordered bounds are not corrected here
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

use crate::escape;
use crate::theme::ThemeSpec;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
  HigherBetter,
  LowerBetter,
  RangeOptimal,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tier {
  Excellent,
  Good,
  Warning,
  Critical,
}

impl Tier {
  pub const ALL: [Tier; 4] = [Tier::Excellent, Tier::Good, Tier::Warning, Tier::Critical];

  /// Theme colour used for this tier.
  pub fn color<'a>(&self, theme: &'a ThemeSpec) -> &'a str {
    match self {
      Tier::Excellent => &theme.success,
      Tier::Good => &theme.primary,
      Tier::Warning => &theme.warning,
      Tier::Critical => &theme.danger,
    }
  }

  pub fn index(&self) -> usize {
    match self {
      Tier::Excellent => 0,
      Tier::Good => 1,
      Tier::Warning => 2,
      Tier::Critical => 3,
    }
  }
}

impl Direction {
  /// Status wording per tier, in tier order.
  pub fn labels(&self) -> [&'static str; 4] {
    match self {
      Direction::HigherBetter => ["Excellent", "Strong", "Needs Attention", "Critical"],
      Direction::LowerBetter => ["Excellent", "Good", "Elevated", "Critical"],
      Direction::RangeOptimal => ["Optimal", "Acceptable", "Off Target", "Critical"],
    }
  }

  pub fn label(&self, tier: Tier) -> &'static str {
    self.labels()[tier.index()]
  }
}

/// Closed interval `[min, max]`, written as a two-element array in config files.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Interval {
  pub min: f64,
  pub max: f64,
}

impl From<[f64; 2]> for Interval {
  fn from(v: [f64; 2]) -> Self {
    Self { min: v[0], max: v[1] }
  }
}

impl From<Interval> for [f64; 2] {
  fn from(i: Interval) -> Self {
    [i.min, i.max]
  }
}

impl Interval {
  pub fn contains_interval(&self, other: &Interval) -> bool {
    self.min <= other.min && other.max <= self.max
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum ThresholdConfig {
  HigherBetter { excellent: f64, good: f64, warning: f64 },
  LowerBetter { excellent: f64, good: f64, warning: f64 },
  RangeOptimal { excellent: Interval, good: Interval, warning: Interval },
}

/// Rendered tier expressions for one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierExpressions {
  pub color: String,
  pub status: String,
}

impl ThresholdConfig {
  pub fn direction(&self) -> Direction {
    match self {
      ThresholdConfig::HigherBetter { .. } => Direction::HigherBetter,
      ThresholdConfig::LowerBetter { .. } => Direction::LowerBetter,
      ThresholdConfig::RangeOptimal { .. } => Direction::RangeOptimal,
    }
  }

  /// Every configured bound, for finiteness checks.
  pub fn bounds(&self) -> Vec<f64> {
    match self {
      ThresholdConfig::HigherBetter { excellent, good, warning }
      | ThresholdConfig::LowerBetter { excellent, good, warning } => vec![*excellent, *good, *warning],
      ThresholdConfig::RangeOptimal { excellent, good, warning } => {
        vec![excellent.min, excellent.max, good.min, good.max, warning.min, warning.max]
      }
    }
  }

  /// Conditions for the excellent, good and warning tiers, in evaluation order.
  fn conditions(&self, subject: &str) -> [String; 3] {
    let scalar = |op: &str, bound: f64| format!("{subject} {op} {}", escape::number(bound));
    let interval = |i: &Interval| {
      format!(
        "{subject} >= {} && {subject} <= {}",
        escape::number(i.min),
        escape::number(i.max)
      )
    };
    match self {
      ThresholdConfig::HigherBetter { excellent, good, warning } => {
        [scalar(">=", *excellent), scalar(">=", *good), scalar(">=", *warning)]
      }
      ThresholdConfig::LowerBetter { excellent, good, warning } => {
        [scalar("<=", *excellent), scalar("<=", *good), scalar("<=", *warning)]
      }
      ThresholdConfig::RangeOptimal { excellent, good, warning } => {
        [interval(excellent), interval(good), interval(warning)]
      }
    }
  }

  /// Colour and status expressions over `subject`.
  pub fn expressions(&self, subject: &str, theme: &ThemeSpec) -> TierExpressions {
    let conditions = self.conditions(subject);
    let direction = self.direction();
    let colors = Tier::ALL.map(|t| escape::string_literal(t.color(theme)));
    let labels = Tier::ALL.map(|t| escape::string_literal(direction.label(t)));
    TierExpressions {
      color: nested_if(&conditions, &colors),
      status: nested_if(&conditions, &labels),
    }
  }

  /// Describe the first ordering problem, if the bounds are not internally consistent.
  pub fn ordering_problem(&self) -> Option<String> {
    match self {
      ThresholdConfig::HigherBetter { excellent, good, warning } => {
        if !(excellent >= good && good >= warning) {
          return Some(format!(
            "higher_better bounds must satisfy excellent >= good >= warning (got {excellent}, {good}, {warning})"
          ));
        }
        None
      }
      ThresholdConfig::LowerBetter { excellent, good, warning } => {
        if !(excellent <= good && good <= warning) {
          return Some(format!(
            "lower_better bounds must satisfy excellent <= good <= warning (got {excellent}, {good}, {warning})"
          ));
        }
        None
      }
      ThresholdConfig::RangeOptimal { excellent, good, warning } => {
        for (name, i) in [("excellent", excellent), ("good", good), ("warning", warning)] {
          if i.min > i.max {
            return Some(format!("{name} interval is empty ([{}, {}])", i.min, i.max));
          }
        }
        if !good.contains_interval(excellent) || !warning.contains_interval(good) {
          return Some("range_optimal intervals must nest: excellent within good within warning".to_string());
        }
        None
      }
    }
  }
}

fn nested_if(conditions: &[String; 3], outcomes: &[String; 4]) -> String {
  format!(
    "IF({}, {},\n    IF({}, {},\n    IF({}, {}, {})))",
    conditions[0], outcomes[0], conditions[1], outcomes[1], conditions[2], outcomes[2], outcomes[3]
  )
}

// Rust mirror of the rendered nested IF, used to check tier semantics.
#[cfg(test)]
impl Interval {
  fn contains(&self, v: f64) -> bool {
    v >= self.min && v <= self.max
  }
}

#[cfg(test)]
impl ThresholdConfig {
  /// Classify a value the same way the rendered expressions do.
  fn classify(&self, v: f64) -> Tier {
    let hits = match self {
      ThresholdConfig::HigherBetter { excellent, good, warning } => [v >= *excellent, v >= *good, v >= *warning],
      ThresholdConfig::LowerBetter { excellent, good, warning } => [v <= *excellent, v <= *good, v <= *warning],
      ThresholdConfig::RangeOptimal { excellent, good, warning } => {
        [excellent.contains(v), good.contains(v), warning.contains(v)]
      }
    };
    hits
      .iter()
      .position(|hit| *hit)
      .map(|i| Tier::ALL[i])
      .unwrap_or(Tier::Critical)
  }
}
