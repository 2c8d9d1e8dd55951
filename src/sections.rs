// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Declare every optional report section with its data requirements and gate requests against dataset capabilities
// role: registry/sections
// inputs: Requested section ids; Capabilities derived from a GeneratorConfig
// outputs: Filtered section ids in canonical registry order
// invariants:
// - output order is registry order, never request order; duplicates collapse
// - a section whose requirement is unmet is dropped silently (not an error)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

use crate::model::GeneratorConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SectionId {
  Header,
  KpiCards,
  Trend,
  Performance,
  TopBottom,
  ActionDashboard,
  PositiveVerbatim,
  NegativeVerbatim,
  ThemeKeywords,
  Distribution,
  Velocity,
}

impl SectionId {
  pub fn as_str(&self) -> &'static str {
    match self {
      SectionId::Header => "header",
      SectionId::KpiCards => "kpi_cards",
      SectionId::Trend => "trend",
      SectionId::Performance => "performance",
      SectionId::TopBottom => "top_bottom",
      SectionId::ActionDashboard => "action_dashboard",
      SectionId::PositiveVerbatim => "positive_verbatim",
      SectionId::NegativeVerbatim => "negative_verbatim",
      SectionId::ThemeKeywords => "theme_keywords",
      SectionId::Distribution => "distribution",
      SectionId::Velocity => "velocity",
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSpec {
  pub id: SectionId,
  pub label: &'static str,
  pub requires_categorical: bool,
  pub requires_text: bool,
  pub requires_date: bool,
  pub requires_threshold: bool,
  pub icon: &'static str,
}

const fn section(
  id: SectionId,
  label: &'static str,
  icon: &'static str,
  requires: (bool, bool, bool, bool),
) -> SectionSpec {
  SectionSpec {
    id,
    label,
    requires_categorical: requires.0,
    requires_text: requires.1,
    requires_date: requires.2,
    requires_threshold: requires.3,
    icon,
  }
}

// (categorical, text, date, threshold)
pub static REGISTRY: [SectionSpec; 11] = [
  section(SectionId::Header, "Header", "⚡", (false, false, false, false)),
  section(SectionId::KpiCards, "KPI Cards", "📊", (false, false, false, false)),
  section(SectionId::Trend, "30-Day Trend", "📈", (false, false, true, false)),
  section(SectionId::Performance, "Performance Breakdown", "📊", (true, false, false, false)),
  section(SectionId::TopBottom, "Top & Bottom Groups", "🏅", (true, false, false, false)),
  section(SectionId::ActionDashboard, "Action Dashboard", "🎯", (false, false, false, true)),
  section(SectionId::PositiveVerbatim, "Positive Feedback", "💚", (false, true, false, false)),
  section(SectionId::NegativeVerbatim, "Critical Feedback", "🔴", (false, true, false, false)),
  section(SectionId::ThemeKeywords, "Feedback Themes", "🏷️", (false, true, false, false)),
  section(SectionId::Distribution, "Score Distribution", "📶", (false, false, false, true)),
  section(SectionId::Velocity, "Response Velocity", "🚀", (false, false, true, false)),
];

pub fn spec(id: SectionId) -> &'static SectionSpec {
  // every id has exactly one registry row
  REGISTRY
    .iter()
    .find(|s| s.id == id)
    .unwrap_or(&REGISTRY[0])
}

/// What the dataset can back, derived from the configuration alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
  pub categorical: bool,
  pub text: bool,
  pub date: bool,
  pub threshold: bool,
}

impl Capabilities {
  /// Date and categorical sections aggregate the primary metric, so they also need one.
  pub fn of(cfg: &GeneratorConfig) -> Self {
    let has_metric = cfg.primary_metric().is_some();
    Self {
      categorical: has_metric && !cfg.categorical_columns.is_empty(),
      text: !cfg.text_columns.is_empty(),
      date: has_metric && cfg.date_column.is_some(),
      threshold: cfg.first_thresholded().is_some(),
    }
  }
}

impl SectionSpec {
  pub fn is_satisfied_by(&self, caps: &Capabilities) -> bool {
    (!self.requires_categorical || caps.categorical)
      && (!self.requires_text || caps.text)
      && (!self.requires_date || caps.date)
      && (!self.requires_threshold || caps.threshold)
  }
}

/// Requested sections that the data can back, in registry order.
pub fn gate(requested: &[SectionId], caps: &Capabilities) -> Vec<SectionId> {
  REGISTRY
    .iter()
    .filter(|s| requested.contains(&s.id) && s.is_satisfied_by(caps))
    .map(|s| s.id)
    .collect()
}

/// Requested sections that `gate` would drop, in request order.
pub fn dropped(requested: &[SectionId], caps: &Capabilities) -> Vec<SectionId> {
  let mut out: Vec<SectionId> = Vec::new();
  for id in requested {
    if !spec(*id).is_satisfied_by(caps) && !out.contains(id) {
      out.push(*id);
    }
  }
  out
}
