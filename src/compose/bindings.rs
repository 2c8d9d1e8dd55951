//! Binding phase: every `VAR` the markup phase may reference is declared here.

use crate::escape::{self, qualified, string_literal};
use crate::model::{GeneratorConfig, MetricConfig, TextMapping};
use crate::threshold::{Direction, ThresholdConfig, Tier};

use super::Fragment;

pub const TOTAL_RECORDS: &str = "TotalRecords";
pub const HTML: &str = "HTML";

pub const MAX_DATE: &str = "MaxDate";
pub const TREND_CURRENT: &str = "TrendCurrent";
pub const TREND_PRIOR: &str = "TrendPrior";
pub const TREND_DELTA: &str = "TrendDelta";
pub const TREND_PCT: &str = "TrendPct";
pub const TREND_ICON: &str = "TrendIcon";
pub const TREND_COLOR: &str = "TrendColor";
pub const VELOCITY_CURRENT: &str = "CurrentCount";
pub const VELOCITY_PRIOR: &str = "PriorCount";
pub const VELOCITY_PCT: &str = "VelocityPct";
pub const VELOCITY_ICON: &str = "VelocityIcon";

pub const PERF_SUMMARY: &str = "PerfSummary";
pub const TOP_PERFORMER: &str = "TopPerformer";
pub const BOTTOM_PERFORMER: &str = "BottomPerformer";
pub const TOP_NAME: &str = "TopName";
pub const TOP_SCORE: &str = "TopScore";
pub const TOP_COUNT: &str = "TopCount";
pub const BOTTOM_NAME: &str = "BottomName";
pub const BOTTOM_SCORE: &str = "BottomScore";
pub const BOTTOM_COUNT: &str = "BottomCount";
pub const GROUP_COUNT: &str = "GroupCount";
pub const TOP3_TEXT: &str = "Top3Text";
pub const BOTTOM3_TEXT: &str = "Bottom3Text";

pub const POSITIVE_COMMENTS: &str = "PositiveComments";
pub const POSITIVE_HTML: &str = "PositiveHTML";
pub const POSITIVE_COUNT: &str = "PositiveCount";
pub const NEGATIVE_COMMENTS: &str = "NegativeComments";
pub const NEGATIVE_HTML: &str = "NegativeHTML";
pub const NEGATIVE_COUNT: &str = "NegativeCount";

pub const ACTION_ITEMS: &str = "ActionItems";
pub const TIER_TABLE: &str = "TierTable";
pub const DIST: [&str; 4] = ["DistExcellent", "DistGood", "DistWarning", "DistCritical"];

pub const TREND_WINDOW_DAYS: u32 = 30;
pub const VERBATIM_LIMIT: usize = 5;
/// Comments must be strictly longer than this to qualify as verbatims.
pub const VERBATIM_MIN_CHARS: usize = 10;

const SUMMARY_VALUE: &str = "MetricValue";
const SUMMARY_ROWS: &str = "RowCount";
const TIER_COLUMN: &str = "Tier";

pub const RESERVED: &[&str] = &[
  TOTAL_RECORDS, HTML, MAX_DATE, TREND_CURRENT, TREND_PRIOR, TREND_DELTA, TREND_PCT, TREND_ICON, TREND_COLOR,
  VELOCITY_CURRENT, VELOCITY_PRIOR, VELOCITY_PCT, VELOCITY_ICON, PERF_SUMMARY, TOP_PERFORMER, BOTTOM_PERFORMER,
  TOP_NAME, TOP_SCORE, TOP_COUNT, BOTTOM_NAME, BOTTOM_SCORE, BOTTOM_COUNT, GROUP_COUNT, TOP3_TEXT, BOTTOM3_TEXT,
  POSITIVE_COMMENTS, POSITIVE_HTML, POSITIVE_COUNT, NEGATIVE_COMMENTS, NEGATIVE_HTML, NEGATIVE_COUNT, ACTION_ITEMS,
  TIER_TABLE, "DistExcellent", "DistGood", "DistWarning", "DistCritical",
];

/// DAX keywords that cannot name a VAR.
pub const DAX_KEYWORDS: &[&str] = &[
  "VAR", "RETURN", "TRUE", "FALSE", "NOT", "AND", "OR", "IN", "DEFINE", "EVALUATE", "MEASURE", "ORDER", "BY",
  "ASC", "DESC", "START", "AT", "COLUMN", "TABLE", "BLANK",
];

/// True when a derived metric name would shadow a fixed binding or a DAX keyword.
/// DAX identifiers are case-insensitive, so the comparison is too.
pub fn is_reserved(name: &str) -> bool {
  if RESERVED.iter().chain(DAX_KEYWORDS).any(|r| r.eq_ignore_ascii_case(name)) {
    return true;
  }
  let lower = name.to_ascii_lowercase();
  lower
    .strip_prefix("keyword")
    .and_then(|rest| rest.strip_suffix("count"))
    .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// VAR names derived from one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricNames {
  pub value: String,
  pub color: String,
  pub status: String,
}

impl MetricNames {
  pub fn of(metric: &MetricConfig) -> Self {
    let value = escape::binding_name(&metric.name);
    Self { color: format!("{value}_Color"), status: format!("{value}_Status"), value }
  }
}

pub fn keyword_binding(index: usize) -> String {
  format!("Keyword{}Count", index + 1)
}

/// Default trend/velocity glyphs, overridable through `icons`.
pub const TREND_UP: &str = "▲";
pub const TREND_DOWN: &str = "▼";
pub const TREND_FLAT: &str = "▬";

/// All bindings, in emission order.
pub fn bind_all(cfg: &GeneratorConfig) -> Vec<Fragment> {
  let table = escape::escape_table(&cfg.table);
  let mut out = vec![Fragment::binding(TOTAL_RECORDS, format!("COUNTROWS({table})"))];

  for metric in &cfg.metrics {
    out.extend(metric_bindings(cfg, metric));
  }

  if let (Some(date), Some(primary)) = (&cfg.date_column, cfg.primary_metric()) {
    out.extend(trend_bindings(cfg, date, primary));
    out.extend(velocity_bindings(cfg, date));
  }

  if let (Some(category), Some(primary)) = (cfg.categorical_columns.first(), cfg.primary_metric()) {
    out.extend(category_bindings(cfg, category, primary));
  }

  if let Some(mapping) = cfg.text_columns.first() {
    out.extend(verbatim_bindings(cfg, mapping, true));
    out.extend(verbatim_bindings(cfg, mapping, false));
    out.extend(keyword_bindings(cfg, mapping));
  }

  if cfg.first_thresholded().is_some() {
    out.push(action_items_binding(cfg));
  }
  if let Some((metric, threshold)) = cfg.first_thresholded() {
    out.extend(distribution_bindings(cfg, metric, threshold));
  }

  out
}

fn aggregate(cfg: &GeneratorConfig, metric: &MetricConfig) -> String {
  format!(
    "{}({})",
    metric.aggregation.dax_function(),
    qualified(&cfg.table, &metric.source_column)
  )
}

fn metric_bindings(cfg: &GeneratorConfig, metric: &MetricConfig) -> Vec<Fragment> {
  let names = MetricNames::of(metric);
  let mut out = vec![Fragment::binding(
    &names.value,
    format!("ROUND({}, {})", aggregate(cfg, metric), metric.decimals),
  )];
  if let Some(threshold) = &metric.threshold {
    let exprs = threshold.expressions(&names.value, &cfg.theme);
    out.push(Fragment::binding(&names.color, exprs.color));
    out.push(Fragment::binding(&names.status, exprs.status));
  }
  out
}

fn window_filter(cfg: &GeneratorConfig, date: &str, from_days: u32, to_days: u32) -> String {
  let col = qualified(&cfg.table, date);
  let date_only = format!("ALL({col})");
  if to_days == 0 {
    format!("FILTER({date_only}, {col} > {MAX_DATE} - {from_days})")
  } else {
    format!("FILTER({date_only}, {col} > {MAX_DATE} - {from_days} && {col} <= {MAX_DATE} - {to_days})")
  }
}

/// `IF(prior = 0, 0, ROUND((current - prior) / prior * 100, 1))`
fn guarded_pct(current: &str, prior: &str) -> String {
  format!("IF({prior} = 0, 0, ROUND(({current} - {prior}) / {prior} * 100, 1))")
}

fn direction_icon(cfg: &GeneratorConfig, subject: &str) -> String {
  format!(
    "IF({subject} > 0, {}, IF({subject} < 0, {}, {}))",
    string_literal(&escape::html_text(cfg.icon("trend_up", TREND_UP))),
    string_literal(&escape::html_text(cfg.icon("trend_down", TREND_DOWN))),
    string_literal(&escape::html_text(cfg.icon("trend_flat", TREND_FLAT))),
  )
}

fn trend_bindings(cfg: &GeneratorConfig, date: &str, primary: &MetricConfig) -> Vec<Fragment> {
  let window = TREND_WINDOW_DAYS;
  let agg = aggregate(cfg, primary);
  let theme = &cfg.theme;
  // colour of an upward move depends on which way is good for the primary metric
  let (up, down) = match primary.threshold.as_ref().map(ThresholdConfig::direction) {
    Some(Direction::LowerBetter) => (&theme.danger, &theme.success),
    Some(Direction::RangeOptimal) => (&theme.primary, &theme.primary),
    Some(Direction::HigherBetter) | None => (&theme.success, &theme.danger),
  };

  vec![
    Fragment::binding(MAX_DATE, format!("MAX({})", qualified(&cfg.table, date))),
    Fragment::binding(
      TREND_CURRENT,
      format!(
        "ROUND(CALCULATE({agg}, {}), {})",
        window_filter(cfg, date, window, 0),
        primary.decimals
      ),
    ),
    Fragment::binding(
      TREND_PRIOR,
      format!(
        "ROUND(CALCULATE({agg}, {}), {})",
        window_filter(cfg, date, window * 2, window),
        primary.decimals
      ),
    ),
    Fragment::binding(
      TREND_DELTA,
      format!("ROUND({TREND_CURRENT} - {TREND_PRIOR}, {})", primary.decimals),
    ),
    Fragment::binding(TREND_PCT, guarded_pct(TREND_CURRENT, TREND_PRIOR)),
    Fragment::binding(TREND_ICON, direction_icon(cfg, TREND_DELTA)),
    Fragment::binding(
      TREND_COLOR,
      format!(
        "IF({TREND_DELTA} > 0, {}, IF({TREND_DELTA} < 0, {}, {}))",
        string_literal(up),
        string_literal(down),
        string_literal(&theme.neutral)
      ),
    ),
  ]
}

fn velocity_bindings(cfg: &GeneratorConfig, date: &str) -> Vec<Fragment> {
  let window = TREND_WINDOW_DAYS;
  let table = escape::escape_table(&cfg.table);
  vec![
    Fragment::binding(
      VELOCITY_CURRENT,
      format!("CALCULATE(COUNTROWS({table}), {})", window_filter(cfg, date, window, 0)),
    ),
    Fragment::binding(
      VELOCITY_PRIOR,
      format!("CALCULATE(COUNTROWS({table}), {})", window_filter(cfg, date, window * 2, window)),
    ),
    Fragment::binding(VELOCITY_PCT, guarded_pct(VELOCITY_CURRENT, VELOCITY_PRIOR)),
    Fragment::binding(VELOCITY_ICON, direction_icon(cfg, VELOCITY_PCT)),
  ]
}

fn category_bindings(cfg: &GeneratorConfig, category: &str, primary: &MetricConfig) -> Vec<Fragment> {
  let table = escape::escape_table(&cfg.table);
  let cat = qualified(&cfg.table, category);
  let value = format!("[{SUMMARY_VALUE}]");
  let rows = format!("[{SUMMARY_ROWS}]");
  let pattern = escape::decimal_pattern(primary.decimals);
  let decimals = primary.decimals;

  let ranked_text = |order: &str| {
    format!(
      "CONCATENATEX(\n        TOPN(3, {PERF_SUMMARY}, {value}, {order}),\n        {cat} & \" (\" & FORMAT({value}, {}) & \")\",\n        \", \",\n        {value},\n        {order}\n    )",
      string_literal(&pattern)
    )
  };

  vec![
    Fragment::binding(
      PERF_SUMMARY,
      format!(
        "SUMMARIZE(\n        {table},\n        {cat},\n        {}, {},\n        {}, COUNTROWS({table})\n    )",
        string_literal(SUMMARY_VALUE),
        aggregate(cfg, primary),
        string_literal(SUMMARY_ROWS)
      ),
    ),
    Fragment::binding(TOP_PERFORMER, format!("TOPN(1, {PERF_SUMMARY}, {value}, DESC)")),
    Fragment::binding(BOTTOM_PERFORMER, format!("TOPN(1, {PERF_SUMMARY}, {value}, ASC)")),
    Fragment::binding(TOP_NAME, format!("MAXX({TOP_PERFORMER}, {cat})")),
    Fragment::binding(TOP_SCORE, format!("ROUND(MAXX({TOP_PERFORMER}, {value}), {decimals})")),
    Fragment::binding(TOP_COUNT, format!("MAXX({TOP_PERFORMER}, {rows})")),
    Fragment::binding(BOTTOM_NAME, format!("MAXX({BOTTOM_PERFORMER}, {cat})")),
    Fragment::binding(BOTTOM_SCORE, format!("ROUND(MAXX({BOTTOM_PERFORMER}, {value}), {decimals})")),
    Fragment::binding(BOTTOM_COUNT, format!("MAXX({BOTTOM_PERFORMER}, {rows})")),
    Fragment::binding(GROUP_COUNT, format!("COUNTROWS({PERF_SUMMARY})")),
    Fragment::binding(TOP3_TEXT, ranked_text("DESC")),
    Fragment::binding(BOTTOM3_TEXT, ranked_text("ASC")),
  ]
}

fn verbatim_bindings(cfg: &GeneratorConfig, mapping: &TextMapping, positive: bool) -> Vec<Fragment> {
  let table = escape::escape_table(&cfg.table);
  let text = qualified(&cfg.table, &mapping.text_column);
  let score = qualified(&cfg.table, &mapping.score_column);
  let theme = &cfg.theme;
  let (rows, html, count, order, accent) = if positive {
    (POSITIVE_COMMENTS, POSITIVE_HTML, POSITIVE_COUNT, "DESC", &theme.success)
  } else {
    (NEGATIVE_COMMENTS, NEGATIVE_HTML, NEGATIVE_COUNT, "ASC", &theme.danger)
  };

  let card = [
    format!("\"<div style='background:white; padding:14px; margin:10px 0; border-radius:8px; border-left:3px solid {accent};'>\""),
    format!("\"<div style='font-size:11px; color:{accent}; font-weight:600; margin-bottom:6px;'>Score: \" & ROUND({score}, 1) & \"</div>\""),
    format!("\"<div style='font-size:13px; color:{}; line-height:1.6;'>\" & {text} & \"</div>\"", theme.text),
    "\"</div>\"".to_string(),
  ]
  .join(" &\n        ");

  vec![
    Fragment::binding(
      rows,
      format!(
        "TOPN(\n        {VERBATIM_LIMIT},\n        FILTER({table}, NOT ISBLANK({text}) && LEN({text}) > {VERBATIM_MIN_CHARS}),\n        {score},\n        {order}\n    )"
      ),
    ),
    Fragment::binding(
      html,
      format!("CONCATENATEX(\n        {rows},\n        {card},\n        \"\",\n        {score},\n        {order}\n    )"),
    ),
    Fragment::binding(count, format!("COUNTROWS({rows})")),
  ]
}

fn keyword_bindings(cfg: &GeneratorConfig, mapping: &TextMapping) -> Vec<Fragment> {
  let table = escape::escape_table(&cfg.table);
  let text = qualified(&cfg.table, &mapping.text_column);
  cfg
    .keywords
    .iter()
    .enumerate()
    .map(|(i, kw)| {
      Fragment::binding(
        &keyword_binding(i),
        format!("COUNTROWS(FILTER({table}, CONTAINSSTRING({text}, {})))", string_literal(kw)),
      )
    })
    .collect()
}

/// Count of thresholded metrics currently in their warning or critical tier.
fn action_items_binding(cfg: &GeneratorConfig) -> Fragment {
  let terms: Vec<String> = cfg
    .metrics
    .iter()
    .filter_map(|m| m.threshold.as_ref().map(|t| (MetricNames::of(m), t.direction())))
    .map(|(names, direction)| {
      format!(
        "IF({s} = {} || {s} = {}, 1, 0)",
        string_literal(direction.label(Tier::Warning)),
        string_literal(direction.label(Tier::Critical)),
        s = names.status
      )
    })
    .collect();
  Fragment::binding(ACTION_ITEMS, terms.join(" + "))
}

fn distribution_bindings(cfg: &GeneratorConfig, metric: &MetricConfig, threshold: &ThresholdConfig) -> Vec<Fragment> {
  let table = escape::escape_table(&cfg.table);
  let column = qualified(&cfg.table, &metric.source_column);
  let status = threshold.expressions(&column, &cfg.theme).status;
  let direction = threshold.direction();

  let mut out = vec![Fragment::binding(
    TIER_TABLE,
    format!("ADDCOLUMNS(\n        {table},\n        {},\n        {status}\n    )", string_literal(TIER_COLUMN)),
  )];
  for tier in Tier::ALL {
    out.push(Fragment::binding(
      DIST[tier.index()],
      format!(
        "COUNTROWS(FILTER({TIER_TABLE}, [{TIER_COLUMN}] = {}))",
        string_literal(direction.label(tier))
      ),
    ));
  }
  out
}
