//! Markup phase: one HTML fragment per enabled section.
//!
//! Every line is a DAX concatenation ending in `&`, so fragments chain onto the
//! `VAR HTML =` opened by [`open`] and closed by [`close`]. Renderers only
//! reference names declared in [`super::bindings`].

use crate::escape::{self, html_text};
use crate::model::{GeneratorConfig, MetricConfig};
use crate::sections::{self, SectionId};
use crate::threshold::Tier;

use super::bindings::{self as b, MetricNames};

enum Part {
  Html(String),
  Var(String),
}

fn html(s: impl Into<String>) -> Part {
  Part::Html(s.into())
}

fn var(s: impl Into<String>) -> Part {
  Part::Var(s.into())
}

fn line(parts: Vec<Part>) -> String {
  let body: Vec<String> = parts
    .into_iter()
    .map(|p| match p {
      Part::Html(s) => escape::string_literal(&s),
      Part::Var(v) => v,
    })
    .collect();
  format!("{} &", body.join(" & "))
}

fn lit(s: impl Into<String>) -> String {
  line(vec![html(s)])
}

const CARD: &str = "background:white; padding:20px; border-radius:10px; margin-bottom:24px; box-shadow:0 2px 8px rgba(0,0,0,0.06);";
const RULE: &str = "#e2e8f0";

fn heading(cfg: &GeneratorConfig, id: SectionId, title: &str) -> String {
  let spec = sections::spec(id);
  let icon = html_text(cfg.icon(id.as_str(), spec.icon));
  lit(format!(
    "<h2 style='font-size:20px; font-weight:600; margin:0 0 16px 0; padding-bottom:12px; border-bottom:2px solid {RULE}; color:{};'>{icon} {}</h2>",
    cfg.theme.text,
    html_text(title)
  ))
}

pub fn open(cfg: &GeneratorConfig) -> String {
  format!(
    "VAR {} =\n{}",
    b::HTML,
    lit(format!(
      "<div style='font-family:-apple-system,BlinkMacSystemFont,Segoe UI,Roboto,sans-serif; max-width:1200px; padding:24px; background:{}; color:{};'>",
      cfg.theme.background, cfg.theme.text
    ))
  )
}

pub fn footer(cfg: &GeneratorConfig) -> String {
  [
    lit(format!(
      "<div style='margin-top:32px; padding-top:20px; border-top:2px solid {RULE}; text-align:center;'>"
    )),
    lit(format!(
      "<p style='font-size:11px; color:{}; margin:0;'>Auto-generated by Power BI DAX | Updates with data refresh</p>",
      cfg.theme.neutral
    )),
    lit("</div>"),
  ]
  .join("\n")
}

pub fn close() -> String {
  escape::string_literal("</div>")
}

pub fn render_section(id: SectionId, cfg: &GeneratorConfig) -> String {
  let lines = match id {
    SectionId::Header => header(cfg),
    SectionId::KpiCards => kpi_cards(cfg),
    SectionId::Trend => trend(cfg),
    SectionId::Performance => performance(cfg),
    SectionId::TopBottom => top_bottom(cfg),
    SectionId::ActionDashboard => action_dashboard(cfg),
    SectionId::PositiveVerbatim => verbatim(cfg, true),
    SectionId::NegativeVerbatim => verbatim(cfg, false),
    SectionId::ThemeKeywords => keywords(cfg),
    SectionId::Distribution => distribution(cfg),
    SectionId::Velocity => velocity(cfg),
  };
  lines.join("\n")
}

fn header(cfg: &GeneratorConfig) -> Vec<String> {
  let t = &cfg.theme;
  let icon = html_text(cfg.icon(SectionId::Header.as_str(), sections::spec(SectionId::Header).icon));
  vec![
    lit(format!(
      "<div style='background:linear-gradient(135deg, {} 0%, {} 100%); padding:32px; border-radius:12px; margin-bottom:28px; box-shadow:0 4px 16px rgba(0,0,0,0.1);'>",
      t.primary, t.secondary
    )),
    lit(format!(
      "<h1 style='color:white; font-size:32px; font-weight:700; margin:0 0 8px 0;'>{icon} {}</h1>",
      html_text(&cfg.title)
    )),
    line(vec![
      html("<p style='color:rgba(255,255,255,0.9); font-size:15px; margin:0;'>Generated Report • "),
      var(b::TOTAL_RECORDS),
      html(" Total Records</p>"),
    ]),
    lit("</div>"),
  ]
}

/// Colour part for a metric: its bound colour when tiered, the theme primary otherwise.
fn metric_color(cfg: &GeneratorConfig, metric: &MetricConfig, names: &MetricNames) -> Part {
  if metric.threshold.is_some() {
    var(names.color.clone())
  } else {
    html(cfg.theme.primary.clone())
  }
}

fn unit(metric: &MetricConfig) -> String {
  metric.unit.as_deref().map(html_text).unwrap_or_default()
}

fn kpi_cards(cfg: &GeneratorConfig) -> Vec<String> {
  let t = &cfg.theme;
  let mut out = vec![lit(
    "<div style='display:grid; grid-template-columns:repeat(auto-fit, minmax(250px, 1fr)); gap:16px; margin-bottom:28px;'>",
  )];
  for metric in &cfg.metrics {
    let names = MetricNames::of(metric);
    out.push(line(vec![
      html("<div style='background:white; padding:20px; border-radius:10px; box-shadow:0 2px 8px rgba(0,0,0,0.1); border-left:4px solid "),
      metric_color(cfg, metric, &names),
      html(";'>"),
    ]));
    out.push(lit(format!(
      "<div style='font-size:12px; color:{}; font-weight:500; margin-bottom:8px;'>{}</div>",
      t.neutral,
      html_text(&metric.name)
    )));
    out.push(line(vec![
      html("<div style='font-size:32px; font-weight:700; color:"),
      metric_color(cfg, metric, &names),
      html("; margin-bottom:4px;'>"),
      var(names.value.clone()),
      html(format!("{}</div>", unit(metric))),
    ]));
    if metric.threshold.is_some() {
      out.push(line(vec![
        html("<div style='font-size:12px; font-weight:600; color:"),
        var(names.color.clone()),
        html(";'>"),
        var(names.status.clone()),
        html("</div>"),
      ]));
    }
    out.push(lit("</div>"));
  }
  out.push(lit("</div>"));
  out
}

fn stat(label: &str, value: Vec<Part>, color: Part) -> String {
  let mut parts = vec![
    html(format!(
      "<div><div style='font-size:12px; color:#64748b; margin-bottom:4px;'>{label}</div><div style='font-size:28px; font-weight:700; color:"
    )),
    color,
    html(";'>"),
  ];
  parts.extend(value);
  parts.push(html("</div></div>"));
  line(parts)
}

fn trend(cfg: &GeneratorConfig) -> Vec<String> {
  let t = &cfg.theme;
  let primary = cfg.primary_metric().map(|m| m.name.as_str()).unwrap_or_default();
  let days = b::TREND_WINDOW_DAYS;
  vec![
    line(vec![html(format!("<div style='{CARD} border-left:4px solid ")), var(b::TREND_COLOR), html(";'>")]),
    heading(cfg, SectionId::Trend, &format!("{days}-Day Trend: {primary}")),
    lit("<div style='display:flex; gap:32px; flex-wrap:wrap;'>"),
    stat(&format!("Last {days} days"), vec![var(b::TREND_CURRENT)], html(t.text.clone())),
    stat(&format!("Prior {days} days"), vec![var(b::TREND_PRIOR)], html(t.neutral.clone())),
    stat(
      "Change",
      vec![
        var(b::TREND_ICON),
        html(" "),
        var(b::TREND_DELTA),
        html(" ("),
        var(b::TREND_PCT),
        html("%)"),
      ],
      var(b::TREND_COLOR),
    ),
    lit("</div>"),
    lit("</div>"),
  ]
}

fn performer(cfg: &GeneratorConfig, top: bool) -> Vec<String> {
  let t = &cfg.theme;
  let (bg, accent, ink, icon, label, name, score, count) = if top {
    ("#ecfdf5", &t.success, "#047857", cfg.icon("top", "🏆"), "Top Performer", b::TOP_NAME, b::TOP_SCORE, b::TOP_COUNT)
  } else {
    ("#fef2f2", &t.danger, "#dc2626", cfg.icon("bottom", "⚠️"), "Needs Attention", b::BOTTOM_NAME, b::BOTTOM_SCORE, b::BOTTOM_COUNT)
  };
  vec![
    lit(format!(
      "<div style='background:{bg}; padding:20px; border-radius:10px; border-left:4px solid {accent};'>"
    )),
    lit(format!(
      "<div style='font-size:13px; color:{ink}; font-weight:600; margin-bottom:6px;'>{} {label}</div>",
      html_text(icon)
    )),
    line(vec![
      html(format!("<div style='font-size:18px; font-weight:700; color:{}; margin-bottom:4px;'>", t.text)),
      var(name),
      html("</div>"),
    ]),
    line(vec![
      html(format!(
        "<div style='font-size:14px; color:{};'>Score: <span style='color:{accent}; font-weight:600;'>",
        t.neutral
      )),
      var(score),
      html("</span> · "),
      var(count),
      html(" records</div>"),
    ]),
    lit("</div>"),
  ]
}

fn performance(cfg: &GeneratorConfig) -> Vec<String> {
  let category = cfg.categorical_columns.first().map(String::as_str).unwrap_or_default();
  let mut out = vec![
    lit("<div style='margin-bottom:24px;'>"),
    heading(cfg, SectionId::Performance, &format!("Performance by {category}")),
    line(vec![
      html(format!("<p style='font-size:13px; color:{}; margin:0 0 12px 0;'>Across ", cfg.theme.neutral)),
      var(b::GROUP_COUNT),
      html(" groups</p>"),
    ]),
    lit("<div style='display:grid; grid-template-columns:1fr 1fr; gap:16px;'>"),
  ];
  out.extend(performer(cfg, true));
  out.extend(performer(cfg, false));
  out.push(lit("</div>"));
  out.push(lit("</div>"));
  out
}

fn top_bottom(cfg: &GeneratorConfig) -> Vec<String> {
  let t = &cfg.theme;
  let column = |title: &str, icon: &str, accent: &str, binding: &str| {
    vec![
      lit(format!(
        "<div style='padding:16px; border-radius:10px; background:{}; border-top:3px solid {accent};'>",
        t.background
      )),
      lit(format!(
        "<div style='font-size:13px; font-weight:600; color:{accent}; margin-bottom:8px;'>{} {title}</div>",
        html_text(icon)
      )),
      line(vec![
        html(format!("<div style='font-size:14px; color:{}; line-height:1.6;'>", t.text)),
        var(binding),
        html("</div>"),
      ]),
      lit("</div>"),
    ]
  };
  let mut out = vec![
    lit(format!("<div style='{CARD}'>")),
    heading(cfg, SectionId::TopBottom, "Top & Bottom Groups"),
    lit("<div style='display:grid; grid-template-columns:1fr 1fr; gap:16px;'>"),
  ];
  out.extend(column("Top 3", cfg.icon("top", "🏆"), t.success.as_str(), b::TOP3_TEXT));
  out.extend(column("Bottom 3", cfg.icon("bottom", "⚠️"), t.danger.as_str(), b::BOTTOM3_TEXT));
  out.push(lit("</div>"));
  out.push(lit("</div>"));
  out
}

fn action_dashboard(cfg: &GeneratorConfig) -> Vec<String> {
  let t = &cfg.theme;
  let tracked: Vec<&MetricConfig> = cfg.metrics.iter().filter(|m| m.threshold.is_some()).collect();
  let mut out = vec![
    lit(format!("<div style='{CARD}'>")),
    heading(cfg, SectionId::ActionDashboard, "Action Dashboard"),
    line(vec![
      html(format!("<p style='font-size:14px; color:{}; margin:0 0 12px 0;'>", t.neutral)),
      var(b::ACTION_ITEMS),
      html(format!(" of {} tracked metrics need attention</p>", tracked.len())),
    ]),
  ];
  for metric in tracked {
    let names = MetricNames::of(metric);
    out.push(lit(format!(
      "<div style='display:flex; justify-content:space-between; padding:10px 0; border-bottom:1px solid {RULE};'>"
    )));
    out.push(lit(format!(
      "<span style='font-weight:600; color:{};'>{}</span>",
      t.text,
      html_text(&metric.name)
    )));
    out.push(line(vec![
      html("<span style='font-weight:600; color:"),
      var(names.color.clone()),
      html(";'>"),
      var(names.value.clone()),
      html(format!("{} · ", unit(metric))),
      var(names.status.clone()),
      html("</span>"),
    ]));
    out.push(lit("</div>"));
  }
  out.push(lit("</div>"));
  out
}

fn verbatim(cfg: &GeneratorConfig, positive: bool) -> Vec<String> {
  let t = &cfg.theme;
  let (id, bg, accent, ink, fragment, count) = if positive {
    (SectionId::PositiveVerbatim, "#ecfdf5", &t.success, "#047857", b::POSITIVE_HTML, b::POSITIVE_COUNT)
  } else {
    (SectionId::NegativeVerbatim, "#fef2f2", &t.danger, "#dc2626", b::NEGATIVE_HTML, b::NEGATIVE_COUNT)
  };
  let spec = sections::spec(id);
  let icon = html_text(cfg.icon(id.as_str(), spec.icon));
  vec![
    lit(format!(
      "<div style='background:{bg}; padding:20px; border-radius:10px; margin-bottom:24px; border-left:4px solid {accent};'>"
    )),
    line(vec![
      html(format!(
        "<h2 style='color:{ink}; font-size:18px; font-weight:600; margin:0 0 16px 0;'>{icon} {} (",
        spec.label
      )),
      var(count),
      html(")</h2>"),
    ]),
    var_line(fragment),
    lit("</div>"),
  ]
}

/// A bare reference on its own line.
fn var_line(name: &str) -> String {
  format!("{name} &")
}

fn keywords(cfg: &GeneratorConfig) -> Vec<String> {
  let t = &cfg.theme;
  let mut out = vec![
    lit(format!("<div style='{CARD}'>")),
    heading(cfg, SectionId::ThemeKeywords, sections::spec(SectionId::ThemeKeywords).label),
    lit("<div style='display:flex; flex-wrap:wrap; gap:8px;'>"),
  ];
  if cfg.keywords.is_empty() {
    out.push(lit(format!(
      "<span style='font-size:13px; color:{};'>No keywords configured</span>",
      t.neutral
    )));
  }
  for (i, kw) in cfg.keywords.iter().enumerate() {
    out.push(line(vec![
      html(format!(
        "<span style='background:{}; color:{}; padding:6px 12px; border-radius:999px; font-size:13px;'>{}: <b>",
        t.background,
        t.primary,
        html_text(kw)
      )),
      var(b::keyword_binding(i)),
      html("</b></span>"),
    ]));
  }
  out.push(lit("</div>"));
  out.push(lit("</div>"));
  out
}

fn distribution(cfg: &GeneratorConfig) -> Vec<String> {
  let t = &cfg.theme;
  let Some((metric, threshold)) = cfg.first_thresholded() else {
    return Vec::new();
  };
  let direction = threshold.direction();
  let mut out = vec![
    lit(format!("<div style='{CARD}'>")),
    heading(
      cfg,
      SectionId::Distribution,
      &format!("{}: {}", sections::spec(SectionId::Distribution).label, metric.source_column),
    ),
  ];
  for tier in Tier::ALL {
    let count = b::DIST[tier.index()];
    out.push(line(vec![
      html(format!(
        "<div style='display:flex; justify-content:space-between; padding:8px 0; border-bottom:1px solid {RULE};'><span style='color:{};'>{}</span><span style='font-weight:600; color:{};'>",
        t.text,
        direction.label(tier),
        tier.color(t)
      )),
      var(count),
      html(" ("),
      var(format!("FORMAT(DIVIDE({count}, {}, 0), \"0%\")", b::TOTAL_RECORDS)),
      html(")</span></div>"),
    ]));
  }
  out.push(lit("</div>"));
  out
}

fn velocity(cfg: &GeneratorConfig) -> Vec<String> {
  let t = &cfg.theme;
  let days = b::TREND_WINDOW_DAYS;
  vec![
    lit(format!("<div style='{CARD}'>")),
    heading(cfg, SectionId::Velocity, sections::spec(SectionId::Velocity).label),
    lit("<div style='display:flex; gap:32px; flex-wrap:wrap;'>"),
    stat(&format!("Records, last {days} days"), vec![var(b::VELOCITY_CURRENT)], html(t.text.clone())),
    stat(&format!("Records, prior {days} days"), vec![var(b::VELOCITY_PRIOR)], html(t.neutral.clone())),
    stat(
      "Change",
      vec![var(b::VELOCITY_ICON), html(" "), var(b::VELOCITY_PCT), html("%")],
      html(t.primary.clone()),
    ),
    lit("</div>"),
    lit("</div>"),
  ]
}
