// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Named colour palettes used by every rendered fragment, plus the registry that resolves theme names
// role: registry/themes
// outputs: ThemeSpec values; registry lookup; startup validation of colour literals
// invariants:
// - every theme carries the same token set (enforced by the struct shape)
// - every token is a #rgb or #rrggbb literal; text is emitted exactly as stored
// - registry order is stable and names are unique
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_THEME: &str = "Ocean Blue";

static COLOR_LITERAL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^#(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").expect("colour literal regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSpec {
  pub name: String,
  pub primary: String,
  pub secondary: String,
  pub success: String,
  pub warning: String,
  pub danger: String,
  pub neutral: String,
  pub background: String,
  pub text: String,
}

impl ThemeSpec {
  #[allow(clippy::too_many_arguments)]
  fn new(
    name: &str,
    primary: &str,
    secondary: &str,
    success: &str,
    warning: &str,
    danger: &str,
    neutral: &str,
    background: &str,
    text: &str,
  ) -> Self {
    Self {
      name: name.into(),
      primary: primary.into(),
      secondary: secondary.into(),
      success: success.into(),
      warning: warning.into(),
      danger: danger.into(),
      neutral: neutral.into(),
      background: background.into(),
      text: text.into(),
    }
  }

  /// Token name/value pairs in declaration order.
  pub fn tokens(&self) -> [(&'static str, &str); 8] {
    [
      ("primary", &self.primary),
      ("secondary", &self.secondary),
      ("success", &self.success),
      ("warning", &self.warning),
      ("danger", &self.danger),
      ("neutral", &self.neutral),
      ("background", &self.background),
      ("text", &self.text),
    ]
  }

  /// First token whose value is not a colour literal, if any.
  pub fn invalid_token(&self) -> Option<(&'static str, &str)> {
    self.tokens().into_iter().find(|(_, v)| !is_color_literal(v))
  }
}

pub fn is_color_literal(s: &str) -> bool {
  COLOR_LITERAL.is_match(s)
}

static REGISTRY: Lazy<Vec<ThemeSpec>> = Lazy::new(|| {
  vec![
    ThemeSpec::new("Ocean Blue", "#2563eb", "#1e40af", "#10b981", "#f59e0b", "#ef4444", "#64748b", "#eff6ff", "#1e293b"),
    ThemeSpec::new("Forest Green", "#059669", "#047857", "#10b981", "#f59e0b", "#dc2626", "#6b7280", "#ecfdf5", "#1f2937"),
    ThemeSpec::new("Royal Purple", "#7c3aed", "#6d28d9", "#10b981", "#f59e0b", "#ef4444", "#64748b", "#f5f3ff", "#1e293b"),
    ThemeSpec::new("Sunset Orange", "#ea580c", "#c2410c", "#10b981", "#f59e0b", "#dc2626", "#6b7280", "#fff7ed", "#1f2937"),
    ThemeSpec::new("Slate Gray", "#475569", "#334155", "#10b981", "#f59e0b", "#ef4444", "#64748b", "#f8fafc", "#0f172a"),
  ]
});

pub fn registry() -> &'static [ThemeSpec] {
  &REGISTRY
}

/// Case-insensitive lookup by theme name.
pub fn by_name(name: &str) -> Option<&'static ThemeSpec> {
  registry().iter().find(|t| t.name.eq_ignore_ascii_case(name.trim()))
}

pub fn default_theme() -> ThemeSpec {
  by_name(DEFAULT_THEME).cloned().unwrap_or_else(|| registry()[0].clone())
}

/// Checked once at startup: colour literals valid, names unique.
pub fn validate_registry() -> Result<()> {
  let mut seen: Vec<String> = Vec::new();
  for theme in registry() {
    if let Some((token, value)) = theme.invalid_token() {
      bail!("theme {:?}: token {} is not a colour literal: {:?}", theme.name, token, value);
    }
    let key = theme.name.to_ascii_lowercase();
    if seen.contains(&key) {
      bail!("theme {:?} registered twice", theme.name);
    }
    seen.push(key);
  }
  Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ThemeChoice {
  Named(String),
  Custom(ThemeSpec),
}

/// Accept either a registry name or an inline palette.
pub fn deserialize_theme<'de, D>(deserializer: D) -> Result<ThemeSpec, D::Error>
where
  D: Deserializer<'de>,
{
  match ThemeChoice::deserialize(deserializer)? {
    ThemeChoice::Named(name) => by_name(&name)
      .cloned()
      .ok_or_else(|| serde::de::Error::custom(format!("unknown theme {name:?}"))),
    ThemeChoice::Custom(spec) => Ok(spec),
  }
}
