// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Quote DAX identifiers and literals, escape user text for embedded HTML, derive binding names
// role: utilities/escaping
// outputs: Quoted column/table references, DAX string literals, HTML-safe text, VAR-safe names
// invariants:
// - column references always start with '[' and end with ']'; table references start and end with '\''
// - quoting is unconditional and does not rewrite interior characters (validation rejects embedded delimiters)
// - binding names are ASCII alphanumeric and never start with a digit
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

/// Wrap a column name in bracket delimiters.
pub fn escape_column(name: &str) -> String {
  format!("[{name}]")
}

/// Wrap a table name in single-quote delimiters.
pub fn escape_table(name: &str) -> String {
  format!("'{name}'")
}

/// Fully qualified column reference, e.g. `'Survey'[Score]`.
pub fn qualified(table: &str, column: &str) -> String {
  format!("{}{}", escape_table(table), escape_column(column))
}

/// DAX string literal; embedded double quotes are doubled.
pub fn string_literal(s: &str) -> String {
  format!("\"{}\"", s.replace('"', "\"\""))
}

/// Escape user-supplied text that ends up inside generated HTML.
pub fn html_text(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

/// Derive a VAR name from a human metric name ("Response Time" -> "ResponseTime").
///
/// Underscores are dropped too, so derived names never collide with the
/// `_Color` / `_Status` suffixed bindings.
pub fn binding_name(name: &str) -> String {
  let cleaned: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
  match cleaned.chars().next() {
    None => "Metric".to_string(),
    Some(c) if c.is_ascii_digit() => format!("M{cleaned}"),
    Some(_) => cleaned,
  }
}

/// Render a threshold or other numeric literal without adding rounding.
pub fn number(v: f64) -> String {
  format!("{v}")
}

/// FORMAT() pattern for a given number of decimals ("0", "0.0", "0.00", ...).
pub fn decimal_pattern(decimals: u32) -> String {
  if decimals == 0 {
    "0".to_string()
  } else {
    format!("0.{}", "0".repeat(decimals as usize))
  }
}
