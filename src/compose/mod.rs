// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Compose one DAX measure (VAR bindings + HTML concatenation chain) from a GeneratorConfig
// role: composer/core
// inputs: GeneratorConfig (immutable)
// outputs: Artifact fragments and the final artifact text
// invariants:
// - phases run in order: bindings -> section gating -> markup -> assembly
// - markup fragments only reference names bound in the binding phase (no forward references)
// - pure: no IO, no logging, no retained state; identical input yields byte-identical output
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;

use crate::model::GeneratorConfig;
use crate::sections::{self, Capabilities, SectionId};

pub mod bindings;
pub mod markup;

/// Separator placed between fragments in the assembled artifact.
pub const SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
  Comment(String),
  Measure(String),
  Binding { name: String, expr: String },
  Markup(String),
  Return(String),
}

impl Fragment {
  pub fn binding(name: &str, expr: impl Into<String>) -> Self {
    Fragment::Binding { name: name.to_string(), expr: expr.into() }
  }
}

impl fmt::Display for Fragment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Fragment::Comment(text) => {
        let lines: Vec<String> = text.lines().map(|l| format!("// {l}")).collect();
        f.write_str(&lines.join("\n"))
      }
      Fragment::Measure(name) => write!(f, "{name} ="),
      Fragment::Binding { name, expr } if expr.contains('\n') => write!(f, "VAR {name} =\n    {expr}"),
      Fragment::Binding { name, expr } => write!(f, "VAR {name} = {expr}"),
      Fragment::Markup(text) => f.write_str(text),
      Fragment::Return(name) => write!(f, "RETURN {name}"),
    }
  }
}

/// Ordered fragments of one composition plus the sections that survived gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
  pub fragments: Vec<Fragment>,
  pub sections: Vec<SectionId>,
}

impl Artifact {
  pub fn render(&self) -> String {
    self
      .fragments
      .iter()
      .map(|f| f.to_string())
      .collect::<Vec<_>>()
      .join(SEPARATOR)
  }

  pub fn binding_names(&self) -> Vec<&str> {
    self
      .fragments
      .iter()
      .filter_map(|f| match f {
        Fragment::Binding { name, .. } => Some(name.as_str()),
        _ => None,
      })
      .collect()
  }
}

/// Run all four phases and return the structured artifact.
pub fn compose_artifact(cfg: &GeneratorConfig) -> Artifact {
  let mut fragments = vec![
    Fragment::Comment(header_comment(cfg)),
    Fragment::Measure(cfg.measure_name.clone()),
  ];

  // Phase 1: bindings
  fragments.extend(bindings::bind_all(cfg));

  // Phase 2: section gating
  let sections = sections::gate(&cfg.sections, &Capabilities::of(cfg));

  // Phase 3: markup
  fragments.push(Fragment::Markup(markup::open(cfg)));
  for id in &sections {
    fragments.push(Fragment::Markup(markup::render_section(*id, cfg)));
  }

  // Phase 4: assembly tail
  fragments.push(Fragment::Markup(markup::footer(cfg)));
  fragments.push(Fragment::Markup(markup::close()));
  fragments.push(Fragment::Return(bindings::HTML.to_string()));

  Artifact { fragments, sections }
}

/// Compose the artifact text for one configuration.
pub fn compose(cfg: &GeneratorConfig) -> String {
  compose_artifact(cfg).render()
}

/// Drop control characters so user text stays on its `//` line.
fn single_line(s: &str) -> String {
  s.chars().filter(|c| !c.is_control()).collect()
}

fn header_comment(cfg: &GeneratorConfig) -> String {
  format!(
    "{}\nGenerated by dax-narrative | table {} | theme {}",
    single_line(&cfg.title),
    crate::escape::escape_table(&single_line(&cfg.table)),
    single_line(&cfg.theme.name)
  )
}
