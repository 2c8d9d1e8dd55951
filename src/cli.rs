use anyhow::{Result, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::sections::SectionId;
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "dax-narrative",
    version,
    about = "Compose Power BI DAX measures that render themed HTML narratives",
    long_about = None
)]
pub struct Cli {
  /// Generator config (JSON); repeat to compose several measures in one run
  #[arg(long = "config", value_name = "FILE")]
  pub configs: Vec<PathBuf>,

  /// Output location:
  /// - one config: file path (default stdout "-")
  /// - several configs, or a path ending in '/': directory for <stem>.dax files plus manifest.json
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Theme name overriding every config's theme
  #[arg(long)]
  pub theme: Option<String>,

  /// Report title overriding every config's title
  #[arg(long)]
  pub title: Option<String>,

  /// Section to render (repeatable); replaces the configs' section lists
  #[arg(long = "section", value_enum)]
  pub sections: Vec<SectionId>,

  /// Render non-monotonic threshold bounds as configured instead of rejecting them
  #[arg(long)]
  pub allow_unordered_thresholds: bool,

  /// Print a suggested config for the dataset profile given by --profile
  #[arg(long, requires = "profile")]
  pub suggest: bool,

  /// Dataset profile (JSON) used by --suggest
  #[arg(long, value_name = "FILE")]
  pub profile: Option<PathBuf>,

  /// Table name for --suggest
  #[arg(long, default_value = "Data")]
  pub table: String,

  /// List built-in themes as JSON and exit
  #[arg(long)]
  pub list_themes: bool,

  /// List known sections and their data requirements as JSON and exit
  #[arg(long)]
  pub list_sections: bool,

  /// More logging on stderr (-v info, -vv debug); RUST_LOG takes precedence
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant stamped into manifests (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Mode {
  ListThemes,
  ListSections,
  Suggest { profile: String, table: String },
  Compose,
}

/// CLI-level overrides applied on top of each loaded config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
  pub theme: Option<String>,
  pub title: Option<String>,
  pub sections: Option<Vec<SectionId>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub mode: Mode,
  pub configs: Vec<String>, // absolute paths for stability
  pub out: String,
  pub overrides: Overrides,
  pub allow_unordered_thresholds: bool,
  pub now_override: Option<String>,
}

impl EffectiveConfig {
  /// Output goes to a directory (per-config files + manifest) rather than a single file/stdout.
  pub fn writes_directory(&self) -> bool {
    self.configs.len() > 1 || self.out.ends_with('/')
  }
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let mode = match (cli.list_themes, cli.list_sections, cli.suggest) {
    (true, false, false) => Mode::ListThemes,
    (false, true, false) => Mode::ListSections,
    (false, false, true) => {
      let Some(profile) = cli.profile.as_deref() else {
        bail!("--suggest needs --profile");
      };
      Mode::Suggest { profile: util::canonicalize_lossy(profile), table: cli.table.clone() }
    }
    (false, false, false) => {
      if cli.configs.is_empty() {
        bail!("Provide at least one --config, or one of --suggest | --list-themes | --list-sections");
      }
      Mode::Compose
    }
    _ => bail!("Choose only one of --suggest | --list-themes | --list-sections"),
  };

  if cli.table.trim().is_empty() {
    bail!("--table must not be empty");
  }

  let overrides = Overrides {
    theme: cli.theme,
    title: cli.title,
    sections: (!cli.sections.is_empty()).then_some(cli.sections),
  };

  Ok(EffectiveConfig {
    mode,
    configs: cli.configs.iter().map(util::canonicalize_lossy).collect(),
    out: cli.out,
    overrides,
    allow_unordered_thresholds: cli.allow_unordered_thresholds,
    now_override: cli.now_override.clone(),
  })
}
