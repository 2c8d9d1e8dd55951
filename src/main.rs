use anyhow::Result;
use clap::Parser;
use tracing::info;

mod batch;
mod cli;
mod compose;
mod escape;
mod manifest;
mod model;
mod params;
mod sections;
mod suggest;
mod theme;
mod threshold;
mod util;
mod validate;

use crate::cli::{Cli, Mode, normalize};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  util::init_logging(cli.verbose);
  theme::validate_registry()?;

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;
  let now_opt = util::parse_now_override(cfg.now_override.as_deref())?;

  // Phase 2: dispatch
  match &cfg.mode {
    Mode::ListThemes => {
      println!("{}", serde_json::to_string_pretty(theme::registry())?);
      Ok(())
    }
    Mode::ListSections => {
      println!("{}", serde_json::to_string_pretty(&sections::REGISTRY[..])?);
      Ok(())
    }
    Mode::Suggest { profile, table } => {
      let profile = params::load_profile(profile)?;
      info!(data_quality = suggest::data_quality(&profile), "profile loaded");
      let suggestion = suggest::suggest_config(&profile, table);
      println!("{}", serde_json::to_string_pretty(&suggestion)?);
      Ok(())
    }
    // Phase 3: compose configs (single or many) in a unified flow
    Mode::Compose => batch::process_configs(&cfg, now_opt),
  }
}
