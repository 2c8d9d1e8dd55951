// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, the effective clock, output directories, logging setup, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; DateTime; paths; clap CommandFactory
// outputs: Canonicalized paths, resolved "now", directories ensured, man page text
// side_effects: prepare_out_dir creates directories; init_logging installs the global subscriber
// invariants:
// - prepare_out_dir returns an existing directory (either provided or temp timestamped)
// - logs go to stderr only; stdout is reserved for artifacts and JSON
// errors: IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use clap::CommandFactory;
use tracing_subscriber::EnvFilter;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

/// Parse the hidden `--now-override` value (RFC3339 or `%Y-%m-%dT%H:%M:%S` local).
pub fn parse_now_override(s: Option<&str>) -> Result<Option<DateTime<Local>>> {
  let Some(raw) = s else {
    return Ok(None);
  };
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Ok(Some(dt.with_timezone(&Local)));
  }
  let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
    .with_context(|| format!("invalid --now-override {raw:?}"))?;
  naive
    .and_local_timezone(Local)
    .earliest()
    .map(Some)
    .with_context(|| format!("--now-override {raw:?} does not exist in the local timezone"))
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current local time is used.
pub fn effective_now(override_now: Option<DateTime<Local>>) -> DateTime<Local> {
  override_now.unwrap_or_else(Local::now)
}

/// Prepare an output directory for multi-config runs.
///
/// - When `out` is not "-", it is treated as the target directory; it will be created if needed.
/// - When `out` is "-", a temp directory is created with a timestamped name.
///   Returns the absolute path as a String.
pub fn prepare_out_dir(out: &str, now_opt: Option<DateTime<Local>>) -> Result<String> {
  let dir = if out != "-" {
    out.trim_end_matches('/').to_string()
  } else {
    let eff_now = effective_now(now_opt);
    std::env::temp_dir()
      .join(format!("dax-narrative-{}", eff_now.format("%Y%m%d-%H%M%S")))
      .to_string_lossy()
      .to_string()
  };
  std::fs::create_dir_all(&dir).with_context(|| format!("creating output directory {dir}"))?;

  Ok(dir)
}

/// Default filter directive for a `-v` count.
pub fn verbosity_directive(verbose: u8) -> &'static str {
  match verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  }
}

/// Install the global stderr subscriber; `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity_directive(verbose)));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
