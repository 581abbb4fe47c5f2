//! Info and dirs command implementation.
//!
//! Reports the detected platform, the session id and the three directory roots.

use anyhow::{Context, Result};
use ora_platform::{Environment, PlatformKind, SessionId, runtime_version_label};
use serde::Serialize;

use crate::output::{OutputFormat, print_info, print_json, print_stat};

const LABEL_WIDTH: usize = 16;

#[derive(Debug, Serialize)]
struct DirsReport<'a> {
  game_dir: &'a str,
  support_dir: &'a str,
  system_support_dir: &'a str,
}

#[derive(Debug, Serialize)]
struct InfoReport<'a> {
  platform: PlatformKind,
  session_id: SessionId,
  runtime: String,
  #[serde(flatten)]
  dirs: DirsReport<'a>,
}

fn dirs_report(env: &Environment) -> Result<DirsReport<'_>> {
  Ok(DirsReport {
    game_dir: env.game_dir(),
    support_dir: env.support_dir().context("Failed to prepare the user support directory")?,
    system_support_dir: env.system_support_dir(),
  })
}

fn print_dirs(dirs: &DirsReport<'_>) {
  print_stat("Game dir", dirs.game_dir, LABEL_WIDTH);
  print_stat("Support dir", dirs.support_dir, LABEL_WIDTH);
  print_stat("System support", dirs.system_support_dir, LABEL_WIDTH);
}

pub fn cmd_info(output: OutputFormat) -> Result<()> {
  let env = Environment::global();
  let report = InfoReport {
    platform: env.current_platform(),
    session_id: env.session_id(),
    runtime: runtime_version_label(),
    dirs: dirs_report(env)?,
  };

  if output.is_json() {
    return print_json(&report);
  }

  print_info("System:");
  print_stat("Platform", report.platform.as_str(), LABEL_WIDTH);
  print_stat("Session", &report.session_id.to_string(), LABEL_WIDTH);
  print_stat("Runtime", &report.runtime, LABEL_WIDTH);
  println!();
  print_info("Directories:");
  print_dirs(&report.dirs);
  Ok(())
}

pub fn cmd_dirs(output: OutputFormat) -> Result<()> {
  let dirs = dirs_report(Environment::global())?;

  if output.is_json() {
    return print_json(&dirs);
  }

  print_dirs(&dirs);
  Ok(())
}
