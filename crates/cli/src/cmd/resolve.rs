//! Resolve and unresolve command implementation.

use anyhow::{Context, Result};
use ora_platform::Environment;

pub fn cmd_resolve(segments: &[String]) -> Result<()> {
  let env = Environment::global();
  let resolved = match segments {
    [path] => env.resolve(path),
    _ => env.resolve_segments(segments),
  }
  .context("Failed to resolve path")?;

  println!("{}", resolved);
  Ok(())
}

pub fn cmd_unresolve(path: &str) -> Result<()> {
  let symbolic = Environment::global()
    .unresolve(path)
    .context("Failed to unresolve path")?;

  println!("{}", symbolic);
  Ok(())
}
