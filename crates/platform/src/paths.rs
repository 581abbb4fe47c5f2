//! Symbolic path translation
//!
//! Configuration files refer to the user support directory as `^` and to the
//! installation directory as `./` (or `.\`). These functions convert between
//! that notation and real paths given the two roots.

use std::path::{Path, PathBuf};

/// Prefix standing for the user support directory
pub const SUPPORT_PREFIX: char = '^';

/// Prefix written back for paths inside the installation directory
pub const GAME_PREFIX: &str = "./";

/// The directories symbolic prefixes stand for.
///
/// Both values end with a path separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roots<'a> {
  pub game_dir: &'a str,
  pub support_dir: &'a str,
}

/// Expand a symbolic path.
///
/// Trailing spaces and tabs are dropped first; leading characters are kept.
/// Paths without a recognized prefix are returned as-is.
///
/// # Examples
///
/// ```
/// use ora_platform::paths::{Roots, resolve_with};
///
/// let roots = Roots { game_dir: "/opt/openra/", support_dir: "/home/player/.openra/" };
/// assert_eq!(resolve_with(&roots, "^maps/test.oramap"), "/home/player/.openra/maps/test.oramap");
/// assert_eq!(resolve_with(&roots, "./mods\t"), "/opt/openra/mods");
/// assert_eq!(resolve_with(&roots, "."), "/opt/openra/");
/// assert_eq!(resolve_with(&roots, "/etc/foo"), "/etc/foo");
/// ```
pub fn resolve_with(roots: &Roots<'_>, path: &str) -> String {
  let path = path.trim_end_matches([' ', '\t']);

  if let Some(rest) = path.strip_prefix(SUPPORT_PREFIX) {
    format!("{}{}", roots.support_dir, rest)
  } else if path == "." {
    roots.game_dir.to_string()
  } else if let Some(rest) = path.strip_prefix("./").or_else(|| path.strip_prefix(".\\")) {
    format!("{}{}", roots.game_dir, rest)
  } else {
    path.to_string()
  }
}

/// Replace a leading root directory with its symbolic prefix.
///
/// The user support directory is tried before the installation directory, so
/// when one contains the other the support directory wins.
///
/// # Examples
///
/// ```
/// use ora_platform::paths::{Roots, unresolve_with};
///
/// let roots = Roots { game_dir: "/opt/openra/", support_dir: "/home/player/.openra/" };
/// assert_eq!(unresolve_with(&roots, "/home/player/.openra/replays"), "^replays");
/// assert_eq!(unresolve_with(&roots, "/opt/openra/mods/ra"), "./mods/ra");
/// assert_eq!(unresolve_with(&roots, "/tmp/x"), "/tmp/x");
/// ```
pub fn unresolve_with(roots: &Roots<'_>, path: &str) -> String {
  if let Some(rest) = path.strip_prefix(roots.support_dir) {
    format!("{}{}", SUPPORT_PREFIX, rest)
  } else if let Some(rest) = path.strip_prefix(roots.game_dir) {
    format!("{}{}", GAME_PREFIX, rest)
  } else {
    path.to_string()
  }
}

/// Combine path segments with the platform separator.
///
/// A rooted segment replaces everything before it, like [`Path::join`].
pub fn join_segments<S: AsRef<Path>>(segments: &[S]) -> String {
  segments
    .iter()
    .fold(PathBuf::new(), |acc, segment| acc.join(segment))
    .to_string_lossy()
    .into_owned()
}

/// Join `segments` and expand the result with [`resolve_with`]
pub fn resolve_segments_with<S: AsRef<Path>>(roots: &Roots<'_>, segments: &[S]) -> String {
  resolve_with(roots, &join_segments(segments))
}
