//! Installation and support directory resolution
//!
//! Every directory value produced here is a `String` ending in a path
//! separator so symbolic prefixes can be substituted by plain concatenation.
//! Memoization lives in [`crate::Environment`]; these functions compute.

use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{PlatformError, Result};
use crate::platform::PlatformKind;

/// Name of the folder next to the binaries that turns an install portable
pub const PORTABLE_SUPPORT_DIR: &str = "Support";

/// Render `path` as a string that ends with a path separator
///
/// Paths that are not valid UTF-8 are converted lossily and a warning is
/// logged; the resulting string no longer names the same directory.
pub fn with_trailing_separator<P: AsRef<Path>>(path: P) -> String {
  let path = path.as_ref();
  let mut s = match path.to_str() {
    Some(s) => s.to_string(),
    None => {
      warn!(path = %path.display(), "path is not valid UTF-8, converting lossily");
      path.to_string_lossy().into_owned()
    }
  };
  if !s.ends_with(['/', MAIN_SEPARATOR]) {
    s.push(MAIN_SEPARATOR);
  }
  s
}

/// Make `path` absolute against the working directory without requiring it
/// to exist
pub fn absolute_dir(path: &Path) -> PathBuf {
  if path.is_absolute() {
    return path.to_path_buf();
  }

  std::path::absolute(path).unwrap_or_else(|_| {
    std::env::current_dir()
      .map(|cwd| cwd.join(path))
      .unwrap_or_else(|_| path.to_path_buf())
  })
}

/// Directory holding the running executable.
///
/// Falls back to the working directory, then `.`, when the executable path
/// cannot be determined.
pub fn default_game_dir() -> PathBuf {
  let exe_dir = std::env::current_exe()
    .ok()
    .and_then(|exe| exe.parent().map(Path::to_path_buf))
    .map(|dir| dunce::canonicalize(&dir).unwrap_or(dir));

  match exe_dir {
    Some(dir) => dir,
    None => {
      warn!("could not locate the running executable, using the working directory");
      std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
  }
}

/// The `Support` folder inside `game_dir`, if it exists
pub fn portable_support_dir(game_dir: &str) -> Option<String> {
  let dir = Path::new(game_dir).join(PORTABLE_SUPPORT_DIR);
  if dir.is_dir() {
    debug!(path = %dir.display(), "using portable support directory");
    Some(with_trailing_separator(dir))
  } else {
    None
  }
}

/// The folder the user support directory is placed under by default.
///
/// Windows keeps it in the documents folder; everywhere else it is the home
/// directory.
pub fn default_personal_dir(platform: PlatformKind) -> Option<PathBuf> {
  match platform {
    PlatformKind::Windows => dirs::document_dir(),
    _ => dirs::home_dir(),
  }
}

/// Platform default location of the user support directory under `personal`
pub fn user_support_location(platform: PlatformKind, personal: &Path) -> PathBuf {
  match platform {
    PlatformKind::Windows => personal.join("OpenRA"),
    PlatformKind::MacOs => personal.join("Library/Application Support/OpenRA"),
    PlatformKind::Linux | PlatformKind::Unknown => personal.join(".openra"),
  }
}

/// Create `path` (and its parents) if it is missing.
///
/// A directory that appears concurrently is not an error.
pub fn ensure_support_dir(path: &Path) -> Result<()> {
  if path.is_dir() {
    return Ok(());
  }

  fs::create_dir_all(path).map_err(|source| PlatformError::CreateSupportDir {
    path: path.to_path_buf(),
    source: Arc::new(source),
  })?;
  info!(path = %path.display(), "created support directory");
  Ok(())
}

/// Compute the user support directory, creating it when necessary.
///
/// `explicit` takes precedence over the portable `Support` folder, which in
/// turn takes precedence over the platform default under `personal`.
pub fn user_support_dir(
  platform: PlatformKind,
  game_dir: &str,
  explicit: Option<&Path>,
  personal: Option<&Path>,
) -> Result<String> {
  if let Some(dir) = explicit {
    let dir = absolute_dir(dir);
    ensure_support_dir(&dir)?;
    return Ok(with_trailing_separator(dir));
  }

  if let Some(dir) = portable_support_dir(game_dir) {
    return Ok(dir);
  }

  let personal = match personal {
    Some(dir) => dir.to_path_buf(),
    None => default_personal_dir(platform).ok_or(PlatformError::NoHomeDirectory)?,
  };
  let dir = user_support_location(platform, &personal);
  ensure_support_dir(&dir)?;
  Ok(with_trailing_separator(dir))
}

/// Shared application data root on Windows
pub fn default_common_data_dir() -> PathBuf {
  std::env::var_os("ProgramData")
    .or_else(|| std::env::var_os("ALLUSERSPROFILE"))
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"))
}

/// Compute the system support directory.
///
/// Never touches the filesystem beyond the portable check: the result may not
/// exist or be writable.
pub fn system_support_dir(platform: PlatformKind, game_dir: &str, common_data: Option<&Path>) -> String {
  if let Some(dir) = portable_support_dir(game_dir) {
    return dir;
  }

  match platform {
    PlatformKind::Windows => {
      let root = common_data.map(Path::to_path_buf).unwrap_or_else(default_common_data_dir);
      with_trailing_separator(root.join("OpenRA"))
    }
    PlatformKind::MacOs => "/Library/Application Support/OpenRA/".to_string(),
    PlatformKind::Linux | PlatformKind::Unknown => "/var/games/openra/".to_string(),
  }
}
