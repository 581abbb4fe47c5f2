//! Process environment context
//!
//! [`Environment`] owns every lazily computed value: the detected platform,
//! the session id and the three directory roots. The process normally uses
//! [`Environment::global`]; tests build their own instance so nothing is shared
//! between them.

use std::fmt;
use std::path::{Path, PathBuf};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::directory;
use crate::error::{PlatformError, Result};
use crate::paths::{self, Roots};
use crate::platform::{self, OsProber, PlatformKind, SystemProber};

/// Environment variable overriding the user support directory
pub const SUPPORT_DIR_ENV: &str = "OPENRA_SUPPORT_DIR";

/// Random identifier of this process, for correlating logs and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
  fn generate() -> Self {
    Self(Uuid::new_v4())
  }

  pub fn as_uuid(&self) -> &Uuid {
    &self.0
  }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Location overrides; `None` means the platform default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locations {
  /// Installation directory instead of the executable's directory
  pub game_dir: Option<PathBuf>,
  /// User support directory, bypassing the portable and platform defaults
  pub support_dir: Option<PathBuf>,
  /// Folder the default user support directory is placed under
  pub personal_dir: Option<PathBuf>,
  /// Windows shared application data root
  pub common_data_dir: Option<PathBuf>,
}

impl Locations {
  /// Read overrides from the process environment
  pub fn from_env() -> Self {
    let support_dir = std::env::var_os(SUPPORT_DIR_ENV)
      .filter(|v| !v.is_empty())
      .map(PathBuf::from);

    Self {
      support_dir,
      ..Self::default()
    }
  }
}

/// Memoized platform and directory state
pub struct Environment {
  prober: Box<dyn OsProber>,
  locations: Locations,
  session_id: SessionId,
  platform: OnceCell<PlatformKind>,
  game_dir: OnceCell<String>,
  support_dir: OnceCell<Result<String>>,
  system_support_dir: OnceCell<String>,
}

static GLOBAL: OnceCell<Environment> = OnceCell::new();

impl Environment {
  /// The process-wide environment, configured from [`Locations::from_env`]
  pub fn global() -> &'static Environment {
    GLOBAL.get_or_init(|| Environment::builder().locations(Locations::from_env()).build())
  }

  pub fn builder() -> EnvironmentBuilder {
    EnvironmentBuilder::default()
  }

  /// Operating system family, detected on first call
  pub fn current_platform(&self) -> PlatformKind {
    *self.platform.get_or_init(|| {
      let kind = PlatformKind::from(platform::detect(self.prober.as_ref()));
      debug!(platform = %kind, "detected platform");
      kind
    })
  }

  pub fn session_id(&self) -> SessionId {
    self.session_id
  }

  /// Installation directory, absolute and with a trailing separator
  pub fn game_dir(&self) -> &str {
    self.game_dir.get_or_init(|| {
      let dir = match &self.locations.game_dir {
        Some(dir) => directory::absolute_dir(dir),
        None => directory::default_game_dir(),
      };
      directory::with_trailing_separator(dir)
    })
  }

  /// User support directory, with a trailing separator.
  ///
  /// Created on first access. The outcome is memoized either way: after a
  /// creation failure every later call returns the same error without
  /// touching the filesystem again.
  pub fn support_dir(&self) -> Result<&str> {
    self
      .support_dir
      .get_or_init(|| {
        let outcome = directory::user_support_dir(
          self.current_platform(),
          self.game_dir(),
          self.locations.support_dir.as_deref(),
          self.locations.personal_dir.as_deref(),
        );
        match &outcome {
          Ok(dir) => debug!(path = %dir, "resolved user support directory"),
          Err(e) => warn!(error = %e, "user support directory unavailable"),
        }
        outcome
      })
      .as_deref()
      .map_err(PlatformError::clone)
  }

  /// System support directory, with a trailing separator.
  ///
  /// Not created and not checked for existence or writability.
  pub fn system_support_dir(&self) -> &str {
    self.system_support_dir.get_or_init(|| {
      directory::system_support_dir(
        self.current_platform(),
        self.game_dir(),
        self.locations.common_data_dir.as_deref(),
      )
    })
  }

  /// The roots symbolic paths expand to
  pub fn roots(&self) -> Result<Roots<'_>> {
    Ok(Roots {
      game_dir: self.game_dir(),
      support_dir: self.support_dir()?,
    })
  }

  /// Expand `^`, `.` and `./` prefixes; see [`paths::resolve_with`]
  pub fn resolve(&self, path: &str) -> Result<String> {
    Ok(paths::resolve_with(&self.roots()?, path))
  }

  /// Join `segments` and expand the result
  pub fn resolve_segments<S: AsRef<Path>>(&self, segments: &[S]) -> Result<String> {
    Ok(paths::resolve_segments_with(&self.roots()?, segments))
  }

  /// Turn an absolute path back into symbolic form; see [`paths::unresolve_with`]
  pub fn unresolve(&self, path: &str) -> Result<String> {
    Ok(paths::unresolve_with(&self.roots()?, path))
  }
}

impl fmt::Debug for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Environment")
      .field("locations", &self.locations)
      .field("session_id", &self.session_id)
      .field("platform", &self.platform.get())
      .field("game_dir", &self.game_dir.get())
      .field("support_dir", &self.support_dir.get())
      .field("system_support_dir", &self.system_support_dir.get())
      .finish_non_exhaustive()
  }
}

/// Builder for [`Environment`]
#[derive(Default)]
pub struct EnvironmentBuilder {
  prober: Option<Box<dyn OsProber>>,
  locations: Locations,
}

impl EnvironmentBuilder {
  /// Use `prober` instead of querying the host
  pub fn prober(mut self, prober: impl OsProber + 'static) -> Self {
    self.prober = Some(Box::new(prober));
    self
  }

  /// Replace all location overrides
  pub fn locations(mut self, locations: Locations) -> Self {
    self.locations = locations;
    self
  }

  pub fn game_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.locations.game_dir = Some(dir.into());
    self
  }

  pub fn support_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.locations.support_dir = Some(dir.into());
    self
  }

  pub fn personal_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.locations.personal_dir = Some(dir.into());
    self
  }

  pub fn common_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.locations.common_data_dir = Some(dir.into());
    self
  }

  pub fn build(self) -> Environment {
    Environment {
      prober: self.prober.unwrap_or_else(|| Box::new(SystemProber)),
      locations: self.locations,
      session_id: SessionId::generate(),
      platform: OnceCell::new(),
      game_dir: OnceCell::new(),
      support_dir: OnceCell::new(),
      system_support_dir: OnceCell::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::directory::with_trailing_separator;
  use crate::platform::tests::FakeProber;
  use serial_test::serial;
  use std::sync::Arc;
  use std::sync::atomic::Ordering;
  use tempfile::TempDir;

  /// Install and home directories backing a test environment
  struct Sandbox {
    install: TempDir,
    home: TempDir,
  }

  impl Sandbox {
    fn new() -> Self {
      Self {
        install: TempDir::new().unwrap(),
        home: TempDir::new().unwrap(),
      }
    }

    fn env(&self, prober: FakeProber) -> Environment {
      Environment::builder()
        .prober(prober)
        .game_dir(self.install.path())
        .personal_dir(self.home.path())
        .build()
    }
  }

  /// Shares one counting prober with the environment under test
  struct SharedProber(Arc<FakeProber>);

  impl OsProber for SharedProber {
    fn is_windows_nt(&self) -> bool {
      self.0.is_windows_nt()
    }

    fn kernel_name(&self) -> std::io::Result<String> {
      self.0.kernel_name()
    }
  }

  #[test]
  fn platform_is_probed_once() {
    let prober = Arc::new(FakeProber::unix("Darwin"));
    let env = Environment::builder().prober(SharedProber(prober.clone())).build();

    assert_eq!(env.current_platform(), PlatformKind::MacOs);
    assert_eq!(env.current_platform(), PlatformKind::MacOs);
    assert_eq!(prober.queries.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn broken_probe_is_unknown_with_linux_style_dirs() {
    let sandbox = Sandbox::new();
    let env = sandbox.env(FakeProber::broken());

    assert_eq!(env.current_platform(), PlatformKind::Unknown);
    assert_eq!(
      env.support_dir().unwrap(),
      with_trailing_separator(sandbox.home.path().join(".openra"))
    );
    assert_eq!(env.system_support_dir(), "/var/games/openra/");
  }

  #[test]
  fn game_dir_has_trailing_separator() {
    let sandbox = Sandbox::new();
    let env = sandbox.env(FakeProber::unix("Linux"));
    assert_eq!(env.game_dir(), with_trailing_separator(sandbox.install.path()));

    let default = Environment::builder().prober(FakeProber::unix("Linux")).build();
    assert!(default.game_dir().ends_with(std::path::MAIN_SEPARATOR));
  }

  #[test]
  fn support_dir_created_once_and_cached() {
    let sandbox = Sandbox::new();
    let env = sandbox.env(FakeProber::unix("Linux"));
    let expected = sandbox.home.path().join(".openra");
    assert!(!expected.exists());

    let first = env.support_dir().unwrap();
    assert!(expected.is_dir());

    std::fs::remove_dir(&expected).unwrap();
    let second = env.support_dir().unwrap();
    assert!(std::ptr::eq(first, second));
    assert!(!expected.exists());
  }

  #[test]
  fn support_dir_creation_failure_propagates() {
    let sandbox = Sandbox::new();
    let blocker = sandbox.home.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let env = Environment::builder()
      .prober(FakeProber::unix("Linux"))
      .game_dir(sandbox.install.path())
      .personal_dir(&blocker)
      .build();

    assert!(matches!(env.support_dir(), Err(PlatformError::CreateSupportDir { .. })));
    assert!(env.resolve("^maps").is_err());
  }

  #[test]
  fn support_dir_failure_is_memoized() {
    let sandbox = Sandbox::new();
    let blocker = sandbox.home.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let env = Environment::builder()
      .prober(FakeProber::unix("Linux"))
      .game_dir(sandbox.install.path())
      .personal_dir(&blocker)
      .build();

    let first = env.support_dir().unwrap_err();

    std::fs::remove_file(&blocker).unwrap();
    let second = env.support_dir().unwrap_err();

    assert_eq!(first.to_string(), second.to_string());
    assert!(!blocker.exists());
    assert!(env.unresolve("/anything").is_err());
  }

  #[test]
  fn relative_game_dir_override_is_absolute() {
    let env = Environment::builder()
      .prober(FakeProber::unix("Linux"))
      .game_dir("rel")
      .build();

    let expected = std::env::current_dir().unwrap().join("rel");
    assert!(Path::new(env.game_dir()).is_absolute());
    assert_eq!(env.game_dir(), with_trailing_separator(expected));
  }

  #[test]
  fn resolve_and_unresolve_use_cached_roots() {
    let sandbox = Sandbox::new();
    let env = sandbox.env(FakeProber::unix("Linux"));
    let support = env.support_dir().unwrap().to_string();
    let game = env.game_dir().to_string();

    assert_eq!(env.resolve("^").unwrap(), support);
    assert_eq!(env.unresolve(&support).unwrap(), "^");
    assert_eq!(env.resolve(".").unwrap(), game);
    assert_eq!(env.resolve("./settings.yml").unwrap(), format!("{game}settings.yml"));
    assert_eq!(env.unresolve(&env.resolve("^/maps").unwrap()).unwrap(), "^/maps");
    assert_eq!(env.resolve("^/replays \t").unwrap(), env.resolve("^/replays").unwrap());
    assert_eq!(env.resolve("/etc/foo").unwrap(), "/etc/foo");
    assert_eq!(
      env.resolve_segments(&[".", "mods", "ra"]).unwrap(),
      with_trailing_separator(sandbox.install.path().join("mods")) + "ra"
    );
  }

  #[test]
  fn portable_install_shares_support_dir() {
    let sandbox = Sandbox::new();
    std::fs::create_dir(sandbox.install.path().join("Support")).unwrap();
    let env = sandbox.env(FakeProber::unix("Darwin"));

    let portable = with_trailing_separator(sandbox.install.path().join("Support"));
    assert_eq!(env.support_dir().unwrap(), portable);
    assert_eq!(env.system_support_dir(), portable);
    assert_eq!(env.unresolve(&format!("{portable}maps")).unwrap(), "^maps");
    assert_eq!(env.unresolve(&format!("{}mods", env.game_dir())).unwrap(), "./mods");
  }

  #[test]
  fn system_support_dir_is_not_created() {
    let sandbox = Sandbox::new();
    let shared = sandbox.home.path().join("ProgramData");
    let env = Environment::builder()
      .prober(FakeProber::windows())
      .game_dir(sandbox.install.path())
      .common_data_dir(&shared)
      .build();

    assert_eq!(env.current_platform(), PlatformKind::Windows);
    assert_eq!(env.system_support_dir(), with_trailing_separator(shared.join("OpenRA")));
    assert!(!shared.exists());
  }

  #[test]
  fn explicit_support_dir_override() {
    let sandbox = Sandbox::new();
    let custom = sandbox.home.path().join("custom-support");
    let env = Environment::builder()
      .prober(FakeProber::unix("Linux"))
      .game_dir(sandbox.install.path())
      .support_dir(&custom)
      .build();

    assert_eq!(env.support_dir().unwrap(), with_trailing_separator(&custom));
    assert!(custom.is_dir());
    assert_eq!(env.system_support_dir(), "/var/games/openra/");
  }

  #[test]
  fn concurrent_first_access_computes_once() {
    let sandbox = Sandbox::new();
    let prober = Arc::new(FakeProber::unix("Linux"));
    let env = Environment::builder()
      .prober(SharedProber(prober.clone()))
      .game_dir(sandbox.install.path())
      .personal_dir(sandbox.home.path())
      .build();

    let env = &env;
    let results: Vec<(PlatformKind, usize)> = std::thread::scope(|s| {
      let handles: Vec<_> = (0..16)
        .map(|_| {
          s.spawn(move || {
            let dir = env.support_dir().unwrap();
            (env.current_platform(), dir.as_ptr() as usize)
          })
        })
        .collect();
      handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(prober.queries.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|r| *r == results[0]));
    assert_eq!(results[0].0, PlatformKind::Linux);
  }

  #[test]
  fn session_ids_are_per_environment() {
    let a = Environment::builder().prober(FakeProber::broken()).build();
    let b = Environment::builder().prober(FakeProber::broken()).build();

    assert_eq!(a.session_id(), a.session_id());
    assert_ne!(a.session_id(), b.session_id());
    assert_eq!(a.session_id().as_uuid().get_version_num(), 4);
  }

  #[test]
  #[serial]
  fn locations_read_support_override_from_env() {
    temp_env::with_var(SUPPORT_DIR_ENV, Some("/custom/support"), || {
      let locations = Locations::from_env();
      assert_eq!(locations.support_dir, Some(PathBuf::from("/custom/support")));
      assert_eq!(locations.game_dir, None);
    });
  }

  #[test]
  #[serial]
  fn empty_env_override_is_ignored() {
    temp_env::with_var(SUPPORT_DIR_ENV, Some(""), || {
      assert_eq!(Locations::from_env(), Locations::default());
    });
    temp_env::with_var(SUPPORT_DIR_ENV, None::<&str>, || {
      assert_eq!(Locations::from_env().support_dir, None);
    });
  }

  #[test]
  fn global_environment_is_shared() {
    let a = Environment::global();
    let b = Environment::global();
    assert!(std::ptr::eq(a, b));
    assert_eq!(a.session_id(), b.session_id());
    assert_eq!(a.current_platform(), b.current_platform());
  }
}
