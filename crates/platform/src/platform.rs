//! Operating system family detection

use std::fmt;
use std::io;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Operating system family the process is running on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
  #[default]
  Unknown,
  Windows,
  MacOs,
  Linux,
}

impl PlatformKind {
  /// Returns the lowercase identifier for this platform
  pub const fn as_str(&self) -> &'static str {
    match self {
      PlatformKind::Unknown => "unknown",
      PlatformKind::Windows => "windows",
      PlatformKind::MacOs => "macos",
      PlatformKind::Linux => "linux",
    }
  }
}

impl fmt::Display for PlatformKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Outcome of probing the host operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
  Windows,
  DarwinLike,
  OtherUnix,
  Failed,
}

impl From<Detection> for PlatformKind {
  fn from(detection: Detection) -> Self {
    match detection {
      Detection::Windows => PlatformKind::Windows,
      Detection::DarwinLike => PlatformKind::MacOs,
      Detection::OtherUnix => PlatformKind::Linux,
      Detection::Failed => PlatformKind::Unknown,
    }
  }
}

/// Source of the raw facts platform detection is built on.
///
/// The real implementation is [`SystemProber`]; tests substitute canned
/// answers so no process is spawned.
pub trait OsProber: Send + Sync {
  /// Whether the host reports itself natively as Windows NT
  fn is_windows_nt(&self) -> bool;

  /// Kernel name as printed by `uname -s`
  fn kernel_name(&self) -> io::Result<String>;
}

/// Probes the running host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProber;

impl OsProber for SystemProber {
  fn is_windows_nt(&self) -> bool {
    cfg!(windows)
  }

  fn kernel_name(&self) -> io::Result<String> {
    let output = Command::new("uname")
      .arg("-s")
      .stdin(Stdio::null())
      .stderr(Stdio::null())
      .output()?;

    if !output.status.success() {
      return Err(io::Error::other(format!("uname exited with {}", output.status)));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}

/// Classify the host using `prober`.
///
/// Never fails: a kernel-name query that cannot be run, or that prints
/// nothing, yields [`Detection::Failed`].
pub fn detect(prober: &dyn OsProber) -> Detection {
  if prober.is_windows_nt() {
    return Detection::Windows;
  }

  match prober.kernel_name() {
    Ok(name) if name.contains("Darwin") => Detection::DarwinLike,
    Ok(name) if !name.trim().is_empty() => Detection::OtherUnix,
    Ok(_) => {
      debug!("kernel name query returned no output");
      Detection::Failed
    }
    Err(e) => {
      debug!(error = %e, "kernel name query failed");
      Detection::Failed
    }
  }
}

/// Human-readable description of the runtime, for diagnostics and bug reports
pub fn runtime_version_label() -> String {
  let os = sysinfo::System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string());
  format!(
    "{} {} ({}; {})",
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_VERSION"),
    os,
    std::env::consts::ARCH
  )
}
