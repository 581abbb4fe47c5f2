//! Platform identification and support-directory resolution for OpenRA
//!
//! This crate provides:
//! - OS family detection ([`PlatformKind`]), probed once per [`Environment`]
//! - The installation, user support and system support directories
//! - Translation between absolute paths and the symbolic `^` / `./` notation
//!   used in configuration files

pub mod directory;
mod env;
mod error;
pub mod paths;
mod platform;

pub use env::{Environment, EnvironmentBuilder, Locations, SUPPORT_DIR_ENV, SessionId};
pub use error::{PlatformError, Result};
pub use paths::Roots;
pub use platform::{Detection, OsProber, PlatformKind, SystemProber, detect, runtime_version_label};
