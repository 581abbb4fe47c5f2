//! Error types for ora-platform

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur while resolving platform directories
///
/// `Clone` so a memoized failure can be returned to every caller.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
  #[error("Failed to determine the personal (home/documents) directory")]
  NoHomeDirectory,

  #[error("Failed to create support directory '{}': {source}", path.display())]
  CreateSupportDir {
    path: PathBuf,
    #[source]
    source: Arc<std::io::Error>,
  },
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
