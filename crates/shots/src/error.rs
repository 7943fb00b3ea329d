//! Shot Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A shots error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for shot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// An upload item was requested while running in generate-only mode.
    /// This is a configuration contract violation: there is no remote
    /// destination to upload to.
    #[display("can't create upload item when generate-only mode is enabled")]
    GenerateOnly,
    /// Underlying I/O error (folder creation, ignore file, file promotion).
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Path could not be used (for example, it normalizes to nothing).
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Runs operate on a point-in-time snapshot of the filesystem and
        // failures are expected to end the run.
        false
    }
}
