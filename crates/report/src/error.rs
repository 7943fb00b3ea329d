//! Report Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::api::ApiAction;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// A report error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The webhook event file is missing or unreadable.
    #[display("could not read event file: {}", _0.display())]
    EventFile(#[error(not(source))] PathBuf),
    /// The webhook event file is not the expected JSON document.
    #[display("malformed event file")]
    InvalidEvent,
    /// The transport could not deliver the payload.
    #[display("transport error")]
    Transport,
    /// The API answered with a non-2xx status.
    #[display("API rejected [{action}] with status {status}")]
    Rejected { action: ApiAction, status: u16 },
    /// A value required to build the payload is missing or invalid.
    #[display("invalid report configuration")]
    Config,
    #[display("could not serialize payload")]
    Serialize,
    /// Telemetry could not be captured or flushed. Never fatal.
    #[display("telemetry error")]
    Telemetry,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Runs never retry; a failed submission ends the run.
        false
    }
}
