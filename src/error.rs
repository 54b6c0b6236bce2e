//! Error types for the acquisition pipeline.
//!
//! Three failure classes cross the public API boundary:
//!
//! - **Transport errors**: the byte source failed mid-read. Fatal to the
//!   acquisition loop; surfaced through `AcquisitionHandle::stop`.
//! - **Empty recording**: export was requested before anything was recorded.
//!   A user-facing precondition failure with no state change.
//! - **Export write failures**: the file sink could not be written. The
//!   in-memory recording is unaffected; only the export attempt fails.
//!
//! Framing-level errors ([`crate::wire::FrameError`]) are deliberately absent
//! here: they are absorbed inside the stream reassembler by resynchronizing
//! and never propagate to callers.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for acquisition operations.
pub type Result<T, E = AcquisitionError> = std::result::Result<T, E>;

/// Main error type for acquisition operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AcquisitionError {
    #[error("transport read failed: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("export requested with no recorded samples")]
    EmptyRecording,

    #[error("failed to write export to {path}")]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("channel label table error: {details}")]
    Labels { details: String },
}

impl AcquisitionError {
    /// Returns whether this error terminates the acquisition loop.
    ///
    /// Only transport failures are fatal; everything else is reported to the
    /// caller of the failing operation and leaves acquisition running.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AcquisitionError::Transport { .. })
    }

    /// Helper constructor for transport failures.
    pub fn transport_failed(reason: impl Into<String>) -> Self {
        AcquisitionError::Transport { reason: reason.into(), source: None }
    }

    /// Helper constructor for transport failures with an underlying cause.
    pub fn transport_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        AcquisitionError::Transport { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for export write failures with path context.
    pub fn export_write_error(path: PathBuf, source: std::io::Error) -> Self {
        AcquisitionError::ExportWrite { path, source }
    }

    /// Helper constructor for label table errors.
    pub fn labels_error(details: impl Into<String>) -> Self {
        AcquisitionError::Labels { details: details.into() }
    }
}

impl From<std::io::Error> for AcquisitionError {
    fn from(err: std::io::Error) -> Self {
        AcquisitionError::Transport { reason: err.to_string(), source: Some(Box::new(err)) }
    }
}
