//! Error types for framescan.

use thiserror::Error;

/// Main error type for all framescan operations.
///
/// Malformed audio content is never an error: a buffer with no valid
/// frames scans successfully to a count of 0. These variants cover the
/// surfaces around the scan (intake checks and pool dispatch).
#[derive(Debug, Error)]
pub enum FramescanError {
    /// No upload was provided at all (boundary layers only; an
    /// empty-but-present buffer is a successful zero-frame scan).
    #[error("No input file provided")]
    MissingFile,

    /// Upload is not recognizable as MP3 by content type or filename.
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    /// Upload exceeds the configured size ceiling.
    #[error("Payload of {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Scan did not finish within the configured time budget.
    #[error("Scan timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Pool queue is full - too many concurrent scans.
    #[error("Scanner pool is at capacity")]
    Busy,

    /// A scan context died mid-call (panic in the worker).
    #[error("Scan worker failed: {0}")]
    Worker(String),

    /// Pool is shut down and no longer accepts work.
    #[error("Scanner pool is closed")]
    Closed,

    /// Shutdown grace period expired with work still in flight.
    #[error("Shutdown grace period expired")]
    ShutdownTimeout,
}

/// Result type alias using FramescanError.
pub type Result<T> = std::result::Result<T, FramescanError>;
