//! Common error types used throughout reelforge.
//!
//! This module provides the unified error taxonomy for the orchestration
//! core: synchronous validation failures, pipeline stage failures after
//! retry exhaustion, and lookup/state errors surfaced by the job-facing
//! interface.

/// Common error type for reelforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter path, value, or input field failed validation.
    ///
    /// Rejected synchronously; never touches a job's stage.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested job was not found (never created, or evicted).
    #[error("Job not found: {0}")]
    NotFound(String),

    /// The operation is not legal for the job's current stage.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A pipeline stage failed after retry exhaustion, or a stage boundary
    /// invariant was violated.
    #[error("Pipeline error in {stage}: {message}")]
    Pipeline {
        /// The stage that failed (e.g. "storyboard", "frame-generation").
        stage: String,
        /// User-facing failure description.
        message: String,
        /// Whether resubmitting the job could succeed.
        retryable: bool,
    },

    /// An I/O operation failed (e.g. reading a config file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Conflict error.
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a new Pipeline error.
    pub fn pipeline<S: Into<String>, M: Into<String>>(stage: S, message: M, retryable: bool) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            message: message.into(),
            retryable,
        }
    }

    /// Whether the failure is transient enough that retrying could succeed.
    ///
    /// Only pipeline errors carry a meaningful flag; everything else is a
    /// deterministic rejection.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Pipeline { retryable: true, .. })
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
