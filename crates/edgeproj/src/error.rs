//! Error types for the projection engine.

use thiserror::Error;

/// Errors that can occur while generating a projection.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// Position buffer has no vertices.
    #[error("position buffer is empty")]
    EmptyPositions,

    /// Position buffer length is not a multiple of three.
    #[error("position buffer length {0} is not a multiple of 3")]
    PositionStride(usize),

    /// Index buffer length is not a multiple of three.
    #[error("index buffer length {0} is not a multiple of 3")]
    IndexStride(usize),

    /// An index refers past the end of the vertex list.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index value.
        index: u32,
        /// Number of vertices in the part.
        vertex_count: usize,
    },

    /// Invalid projection options.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The caller cancelled the job.
    #[error("projection aborted")]
    Aborted,

    /// `advance` was called on a task that already completed.
    #[error("projection task already finished")]
    TaskFinished,

    /// The background worker could not be started.
    #[error("worker unavailable: {0}")]
    WorkerUnavailable(String),

    /// The background worker stopped without reporting a result.
    #[error("worker crashed: {0}")]
    WorkerCrashed(String),

    /// A job is already running on this worker.
    #[error("Already running job")]
    JobInProgress,

    /// The worker has been disposed.
    #[error("worker has been disposed")]
    WorkerDisposed,

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing export files failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
