use thiserror::Error;

/// Convenience result type for fallible operations in this crate.
pub type FilterResult<T> = Result<T, FilterError>;

/// Error type returned by loading, state persistence, and background detection.
///
/// Detection, filter generation and filter evaluation themselves never fail; malformed cells
/// degrade to `string`/`mixed` classification and unknown filter ids are no-ops.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error, e.g. a corrupt persisted filter state.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not have a usable shape (empty file, unsupported extension, ...).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A background detection job failed (panicked or exited without a result).
    #[error("type detection failed: {message}")]
    DetectionFailed { message: String },

    /// The background executor could not accept the job.
    #[error("detection worker unavailable: {message}")]
    WorkerUnavailable { message: String },
}
