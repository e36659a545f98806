//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum OrionError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// A trajectory was built from an episode without any step.
    #[error("Cannot build a trajectory from an empty episode")]
    EmptyTrajectory,

    /// A tensor, frame or batch did not have the expected shape.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A configuration value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
