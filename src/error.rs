//! Error handling for spikeviz
//!
//! Every failure is detected at the boundary where it occurs and propagated
//! unmodified to the caller. Nothing here is retried.

use thiserror::Error;

/// Result type alias for spikeviz operations
pub type Result<T> = std::result::Result<T, VizError>;

/// Main error type for spikeviz operations
#[derive(Error, Debug)]
pub enum VizError {
    // Topology Errors
    #[error("Invalid topology: {reason}")]
    InvalidTopology { reason: String },

    // Buffer Errors
    #[error(
        "Buffer length mismatch: expected {expected} samples ({num_neurons} neurons x {num_steps} steps), got {actual}"
    )]
    BufferLengthMismatch {
        expected: usize,
        actual: usize,
        num_neurons: usize,
        num_steps: usize,
    },

    // Engine Errors
    #[error("Engine call failed: {reason}")]
    EngineCallFailure { reason: String },

    // Output Errors
    #[error("Failed to write {path}: {reason}")]
    AnimationWriteFailure { path: String, reason: String },

    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("Recording not found: {path}")]
    RecordingNotFound { path: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VizError {
    /// Shorthand for an [`VizError::InvalidTopology`] error
    pub fn topology(reason: impl Into<String>) -> Self {
        VizError::InvalidTopology {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`VizError::InvalidParameter`] error
    pub fn parameter(reason: impl Into<String>) -> Self {
        VizError::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`VizError::EngineCallFailure`] error
    pub fn engine(reason: impl Into<String>) -> Self {
        VizError::EngineCallFailure {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`VizError::AnimationWriteFailure`] error
    pub fn write_failure(path: &std::path::Path, reason: impl ToString) -> Self {
        VizError::AnimationWriteFailure {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            VizError::InvalidTopology { .. } => "INVALID_TOPOLOGY",
            VizError::BufferLengthMismatch { .. } => "BUFFER_LENGTH_MISMATCH",
            VizError::EngineCallFailure { .. } => "ENGINE_CALL_FAILURE",
            VizError::AnimationWriteFailure { .. } => "ANIMATION_WRITE_FAILURE",
            VizError::InvalidParameter { .. } => "INVALID_PARAMETER",
            VizError::RecordingNotFound { .. } => "RECORDING_NOT_FOUND",
            VizError::Io(_) => "IO_ERROR",
            VizError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            VizError::InvalidTopology { .. } => vec![
                "Every layer must contain at least one neuron",
                "The reference topology is 16,4,1",
            ],
            VizError::BufferLengthMismatch { .. } => vec![
                "Check that the layer sizes match the ones the engine was run with",
                "Check that the step count matches the engine run",
            ],
            VizError::EngineCallFailure { .. } => vec![
                "The engine is not re-entrant - start a new session to run again",
                "Check the recording was produced by a completed engine run",
            ],
            VizError::AnimationWriteFailure { .. } => vec![
                "Check the output directory exists and is writable",
                "Free up disk space",
            ],
            VizError::RecordingNotFound { .. } => vec![
                "Check the file path is correct",
                "Generate a fixture with 'spikeviz-cli synth <path>'",
            ],
            _ => vec![],
        }
    }
}
