//! Error types for neural_plan.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during training or export.
#[derive(Error, Debug)]
pub enum NeuralPlanError {
    /// Invalid run or network configuration. Always fatal before training starts.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Tensor shape mismatch between declared and actual sizes.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Malformed or missing dataset entry.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A scene/object key expected by the test accessor is absent.
    #[error("missing entry: scene {scene:?} has no object {name:?}")]
    MissingEntry {
        /// Scene name.
        scene: String,
        /// Object or constraint name.
        name: String,
    },

    /// Checkpoint write or read failure.
    #[error("checkpoint error: {message}")]
    Checkpoint {
        /// Description of the error.
        message: String,
    },

    /// Failure while freezing the predictor or writing an embedding archive.
    #[error("export error: {message}")]
    Export {
        /// Description of the error.
        message: String,
    },

    /// Destination already populated and the run is not authorized to overwrite it.
    #[error("output path already populated: {path:?} (pass allow_overwrite to replace it)")]
    OutputExists {
        /// The offending path.
        path: PathBuf,
    },

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for neural_plan operations.
pub type Result<T> = std::result::Result<T, NeuralPlanError>;
