//! Core error types for ecourban-core.
//!
//! Every fallible operation in the library returns [`ForecastError`] (or one
//! of the narrower enums that convert into it). Callers at a boundary use
//! [`ForecastError::kind`] to tell the three reportable cases apart.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ecourban-core.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Wrong number of values passed to a prediction
    #[error("Expected {expected} values, got {actual}.")]
    InputSize { expected: usize, actual: usize },

    /// Model or scaler artifact has not been written yet
    #[error(
        "Trained model or scaler not found (model: {}, scaler: {}). \
         Please run `ecourban-cli train` first to train the model.",
        model.display(),
        scaler.display()
    )]
    ArtifactMissing { model: PathBuf, scaler: PathBuf },

    /// Dataset-related errors
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Training-related errors
    #[error("Training error: {0}")]
    Training(#[from] TrainingError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Coarse classification used by the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputSize,
    ArtifactMissing,
    Unexpected,
}

impl ForecastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::InputSize { .. } => ErrorKind::InputSize,
            ForecastError::ArtifactMissing { .. } => ErrorKind::ArtifactMissing,
            _ => ErrorKind::Unexpected,
        }
    }
}

/// Dataset-specific errors.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Failed to read or parse the CSV file
    #[error("Failed to read dataset at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failed to write the CSV file
    #[error("Failed to write dataset at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A timestamp cell could not be parsed
    #[error("Invalid timestamp '{value}' on row {row}")]
    InvalidTimestamp { row: usize, value: String },

    /// A value cell is NaN or infinite
    #[error("Non-finite energy value on row {row}")]
    NonFinite { row: usize },

    /// Not enough readings to build a single training window
    #[error("Series has {len} values; at least {required} are needed")]
    TooShort { len: usize, required: usize },

    /// Nothing to fit a scaler on
    #[error("Cannot fit scaler on an empty series")]
    Empty,

    /// Synthetic noise level is negative or not a number
    #[error("Invalid noise_std {value}: must be a finite, non-negative number")]
    InvalidNoise { value: f64 },
}

/// Training-specific errors.
#[derive(Error, Debug)]
pub enum TrainingError {
    /// The chronological split left no training windows
    #[error("Training split is empty ({total} windows, ratio {ratio})")]
    EmptyTrainingSplit { total: usize, ratio: f64 },

    /// Invalid hyperparameter
    #[error("Invalid training parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// Loss blew up
    #[error("Loss diverged to a non-finite value at epoch {epoch}")]
    Diverged { epoch: usize },

    /// Loaded model does not match the expected window size
    #[error("Model expects windows of {expected} values, got {actual}")]
    WindowMismatch { expected: usize, actual: usize },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable at {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for ForecastError
pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
