//! # EcoUrban Core Library
//!
//! Core logic for the EcoUrban hourly energy forecaster: given the last 24
//! hourly readings of a building's total energy use, predict the next hour.
//! The CLI binary and the HTTP server are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Dataset**: hourly CSV series, generated synthetically when absent
//! - **Scaling & windowing**: min-max scaler and 24-step sliding windows
//! - **Model**: single-layer LSTM with a dense head, trained with Adam
//! - **Training**: chronological split, early stopping, artifact persistence
//! - **Prediction**: validated one-shot prediction and a shared [`ModelStore`]
//! - **Storage**: data directory resolution and TOML configuration
//!
//! ## Key Components
//!
//! - [`train_and_save`]: Full training workflow
//! - [`predict_next_energy`]: One-shot prediction from the artifacts on disk
//! - [`ModelStore`]: Lazily loaded predictor for long-running processes
//! - [`Config`]: Application configuration management

pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod predict;
pub mod scaler;
pub mod storage;
pub mod training;
pub mod window;

pub use dataset::{generate_synthetic, load_or_create, EnergyReading, EnergySeries, SyntheticConfig};
pub use error::{ConfigError, DatasetError, ErrorKind, ForecastError, Result, TrainingError};
pub use evaluate::{evaluate, render_ascii_chart, EvaluationReport};
pub use model::{LstmRegressor, ModelConfig};
pub use predict::{predict_next_energy, ModelStore, Predictor};
pub use scaler::MinMaxScaler;
pub use storage::{data_dir, ArtifactPaths, Config, PathsConfig, ServerConfig};
pub use training::{fit_series, train_and_save, TrainingConfig, TrainingHistory, TrainingReport};
pub use window::{create_sequences, Windows, WINDOW_SIZE};
