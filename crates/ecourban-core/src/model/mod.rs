//! Recurrent sequence regressor.
//!
//! - `config` - model shape
//! - `lstm` - LSTM layer, dense head, forward/backward passes
//! - `optimizer` - Adam

mod config;
mod lstm;
mod optimizer;

pub use config::ModelConfig;
pub use lstm::{LstmRegressor, LstmWeights};
pub use optimizer::Adam;
