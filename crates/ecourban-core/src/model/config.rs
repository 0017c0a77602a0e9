//! Model shape configuration.

use serde::{Deserialize, Serialize};

use crate::window::WINDOW_SIZE;

/// Shape of the recurrent regressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Time steps per input window
    pub window_size: usize,
    /// LSTM hidden units
    pub hidden_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            window_size: WINDOW_SIZE,
            hidden_size: 32,
        }
    }
}

impl ModelConfig {
    pub fn new(window_size: usize, hidden_size: usize) -> Self {
        Self {
            window_size,
            hidden_size,
        }
    }

    /// Trainable parameters: LSTM gates plus the dense head.
    pub fn parameter_count(&self) -> usize {
        let h = self.hidden_size;
        4 * (h + h * h + h) + h + 1
    }
}
