//! Training workflow.
//!
//! 1. Load (or synthesize) the dataset
//! 2. Fit the min-max scaler and normalize the `total_energy` column
//! 3. Slice into windows of [`WINDOW_SIZE`] values
//! 4. Split 80/20 in time order
//! 5. Fit the LSTM with Adam on MSE, early stopping on validation loss
//! 6. Save the model and the scaler as two separate artifacts

use std::path::PathBuf;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::{self, SyntheticConfig};
use crate::error::{DatasetError, Result, TrainingError};
use crate::model::{Adam, LstmRegressor, LstmWeights, ModelConfig};
use crate::scaler::MinMaxScaler;
use crate::storage::ArtifactPaths;
use crate::window::{create_sequences, Windows, WINDOW_SIZE};

/// Training hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Epochs without validation improvement before stopping
    #[serde(default = "default_patience")]
    pub patience: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Share of windows (oldest first) used for training
    #[serde(default = "default_train_ratio")]
    pub train_ratio: f64,
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,
    /// Seeds weight init and batch order
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Reshuffle training batches every epoch (the split itself never is)
    #[serde(default = "default_true")]
    pub shuffle: bool,
}

fn default_epochs() -> usize {
    15
}
fn default_batch_size() -> usize {
    32
}
fn default_patience() -> usize {
    3
}
fn default_learning_rate() -> f64 {
    0.001
}
fn default_train_ratio() -> f64 {
    0.8
}
fn default_hidden_size() -> usize {
    32
}
fn default_seed() -> u64 {
    42
}
fn default_true() -> bool {
    true
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            patience: default_patience(),
            learning_rate: default_learning_rate(),
            train_ratio: default_train_ratio(),
            hidden_size: default_hidden_size(),
            seed: default_seed(),
            shuffle: true,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), TrainingError> {
        let invalid = |name: &str, message: &str| TrainingError::InvalidParameter {
            name: name.to_string(),
            message: message.to_string(),
        };
        if self.epochs == 0 {
            return Err(invalid("epochs", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        if self.hidden_size == 0 {
            return Err(invalid("hidden_size", "must be at least 1"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(invalid("learning_rate", "must be a positive number"));
        }
        if !(self.train_ratio > 0.0 && self.train_ratio <= 1.0) {
            return Err(invalid("train_ratio", "must be in (0, 1]"));
        }
        Ok(())
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::new(WINDOW_SIZE, self.hidden_size)
    }
}

/// Losses recorded after one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based
    pub epoch: usize,
    pub loss: f64,
    pub val_loss: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochStats>,
    /// Epoch whose weights were kept
    pub best_epoch: usize,
    pub best_loss: f64,
    pub stopped_early: bool,
}

impl TrainingHistory {
    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.loss)
    }

    pub fn final_val_loss(&self) -> Option<f64> {
        self.epochs.last().and_then(|e| e.val_loss)
    }
}

/// Stops when the monitored loss has not improved for `patience` epochs and
/// remembers the best weights seen.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best: f64,
    best_epoch: usize,
    wait: usize,
    best_weights: Option<LstmWeights>,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best: f64::INFINITY,
            best_epoch: 0,
            wait: 0,
            best_weights: None,
        }
    }

    /// Record an epoch. Returns true when training should stop.
    pub fn observe(&mut self, epoch: usize, monitored: f64, weights: &LstmWeights) -> bool {
        if monitored < self.best {
            self.best = monitored;
            self.best_epoch = epoch;
            self.wait = 0;
            self.best_weights = Some(weights.clone());
            false
        } else {
            self.wait += 1;
            self.wait >= self.patience
        }
    }

    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    pub fn take_best_weights(&mut self) -> Option<LstmWeights> {
        self.best_weights.take()
    }
}

/// Mini-batch trainer.
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Fit `model` on `train`, monitoring `val` (or the training loss when
    /// `val` is empty). The best weights are restored before returning.
    pub fn fit<R: Rng>(
        &self,
        model: &mut LstmRegressor,
        train: &Windows,
        val: &Windows,
        rng: &mut R,
    ) -> Result<TrainingHistory> {
        self.config.validate()?;
        if train.is_empty() {
            return Err(TrainingError::EmptyTrainingSplit {
                total: train.len() + val.len(),
                ratio: self.config.train_ratio,
            }
            .into());
        }
        if train.window_size() != model.config.window_size {
            return Err(TrainingError::WindowMismatch {
                expected: model.config.window_size,
                actual: train.window_size(),
            }
            .into());
        }

        let mut adam = Adam::new(self.config.learning_rate, model.config.hidden_size);
        let mut stopper = EarlyStopping::new(self.config.patience);
        let mut history = TrainingHistory::default();
        let mut order: Vec<usize> = (0..train.len()).collect();

        for epoch in 1..=self.config.epochs {
            if self.config.shuffle {
                order.shuffle(rng);
            }

            let mut weighted_loss = 0.0;
            for chunk in order.chunks(self.config.batch_size) {
                let batch = train.select(chunk);
                let (loss, grads) = model.batch_gradients(&batch);
                adam.step(model.weights_mut(), &grads);
                weighted_loss += loss * chunk.len() as f64;
            }
            let loss = weighted_loss / train.len() as f64;
            let val_loss = (!val.is_empty()).then(|| model.mse(val));

            if !loss.is_finite() || val_loss.is_some_and(|v| !v.is_finite()) {
                return Err(TrainingError::Diverged { epoch }.into());
            }

            info!(epoch, epochs = self.config.epochs, loss, ?val_loss, "epoch finished");
            history.epochs.push(EpochStats {
                epoch,
                loss,
                val_loss,
            });

            if stopper.observe(epoch, val_loss.unwrap_or(loss), model.weights()) {
                info!(epoch, best_epoch = stopper.best_epoch(), "early stopping");
                history.stopped_early = true;
                break;
            }
        }

        if let Some(best) = stopper.take_best_weights() {
            debug!(best_epoch = stopper.best_epoch(), "restoring best weights");
            model.set_weights(best);
        }
        history.best_epoch = stopper.best_epoch();
        history.best_loss = stopper.best();
        Ok(history)
    }
}

/// Model and scaler fitted on one series.
#[derive(Debug, Clone)]
pub struct TrainedForecaster {
    pub model: LstmRegressor,
    pub scaler: MinMaxScaler,
    pub history: TrainingHistory,
    pub train_samples: usize,
    pub val_samples: usize,
}

/// Scale, window, split and fit on a raw series.
pub fn fit_series(values: &[f64], config: &TrainingConfig) -> Result<TrainedForecaster> {
    config.validate()?;
    if values.len() < WINDOW_SIZE + 1 {
        return Err(DatasetError::TooShort {
            len: values.len(),
            required: WINDOW_SIZE + 1,
        }
        .into());
    }

    let scaler = MinMaxScaler::fit(values)?;
    let scaled = scaler.transform_all(values);
    info!(min = scaler.min, max = scaler.max, "data normalized");

    let windows = create_sequences(scaled.view(), WINDOW_SIZE);
    info!(sequences = windows.len(), window = WINDOW_SIZE, "created sequences");

    let (train, val) = windows.split_chronological(config.train_ratio);
    if train.is_empty() {
        return Err(TrainingError::EmptyTrainingSplit {
            total: windows.len(),
            ratio: config.train_ratio,
        }
        .into());
    }

    let mut rng = Mcg128Xsl64::seed_from_u64(config.seed);
    let model_config = config.model_config();
    let mut model = LstmRegressor::new(model_config, &mut rng);
    info!(
        hidden = model_config.hidden_size,
        parameters = model_config.parameter_count(),
        train = train.len(),
        val = val.len(),
        "training LSTM"
    );

    let history = Trainer::new(config.clone()).fit(&mut model, &train, &val, &mut rng)?;

    Ok(TrainedForecaster {
        model,
        scaler,
        history,
        train_samples: train.len(),
        val_samples: val.len(),
    })
}

/// Outcome of a full training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub rows: usize,
    pub train_samples: usize,
    pub val_samples: usize,
    pub history: TrainingHistory,
    pub scaler: MinMaxScaler,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

/// Run the whole workflow and overwrite both artifacts.
pub fn train_and_save(
    paths: &ArtifactPaths,
    training: &TrainingConfig,
    synthetic: &SyntheticConfig,
) -> Result<TrainingReport> {
    let series = dataset::load_or_create(&paths.dataset, synthetic)?;
    let trained = fit_series(&series.values(), training)?;

    info!(
        final_loss = ?trained.history.final_loss(),
        final_val_loss = ?trained.history.final_val_loss(),
        "training finished"
    );

    // Model lands last so the pair switches over on its rename
    trained.scaler.save(&paths.scaler)?;
    info!(path = %paths.scaler.display(), "scaler saved");
    trained.model.save(&paths.model)?;
    info!(path = %paths.model.display(), "model saved");

    Ok(TrainingReport {
        rows: series.len(),
        train_samples: trained.train_samples,
        val_samples: trained.val_samples,
        history: trained.history,
        scaler: trained.scaler,
        model_path: paths.model.clone(),
        scaler_path: paths.scaler.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_config() -> TrainingConfig {
        TrainingConfig {
            epochs: 3,
            batch_size: 16,
            hidden_size: 4,
            learning_rate: 0.01,
            ..Default::default()
        }
    }

    fn wave(len: usize) -> Vec<f64> {
        (0..len)
            .map(|h| 100.0 + 20.0 * (2.0 * std::f64::consts::PI * h as f64 / 24.0).sin())
            .collect()
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let bad = [
            TrainingConfig { epochs: 0, ..Default::default() },
            TrainingConfig { batch_size: 0, ..Default::default() },
            TrainingConfig { hidden_size: 0, ..Default::default() },
            TrainingConfig { learning_rate: -1.0, ..Default::default() },
            TrainingConfig { train_ratio: 0.0, ..Default::default() },
            TrainingConfig { train_ratio: 1.5, ..Default::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?}");
        }
        assert!(TrainingConfig::default().validate().is_ok());
    }

    #[test]
    fn early_stopping_waits_for_patience() {
        let weights = LstmWeights::zeros(1);
        let mut stopper = EarlyStopping::new(2);
        assert!(!stopper.observe(1, 0.5, &weights));
        assert!(!stopper.observe(2, 0.4, &weights));
        assert!(!stopper.observe(3, 0.45, &weights));
        assert!(stopper.observe(4, 0.41, &weights));
        assert_eq!(stopper.best_epoch(), 2);
        assert_eq!(stopper.best(), 0.4);
        assert!(stopper.take_best_weights().is_some());
    }

    #[test]
    fn rejects_series_too_short_for_a_window() {
        let err = fit_series(&wave(WINDOW_SIZE), &tiny_config()).unwrap_err();
        assert!(matches!(
            err,
            crate::ForecastError::Dataset(DatasetError::TooShort { .. })
        ));
    }

    #[test]
    fn rejects_split_without_training_windows() {
        // One window: floor(0.8 * 1) == 0
        let err = fit_series(&wave(WINDOW_SIZE + 1), &tiny_config()).unwrap_err();
        assert!(matches!(
            err,
            crate::ForecastError::Training(TrainingError::EmptyTrainingSplit { .. })
        ));
    }

    #[test]
    fn fit_series_reports_split_and_history() {
        let values = wave(24 * 5);
        let trained = fit_series(&values, &tiny_config()).unwrap();

        // 96 windows -> 76 train / 20 validation
        assert_eq!(trained.train_samples, 76);
        assert_eq!(trained.val_samples, 20);
        assert!(!trained.history.epochs.is_empty());
        assert!(trained.history.epochs.len() <= 3);
        assert!(trained.history.final_val_loss().is_some());
        assert!(trained.history.best_epoch >= 1);
        assert_eq!(trained.scaler.min, values.iter().cloned().fold(f64::INFINITY, f64::min));
    }

    #[test]
    fn training_is_reproducible_with_same_seed() {
        let values = wave(24 * 3);
        let a = fit_series(&values, &tiny_config()).unwrap();
        let b = fit_series(&values, &tiny_config()).unwrap();
        assert_eq!(a.model, b.model);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn training_reduces_loss_on_a_clean_wave() {
        let values = wave(24 * 8);
        let config = TrainingConfig {
            epochs: 8,
            batch_size: 8,
            hidden_size: 6,
            learning_rate: 0.01,
            patience: 8,
            ..Default::default()
        };
        let trained = fit_series(&values, &config).unwrap();
        let epochs = &trained.history.epochs;
        assert!(epochs.last().unwrap().loss < epochs[0].loss);
    }

    #[test]
    fn empty_validation_monitors_training_loss() {
        let values = wave(60);
        let scaler = MinMaxScaler::fit(&values).unwrap();
        let windows = create_sequences(scaler.transform_all(&values).view(), WINDOW_SIZE);
        let empty = windows.split_chronological(1.0).1;
        assert!(empty.is_empty());

        let config = tiny_config();
        let mut rng = Mcg128Xsl64::seed_from_u64(1);
        let mut model = LstmRegressor::new(config.model_config(), &mut rng);
        let history = Trainer::new(config)
            .fit(&mut model, &windows, &empty, &mut rng)
            .unwrap();
        assert!(history.epochs.iter().all(|e| e.val_loss.is_none()));
        assert!(history.best_loss.is_finite());
    }
}
