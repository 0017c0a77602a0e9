//! Next-hour prediction from the persisted artifacts.
//!
//! [`Predictor`] is a loaded model + scaler pair. [`ModelStore`] owns the one
//! shared predictor of a long-running process: it loads lazily, reloads when
//! either artifact file changes on disk and forgets the cached pair when the
//! artifacts disappear.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::error::{ForecastError, Result, TrainingError};
use crate::model::LstmRegressor;
use crate::scaler::MinMaxScaler;
use crate::storage::ArtifactPaths;
use crate::window::WINDOW_SIZE;

fn check_input_len(values: &[f64]) -> Result<()> {
    if values.len() != WINDOW_SIZE {
        return Err(ForecastError::InputSize {
            expected: WINDOW_SIZE,
            actual: values.len(),
        });
    }
    Ok(())
}

fn artifact_missing(paths: &ArtifactPaths) -> ForecastError {
    ForecastError::ArtifactMissing {
        model: paths.model.clone(),
        scaler: paths.scaler.clone(),
    }
}

/// Trained model with the scaler it was trained against.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: LstmRegressor,
    scaler: MinMaxScaler,
}

impl Predictor {
    pub fn new(model: LstmRegressor, scaler: MinMaxScaler) -> Result<Self> {
        if model.config.window_size != WINDOW_SIZE {
            return Err(TrainingError::WindowMismatch {
                expected: WINDOW_SIZE,
                actual: model.config.window_size,
            }
            .into());
        }
        Ok(Self { model, scaler })
    }

    /// Load both artifacts.
    ///
    /// # Errors
    /// [`ForecastError::ArtifactMissing`] if either file is absent.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        if !paths.artifacts_exist() {
            return Err(artifact_missing(paths));
        }
        let model = LstmRegressor::load(&paths.model)?;
        let scaler = MinMaxScaler::load(&paths.scaler)?;
        info!(
            model = %paths.model.display(),
            hidden = model.config.hidden_size,
            "model loaded"
        );
        Self::new(model, scaler)
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn model(&self) -> &LstmRegressor {
        &self.model
    }

    /// Predict the value following `values` (exactly [`WINDOW_SIZE`] raw
    /// readings, oldest first).
    pub fn predict(&self, values: &[f64]) -> Result<f64> {
        check_input_len(values)?;
        let scaled = self.scaler.transform_all(values);
        let next = self.model.predict(scaled.view());
        let predicted = self.scaler.inverse_transform(next);
        if !predicted.is_finite() {
            return Err(ForecastError::Custom(format!(
                "model produced a non-finite prediction ({predicted})"
            )));
        }
        Ok(predicted)
    }
}

/// One-shot prediction: validate, load, predict.
///
/// The input length is checked before any file is touched.
pub fn predict_next_energy(paths: &ArtifactPaths, values: &[f64]) -> Result<f64> {
    check_input_len(values)?;
    Predictor::load(paths)?.predict(values)
}

/// Modification times identifying one version of the artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArtifactStamp {
    model: Option<SystemTime>,
    scaler: Option<SystemTime>,
}

impl ArtifactStamp {
    fn read(paths: &ArtifactPaths) -> Self {
        fn modified(path: &Path) -> Option<SystemTime> {
            std::fs::metadata(path).and_then(|m| m.modified()).ok()
        }
        Self {
            model: modified(&paths.model),
            scaler: modified(&paths.scaler),
        }
    }
}

#[derive(Debug)]
struct Cached {
    predictor: Arc<Predictor>,
    stamp: ArtifactStamp,
}

/// Shared, lazily loaded predictor.
#[derive(Debug)]
pub struct ModelStore {
    paths: ArtifactPaths,
    cached: RwLock<Option<Cached>>,
}

impl ModelStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            cached: RwLock::new(None),
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// A predictor is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Load now instead of on the first request.
    pub fn preload(&self) -> Result<()> {
        self.get_or_load().map(|_| ())
    }

    /// Current predictor, loading or reloading from disk when needed.
    pub fn get_or_load(&self) -> Result<Arc<Predictor>> {
        if !self.paths.artifacts_exist() {
            let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
            if cached.take().is_some() {
                info!("artifacts removed, dropping cached model");
            }
            return Err(artifact_missing(&self.paths));
        }

        let stamp = ArtifactStamp::read(&self.paths);
        {
            let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(c) = cached.as_ref().filter(|c| c.stamp == stamp) {
                return Ok(Arc::clone(&c.predictor));
            }
        }

        let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded the same version meanwhile
        if let Some(c) = cached.as_ref().filter(|c| c.stamp == stamp) {
            return Ok(Arc::clone(&c.predictor));
        }
        if cached.is_some() {
            debug!("artifacts changed on disk, reloading");
        }
        let predictor = Arc::new(Predictor::load(&self.paths)?);
        *cached = Some(Cached {
            predictor: Arc::clone(&predictor),
            stamp,
        });
        Ok(predictor)
    }

    /// Validate `values`, then predict with the cached model.
    pub fn predict(&self, values: &[f64]) -> Result<f64> {
        check_input_len(values)?;
        self.get_or_load()?.predict(values)
    }
}
