//! Min-max scaling of energy values into [0, 1].
//!
//! The scaler is fit once during training, persisted next to the model and
//! reloaded verbatim for every prediction. A prediction made with a scaler
//! fitted on different data is silently wrong, so nothing here refits.

use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::storage::write_atomic;

/// Fitted min-max normalization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: f64,
    pub max: f64,
}

impl MinMaxScaler {
    /// Fit on a series. Rejects empty and non-finite input.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(DatasetError::Empty.into());
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (row, &v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(DatasetError::NonFinite { row }.into());
            }
            min = min.min(v);
            max = max.max(v);
        }
        Ok(Self { min, max })
    }

    /// Denominator of the affine map. A constant series maps with unit scale.
    fn range(&self) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            1.0
        } else {
            range
        }
    }

    pub fn transform(&self, x: f64) -> f64 {
        (x - self.min) / self.range()
    }

    pub fn inverse_transform(&self, y: f64) -> f64 {
        y * self.range() + self.min
    }

    pub fn transform_all(&self, values: &[f64]) -> Array1<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }

    /// Persist as pretty JSON, overwriting any previous scaler.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, serde_json::to_string_pretty(self)?.as_bytes())?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fit_finds_bounds() {
        let scaler = MinMaxScaler::fit(&[3.0, -1.0, 7.5, 2.0]).unwrap();
        assert_eq!(scaler.min, -1.0);
        assert_eq!(scaler.max, 7.5);
        assert_eq!(scaler.transform(-1.0), 0.0);
        assert_eq!(scaler.transform(7.5), 1.0);
    }

    #[test]
    fn fit_rejects_empty_and_nan() {
        assert!(MinMaxScaler::fit(&[]).is_err());
        assert!(MinMaxScaler::fit(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn out_of_range_extrapolates_without_clamping() {
        let scaler = MinMaxScaler { min: 100.0, max: 200.0 };
        assert!((scaler.transform(250.0) - 1.5).abs() < 1e-12);
        assert!((scaler.transform(50.0) + 0.5).abs() < 1e-12);
        assert!((scaler.inverse_transform(-0.25) - 75.0).abs() < 1e-12);
    }

    #[test]
    fn constant_series_stays_finite() {
        let scaler = MinMaxScaler::fit(&[42.0; 10]).unwrap();
        assert_eq!(scaler.transform(42.0), 0.0);
        assert_eq!(scaler.inverse_transform(0.0), 42.0);
        assert!(scaler.transform(43.0).is_finite());
    }

    #[test]
    fn save_and_load_preserves_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scaler.json");
        let scaler = MinMaxScaler { min: 71.25, max: 139.5 };
        scaler.save(&path).unwrap();
        assert_eq!(MinMaxScaler::load(&path).unwrap(), scaler);
    }

    proptest! {
        #[test]
        fn inverse_undoes_transform_within_training_range(
            lo in -1.0e4f64..1.0e4,
            span in 1.0e-3f64..1.0e4,
            t in 0.0f64..=1.0,
        ) {
            let hi = lo + span;
            let scaler = MinMaxScaler::fit(&[lo, hi]).unwrap();
            let x = lo + t * span;
            prop_assert!((scaler.inverse_transform(scaler.transform(x)) - x).abs() < 1e-6);
            let y = scaler.transform(x);
            prop_assert!((scaler.transform(scaler.inverse_transform(y)) - y).abs() < 1e-6);
        }
    }
}
