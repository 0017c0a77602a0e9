//! Sliding windows over a scaled series.

use ndarray::{s, Array1, Array2, ArrayView1};

/// Number of past hourly readings fed to the model.
pub const WINDOW_SIZE: usize = 24;

/// Supervised samples: `inputs[i]` is a window, `targets[i]` the value after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Windows {
    /// [samples, window_size]
    pub inputs: Array2<f64>,
    /// [samples]
    pub targets: Array1<f64>,
}

/// Slice `data` into `len - window_size` (input, label) pairs.
///
/// `input[i] = data[i..i + window_size]`, `label[i] = data[i + window_size]`.
/// No padding or wraparound; a series shorter than `window_size + 1` gives
/// zero samples.
pub fn create_sequences(data: ArrayView1<f64>, window_size: usize) -> Windows {
    let n_samples = data.len().saturating_sub(window_size);
    let mut inputs = Array2::zeros((n_samples, window_size));
    let mut targets = Array1::zeros(n_samples);

    for i in 0..n_samples {
        inputs
            .row_mut(i)
            .assign(&data.slice(s![i..i + window_size]));
        targets[i] = data[i + window_size];
    }

    Windows { inputs, targets }
}

impl Windows {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.inputs.ncols()
    }

    /// Split in time order at `floor(ratio * len)`. Earlier windows come
    /// first; nothing is shuffled.
    pub fn split_chronological(&self, ratio: f64) -> (Windows, Windows) {
        let split = ((self.len() as f64) * ratio.clamp(0.0, 1.0)) as usize;
        let head = Windows {
            inputs: self.inputs.slice(s![..split, ..]).to_owned(),
            targets: self.targets.slice(s![..split]).to_owned(),
        };
        let tail = Windows {
            inputs: self.inputs.slice(s![split.., ..]).to_owned(),
            targets: self.targets.slice(s![split..]).to_owned(),
        };
        (head, tail)
    }

    /// Samples at the given row indices, in that order.
    pub fn select(&self, indices: &[usize]) -> Windows {
        Windows {
            inputs: self.inputs.select(ndarray::Axis(0), indices),
            targets: self.targets.select(ndarray::Axis(0), indices),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn pairs_each_window_with_following_value() {
        let data = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let windows = create_sequences(data.view(), 3);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows.inputs.row(0), array![1.0, 2.0, 3.0]);
        assert_eq!(windows.targets[0], 4.0);
        assert_eq!(windows.inputs.row(1), array![2.0, 3.0, 4.0]);
        assert_eq!(windows.targets[1], 5.0);
    }

    #[test]
    fn short_series_yields_nothing() {
        let data = Array1::from_elem(WINDOW_SIZE, 1.0);
        assert!(create_sequences(data.view(), WINDOW_SIZE).is_empty());
        let data = Array1::<f64>::zeros(3);
        let windows = create_sequences(data.view(), WINDOW_SIZE);
        assert!(windows.is_empty());
        assert_eq!(windows.window_size(), WINDOW_SIZE);
    }

    #[test]
    fn split_keeps_time_order() {
        let data: Array1<f64> = (0..34).map(|v| v as f64).collect();
        let windows = create_sequences(data.view(), WINDOW_SIZE);
        assert_eq!(windows.len(), 10);

        let (train, val) = windows.split_chronological(0.8);
        assert_eq!(train.len(), 8);
        assert_eq!(val.len(), 2);
        assert_eq!(train.targets[7], 31.0);
        assert_eq!(val.targets[0], 32.0);
        assert!(train.targets.iter().all(|t| *t < val.targets[0]));
    }

    #[test]
    fn select_picks_rows() {
        let data: Array1<f64> = (0..30).map(|v| v as f64).collect();
        let windows = create_sequences(data.view(), WINDOW_SIZE);
        let picked = windows.select(&[3, 0]);
        assert_eq!(picked.targets, array![27.0, 24.0]);
        assert_eq!(picked.inputs[[0, 0]], 3.0);
    }

    proptest! {
        #[test]
        fn produces_len_minus_window_samples(len in (WINDOW_SIZE + 1)..400usize) {
            let data: Array1<f64> = (0..len).map(|v| v as f64).collect();
            let windows = create_sequences(data.view(), WINDOW_SIZE);
            prop_assert_eq!(windows.len(), len - WINDOW_SIZE);
            prop_assert_eq!(windows.inputs.ncols(), WINDOW_SIZE);
            let last = windows.len() - 1;
            prop_assert_eq!(windows.targets[last], (len - 1) as f64);
        }
    }
}
