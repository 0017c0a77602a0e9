//! Single-layer LSTM with a dense output head.
//!
//! Each window is fed one scalar per time step. The final hidden state goes
//! through a linear layer that produces the next scaled value. Gradients
//! are computed with full backpropagation through time.

use std::path::Path;

use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::ModelConfig;
use crate::error::{ForecastError, Result};
use crate::storage::write_atomic;
use crate::window::Windows;

/// All trainable parameters. Gate blocks are stacked in the order
/// input, forget, cell candidate, output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmWeights {
    /// input -> gates [4 * hidden]
    pub w_x: Array1<f64>,
    /// hidden -> gates [4 * hidden, hidden]
    pub w_h: Array2<f64>,
    /// gate bias [4 * hidden]
    pub bias: Array1<f64>,
    /// dense head [hidden]
    pub w_out: Array1<f64>,
    pub b_out: f64,
}

impl LstmWeights {
    pub fn zeros(hidden: usize) -> Self {
        Self {
            w_x: Array1::zeros(4 * hidden),
            w_h: Array2::zeros((4 * hidden, hidden)),
            bias: Array1::zeros(4 * hidden),
            w_out: Array1::zeros(hidden),
            b_out: 0.0,
        }
    }

    /// Glorot-uniform weights, zero bias except a forget-gate bias of one.
    pub fn init<R: Rng>(hidden: usize, rng: &mut R) -> Self {
        let glorot = |fan_in: usize, fan_out: usize| {
            let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
            Uniform::new(-limit, limit)
        };

        let mut bias: Array1<f64> = Array1::zeros(4 * hidden);
        bias.slice_mut(s![hidden..2 * hidden]).fill(1.0);

        Self {
            w_x: Array1::random_using(4 * hidden, glorot(1, 4 * hidden), rng),
            w_h: Array2::random_using((4 * hidden, hidden), glorot(hidden, 4 * hidden), rng),
            bias,
            w_out: Array1::random_using(hidden, glorot(hidden, 1), rng),
            b_out: 0.0,
        }
    }

    fn hidden(&self) -> usize {
        self.w_out.len()
    }

    fn check_shapes(&self, hidden: usize) -> Result<()> {
        let ok = self.w_x.len() == 4 * hidden
            && self.w_h.dim() == (4 * hidden, hidden)
            && self.bias.len() == 4 * hidden
            && self.w_out.len() == hidden;
        if ok {
            Ok(())
        } else {
            Err(ForecastError::Custom(format!(
                "model weights do not match hidden size {hidden}"
            )))
        }
    }
}

/// Activations kept from the forward pass for one time step.
struct StepCache {
    x: f64,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    i: Array1<f64>,
    f: Array1<f64>,
    g: Array1<f64>,
    o: Array1<f64>,
    c: Array1<f64>,
}

/// LSTM sequence regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmRegressor {
    pub config: ModelConfig,
    weights: LstmWeights,
}

impl LstmRegressor {
    /// New model with weights drawn from `rng`.
    pub fn new<R: Rng>(config: ModelConfig, rng: &mut R) -> Self {
        Self {
            config,
            weights: LstmWeights::init(config.hidden_size, rng),
        }
    }

    pub fn weights(&self) -> &LstmWeights {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut LstmWeights {
        &mut self.weights
    }

    pub fn set_weights(&mut self, weights: LstmWeights) {
        self.weights = weights;
    }

    fn gates(
        &self,
        x: f64,
        h_prev: &Array1<f64>,
    ) -> (Array1<f64>, Array1<f64>, Array1<f64>, Array1<f64>) {
        let n = self.weights.hidden();
        let z = &self.weights.w_x * x + self.weights.w_h.dot(h_prev) + &self.weights.bias;
        (
            z.slice(s![0..n]).mapv(sigmoid),
            z.slice(s![n..2 * n]).mapv(sigmoid),
            z.slice(s![2 * n..3 * n]).mapv(f64::tanh),
            z.slice(s![3 * n..]).mapv(sigmoid),
        )
    }

    /// Predict the scaled value following `window`.
    pub fn predict(&self, window: ArrayView1<f64>) -> f64 {
        let n = self.weights.hidden();
        let mut h: Array1<f64> = Array1::zeros(n);
        let mut c: Array1<f64> = Array1::zeros(n);
        for &x in window.iter() {
            let (i, f, g, o) = self.gates(x, &h);
            c = &f * &c + &i * &g;
            h = &o * &c.mapv(f64::tanh);
        }
        self.weights.w_out.dot(&h) + self.weights.b_out
    }

    /// Predict every row of `inputs`.
    pub fn predict_batch(&self, inputs: &Array2<f64>) -> Array1<f64> {
        inputs
            .axis_iter(Axis(0))
            .map(|row| self.predict(row))
            .collect()
    }

    /// Mean squared error over `windows` (0 for an empty set).
    pub fn mse(&self, windows: &Windows) -> f64 {
        if windows.is_empty() {
            return 0.0;
        }
        let predictions = self.predict_batch(&windows.inputs);
        let diff = predictions - &windows.targets;
        diff.mapv(|d| d * d).mean().unwrap_or(0.0)
    }

    fn forward_cached(&self, window: ArrayView1<f64>) -> (f64, Vec<StepCache>, Array1<f64>) {
        let n = self.weights.hidden();
        let mut h: Array1<f64> = Array1::zeros(n);
        let mut c: Array1<f64> = Array1::zeros(n);
        let mut steps = Vec::with_capacity(window.len());

        for &x in window.iter() {
            let (i, f, g, o) = self.gates(x, &h);
            let c_next = &f * &c + &i * &g;
            let h_next = &o * &c_next.mapv(f64::tanh);
            steps.push(StepCache {
                x,
                h_prev: std::mem::replace(&mut h, h_next),
                c_prev: std::mem::replace(&mut c, c_next.clone()),
                i,
                f,
                g,
                o,
                c: c_next,
            });
        }

        let y = self.weights.w_out.dot(&h) + self.weights.b_out;
        (y, steps, h)
    }

    /// Accumulate into `grads` the gradient of the output given `d_y`.
    fn backward(
        &self,
        steps: &[StepCache],
        h_last: &Array1<f64>,
        d_y: f64,
        grads: &mut LstmWeights,
    ) {
        let n = self.weights.hidden();
        grads.w_out.scaled_add(d_y, h_last);
        grads.b_out += d_y;

        let mut dh = &self.weights.w_out * d_y;
        let mut dc_next: Array1<f64> = Array1::zeros(n);
        let mut dz: Array1<f64> = Array1::zeros(4 * n);

        for step in steps.iter().rev() {
            let tanh_c = step.c.mapv(f64::tanh);
            let d_o = &dh * &tanh_c;
            let dc = &dc_next + &(&dh * &step.o * &tanh_c.mapv(|t| 1.0 - t * t));

            dz.slice_mut(s![0..n])
                .assign(&(&dc * &step.g * &step.i.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![n..2 * n])
                .assign(&(&dc * &step.c_prev * &step.f.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![2 * n..3 * n])
                .assign(&(&dc * &step.i * &step.g.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![3 * n..])
                .assign(&(&d_o * &step.o.mapv(|v| v * (1.0 - v))));

            dc_next = &dc * &step.f;

            grads.w_x.scaled_add(step.x, &dz);
            grads.bias += &dz;
            let outer = dz
                .view()
                .insert_axis(Axis(1))
                .dot(&step.h_prev.view().insert_axis(Axis(0)));
            grads.w_h += &outer;

            dh = self.weights.w_h.t().dot(&dz);
        }
    }

    /// MSE loss of a mini-batch and its gradient with respect to all weights.
    pub fn batch_gradients(&self, batch: &Windows) -> (f64, LstmWeights) {
        let mut grads = LstmWeights::zeros(self.weights.hidden());
        let len = batch.len();
        if len == 0 {
            return (0.0, grads);
        }

        let mut loss = 0.0;
        for (row, &target) in batch.inputs.axis_iter(Axis(0)).zip(batch.targets.iter()) {
            let (y, steps, h_last) = self.forward_cached(row);
            let err = y - target;
            loss += err * err;
            self.backward(&steps, &h_last, 2.0 * err / len as f64, &mut grads);
        }

        (loss / len as f64, grads)
    }

    /// Persist as JSON, overwriting any previous model.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, serde_json::to_string(self)?.as_bytes())?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&content)?;
        model.weights.check_shapes(model.config.hidden_size)?;
        Ok(model)
    }
}

fn sigmoid(v: f64) -> f64 {
    1.0 / (1.0 + (-v).exp())
}
