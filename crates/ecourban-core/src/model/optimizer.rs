//! Adam optimizer over [`LstmWeights`].

use ndarray::{Array, Dimension, Zip};

use super::lstm::LstmWeights;

/// Adam with bias-corrected moment estimates.
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: i32,
    m: LstmWeights,
    v: LstmWeights,
}

/// Per-step constants shared by every parameter tensor.
struct AdamStep {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    correction1: f64,
    correction2: f64,
}

impl AdamStep {
    fn update(&self, p: &mut f64, g: f64, m: &mut f64, v: &mut f64) {
        *m = self.beta1 * *m + (1.0 - self.beta1) * g;
        *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
        let m_hat = *m / self.correction1;
        let v_hat = *v / self.correction2;
        *p -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
    }

    fn apply<D: Dimension>(
        &self,
        p: &mut Array<f64, D>,
        g: &Array<f64, D>,
        m: &mut Array<f64, D>,
        v: &mut Array<f64, D>,
    ) {
        Zip::from(p)
            .and(g)
            .and(m)
            .and(v)
            .for_each(|p, &g, m, v| self.update(p, g, m, v));
    }
}

impl Adam {
    /// Adam with the usual defaults (beta1 0.9, beta2 0.999, epsilon 1e-7).
    pub fn new(learning_rate: f64, hidden: usize) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            t: 0,
            m: LstmWeights::zeros(hidden),
            v: LstmWeights::zeros(hidden),
        }
    }

    /// Number of updates applied so far.
    pub fn iterations(&self) -> i32 {
        self.t
    }

    /// Apply one update of `grads` to `params`.
    pub fn step(&mut self, params: &mut LstmWeights, grads: &LstmWeights) {
        self.t += 1;
        let step = AdamStep {
            learning_rate: self.learning_rate,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            correction1: 1.0 - self.beta1.powi(self.t),
            correction2: 1.0 - self.beta2.powi(self.t),
        };

        step.apply(&mut params.w_x, &grads.w_x, &mut self.m.w_x, &mut self.v.w_x);
        step.apply(&mut params.w_h, &grads.w_h, &mut self.m.w_h, &mut self.v.w_h);
        step.apply(&mut params.bias, &grads.bias, &mut self.m.bias, &mut self.v.bias);
        step.apply(&mut params.w_out, &grads.w_out, &mut self.m.w_out, &mut self.v.w_out);
        step.update(
            &mut params.b_out,
            grads.b_out,
            &mut self.m.b_out,
            &mut self.v.b_out,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_each_weight_by_learning_rate() {
        let mut params = LstmWeights::zeros(2);
        let mut grads = LstmWeights::zeros(2);
        grads.w_x.fill(0.5);
        grads.w_h[[0, 1]] = -3.0;
        grads.b_out = 2.0;

        let mut adam = Adam::new(0.01, 2);
        adam.step(&mut params, &grads);

        assert_eq!(adam.iterations(), 1);
        // With bias correction the first step is lr * sign(g).
        assert!((params.w_x[0] + 0.01).abs() < 1e-6);
        assert!((params.w_h[[0, 1]] - 0.01).abs() < 1e-6);
        assert!((params.b_out + 0.01).abs() < 1e-6);
        assert_eq!(params.w_h[[0, 0]], 0.0);
    }

    #[test]
    fn minimizes_a_quadratic() {
        let mut params = LstmWeights::zeros(1);
        params.b_out = 5.0;
        let mut adam = Adam::new(0.1, 1);
        for _ in 0..500 {
            let mut grads = LstmWeights::zeros(1);
            grads.b_out = 2.0 * (params.b_out - 1.0);
            adam.step(&mut params, &grads);
        }
        assert!((params.b_out - 1.0).abs() < 0.05, "{}", params.b_out);
    }
}
