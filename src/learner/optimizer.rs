//! Adam optimizer over ndarray parameters

use ndarray::{Array, ArrayD, Dimension, Zip};
use serde::{Deserialize, Serialize};

use super::traits::OptimizerConfig;

/// Adam optimizer
///
/// θ_t = θ_{t-1} - lr_t * m_t / (√v_t + ε), with the bias correction folded
/// into `lr_t = lr * √(1 - β2^t) / (1 - β1^t)`.
///
/// Parameters are addressed by slot index; moments are created lazily on
/// first use and serialized with the model so a reloaded model resumes
/// training where it stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adam {
    config: OptimizerConfig,
    t: u64,
    m: Vec<Option<ArrayD<f32>>>,
    v: Vec<Option<ArrayD<f32>>>,
}

impl Adam {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    pub fn config(&self) -> OptimizerConfig {
        self.config
    }

    pub fn learning_rate(&self) -> f32 {
        self.config.learning_rate
    }

    pub fn step_count(&self) -> u64 {
        self.t
    }

    /// Advance the step counter. Call once per mini-batch before the
    /// per-slot updates.
    pub fn begin_step(&mut self) {
        self.t += 1;
    }

    /// Apply one update to the parameter in `slot`.
    pub fn update<D: Dimension>(&mut self, slot: usize, param: &mut Array<f32, D>, grad: &Array<f32, D>) {
        if self.m.len() <= slot {
            self.m.resize(slot + 1, None);
            self.v.resize(slot + 1, None);
        }
        let shape = grad.shape();
        let m = self.m[slot].get_or_insert_with(|| ArrayD::zeros(shape));
        let v = self.v[slot].get_or_insert_with(|| ArrayD::zeros(shape));
        if m.shape() != shape {
            *m = ArrayD::zeros(shape);
            *v = ArrayD::zeros(shape);
        }

        let OptimizerConfig {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } = self.config;
        let t = self.t.max(1) as i32;
        let lr_t = learning_rate * (1.0 - beta2.powi(t)).sqrt() / (1.0 - beta1.powi(t));

        let grad = grad.view().into_dyn();
        let mut param = param.view_mut().into_dyn();
        Zip::from(&mut param)
            .and(&grad)
            .and(m)
            .and(v)
            .for_each(|p, &g, m, v| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                *p -= lr_t * *m / (v.sqrt() + epsilon);
            });
    }
}
