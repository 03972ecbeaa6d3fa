//! Feed-forward sequence classifier

use std::time::Instant;

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::history::History;
use super::optimizer::Adam;
use super::traits::{Evaluation, FitOptions, InputShape, Learner, OptimizerConfig};
use crate::corpus::{Dataset, NUM_CLASSES};
use crate::train::callback::{CallbackAction, CallbackContext, CallbackManager};
use crate::{Error, Result};

const PROB_CLAMP: f32 = 1e-7;

/// Hyperparameters that fully determine an untrained [`SequenceClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Architecture {
    pub seq_len: usize,
    pub vocab_size: usize,
    pub hidden_units: usize,
    /// Fraction of hidden activations zeroed during training
    pub dropout: f32,
    /// L2 penalty on the hidden kernel
    pub l2: f32,
    pub learning_rate: f32,
    /// Seeds weight initialization and the per-fit shuffle
    pub seed: u64,
}

impl Default for Architecture {
    fn default() -> Self {
        Self {
            seq_len: 16,
            vocab_size: 5,
            hidden_units: 64,
            dropout: 0.2,
            l2: 1e-4,
            learning_rate: 1e-3,
            seed: 42,
        }
    }
}

impl Architecture {
    pub fn validate(&self) -> Result<()> {
        if self.seq_len == 0 || self.vocab_size == 0 || self.hidden_units == 0 {
            return Err(Error::Validation(format!(
                "architecture dimensions must be positive: seq_len={}, vocab_size={}, hidden_units={}",
                self.seq_len, self.vocab_size, self.hidden_units
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(Error::Validation(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        if !(self.l2 >= 0.0 && self.l2.is_finite()) {
            return Err(Error::Validation(format!("l2 must be non-negative, got {}", self.l2)));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(Error::Validation(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Build an untrained classifier. Same architecture, same weights.
    pub fn build(&self) -> Result<SequenceClassifier> {
        self.validate()?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let inputs = self.seq_len * self.vocab_size;
        Ok(SequenceClassifier {
            w1: glorot_uniform(&mut rng, inputs, self.hidden_units),
            b1: Array1::zeros(self.hidden_units),
            w2: glorot_uniform(&mut rng, self.hidden_units, NUM_CLASSES),
            b2: Array1::zeros(NUM_CLASSES),
            optimizer: Adam::new(OptimizerConfig::adam(self.learning_rate)),
            fits: 0,
            architecture: self.clone(),
        })
    }
}

fn glorot_uniform(rng: &mut StdRng, fan_in: usize, fan_out: usize) -> Array2<f32> {
    let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
    Array2::from_shape_fn((fan_in, fan_out), |_| rng.random_range(-limit..limit))
}

/// Token ids → per-position one-hot → dense ReLU (dropout, L2) → softmax.
///
/// The one-hot expansion is never materialized: the hidden pre-activation
/// of a row is the sum of one kernel row per position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceClassifier {
    architecture: Architecture,
    w1: Array2<f32>,
    b1: Array1<f32>,
    w2: Array2<f32>,
    b2: Array1<f32>,
    optimizer: Adam,
    /// Completed fit calls; varies the shuffle between fits
    fits: u64,
}

struct BatchOutcome {
    loss: f32,
    correct: usize,
}

impl SequenceClassifier {
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    pub fn optimizer(&self) -> &Adam {
        &self.optimizer
    }

    fn kernel_row(&self, position: usize, token: f32) -> usize {
        position * self.architecture.vocab_size + token as usize
    }

    fn hidden_pre(&self, x: ArrayView2<'_, f32>) -> Array2<f32> {
        let mut pre = Array2::zeros((x.nrows(), self.architecture.hidden_units));
        for (row, mut out) in x.rows().into_iter().zip(pre.rows_mut()) {
            out.assign(&self.b1);
            for (p, &token) in row.iter().enumerate() {
                out.scaled_add(1.0, &self.w1.row(self.kernel_row(p, token)));
            }
        }
        pre
    }

    fn probabilities(&self, x: ArrayView2<'_, f32>) -> Array2<f32> {
        let hidden = self.hidden_pre(x).mapv(|v| v.max(0.0));
        softmax(hidden.dot(&self.w2) + &self.b2)
    }

    fn penalty(&self) -> f32 {
        self.architecture.l2 * self.w1.iter().map(|w| w * w).sum::<f32>()
    }

    fn score(&self, data: &Dataset) -> Evaluation {
        let probs = self.probabilities(data.features().view());
        let labels = data.labels().view();
        Evaluation {
            loss: cross_entropy(&probs, labels) + self.penalty(),
            accuracy: correct(&probs, labels) as f32 / data.len().max(1) as f32,
        }
    }

    fn train_batch(
        &mut self,
        x: ArrayView2<'_, f32>,
        y: ArrayView2<'_, f32>,
        rng: &mut StdRng,
    ) -> BatchOutcome {
        let n = x.nrows() as f32;
        let pre = self.hidden_pre(x);
        let relu = pre.mapv(|v| v.max(0.0));
        let keep = 1.0 - self.architecture.dropout;
        let mask = if self.architecture.dropout > 0.0 {
            Array2::from_shape_fn(relu.dim(), |_| {
                if rng.random::<f32>() < keep {
                    1.0 / keep
                } else {
                    0.0
                }
            })
        } else {
            Array2::ones(relu.dim())
        };
        let hidden = &relu * &mask;
        let probs = softmax(hidden.dot(&self.w2) + &self.b2);
        let outcome = BatchOutcome {
            loss: cross_entropy(&probs, y) + self.penalty(),
            correct: correct(&probs, y),
        };

        let dlogits = (&probs - &y) / n;
        let gw2 = hidden.t().dot(&dlogits);
        let gb2 = dlogits.sum_axis(Axis(0));
        let dpre = dlogits.dot(&self.w2.t()) * &mask * &pre.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
        let mut gw1 = &self.w1 * (2.0 * self.architecture.l2);
        for (row, grad) in x.rows().into_iter().zip(dpre.rows()) {
            for (p, &token) in row.iter().enumerate() {
                let r = self.kernel_row(p, token);
                gw1.row_mut(r).scaled_add(1.0, &grad);
            }
        }
        let gb1 = dpre.sum_axis(Axis(0));

        self.optimizer.begin_step();
        self.optimizer.update(0, &mut self.w1, &gw1);
        self.optimizer.update(1, &mut self.b1, &gb1);
        self.optimizer.update(2, &mut self.w2, &gw2);
        self.optimizer.update(3, &mut self.b2, &gb2);
        outcome
    }
}

impl Learner for SequenceClassifier {
    fn input_shape(&self) -> InputShape {
        InputShape::new(self.architecture.seq_len, self.architecture.vocab_size)
    }

    fn compile(&mut self, optimizer: OptimizerConfig) {
        self.optimizer = Adam::new(optimizer);
    }

    fn fit(
        &mut self,
        data: &Dataset,
        options: &FitOptions<'_>,
        callbacks: &mut CallbackManager,
    ) -> Result<History> {
        let (train, val) = options.partition(data)?;
        let shape = self.input_shape();
        shape.check(train.features())?;
        if let Some(val) = &val {
            shape.check(val.features())?;
        }

        self.fits += 1;
        let mut rng = StdRng::seed_from_u64(
            self.architecture
                .seed
                .wrapping_add(self.fits.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        );
        let rows = train.len();
        let started = Instant::now();
        let mut ctx = CallbackContext {
            max_epochs: options.epochs,
            steps_per_epoch: rows.div_ceil(options.batch_size),
            lr: self.optimizer.learning_rate(),
            ..Default::default()
        };
        let mut history = History::new();

        if callbacks.on_train_begin(&ctx) == CallbackAction::Stop {
            callbacks.on_train_end(&ctx);
            return Ok(history);
        }
        for epoch in 0..options.epochs {
            ctx.epoch = epoch;
            if callbacks.on_epoch_begin(&ctx) == CallbackAction::Stop {
                break;
            }
            let mut order: Vec<usize> = (0..rows).collect();
            order.shuffle(&mut rng);
            let (mut loss_sum, mut hits, mut seen) = (0.0_f32, 0_usize, 0_usize);
            let mut stop = false;
            for (step, batch) in order.chunks(options.batch_size).enumerate() {
                let x = train.features().select(Axis(0), batch);
                let y = train.labels().select(Axis(0), batch);
                let outcome = self.train_batch(x.view(), y.view(), &mut rng);
                if !outcome.loss.is_finite() {
                    return Err(Error::training(
                        format!("epoch {}", epoch + 1),
                        format!("loss diverged to {}", outcome.loss),
                    ));
                }
                loss_sum += outcome.loss * batch.len() as f32;
                hits += outcome.correct;
                seen += batch.len();
                ctx.step = step + 1;
                ctx.loss = loss_sum / seen as f32;
                ctx.accuracy = hits as f32 / seen as f32;
                stop |= callbacks.on_step_end(&ctx) == CallbackAction::Stop;
            }

            let validation = val.as_ref().map(|v| {
                let e = self.score(v);
                (e.loss, e.accuracy)
            });
            ctx.val_loss = validation.map(|(loss, _)| loss);
            ctx.val_accuracy = validation.map(|(_, acc)| acc);
            ctx.elapsed_secs = started.elapsed().as_secs_f64();
            history.push_epoch(ctx.loss, ctx.accuracy, validation);
            if callbacks.on_epoch_end(&ctx) == CallbackAction::Stop || stop {
                break;
            }
        }
        callbacks.on_train_end(&ctx);
        Ok(history)
    }

    fn evaluate(&self, data: &Dataset) -> Result<Evaluation> {
        if data.is_empty() {
            return Err(Error::Validation("cannot evaluate on an empty dataset".into()));
        }
        self.input_shape().check(data.features())?;
        Ok(self.score(data))
    }

    fn predict(&self, features: &Array2<f32>) -> Result<Array2<f32>> {
        self.input_shape().check(features)?;
        Ok(self.probabilities(features.view()))
    }
}

fn softmax(mut logits: Array2<f32>) -> Array2<f32> {
    for mut row in logits.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row /= sum;
    }
    logits
}

fn cross_entropy(probs: &Array2<f32>, labels: ArrayView2<'_, f32>) -> f32 {
    if probs.nrows() == 0 {
        return 0.0;
    }
    let total: f32 = probs
        .iter()
        .zip(labels.iter())
        .map(|(&p, &y)| -y * p.clamp(PROB_CLAMP, 1.0 - PROB_CLAMP).ln())
        .sum();
    total / probs.nrows() as f32
}

fn argmax(row: ndarray::ArrayView1<'_, f32>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

fn correct(probs: &Array2<f32>, labels: ArrayView2<'_, f32>) -> usize {
    probs
        .rows()
        .into_iter()
        .zip(labels.rows())
        .filter(|(p, y)| argmax(*p) == argmax(*y))
        .count()
}
