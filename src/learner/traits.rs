//! The trainable-artifact contract consumed by the orchestration layer.

use std::borrow::Cow;

use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::history::History;
use crate::corpus::Dataset;
use crate::train::callback::CallbackManager;
use crate::{Error, Result};

/// Expected shape of a feature matrix: `seq_len` columns of token ids in
/// `0..vocab_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputShape {
    pub seq_len: usize,
    pub vocab_size: usize,
}

impl InputShape {
    pub fn new(seq_len: usize, vocab_size: usize) -> Self {
        Self {
            seq_len,
            vocab_size,
        }
    }

    /// Reject matrices with the wrong width or with cells that are not
    /// token ids of this vocabulary.
    pub fn check(&self, features: &Array2<f32>) -> Result<()> {
        if features.ncols() != self.seq_len {
            return Err(Error::Validation(format!(
                "input has {} columns, model expects {}",
                features.ncols(),
                self.seq_len
            )));
        }
        let vocab = self.vocab_size as f32;
        if let Some(bad) = features
            .iter()
            .find(|&&v| !(v.is_finite() && v >= 0.0 && v < vocab && v.fract() == 0.0))
        {
            return Err(Error::Validation(format!(
                "input value {bad} is not a token id below {}",
                self.vocab_size
            )));
        }
        Ok(())
    }
}

/// Adam settings applied by [`Learner::compile`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl OptimizerConfig {
    /// Adam with the usual moment decay rates.
    pub fn adam(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::adam(1e-3)
    }
}

/// Where a fit gets its validation data.
#[derive(Debug, Clone, Copy, Default)]
pub enum Validation<'a> {
    /// No validation; `val_*` metrics stay empty.
    #[default]
    None,
    /// Hold out the trailing fraction of the training rows.
    Split(f32),
    /// Validate on an explicit held-out set.
    Holdout(&'a Dataset),
}

/// Per-call fit settings.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions<'a> {
    pub epochs: usize,
    pub batch_size: usize,
    pub validation: Validation<'a>,
}

impl<'a> FitOptions<'a> {
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        Self {
            epochs,
            batch_size,
            validation: Validation::None,
        }
    }

    #[must_use]
    pub fn with_validation(mut self, validation: Validation<'a>) -> Self {
        self.validation = validation;
        self
    }

    /// Split `data` into the rows to train on and the optional validation set.
    pub fn partition<'d>(
        &self,
        data: &'d Dataset,
    ) -> Result<(Cow<'d, Dataset>, Option<Cow<'d, Dataset>>)>
    where
        'a: 'd,
    {
        if self.epochs == 0 {
            return Err(Error::Validation("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Validation("batch size must be at least 1".into()));
        }
        if data.is_empty() {
            return Err(Error::Validation("cannot fit on an empty dataset".into()));
        }
        match self.validation {
            Validation::None => Ok((Cow::Borrowed(data), None)),
            Validation::Split(fraction) => {
                let (train, val) = data.split_tail(fraction)?;
                Ok((Cow::Owned(train), Some(Cow::Owned(val))))
            }
            Validation::Holdout(val) => {
                if val.is_empty() {
                    return Err(Error::Validation("validation set is empty".into()));
                }
                Ok((Cow::Borrowed(data), Some(Cow::Borrowed(val))))
            }
        }
    }
}

/// Loss and accuracy on a labeled dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub loss: f32,
    pub accuracy: f32,
}

/// A trainable, predictable, serializable classifier.
///
/// `Clone` is an independent deep copy: fitting a clone never touches the
/// original. Every call validates its input against [`input_shape`](Self::input_shape).
pub trait Learner: Clone + Serialize + DeserializeOwned + Send {
    fn input_shape(&self) -> InputShape;

    /// Replace the optimizer, discarding any optimizer state.
    fn compile(&mut self, optimizer: OptimizerConfig);

    fn fit(
        &mut self,
        data: &Dataset,
        options: &FitOptions<'_>,
        callbacks: &mut CallbackManager,
    ) -> Result<History>;

    fn evaluate(&self, data: &Dataset) -> Result<Evaluation>;

    /// Class probabilities, one row per input row.
    fn predict(&self, features: &Array2<f32>) -> Result<Array2<f32>>;
}
