//! Shared fixtures: a scripted learner and a synthetic staged corpus

#![allow(dead_code)]

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use ensenar::corpus::{Dataset, DatasetStager, DifficultyTier, Example, StagedData, WordClass};
use ensenar::learner::{Evaluation, FitOptions, History, InputShape, Learner, OptimizerConfig};
use ensenar::tokenizer::VowelClassEncoder;
use ensenar::train::{CallbackAction, CallbackContext, CallbackManager};
use ensenar::{Error, Result};

const WORDS: [&str; 12] = [
    "hueso", "frío", "lata", "baúl", "aire", "vaso", "piano", "caer", "mesa", "reúne", "cielo", "tía",
];

/// Learner that records what it was fitted on and replays scripted metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedLearner {
    pub seq_len: usize,
    /// Row fingerprints (sum of features) of every dataset passed to `fit`
    pub fits: Vec<Vec<f32>>,
    /// (train, validation) row counts of every fit
    #[serde(default)]
    pub partitions: Vec<(usize, usize)>,
    /// Fail every fit once this many fits have happened
    pub fail_after: Option<usize>,
    /// Validation accuracy per epoch, cycled
    pub val_accuracy: Vec<f32>,
    /// Probability row returned for every input
    pub output: [f32; 3],
}

impl ScriptedLearner {
    pub fn new() -> Self {
        Self {
            seq_len: 16,
            fits: Vec::new(),
            partitions: Vec::new(),
            fail_after: None,
            val_accuracy: vec![0.5],
            output: [0.34, 0.33, 0.33],
        }
    }

    pub fn failing_after(mut self, fits: usize) -> Self {
        self.fail_after = Some(fits);
        self
    }

    pub fn with_val_accuracy(mut self, script: Vec<f32>) -> Self {
        self.val_accuracy = script;
        self
    }

    pub fn fit_count(&self) -> usize {
        self.fits.len()
    }
}

impl Learner for ScriptedLearner {
    fn input_shape(&self) -> InputShape {
        InputShape::new(self.seq_len, 5)
    }

    fn compile(&mut self, _optimizer: OptimizerConfig) {}

    fn fit(
        &mut self,
        data: &Dataset,
        options: &FitOptions<'_>,
        callbacks: &mut CallbackManager,
    ) -> Result<History> {
        if self.fail_after.is_some_and(|limit| self.fits.len() >= limit) {
            return Err(Error::training("scripted fit", "forced failure"));
        }
        self.input_shape().check(data.features())?;
        let (train, validation) = options.partition(data)?;
        self.partitions
            .push((train.len(), validation.as_ref().map_or(0, |v| v.len())));
        self.fits.push(data.features().rows().into_iter().map(|r| r.sum()).collect());

        let mut ctx = CallbackContext {
            max_epochs: options.epochs,
            ..CallbackContext::default()
        };
        callbacks.on_train_begin(&ctx);
        let mut history = History::new();
        for epoch in 0..options.epochs {
            let val_acc = self.val_accuracy[epoch % self.val_accuracy.len()];
            ctx.epoch = epoch;
            ctx.loss = 1.0;
            ctx.accuracy = 0.5;
            ctx.val_loss = validation.as_ref().map(|_| 1.0);
            ctx.val_accuracy = validation.as_ref().map(|_| val_acc);
            history.push_epoch(1.0, 0.5, validation.as_ref().map(|_| (1.0, val_acc)));
            if callbacks.on_epoch_end(&ctx) == CallbackAction::Stop {
                break;
            }
        }
        callbacks.on_train_end(&ctx);
        Ok(history)
    }

    fn evaluate(&self, data: &Dataset) -> Result<Evaluation> {
        let predictions = self.predict(data.features())?;
        let hits = data
            .labels()
            .rows()
            .into_iter()
            .zip(predictions.rows())
            .filter(|(truth, pred)| WordClass::argmax(*truth) == WordClass::argmax(*pred))
            .count();
        Ok(Evaluation {
            loss: 1.0,
            accuracy: hits as f32 / data.len().max(1) as f32,
        })
    }

    fn predict(&self, features: &Array2<f32>) -> Result<Array2<f32>> {
        self.input_shape().check(features)?;
        Ok(Array2::from_shape_fn((features.nrows(), 3), |(_, j)| self.output[j]))
    }
}

/// `per_tier` examples per difficulty tier, classes cycling d/h/g.
pub fn corpus(per_tier: usize) -> Vec<Example> {
    let mut out = Vec::new();
    for tier in DifficultyTier::ALL {
        for i in 0..per_tier {
            let word = WORDS[(i + 5 * tier.index()) % WORDS.len()];
            out.push(Example::new(word, tier, WordClass::ALL[i % 3]));
        }
    }
    out
}

pub fn staged(per_tier: usize) -> StagedData {
    DatasetStager::default()
        .stage(&corpus(per_tier), &VowelClassEncoder::new())
        .expect("synthetic corpus stages")
}
