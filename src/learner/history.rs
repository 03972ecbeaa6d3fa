//! Per-epoch training metrics

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Per-epoch metric sequences of a single fit.
///
/// `val_loss`/`val_accuracy` are either empty (fit without validation) or
/// as long as `loss`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub accuracy: Vec<f32>,
    pub loss: Vec<f32>,
    pub val_accuracy: Vec<f32>,
    pub val_loss: Vec<f32>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one epoch.
    pub fn push_epoch(&mut self, loss: f32, accuracy: f32, validation: Option<(f32, f32)>) {
        self.loss.push(loss);
        self.accuracy.push(accuracy);
        if let Some((val_loss, val_accuracy)) = validation {
            self.val_loss.push(val_loss);
            self.val_accuracy.push(val_accuracy);
        }
    }

    /// Number of epochs actually run.
    pub fn epochs(&self) -> usize {
        self.loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loss.is_empty()
    }

    /// One-indexed epoch with the highest validation accuracy; the first
    /// one wins ties. `None` when the fit had no validation data.
    pub fn best_epoch(&self) -> Option<usize> {
        best_in(&self.val_accuracy).map(|i| i + 1)
    }

    /// Append another history's epochs after this one's.
    pub fn extend(&mut self, other: &History) {
        self.accuracy.extend_from_slice(&other.accuracy);
        self.loss.extend_from_slice(&other.loss);
        self.val_accuracy.extend_from_slice(&other.val_accuracy);
        self.val_loss.extend_from_slice(&other.val_loss);
    }
}

fn best_in(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Histories of consecutive fits (stages, folds) concatenated in execution
/// order, never averaged.
///
/// `segments[i]` is the epoch count of the i-th constituent fit, so segment
/// boundaries stay recoverable from the flat sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedHistory {
    #[serde(flatten)]
    pub history: History,
    #[serde(default)]
    pub segments: Vec<usize>,
}

impl AggregatedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fit as a new segment.
    pub fn append(&mut self, history: &History) {
        self.history.extend(history);
        self.segments.push(history.epochs());
    }

    /// Append every segment of another aggregate.
    pub fn append_all(&mut self, other: &AggregatedHistory) {
        self.history.extend(&other.history);
        self.segments.extend_from_slice(&other.segments);
    }

    /// Epoch index ranges of each segment in the flat sequences.
    pub fn boundaries(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.segments
            .iter()
            .map(|&len| {
                let range = start..start + len;
                start += len;
                range
            })
            .collect()
    }

    pub fn epochs(&self) -> usize {
        self.history.epochs()
    }
}

impl From<History> for AggregatedHistory {
    fn from(history: History) -> Self {
        let segments = vec![history.epochs()];
        Self { history, segments }
    }
}
