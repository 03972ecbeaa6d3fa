//! Encoded feature/label matrices

use ndarray::{concatenate, Array2, Axis};

use super::label::{WordClass, NUM_CLASSES};
use crate::{Error, Result};

/// Encoded dataset: one fixed-length token row per example and a
/// one-hot label row of width [`NUM_CLASSES`].
///
/// Rows keep the order they were built in; `select`, `append` and
/// `split_tail` never reorder.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f32>,
    labels: Array2<f32>,
}

impl Dataset {
    /// Build a dataset, validating row counts and label width.
    pub fn new(features: Array2<f32>, labels: Array2<f32>) -> Result<Self> {
        if features.nrows() != labels.nrows() {
            return Err(Error::Validation(format!(
                "feature rows ({}) and label rows ({}) differ",
                features.nrows(),
                labels.nrows()
            )));
        }
        if labels.ncols() != NUM_CLASSES {
            return Err(Error::Validation(format!(
                "label vectors must have width {NUM_CLASSES}, got {}",
                labels.ncols()
            )));
        }
        Ok(Self { features, labels })
    }

    /// Empty dataset with the given sequence length.
    pub fn empty(seq_len: usize) -> Self {
        Self {
            features: Array2::zeros((0, seq_len)),
            labels: Array2::zeros((0, NUM_CLASSES)),
        }
    }

    /// Build from encoded rows and their classes.
    pub fn from_rows(rows: &[Vec<f32>], classes: &[WordClass], seq_len: usize) -> Result<Self> {
        if rows.len() != classes.len() {
            return Err(Error::Validation(format!(
                "{} rows but {} labels",
                rows.len(),
                classes.len()
            )));
        }
        let mut features = Array2::zeros((rows.len(), seq_len));
        let mut labels = Array2::zeros((rows.len(), NUM_CLASSES));
        for (i, (row, class)) in rows.iter().zip(classes).enumerate() {
            if row.len() != seq_len {
                return Err(Error::Validation(format!(
                    "row {i} has length {}, expected {seq_len}",
                    row.len()
                )));
            }
            for (j, &v) in row.iter().enumerate() {
                features[[i, j]] = v;
            }
            labels[[i, class.index()]] = 1.0;
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn seq_len(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    pub fn labels(&self) -> &Array2<f32> {
        &self.labels
    }

    /// Argmax class index of every label row.
    pub fn class_indices(&self) -> Vec<usize> {
        self.labels
            .rows()
            .into_iter()
            .map(|row| WordClass::argmax(row).map_or(0, WordClass::index))
            .collect()
    }

    /// Rows at `indices`, in the order given.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// Append `other`'s rows after this dataset's rows.
    pub fn append(&mut self, other: &Dataset) -> Result<()> {
        if other.seq_len() != self.seq_len() {
            return Err(Error::Validation(format!(
                "cannot append rows of length {} to a dataset of length {}",
                other.seq_len(),
                self.seq_len()
            )));
        }
        self.features = concatenate(Axis(0), &[self.features.view(), other.features.view()])
            .map_err(|e| Error::Validation(format!("feature concatenation failed: {e}")))?;
        self.labels = concatenate(Axis(0), &[self.labels.view(), other.labels.view()])
            .map_err(|e| Error::Validation(format!("label concatenation failed: {e}")))?;
        Ok(())
    }

    /// Concatenate parts in order.
    pub fn concat(parts: &[&Dataset], seq_len: usize) -> Result<Self> {
        let mut out = Self::empty(seq_len);
        for part in parts {
            out.append(part)?;
        }
        Ok(out)
    }

    /// Hold out the trailing `fraction` of rows for validation.
    ///
    /// Mirrors Keras' `validation_split`: the first
    /// `floor(len * (1 - fraction))` rows train, the rest validate.
    /// No shuffling happens before the split.
    pub fn split_tail(&self, fraction: f32) -> Result<(Dataset, Dataset)> {
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(Error::Validation(format!(
                "validation split must be in (0, 1), got {fraction}"
            )));
        }
        let split_at = train_rows(self.len(), fraction);
        if split_at == 0 || split_at == self.len() {
            return Err(Error::Validation(format!(
                "validation split {fraction} of {} rows leaves an empty side",
                self.len()
            )));
        }
        let train: Vec<usize> = (0..split_at).collect();
        let val: Vec<usize> = (split_at..self.len()).collect();
        Ok((self.select(&train), self.select(&val)))
    }
}

/// Relative slack when snapping `len * fraction` to a whole row count.
/// Covers the error of an `f32` fraction widened to `f64`.
const ROW_COUNT_TOLERANCE: f64 = 1e-6;

/// `len * fraction`, snapped to the nearest integer when within tolerance.
fn scaled_rows(len: usize, fraction: f64) -> f64 {
    let exact = len as f64 * fraction;
    let nearest = exact.round();
    if (exact - nearest).abs() <= len as f64 * ROW_COUNT_TOLERANCE {
        nearest
    } else {
        exact
    }
}

/// Rows kept for training by a trailing validation split:
/// `floor(len * (1 - fraction))`.
pub(crate) fn train_rows(len: usize, fraction: f32) -> usize {
    scaled_rows(len, 1.0 - f64::from(fraction)).floor() as usize
}

/// Rows held out by a test fraction: `ceil(len * fraction)`.
pub(crate) fn holdout_rows(len: usize, fraction: f32) -> usize {
    scaled_rows(len, f64::from(fraction)).ceil() as usize
}
