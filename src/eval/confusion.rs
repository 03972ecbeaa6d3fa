//! Confusion matrix over the three word classes

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::corpus::{WordClass, NUM_CLASSES};
use crate::{Error, Result};

/// Confusion matrix for the word classifier
///
/// Element `[i][j]` counts samples of true class `i` predicted as class `j`,
/// with classes in [`WordClass::index`] order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    matrix: [[usize; NUM_CLASSES]; NUM_CLASSES],
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from paired ground truth and predictions.
    pub fn from_predictions(y_true: &[WordClass], y_pred: &[WordClass]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(Error::Validation(format!(
                "{} targets but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        let mut cm = Self::new();
        for (&truth, &pred) in y_true.iter().zip(y_pred) {
            cm.record(truth, pred);
        }
        Ok(cm)
    }

    pub fn record(&mut self, truth: WordClass, predicted: WordClass) {
        self.matrix[truth.index()][predicted.index()] += 1;
    }

    /// Get the raw matrix
    pub fn matrix(&self) -> &[[usize; NUM_CLASSES]; NUM_CLASSES] {
        &self.matrix
    }

    pub fn get(&self, truth: WordClass, predicted: WordClass) -> usize {
        self.matrix[truth.index()][predicted.index()]
    }

    /// Total true instances of a class
    pub fn support(&self, class: WordClass) -> usize {
        self.matrix[class.index()].iter().sum()
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..NUM_CLASSES).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }

    /// Fraction of predictions of `class` that were right; 0 when never predicted.
    pub fn precision(&self, class: WordClass) -> f64 {
        let c = class.index();
        let predicted: usize = (0..NUM_CLASSES).map(|i| self.matrix[i][c]).sum();
        if predicted == 0 {
            0.0
        } else {
            self.matrix[c][c] as f64 / predicted as f64
        }
    }

    /// Fraction of true `class` samples found; 0 when the class is absent.
    pub fn recall(&self, class: WordClass) -> f64 {
        let support = self.support(class);
        if support == 0 {
            0.0
        } else {
            self.matrix[class.index()][class.index()] as f64 / support as f64
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "true\\pred")?;
        for class in WordClass::ALL {
            write!(f, "{:>10}", class.name())?;
        }
        writeln!(f)?;
        for truth in WordClass::ALL {
            write!(f, "{:>10}", truth.name())?;
            for pred in WordClass::ALL {
                write!(f, "{:>10}", self.get(truth, pred))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
