//! Stratified k-fold splitter

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Stratified k-fold cross-validation splitter
///
/// Each class's rows are shuffled with a seeded LCG and dealt round-robin
/// across the folds, continuing the deal where the previous class stopped,
/// so every fold receives its share of every class and fold sizes differ
/// by at most one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratifiedKFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        Self::new(5)
    }
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            seed: 42,
        }
    }

    /// Set random seed for shuffling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Disable shuffling
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Train/test row indices of each fold, both ascending.
    ///
    /// `classes[i]` is the class index of row `i`.
    pub fn split(&self, classes: &[usize]) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 {
            return Err(Error::Validation(format!(
                "k-fold needs at least 2 splits, got {}",
                self.n_splits
            )));
        }
        if classes.len() < self.n_splits {
            return Err(Error::Validation(format!(
                "cannot split {} rows into {} folds",
                classes.len(),
                self.n_splits
            )));
        }

        let n_classes = classes.iter().max().map_or(0, |&c| c + 1);
        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (row, &class) in classes.iter().enumerate() {
            by_class[class].push(row);
        }

        let mut fold_of = vec![0; classes.len()];
        let mut rng_state = self.seed;
        let mut next_fold = 0;
        for members in &mut by_class {
            if self.shuffle {
                for i in (1..members.len()).rev() {
                    rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
                    let j = (rng_state >> 33) as usize % (i + 1);
                    members.swap(i, j);
                }
            }
            for &row in members.iter() {
                fold_of[row] = next_fold;
                next_fold = (next_fold + 1) % self.n_splits;
            }
        }

        Ok((0..self.n_splits)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..classes.len()).partition(|&row| fold_of[row] == fold);
                (train, test)
            })
            .collect())
    }
}
