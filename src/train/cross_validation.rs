//! K-fold cross-validated training

use tracing::info;

use super::kfold::StratifiedKFold;
use super::TrainerSettings;
use crate::corpus::Dataset;
use crate::learner::{AggregatedHistory, FitOptions, History, Learner, Validation};
use crate::Result;

/// Per-fold histories and their fold-ordered concatenation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossValidationReport {
    pub folds: Vec<History>,
    pub aggregated: AggregatedHistory,
}

/// Trains one model instance through every fold of a stratified split.
///
/// Folds run strictly in order against the same instance, so fold `i`
/// starts from the weights fold `i - 1` left behind. Each fold validates on
/// its own held-out rows with early stopping on validation accuracy.
#[derive(Debug, Clone, Default)]
pub struct CrossValidationTrainer {
    splitter: StratifiedKFold,
    settings: TrainerSettings,
}

impl CrossValidationTrainer {
    pub fn new(splitter: StratifiedKFold, settings: TrainerSettings) -> Self {
        Self { splitter, settings }
    }

    pub fn n_splits(&self) -> usize {
        self.splitter.n_splits()
    }

    /// Run every fold for up to `epochs` epochs each.
    pub fn run<L: Learner>(
        &self,
        model: &mut L,
        data: &Dataset,
        epochs: usize,
    ) -> Result<CrossValidationReport> {
        let folds = self.splitter.split(&data.class_indices())?;
        let mut report = CrossValidationReport::default();
        for (fold, (train_idx, test_idx)) in folds.iter().enumerate() {
            let train = data.select(train_idx);
            let held_out = data.select(test_idx);
            let options = FitOptions::new(epochs, self.settings.batch_size)
                .with_validation(Validation::Holdout(&held_out));
            let mut callbacks = self.settings.callbacks(format!("fold {fold}"));
            let history = model
                .fit(&train, &options, &mut callbacks)
                .map_err(|e| e.in_context(format!("fold {fold}")))?;
            info!(
                fold,
                epochs = history.epochs(),
                best_epoch = ?history.best_epoch(),
                train = train.len(),
                validation = held_out.len(),
                "fold complete"
            );
            report.aggregated.append(&history);
            report.folds.push(history);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::WordClass;
    use crate::learner::Architecture;
    use crate::Error;

    fn data(n: usize) -> Dataset {
        let rows: Vec<Vec<f32>> = (0..n).map(|i| vec![(i % 5) as f32, 0.0, 1.0]).collect();
        let classes: Vec<WordClass> = (0..n).map(|i| WordClass::ALL[i % 3]).collect();
        Dataset::from_rows(&rows, &classes, 3).unwrap()
    }

    fn model() -> crate::learner::SequenceClassifier {
        Architecture {
            seq_len: 3,
            vocab_size: 5,
            hidden_units: 4,
            dropout: 0.0,
            l2: 0.0,
            learning_rate: 0.01,
            seed: 3,
        }
        .build()
        .unwrap()
    }

    #[test]
    fn test_five_segments_matching_fold_epochs() {
        let report = CrossValidationTrainer::default()
            .run(&mut model(), &data(30), 3)
            .unwrap();
        assert_eq!(report.folds.len(), 5);
        let lengths: Vec<usize> = report.folds.iter().map(History::epochs).collect();
        assert_eq!(report.aggregated.segments, lengths);
        assert!(lengths.iter().all(|&l| (1..=3).contains(&l)));
    }

    #[test]
    fn test_too_few_rows_is_validation_error() {
        let err = CrossValidationTrainer::default()
            .run(&mut model(), &data(3), 1)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
