//! Training strategies and the runner that applies them

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::cross_validation::CrossValidationTrainer;
use super::curriculum::{CurriculumPlan, CurriculumScheduler};
use super::kfold::StratifiedKFold;
use super::TrainerSettings;
use crate::corpus::StagedData;
use crate::history::HistoryStore;
use crate::learner::{AggregatedHistory, FitOptions, Learner, Validation};
use crate::registry::ModelRegistry;
use crate::{Error, Result};

/// How a model is trained against the staged corpus.
///
/// Curriculum variants take one entry per tier they use, starting from the
/// easiest tier; the list lengths define how many tiers are fed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainingStrategy {
    /// One fit over the full training split
    Plain { epochs: usize, validation_split: f32 },
    /// Stratified k-fold over the full training split
    KFold { epochs: usize },
    /// One fit per tier on the growing accumulator
    Curriculum {
        epochs: Vec<usize>,
        validation_splits: Vec<f32>,
    },
    /// A k-fold pass per tier on the growing accumulator
    CurriculumKFold { epochs: Vec<usize> },
}

impl TrainingStrategy {
    pub fn is_curriculum(&self) -> bool {
        matches!(self, Self::Curriculum { .. } | Self::CurriculumKFold { .. })
    }

    pub fn is_kfold(&self) -> bool {
        matches!(self, Self::KFold { .. } | Self::CurriculumKFold { .. })
    }
}

/// Runs a [`TrainingStrategy`] against a model.
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    settings: TrainerSettings,
    splitter: StratifiedKFold,
}

impl ModelTrainer {
    pub fn new(settings: TrainerSettings, splitter: StratifiedKFold) -> Self {
        Self { settings, splitter }
    }

    pub fn settings(&self) -> &TrainerSettings {
        &self.settings
    }

    fn cross_validation(&self) -> CrossValidationTrainer {
        CrossValidationTrainer::new(self.splitter.clone(), self.settings.clone())
    }

    /// Train `model` in place. Nothing is persisted.
    pub fn train<L: Learner>(
        &self,
        model: &mut L,
        strategy: &TrainingStrategy,
        data: &StagedData,
    ) -> Result<AggregatedHistory> {
        match strategy {
            TrainingStrategy::Plain {
                epochs,
                validation_split,
            } => {
                let options = FitOptions::new(*epochs, self.settings.batch_size)
                    .with_validation(Validation::Split(*validation_split));
                let mut callbacks = self.settings.callbacks("plain");
                let history = model.fit(data.train(), &options, &mut callbacks)?;
                Ok(AggregatedHistory::from(history))
            }
            TrainingStrategy::KFold { epochs } => Ok(self
                .cross_validation()
                .run(model, data.train(), *epochs)?
                .aggregated),
            TrainingStrategy::Curriculum {
                epochs,
                validation_splits,
            } => {
                let plan = CurriculumPlan::new(
                    data.increments(epochs.len())?,
                    epochs.clone(),
                    validation_splits.clone(),
                )?;
                self.run_curriculum(model, &plan)
            }
            TrainingStrategy::CurriculumKFold { epochs } => {
                let plan = CurriculumPlan::with_kfold(data.increments(epochs.len())?, epochs.clone())?;
                self.run_curriculum(model, &plan)
            }
        }
    }

    fn run_curriculum<L: Learner>(&self, model: &mut L, plan: &CurriculumPlan) -> Result<AggregatedHistory> {
        let scheduler = CurriculumScheduler::new(self.settings.clone(), self.cross_validation());
        Ok(scheduler.run(model, plan)?.aggregated)
    }

    /// Train, then persist under `name` and record the history.
    ///
    /// Persistence and recording happen only after every fit succeeded; a
    /// failure leaves the stored artifact and the history untouched.
    pub fn train_and_store<L: Learner>(
        &self,
        name: &str,
        model: &mut L,
        strategy: &TrainingStrategy,
        data: &StagedData,
        registry: &ModelRegistry<L>,
        histories: &mut HistoryStore,
    ) -> Result<AggregatedHistory> {
        strategy.validate()?;
        registry.path_for(name)?;
        let history = self
            .train(model, strategy, data)
            .map_err(|e| e.in_context(format!("model {name}")))?;
        registry.save(model, name)?;
        info!(
            model = name,
            epochs = history.epochs(),
            segments = history.segments.len(),
            strategy = %strategy,
            "model trained"
        );
        histories.record(name, history.clone());
        Ok(history)
    }
}

impl fmt::Display for TrainingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain {
                epochs,
                validation_split,
            } => write!(f, "plain fit, {epochs} epochs, split {validation_split}"),
            Self::KFold { epochs } => write!(f, "k-fold, {epochs} epochs"),
            Self::Curriculum {
                epochs,
                validation_splits,
            } => write!(f, "curriculum, epochs {epochs:?}, splits {validation_splits:?}"),
            Self::CurriculumKFold { epochs } => write!(f, "curriculum + k-fold, epochs {epochs:?}"),
        }
    }
}

impl TrainingStrategy {
    /// Reject strategies that could never run, before any fitting.
    pub fn validate(&self) -> Result<()> {
        let check_epochs = |epochs: &[usize]| {
            if epochs.is_empty() || epochs.contains(&0) {
                Err(Error::Validation(format!(
                    "epoch counts must be positive, got {epochs:?}"
                )))
            } else {
                Ok(())
            }
        };
        match self {
            Self::Plain {
                epochs,
                validation_split,
            } => {
                check_epochs(&[*epochs])?;
                if !(*validation_split > 0.0 && *validation_split < 1.0) {
                    return Err(Error::Validation(format!(
                        "validation split must be in (0, 1), got {validation_split}"
                    )));
                }
                Ok(())
            }
            Self::KFold { epochs } => check_epochs(&[*epochs]),
            Self::Curriculum {
                epochs,
                validation_splits,
            } => {
                check_epochs(epochs)?;
                if epochs.len() != validation_splits.len() {
                    return Err(Error::Validation(format!(
                        "{} stage epoch counts but {} validation splits",
                        epochs.len(),
                        validation_splits.len()
                    )));
                }
                Ok(())
            }
            Self::CurriculumKFold { epochs } => check_epochs(epochs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_serde_is_tagged() {
        let s = TrainingStrategy::Curriculum {
            epochs: vec![2, 4, 8],
            validation_splits: vec![0.15, 0.25, 0.3],
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["kind"], "curriculum");
        let back: TrainingStrategy = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_flags() {
        assert!(TrainingStrategy::CurriculumKFold { epochs: vec![1] }.is_kfold());
        assert!(TrainingStrategy::CurriculumKFold { epochs: vec![1] }.is_curriculum());
        assert!(!TrainingStrategy::KFold { epochs: 1 }.is_curriculum());
    }

    #[test]
    fn test_validate() {
        assert!(TrainingStrategy::Plain {
            epochs: 1,
            validation_split: 0.25
        }
        .validate()
        .is_ok());
        assert!(TrainingStrategy::KFold { epochs: 0 }.validate().is_err());
        assert!(TrainingStrategy::Curriculum {
            epochs: vec![1, 1],
            validation_splits: vec![0.2]
        }
        .validate()
        .is_err());
        assert!(TrainingStrategy::CurriculumKFold { epochs: vec![] }
            .validate()
            .is_err());
    }
}
