//! Seeded random search over classifier architectures

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::space::{apply, Configuration, HyperparameterSpace};
use super::{ArchitectureSearch, SearchInput, SearchObjective};
use crate::learner::{Architecture, FitOptions, History, Learner, SequenceClassifier, Validation};
use crate::train::TrainerSettings;
use crate::{Error, Result};

/// Random search budget and per-trial fit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub max_trials: usize,
    pub validation_split: f32,
    /// Epochs per trial on a single dataset
    pub epochs: usize,
    /// Epochs per stage when searching over curriculum stages
    pub stage_epochs: Vec<usize>,
    pub seed: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_trials: 1,
            validation_split: 0.30,
            epochs: 15,
            stage_epochs: vec![3, 5, 12],
            seed: 42,
        }
    }
}

/// A completed trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub id: usize,
    pub config: Configuration,
    pub score: f32,
    pub epochs: usize,
}

/// Samples `max_trials` architectures, trains each briefly, keeps the best.
///
/// The returned model is built fresh from the winning architecture, so it
/// is untrained and identical for identical seeds.
#[derive(Debug, Clone)]
pub struct RandomArchitectureSearch {
    space: HyperparameterSpace,
    base: Architecture,
    settings: SearchSettings,
    trainer: TrainerSettings,
    rng: StdRng,
    trials: Vec<Trial>,
}

impl RandomArchitectureSearch {
    pub fn new(
        space: HyperparameterSpace,
        base: Architecture,
        settings: SearchSettings,
        trainer: TrainerSettings,
    ) -> Result<Self> {
        space.validate()?;
        if settings.max_trials == 0 {
            return Err(Error::Config("search needs at least one trial".into()));
        }
        let rng = StdRng::seed_from_u64(settings.seed);
        Ok(Self {
            space,
            base,
            settings,
            trainer,
            rng,
            trials: Vec::new(),
        })
    }

    /// Every trial run so far, in order.
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    fn run_trial(&self, arch: &Architecture, input: SearchInput<'_>) -> Result<History> {
        let mut model = arch.build()?;
        let mut history = History::new();
        match input {
            SearchInput::Single(data) => {
                let options = FitOptions::new(self.settings.epochs, self.trainer.batch_size)
                    .with_validation(Validation::Split(self.settings.validation_split));
                let mut callbacks = self.trainer.callbacks("search");
                history = model.fit(data, &options, &mut callbacks)?;
            }
            SearchInput::Staged(stages) => {
                if stages.len() > self.settings.stage_epochs.len() {
                    return Err(Error::Config(format!(
                        "{} search stages but only {} stage epoch counts",
                        stages.len(),
                        self.settings.stage_epochs.len()
                    )));
                }
                for (index, (stage, &epochs)) in
                    stages.iter().zip(&self.settings.stage_epochs).enumerate()
                {
                    let options = FitOptions::new(epochs, self.trainer.batch_size)
                        .with_validation(Validation::Split(self.settings.validation_split));
                    let mut callbacks = self.trainer.callbacks(format!("search stage {index}"));
                    let stage_history = model
                        .fit(stage, &options, &mut callbacks)
                        .map_err(|e| e.in_context(format!("search stage {index}")))?;
                    history.extend(&stage_history);
                }
            }
        }
        Ok(history)
    }
}

impl ArchitectureSearch for RandomArchitectureSearch {
    type Model = SequenceClassifier;

    fn search(&mut self, input: SearchInput<'_>, objective: SearchObjective) -> Result<SequenceClassifier> {
        let mut best: Option<(f32, Architecture)> = None;
        for _ in 0..self.settings.max_trials {
            let id = self.trials.len();
            let config = self.space.sample(&mut self.rng);
            let arch = apply(&self.base, &config)?;
            let history = self
                .run_trial(&arch, input)
                .map_err(|e| e.in_context(format!("search trial {id}")))?;
            let score = objective.score(&history).ok_or_else(|| {
                Error::training(format!("search trial {id}"), "trial produced no validation metrics")
            })?;
            debug!(trial = id, score, ?config, "search trial complete");
            if best.as_ref().is_none_or(|(b, _)| objective.better(score, *b)) {
                best = Some((score, arch));
            }
            self.trials.push(Trial {
                id,
                config,
                score,
                epochs: history.epochs(),
            });
        }
        let Some((score, arch)) = best else {
            return Err(Error::Config("search ran no trials".into()));
        };
        info!(
            score,
            hidden_units = arch.hidden_units,
            dropout = arch.dropout,
            l2 = arch.l2,
            learning_rate = arch.learning_rate,
            "architecture selected"
        );
        arch.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Dataset, WordClass};

    fn data(n: usize) -> Dataset {
        let rows: Vec<Vec<f32>> = (0..n).map(|i| vec![(i % 3) as f32 + 1.0, 0.0]).collect();
        let classes: Vec<WordClass> = (0..n).map(|i| WordClass::ALL[i % 3]).collect();
        Dataset::from_rows(&rows, &classes, 2).unwrap()
    }

    fn search(trials: usize) -> RandomArchitectureSearch {
        let mut space = HyperparameterSpace::classifier();
        space.add(
            super::super::space::HIDDEN_UNITS,
            super::super::space::ParameterDomain::Choice { values: vec![4, 8] },
        );
        let base = Architecture {
            seq_len: 2,
            ..Architecture::default()
        };
        let settings = SearchSettings {
            max_trials: trials,
            epochs: 2,
            stage_epochs: vec![1, 1],
            ..SearchSettings::default()
        };
        RandomArchitectureSearch::new(space, base, settings, TrainerSettings::default()).unwrap()
    }

    #[test]
    fn test_returns_untrained_model_of_best_trial() {
        let mut s = search(3);
        let model = s
            .search(SearchInput::Single(&data(20)), SearchObjective::ValAccuracy)
            .unwrap();
        assert_eq!(s.trials().len(), 3);
        assert_eq!(model, model.architecture().build().unwrap());
        assert!([4, 8].contains(&model.architecture().hidden_units));
    }

    #[test]
    fn test_same_seed_same_result() {
        let a = search(2)
            .search(SearchInput::Single(&data(20)), SearchObjective::ValAccuracy)
            .unwrap();
        let b = search(2)
            .search(SearchInput::Single(&data(20)), SearchObjective::ValAccuracy)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_staged_input() {
        let stages = vec![data(10), data(20)];
        let mut s = search(1);
        s.search(SearchInput::Staged(&stages), SearchObjective::ValLoss)
            .unwrap();
        assert_eq!(s.trials()[0].epochs, 2);
    }

    #[test]
    fn test_too_many_stages_rejected() {
        let stages = vec![data(10), data(10), data(10)];
        let err = search(1)
            .search(SearchInput::Staged(&stages), SearchObjective::ValAccuracy)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_trials_rejected() {
        let settings = SearchSettings {
            max_trials: 0,
            ..SearchSettings::default()
        };
        assert!(RandomArchitectureSearch::new(
            HyperparameterSpace::classifier(),
            Architecture::default(),
            settings,
            TrainerSettings::default()
        )
        .is_err());
    }
}
