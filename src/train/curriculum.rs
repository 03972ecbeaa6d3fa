//! Curriculum training over difficulty-ordered increments

use tracing::info;

use super::cross_validation::CrossValidationTrainer;
use super::TrainerSettings;
use crate::corpus::Dataset;
use crate::learner::{AggregatedHistory, FitOptions, Learner, Validation};
use crate::{Error, Result};

/// How a curriculum stage validates its fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageValidation {
    /// Single fit holding out the trailing fraction of the accumulator
    Split(f32),
    /// Full k-fold pass over the accumulator
    KFold,
}

/// One curriculum stage: the rows it adds and how to fit afterwards.
#[derive(Debug, Clone)]
pub struct CurriculumStage {
    pub increment: Dataset,
    pub epochs: usize,
    pub validation: StageValidation,
}

/// Ordered, validated stage list.
#[derive(Debug, Clone)]
pub struct CurriculumPlan {
    stages: Vec<CurriculumStage>,
}

impl CurriculumPlan {
    /// Single-fit stages. The three lists must have equal length.
    pub fn new(increments: Vec<Dataset>, epochs: Vec<usize>, validation_splits: Vec<f32>) -> Result<Self> {
        if validation_splits.len() != increments.len() {
            return Err(Error::Validation(format!(
                "curriculum has {} stages but {} validation splits",
                increments.len(),
                validation_splits.len()
            )));
        }
        let validations = validation_splits.into_iter().map(StageValidation::Split).collect();
        Self::build(increments, epochs, validations)
    }

    /// Stages that each run a full k-fold pass.
    pub fn with_kfold(increments: Vec<Dataset>, epochs: Vec<usize>) -> Result<Self> {
        let validations = vec![StageValidation::KFold; increments.len()];
        Self::build(increments, epochs, validations)
    }

    fn build(
        increments: Vec<Dataset>,
        epochs: Vec<usize>,
        validations: Vec<StageValidation>,
    ) -> Result<Self> {
        if increments.is_empty() {
            return Err(Error::Validation("curriculum needs at least one stage".into()));
        }
        if epochs.len() != increments.len() {
            return Err(Error::Validation(format!(
                "curriculum has {} stages but {} epoch counts",
                increments.len(),
                epochs.len()
            )));
        }
        let seq_len = increments[0].seq_len();
        for (index, ((increment, &stage_epochs), validation)) in
            increments.iter().zip(&epochs).zip(&validations).enumerate()
        {
            if stage_epochs == 0 {
                return Err(Error::Validation(format!("stage {index} has zero epochs")));
            }
            if increment.seq_len() != seq_len {
                return Err(Error::Validation(format!(
                    "stage {index} rows have length {}, stage 0 rows have length {seq_len}",
                    increment.seq_len()
                )));
            }
            if let StageValidation::Split(fraction) = *validation {
                if !(fraction > 0.0 && fraction < 1.0) {
                    return Err(Error::Validation(format!(
                        "stage {index} validation split must be in (0, 1), got {fraction}"
                    )));
                }
            }
        }
        let stages = increments
            .into_iter()
            .zip(epochs)
            .zip(validations)
            .map(|((increment, epochs), validation)| CurriculumStage {
                increment,
                epochs,
                validation,
            })
            .collect();
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[CurriculumStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub index: usize,
    /// Accumulator size the stage was fitted on
    pub examples: usize,
    pub history: AggregatedHistory,
    /// One-indexed epoch of maximum validation accuracy within the stage
    pub best_epoch: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurriculumReport {
    pub stages: Vec<StageReport>,
    /// Stage-major, fold-minor concatenation of every fit
    pub aggregated: AggregatedHistory,
}

/// Fits a model on a growing accumulator of increments.
///
/// Each stage appends its increment and refits on the whole accumulator,
/// never only on the new rows, so earlier tiers stay in every later fit.
#[derive(Debug, Clone, Default)]
pub struct CurriculumScheduler {
    settings: TrainerSettings,
    cross_validation: CrossValidationTrainer,
}

impl CurriculumScheduler {
    pub fn new(settings: TrainerSettings, cross_validation: CrossValidationTrainer) -> Self {
        Self {
            settings,
            cross_validation,
        }
    }

    pub fn run<L: Learner>(&self, model: &mut L, plan: &CurriculumPlan) -> Result<CurriculumReport> {
        let Some(first) = plan.stages().first() else {
            return Err(Error::Validation("curriculum needs at least one stage".into()));
        };
        let mut accumulator = Dataset::empty(first.increment.seq_len());
        let mut report = CurriculumReport::default();

        for (index, stage) in plan.stages().iter().enumerate() {
            accumulator.append(&stage.increment)?;
            let history = self
                .fit_stage(model, &accumulator, stage, index)
                .map_err(|e| e.in_context(format!("stage {index}")))?;
            let best_epoch = history.history.best_epoch();
            info!(
                stage = index,
                examples = accumulator.len(),
                epochs = history.epochs(),
                best_epoch = ?best_epoch,
                "curriculum stage complete"
            );
            report.aggregated.append_all(&history);
            report.stages.push(StageReport {
                index,
                examples: accumulator.len(),
                history,
                best_epoch,
            });
        }
        Ok(report)
    }

    fn fit_stage<L: Learner>(
        &self,
        model: &mut L,
        accumulator: &Dataset,
        stage: &CurriculumStage,
        index: usize,
    ) -> Result<AggregatedHistory> {
        match stage.validation {
            StageValidation::Split(fraction) => {
                let options = FitOptions::new(stage.epochs, self.settings.batch_size)
                    .with_validation(Validation::Split(fraction));
                let mut callbacks = self.settings.callbacks(format!("stage {index}"));
                let history = model.fit(accumulator, &options, &mut callbacks)?;
                Ok(AggregatedHistory::from(history))
            }
            StageValidation::KFold => Ok(self
                .cross_validation
                .run(model, accumulator, stage.epochs)?
                .aggregated),
        }
    }
}
