//! Training strategies
//!
//! - Stratified k-fold cross-validation ([`CrossValidationTrainer`])
//! - Curriculum training over difficulty tiers ([`CurriculumScheduler`])
//! - Strategy dispatch and persistence ([`ModelTrainer`])
//! - Post-deployment teaching ([`TeachingUpdater`])
//!
//! Every fit runs with early stopping on validation accuracy and logs
//! epoch progress through `tracing`.

pub mod callback;
mod cross_validation;
mod curriculum;
mod kfold;
mod strategy;
mod teaching;

use serde::{Deserialize, Serialize};

pub use callback::{CallbackAction, CallbackContext, CallbackManager, EarlyStopping, Monitor};
pub use cross_validation::{CrossValidationReport, CrossValidationTrainer};
pub use curriculum::{
    CurriculumPlan, CurriculumReport, CurriculumScheduler, CurriculumStage, StageReport,
    StageValidation,
};
pub use kfold::StratifiedKFold;
pub use strategy::{ModelTrainer, TrainingStrategy};
pub use teaching::{SummaryRow, TeachingBatch, TeachingOutcome, TeachingSettings, TeachingUpdater};

/// Fit settings shared by every training strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    pub batch_size: usize,
    /// Epochs without a validation-accuracy improvement before stopping
    pub patience: usize,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            batch_size: 32,
            patience: 2,
        }
    }
}

impl TrainerSettings {
    /// Progress logging plus early stopping on validation accuracy.
    pub fn callbacks(&self, label: impl Into<String>) -> CallbackManager {
        CallbackManager::new()
            .with(callback::ProgressCallback::new(label, 10))
            .with(EarlyStopping::new(Monitor::ValAccuracy, self.patience))
    }
}
