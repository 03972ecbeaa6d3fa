//! Architecture search
//!
//! Search is an opaque capability to the rest of the crate: given training
//! data and an objective it returns a fresh, untrained model.

mod random;
mod space;

pub use random::{RandomArchitectureSearch, SearchSettings, Trial};
pub use space::{
    apply, Configuration, HyperparameterSpace, ParameterDomain, ParameterValue, DROPOUT,
    HIDDEN_UNITS, L2, LEARNING_RATE,
};

use serde::{Deserialize, Serialize};

use crate::corpus::Dataset;
use crate::learner::{History, Learner};
use crate::Result;

/// Data a search trains its trials on.
#[derive(Debug, Clone, Copy)]
pub enum SearchInput<'a> {
    /// One dataset, one fit per trial
    Single(&'a Dataset),
    /// Cumulative curriculum stages, fitted in order per trial
    Staged(&'a [Dataset]),
}

/// Metric a search optimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchObjective {
    #[default]
    ValAccuracy,
    ValLoss,
}

impl SearchObjective {
    /// Best value of the objective over a trial's epochs.
    pub fn score(self, history: &History) -> Option<f32> {
        let values = match self {
            Self::ValAccuracy => &history.val_accuracy,
            Self::ValLoss => &history.val_loss,
        };
        let finite = values.iter().copied().filter(|v| v.is_finite());
        match self {
            Self::ValAccuracy => finite.reduce(f32::max),
            Self::ValLoss => finite.reduce(f32::min),
        }
    }

    /// Whether `candidate` beats `incumbent`. Ties keep the incumbent.
    pub fn better(self, candidate: f32, incumbent: f32) -> bool {
        match self {
            Self::ValAccuracy => candidate > incumbent,
            Self::ValLoss => candidate < incumbent,
        }
    }
}

/// Finds a trainable architecture for a regime.
pub trait ArchitectureSearch {
    type Model: Learner;

    fn search(&mut self, input: SearchInput<'_>, objective: SearchObjective) -> Result<Self::Model>;
}
