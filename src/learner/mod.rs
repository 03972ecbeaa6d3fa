//! Trainable classifiers
//!
//! The orchestration layer only talks to the [`Learner`] trait.
//! [`SequenceClassifier`] is the default implementation: a small
//! feed-forward network trained with Adam on cross-entropy.

mod classifier;
mod history;
mod optimizer;
mod traits;

pub use classifier::{Architecture, SequenceClassifier};
pub use history::{AggregatedHistory, History};
pub use optimizer::Adam;
pub use traits::{Evaluation, FitOptions, InputShape, Learner, OptimizerConfig, Validation};
