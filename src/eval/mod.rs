//! Evaluation of stored models against the held-out set

mod confusion;
mod evaluate;

pub use confusion::ConfusionMatrix;
pub use evaluate::{confusion_matrix, evaluate_models, predict_word, ModelEvaluation, Prediction};
