//! Model evaluation and single-word prediction

use serde::{Deserialize, Serialize};

use super::confusion::ConfusionMatrix;
use crate::corpus::{Dataset, WordClass, NUM_CLASSES};
use crate::learner::{Evaluation, Learner};
use crate::registry::ModelRegistry;
use crate::tokenizer::{encode_words, WordEncoder};
use crate::{Error, Result};

/// Metrics of one stored model on the held-out set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub model: String,
    pub metrics: Evaluation,
}

/// Evaluate stored models in the given order. Any unknown name fails the
/// whole call with `NotFound`.
pub fn evaluate_models<L: Learner>(
    registry: &ModelRegistry<L>,
    names: &[String],
    test: &Dataset,
) -> Result<Vec<ModelEvaluation>> {
    names
        .iter()
        .map(|name| {
            let model = registry.load(name)?;
            let metrics = model
                .evaluate(test)
                .map_err(|e| e.in_context(format!("evaluating {name}")))?;
            Ok(ModelEvaluation {
                model: name.clone(),
                metrics,
            })
        })
        .collect()
}

/// Rows are true classes, columns argmax predictions.
pub fn confusion_matrix<L: Learner>(model: &L, test: &Dataset) -> Result<ConfusionMatrix> {
    let probabilities = model.predict(test.features())?;
    let mut cm = ConfusionMatrix::new();
    for (truth, row) in test.labels().rows().into_iter().zip(probabilities.rows()) {
        let (Some(truth), Some(pred)) = (WordClass::argmax(truth), WordClass::argmax(row)) else {
            return Err(Error::training("confusion matrix", "non-finite prediction"));
        };
        cm.record(truth, pred);
    }
    Ok(cm)
}

/// Class probabilities for a single word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub word: String,
    pub probabilities: [f32; NUM_CLASSES],
    /// Set only when one probability rounds to 1; `None` is the unknown
    /// outcome.
    pub class: Option<WordClass>,
}

/// Predict one word. The word is padded to the model's input length after
/// checking it fits within `max(default_padding, word length)`.
pub fn predict_word<L, E>(model: &L, word: &str, encoder: &E, default_padding: usize) -> Result<Prediction>
where
    L: Learner,
    E: WordEncoder + ?Sized,
{
    let word = word.trim();
    if word.is_empty() {
        return Err(Error::Validation("cannot predict an empty word".into()));
    }
    let padding = default_padding.max(encoder.encode(word).len());
    let seq_len = model.input_shape().seq_len;
    if padding > seq_len {
        return Err(Error::Validation(format!(
            "'{word}' needs {padding} input positions, model accepts {seq_len}"
        )));
    }
    let features = encode_words(encoder, &[word], seq_len)?;
    let probabilities = model.predict(&features)?;
    let row = probabilities.row(0);
    let mut probs = [0.0; NUM_CLASSES];
    for (slot, &p) in probs.iter_mut().zip(row.iter()) {
        *slot = p;
    }
    // Half rounds down, matching round-half-to-even at 0.5
    let rounded = row.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 });
    Ok(Prediction {
        word: word.to_string(),
        probabilities: probs,
        class: WordClass::from_one_hot(rounded.view()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learner::Architecture;
    use crate::registry::ArtifactFormat;
    use crate::tokenizer::VowelClassEncoder;
    use tempfile::TempDir;

    fn model() -> crate::learner::SequenceClassifier {
        Architecture {
            hidden_units: 8,
            ..Architecture::default()
        }
        .build()
        .unwrap()
    }

    fn test_set() -> Dataset {
        let enc = VowelClassEncoder::new();
        let words = ["hueso", "frío", "lata"];
        let features = encode_words(&enc, &words, 16).unwrap();
        let rows: Vec<Vec<f32>> = features.rows().into_iter().map(|r| r.to_vec()).collect();
        Dataset::from_rows(&rows, &WordClass::ALL, 16).unwrap()
    }

    #[test]
    fn test_predict_word_probabilities() {
        let p = predict_word(&model(), "baúl", &VowelClassEncoder::new(), 16).unwrap();
        assert!((p.probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        // An untrained model is near uniform, so nothing rounds to 1
        if p.probabilities.iter().all(|&x| x <= 0.5) {
            assert_eq!(p.class, None);
        }
    }

    #[test]
    fn test_predict_word_too_long() {
        let long = "a".repeat(17);
        let err = predict_word(&model(), &long, &VowelClassEncoder::new(), 16).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_confusion_matrix_covers_test_set() {
        let cm = confusion_matrix(&model(), &test_set()).unwrap();
        assert_eq!(cm.total(), 3);
        for class in WordClass::ALL {
            assert_eq!(cm.support(class), 1);
        }
    }

    #[test]
    fn test_evaluate_unknown_name() {
        let dir = TempDir::new().unwrap();
        let reg = ModelRegistry::open(dir.path(), ArtifactFormat::Json).unwrap();
        reg.save(&model(), "max").unwrap();
        let ok = evaluate_models(&reg, &["max".to_string()], &test_set()).unwrap();
        assert_eq!(ok[0].model, "max");
        let err = evaluate_models(&reg, &["max".to_string(), "nope".to_string()], &test_set())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
