//! Post-deployment teaching: small low-learning-rate updates

use std::collections::HashSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::corpus::{train_rows, Dataset, WordClass, NUM_CLASSES};
use crate::learner::{FitOptions, History, Learner, OptimizerConfig, Validation};
use crate::registry::ModelRegistry;
use crate::tokenizer::{encode_words, WordEncoder};
use crate::train::callback::{CallbackManager, EarlyStopping, Monitor, ProgressCallback};
use crate::{Error, Result};

/// Settings for a teaching update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeachingSettings {
    /// Well below the training rate so a tiny batch cannot overwrite
    /// learned behavior
    pub learning_rate: f32,
    pub epochs: usize,
    pub validation_split: f32,
    pub patience: usize,
    pub batch_size: usize,
    /// Minimum encoded length; the longest batch word raises it
    pub default_padding: usize,
}

impl Default for TeachingSettings {
    fn default() -> Self {
        Self {
            learning_rate: 5.3e-5,
            epochs: 3,
            validation_split: 0.20,
            patience: 0,
            batch_size: 32,
            default_padding: 16,
        }
    }
}

/// Ordered word → label pairs supplied at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeachingBatch {
    entries: Vec<(String, WordClass)>,
}

impl TeachingBatch {
    /// Build from pairs. Words must be non-empty and unique.
    pub fn new(entries: Vec<(String, WordClass)>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (word, _) in &entries {
            if word.trim().is_empty() {
                return Err(Error::Validation("teaching batch contains an empty word".into()));
            }
            if !seen.insert(word.as_str()) {
                return Err(Error::Validation(format!(
                    "teaching batch repeats the word '{word}'"
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Parse `(word, tag)` pairs; any unknown tag is rejected.
    pub fn from_tags<I, W, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (W, T)>,
        W: Into<String>,
        T: AsRef<str>,
    {
        let entries = pairs
            .into_iter()
            .map(|(word, tag)| Ok::<_, Error>((word.into(), tag.as_ref().parse::<WordClass>()?)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    /// Parse a JSON object mapping words to tags, keeping document order.
    pub fn from_json(text: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)
            .map_err(|e| Error::Validation(format!("teaching batch must be a JSON object: {e}")))?;
        let pairs = map
            .into_iter()
            .map(|(word, value)| match value {
                serde_json::Value::String(tag) => Ok((word, tag)),
                other => Err(Error::Validation(format!(
                    "label for '{word}' must be a string, got {other}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_tags(pairs)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(w, _)| w.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = WordClass> + '_ {
        self.entries.iter().map(|&(_, c)| c)
    }
}

/// One row of the teaching summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub word: String,
    pub expected: WordClass,
    pub predicted: WordClass,
}

impl SummaryRow {
    pub fn is_mistake(&self) -> bool {
        self.expected != self.predicted
    }
}

/// Result of a successful teaching call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachingOutcome {
    pub model: String,
    pub history: History,
    pub summary: Vec<SummaryRow>,
}

impl TeachingOutcome {
    pub fn mistakes(&self) -> impl Iterator<Item = &SummaryRow> {
        self.summary.iter().filter(|row| row.is_mistake())
    }
}

/// Applies a teaching batch to a stored model.
#[derive(Debug, Clone, Default)]
pub struct TeachingUpdater {
    settings: TeachingSettings,
}

impl TeachingUpdater {
    pub fn new(settings: TeachingSettings) -> Self {
        Self { settings }
    }

    /// Fine-tune `name` on `batch` and report predicted vs expected labels.
    ///
    /// Batch problems and unknown names are reported before anything is
    /// touched. The model is saved back only after the fit succeeds.
    pub fn teach<L, E>(
        &self,
        registry: &ModelRegistry<L>,
        name: &str,
        batch: &TeachingBatch,
        encoder: &E,
    ) -> Result<TeachingOutcome>
    where
        L: Learner,
        E: WordEncoder + ?Sized,
    {
        self.check_batch_size(batch)?;
        let mut model = registry.load(name)?;

        let words: Vec<&str> = batch.words().collect();
        let longest = words.iter().map(|w| w.chars().count()).max().unwrap_or(0);
        let padding = self.settings.default_padding.max(longest);
        let seq_len = model.input_shape().seq_len;
        if padding > seq_len {
            return Err(Error::Validation(format!(
                "teaching batch needs {padding} input positions, model '{name}' accepts {seq_len}"
            )));
        }
        let features = encode_words(encoder, &words, seq_len)?;
        let classes: Vec<WordClass> = batch.labels().collect();
        let labels = Array2::from_shape_fn((classes.len(), NUM_CLASSES), |(i, j)| {
            if classes[i].index() == j {
                1.0
            } else {
                0.0
            }
        });
        let data = Dataset::new(features, labels)?;

        model.compile(OptimizerConfig::adam(self.settings.learning_rate));
        let options = FitOptions::new(self.settings.epochs, self.settings.batch_size)
            .with_validation(Validation::Split(self.settings.validation_split));
        let mut callbacks = CallbackManager::new()
            .with(ProgressCallback::new(format!("teach {name}"), 10))
            .with(EarlyStopping::new(Monitor::ValAccuracy, self.settings.patience));
        let history = model
            .fit(&data, &options, &mut callbacks)
            .map_err(|e| e.in_context(format!("teaching {name}")))?;

        let probabilities = model
            .predict(data.features())
            .map_err(|e| e.in_context(format!("teaching {name}")))?;
        let mut summary = Vec::with_capacity(batch.len());
        for ((word, expected), row) in words.iter().zip(classes).zip(probabilities.rows()) {
            let predicted = WordClass::argmax(row).ok_or_else(|| {
                Error::training(
                    format!("teaching {name}"),
                    format!("prediction for '{word}' is not a probability vector"),
                )
            })?;
            summary.push(SummaryRow {
                word: (*word).to_string(),
                expected,
                predicted,
            });
        }

        registry.save(&model, name)?;
        let outcome = TeachingOutcome {
            model: name.to_string(),
            history,
            summary,
        };
        let mistakes = outcome.mistakes().count();
        if mistakes > 0 {
            warn!(model = name, mistakes, words = batch.len(), "teaching left mispredictions");
        }
        info!(model = name, words = batch.len(), epochs = outcome.history.epochs(), "model taught");
        Ok(outcome)
    }

    /// The validation split must leave at least one row on each side.
    fn check_batch_size(&self, batch: &TeachingBatch) -> Result<()> {
        let n = batch.len();
        let train = train_rows(n, self.settings.validation_split);
        if train == 0 || train >= n {
            return Err(Error::Validation(format!(
                "teaching batch of {n} words is too small for validation split {}",
                self.settings.validation_split
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_keeps_order() {
        let batch = TeachingBatch::from_json(r#"{"zumo": "g", "baúl": "h", "aire": "d"}"#).unwrap();
        assert_eq!(batch.words().collect::<Vec<_>>(), vec!["zumo", "baúl", "aire"]);
        assert_eq!(
            batch.labels().collect::<Vec<_>>(),
            vec![WordClass::Neither, WordClass::Hiatus, WordClass::Diphthong]
        );
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = TeachingBatch::from_json(r#"{"zumo": "x"}"#).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(TeachingBatch::from_json(r#"{"zumo": 1}"#).is_err());
        assert!(TeachingBatch::from_json("[]").is_err());
    }

    #[test]
    fn test_duplicate_and_empty_words_rejected() {
        assert!(TeachingBatch::from_tags([("a", "d"), ("a", "h")]).is_err());
        assert!(TeachingBatch::from_tags([(" ", "d")]).is_err());
    }

    #[test]
    fn test_single_word_batch_too_small() {
        let updater = TeachingUpdater::default();
        let batch = TeachingBatch::from_tags([("aire", "d")]).unwrap();
        assert!(updater.check_batch_size(&batch).is_err());
        let batch = TeachingBatch::from_tags([("aire", "d"), ("baúl", "h")]).unwrap();
        assert!(updater.check_batch_size(&batch).is_ok());
    }
}
