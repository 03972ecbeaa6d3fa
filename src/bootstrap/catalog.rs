//! The fixed model catalog and its strategy table

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::train::TrainingStrategy;
use crate::{Error, Result};

/// Whether a variant sees the corpus in difficulty order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Plain,
    Curriculum,
}

/// Epoch budget of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    Full,
    UnderTrained,
}

/// Single validated fit or k-fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    SinglePass,
    KFold,
}

/// Structured identity of a catalog model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantKey {
    pub regime: Regime,
    pub budget: Budget,
    pub validation: ValidationMode,
}

impl VariantKey {
    pub const fn new(regime: Regime, budget: Budget, validation: ValidationMode) -> Self {
        Self {
            regime,
            budget,
            validation,
        }
    }

    /// All eight variants, plain before curriculum, full before
    /// under-trained, single-pass before k-fold.
    pub fn all() -> Vec<VariantKey> {
        let mut keys = Vec::with_capacity(8);
        for regime in [Regime::Plain, Regime::Curriculum] {
            for budget in [Budget::Full, Budget::UnderTrained] {
                for validation in [ValidationMode::SinglePass, ValidationMode::KFold] {
                    keys.push(Self::new(regime, budget, validation));
                }
            }
        }
        keys
    }

    /// Registry name, e.g. `curriculum_under_trained_k_folds`.
    pub fn name(&self) -> String {
        let prefix = match self.regime {
            Regime::Plain => "",
            Regime::Curriculum => "curriculum_",
        };
        let budget = match self.budget {
            Budget::Full => "max",
            Budget::UnderTrained => "under_trained",
        };
        let suffix = match self.validation {
            ValidationMode::SinglePass => "",
            ValidationMode::KFold => "_k_folds",
        };
        format!("{prefix}{budget}{suffix}")
    }

    /// Inverse of [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|key| key.name() == name)
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Epoch and split values behind the strategy table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub plain_epochs: usize,
    pub plain_under_epochs: usize,
    pub plain_validation_split: f32,
    pub kfold_epochs: usize,
    pub kfold_under_epochs: usize,
    pub curriculum_epochs: Vec<usize>,
    pub curriculum_validation_splits: Vec<f32>,
    pub curriculum_under_epochs: Vec<usize>,
    pub curriculum_under_validation_splits: Vec<f32>,
    pub curriculum_kfold_epochs: Vec<usize>,
    pub curriculum_kfold_under_epochs: Vec<usize>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            plain_epochs: 15,
            plain_under_epochs: 1,
            plain_validation_split: 0.25,
            kfold_epochs: 15,
            kfold_under_epochs: 1,
            curriculum_epochs: vec![2, 4, 8],
            curriculum_validation_splits: vec![0.15, 0.25, 0.30],
            curriculum_under_epochs: vec![1, 1],
            curriculum_under_validation_splits: vec![0.15, 0.25],
            curriculum_kfold_epochs: vec![3, 8, 15],
            curriculum_kfold_under_epochs: vec![1, 1],
        }
    }
}

impl CatalogSettings {
    /// Strategy for a variant.
    pub fn strategy(&self, key: VariantKey) -> TrainingStrategy {
        use Budget::*;
        use Regime::*;
        use ValidationMode::*;
        match (key.regime, key.budget, key.validation) {
            (Plain, budget, SinglePass) => TrainingStrategy::Plain {
                epochs: match budget {
                    Full => self.plain_epochs,
                    UnderTrained => self.plain_under_epochs,
                },
                validation_split: self.plain_validation_split,
            },
            (Plain, Full, KFold) => TrainingStrategy::KFold {
                epochs: self.kfold_epochs,
            },
            (Plain, UnderTrained, KFold) => TrainingStrategy::KFold {
                epochs: self.kfold_under_epochs,
            },
            (Curriculum, Full, SinglePass) => TrainingStrategy::Curriculum {
                epochs: self.curriculum_epochs.clone(),
                validation_splits: self.curriculum_validation_splits.clone(),
            },
            (Curriculum, UnderTrained, SinglePass) => TrainingStrategy::Curriculum {
                epochs: self.curriculum_under_epochs.clone(),
                validation_splits: self.curriculum_under_validation_splits.clone(),
            },
            (Curriculum, Full, KFold) => TrainingStrategy::CurriculumKFold {
                epochs: self.curriculum_kfold_epochs.clone(),
            },
            (Curriculum, UnderTrained, KFold) => TrainingStrategy::CurriculumKFold {
                epochs: self.curriculum_kfold_under_epochs.clone(),
            },
        }
    }
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: VariantKey,
    pub name: String,
    pub strategy: TrainingStrategy,
}

/// The eight expected models and how each is trained.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build and validate the table.
    pub fn new(settings: &CatalogSettings) -> Result<Self> {
        let entries: Vec<CatalogEntry> = VariantKey::all()
            .into_iter()
            .map(|key| CatalogEntry {
                key,
                name: key.name(),
                strategy: settings.strategy(key),
            })
            .collect();
        for entry in &entries {
            entry
                .strategy
                .validate()
                .map_err(|e| Error::Config(format!("catalog entry {}: {e}", entry.name)))?;
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, key: VariantKey) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}
