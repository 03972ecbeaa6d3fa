//! YAML schema for the application configuration
//!
//! Every section has defaults, so an empty or absent file yields the
//! standard setup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::bootstrap::CatalogSettings;
use crate::corpus::{CorpusSource, StagingSettings};
use crate::learner::Architecture;
use crate::registry::ArtifactFormat;
use crate::search::SearchSettings;
use crate::train::{StratifiedKFold, TeachingSettings, TrainerSettings};

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    pub corpus: CorpusConfig,
    pub staging: StagingSettings,
    pub encoding: EncodingConfig,
    /// Base architecture the search perturbs
    pub model: Architecture,
    pub training: TrainingConfig,
    pub teaching: TeachingSettings,
    pub search: SearchSettings,
}

/// Where named models live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub dir: PathBuf,
    pub format: ArtifactFormat,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            format: ArtifactFormat::Json,
        }
    }
}

/// Labeled word sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub separator: char,
    pub sources: Vec<CorpusSource>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            separator: ';',
            sources: vec![
                CorpusSource::new("database/diptongos.csv", 3),
                CorpusSource::new("database/hiatos.csv", 3),
                CorpusSource::new("database/general.csv", 2),
            ],
        }
    }
}

/// Word encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Minimum padded length for prediction and teaching
    pub default_padding: usize,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self { default_padding: 16 }
    }
}

/// Catalog training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub batch_size: usize,
    pub patience: usize,
    pub folds: usize,
    pub fold_seed: u64,
    pub catalog: CatalogSettings,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let trainer = TrainerSettings::default();
        Self {
            batch_size: trainer.batch_size,
            patience: trainer.patience,
            folds: 5,
            fold_seed: 42,
            catalog: CatalogSettings::default(),
        }
    }
}

impl TrainingConfig {
    pub fn trainer_settings(&self) -> TrainerSettings {
        TrainerSettings {
            batch_size: self.batch_size,
            patience: self.patience,
        }
    }

    pub fn splitter(&self) -> StratifiedKFold {
        StratifiedKFold::new(self.folds).with_seed(self.fold_seed)
    }
}
