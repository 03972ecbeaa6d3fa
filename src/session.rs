//! Orchestration session
//!
//! A [`Session`] owns everything one run of the tool works against: the
//! model registry, the history store, the staged corpus and the training
//! collaborators. Nothing is process-global, so independent sessions over
//! different registries can coexist.

use std::path::PathBuf;

use tracing::info;

use crate::bootstrap::{BootstrapOrchestrator, BootstrapReport, Catalog};
use crate::config::AppConfig;
use crate::corpus::{CorpusLoader, DatasetStager, StagedData};
use crate::eval::{self, ConfusionMatrix, ModelEvaluation, Prediction};
use crate::history::HistoryStore;
use crate::learner::{AggregatedHistory, Learner};
use crate::registry::ModelRegistry;
use crate::search::ArchitectureSearch;
use crate::tokenizer::VowelClassEncoder;
use crate::train::{ModelTrainer, TeachingBatch, TeachingOutcome, TeachingSettings, TeachingUpdater, TrainingStrategy};
use crate::{Error, Result};

/// Source model for [`Session::create`] when none is given.
pub const DEFAULT_BASE_MODEL: &str = "curriculum_under_trained";

/// Histories file inside the registry directory. The leading dot keeps it
/// out of the model listing.
pub const HISTORY_FILE: &str = ".histories.json";

pub struct Session<L> {
    registry: ModelRegistry<L>,
    histories: HistoryStore,
    history_path: PathBuf,
    data: StagedData,
    encoder: VowelClassEncoder,
    trainer: ModelTrainer,
    catalog: Catalog,
    teaching: TeachingUpdater,
    default_padding: usize,
    teaching_progress: Vec<TeachingOutcome>,
}

impl<L: Learner> Session<L> {
    /// Load and stage the configured corpus, then open the registry.
    pub fn open(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let encoder = VowelClassEncoder::new();
        let examples = CorpusLoader::new(config.corpus.separator).load_all(&config.corpus.sources)?;
        let data = DatasetStager::new(config.staging.clone()).stage(&examples, &encoder)?;
        Self::with_data(config, data)
    }

    /// Open the registry over already staged data.
    pub fn with_data(config: &AppConfig, data: StagedData) -> Result<Self> {
        let registry = ModelRegistry::open(&config.registry.dir, config.registry.format)?;
        let history_path = registry.root().join(HISTORY_FILE);
        let histories = HistoryStore::load(&history_path)?;
        let teaching = TeachingSettings {
            default_padding: config.encoding.default_padding,
            ..config.teaching.clone()
        };
        Ok(Self {
            registry,
            histories,
            history_path,
            data,
            encoder: VowelClassEncoder::new(),
            trainer: ModelTrainer::new(config.training.trainer_settings(), config.training.splitter()),
            catalog: Catalog::new(&config.training.catalog)?,
            teaching: TeachingUpdater::new(teaching),
            default_padding: config.encoding.default_padding,
            teaching_progress: Vec::new(),
        })
    }

    pub fn registry(&self) -> &ModelRegistry<L> {
        &self.registry
    }

    pub fn data(&self) -> &StagedData {
        &self.data
    }

    pub fn histories(&self) -> &HistoryStore {
        &self.histories
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Teaching calls made through this session, oldest first.
    pub fn teaching_progress(&self) -> &[TeachingOutcome] {
        &self.teaching_progress
    }

    /// Train the catalog models that are not stored yet.
    pub fn bootstrap<S>(&mut self, search: S) -> Result<BootstrapReport>
    where
        S: ArchitectureSearch<Model = L>,
    {
        let mut orchestrator = BootstrapOrchestrator::new(self.catalog.clone(), self.trainer.clone(), search);
        let result = orchestrator.bootstrap(&self.registry, &mut self.histories, &self.data);
        self.save_histories()?;
        result
    }

    /// Retrain every catalog model.
    pub fn reset<S>(&mut self, search: S) -> Result<BootstrapReport>
    where
        S: ArchitectureSearch<Model = L>,
    {
        let mut orchestrator = BootstrapOrchestrator::new(self.catalog.clone(), self.trainer.clone(), search);
        let result = orchestrator.reset(&self.registry, &mut self.histories, &self.data);
        self.save_histories()?;
        result
    }

    pub fn list(&self) -> Result<Vec<String>> {
        self.registry.list()
    }

    /// Copy `source` (default [`DEFAULT_BASE_MODEL`]) to a new name.
    pub fn create(&self, name: &str, source: Option<&str>) -> Result<()> {
        let source = source.unwrap_or(DEFAULT_BASE_MODEL);
        self.registry.duplicate(source, name)?;
        info!(model = name, source, "model created");
        Ok(())
    }

    /// Remove a model and its recorded history.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.registry.delete(name)?;
        if self.histories.remove(name).is_some() {
            self.save_histories()?;
        }
        Ok(())
    }

    pub fn teach(&mut self, name: &str, batch: &TeachingBatch) -> Result<TeachingOutcome> {
        let outcome = self.teaching.teach(&self.registry, name, batch, &self.encoder)?;
        self.teaching_progress.push(outcome.clone());
        Ok(outcome)
    }

    pub fn predict(&self, name: &str, word: &str) -> Result<Prediction> {
        let model = self.registry.load(name)?;
        eval::predict_word(&model, word, &self.encoder, self.default_padding)
    }

    /// Held-out metrics of each named model, in the order given.
    pub fn evaluate(&self, names: &[String]) -> Result<Vec<ModelEvaluation>> {
        eval::evaluate_models(&self.registry, names, self.data.test())
    }

    pub fn confusion_matrix(&self, name: &str) -> Result<ConfusionMatrix> {
        let model = self.registry.load(name)?;
        eval::confusion_matrix(&model, self.data.test())
    }

    /// Re-run a strategy on a stored model, replacing artifact and history.
    pub fn retrain(&mut self, name: &str, strategy: &TrainingStrategy) -> Result<AggregatedHistory> {
        let mut model = self.registry.load(name)?;
        let history = self.trainer.train_and_store(
            name,
            &mut model,
            strategy,
            &self.data,
            &self.registry,
            &mut self.histories,
        )?;
        self.save_histories()?;
        Ok(history)
    }

    /// Latest recorded history of `name`.
    pub fn history(&self, name: &str) -> Result<&AggregatedHistory> {
        self.histories
            .get(name)
            .ok_or_else(|| Error::NotFound { name: name.to_string() })
    }

    fn save_histories(&self) -> Result<()> {
        self.histories.save(&self.history_path)
    }
}
