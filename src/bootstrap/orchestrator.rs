//! Bootstrap and reset of the model catalog

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::catalog::{Catalog, Regime, VariantKey};
use crate::corpus::StagedData;
use crate::history::HistoryStore;
use crate::registry::ModelRegistry;
use crate::search::{ArchitectureSearch, SearchInput, SearchObjective};
use crate::train::ModelTrainer;
use crate::Result;

/// What a bootstrap or reset did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapReport {
    /// Trained and saved, in catalog order
    pub trained: Vec<String>,
    /// Already present and left alone
    pub skipped: Vec<String>,
}

impl BootstrapReport {
    pub fn is_noop(&self) -> bool {
        self.trained.is_empty()
    }
}

/// Searches one architecture per regime and derives the catalog variants
/// from it.
///
/// Every variant of a regime starts from an in-memory clone of the same
/// searched model, so all of them begin from identical weights.
pub struct BootstrapOrchestrator<S> {
    catalog: Catalog,
    trainer: ModelTrainer,
    search: S,
    objective: SearchObjective,
}

impl<S: ArchitectureSearch> BootstrapOrchestrator<S> {
    pub fn new(catalog: Catalog, trainer: ModelTrainer, search: S) -> Self {
        Self {
            catalog,
            trainer,
            search,
            objective: SearchObjective::default(),
        }
    }

    pub fn with_objective(mut self, objective: SearchObjective) -> Self {
        self.objective = objective;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Catalog variants with no stored artifact.
    pub fn missing(&self, registry: &ModelRegistry<S::Model>) -> Result<Vec<VariantKey>> {
        let mut missing = Vec::new();
        for entry in self.catalog.entries() {
            if !registry.contains(&entry.name)? {
                missing.push(entry.key);
            }
        }
        Ok(missing)
    }

    /// Train only the catalog models that are not stored yet.
    pub fn bootstrap(
        &mut self,
        registry: &ModelRegistry<S::Model>,
        histories: &mut HistoryStore,
        data: &StagedData,
    ) -> Result<BootstrapReport> {
        let missing = self.missing(registry)?;
        let skipped = self
            .catalog
            .entries()
            .iter()
            .filter(|e| !missing.contains(&e.key))
            .map(|e| e.name.clone())
            .collect();
        let mut report = self.train_variants(&missing, registry, histories, data)?;
        report.skipped = skipped;
        if report.is_noop() {
            info!("all catalog models present, nothing to bootstrap");
        }
        Ok(report)
    }

    /// Retrain all eight catalog models, overwriting stored ones.
    pub fn reset(
        &mut self,
        registry: &ModelRegistry<S::Model>,
        histories: &mut HistoryStore,
        data: &StagedData,
    ) -> Result<BootstrapReport> {
        let all: Vec<VariantKey> = self.catalog.entries().iter().map(|e| e.key).collect();
        warn!(models = all.len(), "resetting catalog models");
        self.train_variants(&all, registry, histories, data)
    }

    fn train_variants(
        &mut self,
        keys: &[VariantKey],
        registry: &ModelRegistry<S::Model>,
        histories: &mut HistoryStore,
        data: &StagedData,
    ) -> Result<BootstrapReport> {
        let mut report = BootstrapReport::default();
        if keys.is_empty() {
            return Ok(report);
        }

        info!("searching plain architecture");
        let plain = self
            .search
            .search(SearchInput::Single(data.full()), self.objective)
            .map_err(|e| e.in_context("plain search"))?;
        info!("searching curriculum architecture");
        let stages = data.stacked(data.tiers().len())?;
        let curriculum = self
            .search
            .search(SearchInput::Staged(&stages), self.objective)
            .map_err(|e| e.in_context("curriculum search"))?;

        for entry in self.catalog.entries() {
            if !keys.contains(&entry.key) {
                continue;
            }
            let mut model = match entry.key.regime {
                Regime::Plain => plain.clone(),
                Regime::Curriculum => curriculum.clone(),
            };
            self.trainer.train_and_store(
                &entry.name,
                &mut model,
                &entry.strategy,
                data,
                registry,
                histories,
            )?;
            report.trained.push(entry.name.clone());
        }
        info!(trained = report.trained.len(), "catalog models trained");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::CatalogSettings;
    use crate::corpus::{DatasetStager, DifficultyTier, Example, WordClass};
    use crate::learner::{Architecture, SequenceClassifier};
    use crate::registry::ArtifactFormat;
    use crate::tokenizer::VowelClassEncoder;
    use crate::Error;
    use tempfile::TempDir;

    /// Returns the same fresh model every time and counts calls.
    struct FixedSearch {
        calls: usize,
        fail: bool,
    }

    impl ArchitectureSearch for FixedSearch {
        type Model = SequenceClassifier;

        fn search(&mut self, _input: SearchInput<'_>, _objective: SearchObjective) -> Result<SequenceClassifier> {
            self.calls += 1;
            if self.fail {
                return Err(Error::training("trial 0", "diverged"));
            }
            Architecture {
                hidden_units: 8,
                ..Architecture::default()
            }
            .build()
        }
    }

    fn staged() -> StagedData {
        let words = ["hueso", "frío", "lata", "baúl", "aire", "vaso", "piano", "caer", "mesa"];
        let mut examples = Vec::new();
        for tier in DifficultyTier::ALL {
            for i in 0..20 {
                let word = words[(i + 3 * tier.index()) % words.len()];
                examples.push(Example::new(word, tier, WordClass::ALL[i % 3]));
            }
        }
        DatasetStager::default()
            .stage(&examples, &VowelClassEncoder::new())
            .unwrap()
    }

    fn quick_catalog() -> Catalog {
        Catalog::new(&CatalogSettings {
            plain_epochs: 2,
            kfold_epochs: 1,
            curriculum_epochs: vec![1, 1, 1],
            curriculum_kfold_epochs: vec![1, 1, 1],
            ..CatalogSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_bootstrap_trains_missing_only() {
        let dir = TempDir::new().unwrap();
        let registry = ModelRegistry::open(dir.path(), ArtifactFormat::Json).unwrap();
        let mut histories = HistoryStore::new();
        let data = staged();
        let search = FixedSearch { calls: 0, fail: false };
        let mut orchestrator = BootstrapOrchestrator::new(quick_catalog(), ModelTrainer::default(), search);

        let first = orchestrator.bootstrap(&registry, &mut histories, &data).unwrap();
        assert_eq!(first.trained.len(), 8);
        assert_eq!(registry.list().unwrap().len(), 8);
        assert_eq!(histories.len(), 8);
        assert_eq!(orchestrator.search.calls, 2);

        registry.delete("curriculum_max").unwrap();
        let second = orchestrator.bootstrap(&registry, &mut histories, &data).unwrap();
        assert_eq!(second.trained, vec!["curriculum_max".to_string()]);
        assert_eq!(second.skipped.len(), 7);
        assert_eq!(orchestrator.search.calls, 4);

        let third = orchestrator.bootstrap(&registry, &mut histories, &data).unwrap();
        assert!(third.is_noop());
        assert_eq!(orchestrator.search.calls, 4);
    }

    #[test]
    fn test_curriculum_history_has_stage_segments() {
        let dir = TempDir::new().unwrap();
        let registry = ModelRegistry::open(dir.path(), ArtifactFormat::Json).unwrap();
        let mut histories = HistoryStore::new();
        let search = FixedSearch { calls: 0, fail: false };
        let mut orchestrator = BootstrapOrchestrator::new(quick_catalog(), ModelTrainer::default(), search);
        orchestrator.reset(&registry, &mut histories, &staged()).unwrap();
        assert_eq!(histories.get("curriculum_max").unwrap().segments.len(), 3);
        // 3 stages, 5 folds each
        assert_eq!(histories.get("curriculum_max_k_folds").unwrap().segments.len(), 15);
        assert_eq!(histories.get("max_k_folds").unwrap().segments.len(), 5);
    }

    #[test]
    fn test_search_failure_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let registry = ModelRegistry::open(dir.path(), ArtifactFormat::Json).unwrap();
        let mut histories = HistoryStore::new();
        let search = FixedSearch { calls: 0, fail: true };
        let mut orchestrator = BootstrapOrchestrator::new(quick_catalog(), ModelTrainer::default(), search);
        let err = orchestrator.bootstrap(&registry, &mut histories, &staged()).unwrap_err();
        assert!(err.to_string().contains("plain search"));
        assert!(registry.list().unwrap().is_empty());
        assert!(histories.is_empty());
    }
}
