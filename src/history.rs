//! Session-scoped store of the latest training history per model

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::learner::AggregatedHistory;
use crate::{Error, Result};

/// Latest aggregated history of each model name.
///
/// Entries are replaced wholesale on every successful training call to the
/// same name; there is no versioning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryStore {
    entries: BTreeMap<String, AggregatedHistory>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `history` for `name`, replacing any previous entry.
    pub fn record(&mut self, name: impl Into<String>, history: AggregatedHistory) {
        let name = name.into();
        debug!(model = %name, epochs = history.epochs(), "history recorded");
        self.entries.insert(name, history);
    }

    pub fn get(&self, name: &str) -> Option<&AggregatedHistory> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AggregatedHistory> {
        self.entries.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load from a JSON file; a missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(Error::storage(format!("reading {}", path.display()), e)),
        };
        serde_json::from_str(&text)
            .map_err(|e| Error::Serialization(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("history export failed: {e}")))?;
        fs::write(path, json).map_err(|e| Error::storage(format!("writing {}", path.display()), e))
    }
}
