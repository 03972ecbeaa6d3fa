//! Range checks on a loaded configuration

use super::schema::AppConfig;
use crate::bootstrap::Catalog;
use crate::{Error, Result};

fn fraction(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} must be in (0, 1), got {value}")))
    }
}

fn positive(name: &str, value: usize) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} must be > 0")))
    }
}

impl AppConfig {
    /// Reject values no run could use. Paths are not checked for existence.
    pub fn validate(&self) -> Result<()> {
        if self.registry.dir.as_os_str().is_empty() {
            return Err(Error::Config("registry.dir cannot be empty".into()));
        }
        if self.corpus.sources.is_empty() {
            return Err(Error::Config("corpus.sources cannot be empty".into()));
        }

        fraction("staging.holdout_fraction", self.staging.holdout_fraction)?;
        positive("staging.seq_len", self.staging.seq_len)?;
        if self.model.seq_len != self.staging.seq_len {
            return Err(Error::Config(format!(
                "model.seq_len ({}) must equal staging.seq_len ({})",
                self.model.seq_len, self.staging.seq_len
            )));
        }
        self.model
            .validate()
            .map_err(|e| Error::Config(format!("model: {e}")))?;
        if self.encoding.default_padding > self.staging.seq_len {
            return Err(Error::Config(format!(
                "encoding.default_padding ({}) exceeds staging.seq_len ({})",
                self.encoding.default_padding, self.staging.seq_len
            )));
        }

        positive("training.batch_size", self.training.batch_size)?;
        if self.training.folds < 2 {
            return Err(Error::Config(format!(
                "training.folds must be >= 2, got {}",
                self.training.folds
            )));
        }
        Catalog::new(&self.training.catalog)?;

        positive("teaching.epochs", self.teaching.epochs)?;
        positive("teaching.batch_size", self.teaching.batch_size)?;
        fraction("teaching.validation_split", self.teaching.validation_split)?;
        if !(self.teaching.learning_rate > 0.0 && self.teaching.learning_rate <= 1.0) {
            return Err(Error::Config(format!(
                "teaching.learning_rate must be in (0, 1], got {}",
                self.teaching.learning_rate
            )));
        }

        positive("search.max_trials", self.search.max_trials)?;
        positive("search.epochs", self.search.epochs)?;
        fraction("search.validation_split", self.search.validation_split)?;
        if self.search.stage_epochs.len() < 3 || self.search.stage_epochs.contains(&0) {
            return Err(Error::Config(format!(
                "search.stage_epochs needs a positive count per tier, got {:?}",
                self.search.stage_epochs
            )));
        }
        Ok(())
    }
}
