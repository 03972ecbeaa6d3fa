//! Labeled corpus: loading, encoding and difficulty staging
//!
//! Examples are read once at startup from delimited files, stably sorted by
//! difficulty tier, encoded with a [`WordEncoder`](crate::tokenizer::WordEncoder)
//! and split into per-tier train/holdout sets. Everything here is read-only
//! after staging.

mod dataset;
mod example;
mod label;
mod loader;
mod stager;

pub use dataset::Dataset;
pub(crate) use dataset::train_rows;
pub use example::{DifficultyTier, Example, NUM_TIERS};
pub use label::{WordClass, NUM_CLASSES};
pub use loader::{CorpusLoader, CorpusSource};
pub use stager::{DatasetStager, StagedData, StagingSettings, TierSplit};
