//! Labeled examples and difficulty tiers

use std::fmt;

use serde::{Deserialize, Serialize};

use super::label::WordClass;
use crate::{Error, Result};

/// Number of difficulty tiers.
pub const NUM_TIERS: usize = 3;

/// Ordinal difficulty grouping, ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    /// All tiers in curriculum order.
    pub const ALL: [DifficultyTier; NUM_TIERS] =
        [DifficultyTier::Easy, DifficultyTier::Medium, DifficultyTier::Hard];

    pub fn index(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| Error::Validation(format!("difficulty must be 0, 1 or 2, got {index}")))
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// A single labeled word. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub word: String,
    pub difficulty: DifficultyTier,
    pub label: WordClass,
}

impl Example {
    pub fn new(word: impl Into<String>, difficulty: DifficultyTier, label: WordClass) -> Self {
        Self {
            word: word.into(),
            difficulty,
            label,
        }
    }
}
