//! Difficulty-tier staging for curriculum training

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::dataset::{holdout_rows, Dataset};
use super::example::{DifficultyTier, Example, NUM_TIERS};
use super::label::{WordClass, NUM_CLASSES};
use crate::tokenizer::{encode_words, WordEncoder};
use crate::{Error, Result};

/// Staging parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingSettings {
    /// Fraction of each tier held out for testing
    pub holdout_fraction: f32,
    /// Seed for the per-tier holdout shuffle
    pub seed: u64,
    /// Fixed encoded sequence length
    pub seq_len: usize,
    /// Explicit row indices where tiers 1 and 2 start. When absent the
    /// boundaries are read from each example's difficulty.
    pub tier_boundaries: Option<[usize; 2]>,
}

impl Default for StagingSettings {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.10,
            seed: 42,
            seq_len: 16,
            tier_boundaries: None,
        }
    }
}

/// One tier's train/holdout split.
#[derive(Debug, Clone)]
pub struct TierSplit {
    pub tier: DifficultyTier,
    pub train: Dataset,
    pub holdout: Dataset,
    /// Unencoded words of the train split, row-aligned with `train`
    pub train_words: Vec<String>,
}

/// Output of [`DatasetStager::stage`].
#[derive(Debug, Clone)]
pub struct StagedData {
    tiers: Vec<TierSplit>,
    train: Dataset,
    test: Dataset,
    full: Dataset,
}

impl StagedData {
    /// Assemble from tier splits. `full` is the whole encoded corpus.
    pub fn from_tiers(tiers: Vec<TierSplit>, full: Dataset) -> Result<Self> {
        if tiers.len() != NUM_TIERS {
            return Err(Error::Validation(format!(
                "expected {NUM_TIERS} tiers, got {}",
                tiers.len()
            )));
        }
        let seq_len = full.seq_len();
        let trains: Vec<&Dataset> = tiers.iter().map(|t| &t.train).collect();
        let holdouts: Vec<&Dataset> = tiers.iter().map(|t| &t.holdout).collect();
        let train = Dataset::concat(&trains, seq_len)?;
        let test = Dataset::concat(&holdouts, seq_len)?;
        Ok(Self {
            tiers,
            train,
            test,
            full,
        })
    }

    pub fn tiers(&self) -> &[TierSplit] {
        &self.tiers
    }

    /// Per-tier train splits concatenated in tier order.
    pub fn train(&self) -> &Dataset {
        &self.train
    }

    /// Per-tier holdouts concatenated in tier order.
    pub fn test(&self) -> &Dataset {
        &self.test
    }

    /// The whole encoded corpus, before any holdout.
    pub fn full(&self) -> &Dataset {
        &self.full
    }

    pub fn seq_len(&self) -> usize {
        self.full.seq_len()
    }

    /// Train splits of the first `n` tiers, one dataset per tier.
    pub fn increments(&self, n: usize) -> Result<Vec<Dataset>> {
        self.check_tier_count(n)?;
        Ok(self.tiers[..n].iter().map(|t| t.train.clone()).collect())
    }

    /// Union of the train splits of tiers `0..n`.
    pub fn cumulative(&self, n: usize) -> Result<Dataset> {
        self.check_tier_count(n)?;
        let parts: Vec<&Dataset> = self.tiers[..n].iter().map(|t| &t.train).collect();
        Dataset::concat(&parts, self.seq_len())
    }

    /// Cumulative unions `{0}, {0,1}, …` up to `n` tiers.
    pub fn stacked(&self, n: usize) -> Result<Vec<Dataset>> {
        (1..=n).map(|k| self.cumulative(k)).collect()
    }

    fn check_tier_count(&self, n: usize) -> Result<()> {
        if n == 0 || n > self.tiers.len() {
            return Err(Error::Validation(format!(
                "tier count must be in 1..={}, got {n}",
                self.tiers.len()
            )));
        }
        Ok(())
    }
}

/// Partitions a difficulty-sorted corpus into tiers and holdout splits.
#[derive(Debug, Clone, Default)]
pub struct DatasetStager {
    settings: StagingSettings,
}

impl DatasetStager {
    pub fn new(settings: StagingSettings) -> Self {
        Self { settings }
    }

    /// Stage a corpus. `examples` must already be sorted by difficulty.
    pub fn stage<E: WordEncoder + ?Sized>(
        &self,
        examples: &[Example],
        encoder: &E,
    ) -> Result<StagedData> {
        if !(self.settings.holdout_fraction > 0.0 && self.settings.holdout_fraction < 1.0) {
            return Err(Error::Validation(format!(
                "holdout fraction must be in (0, 1), got {}",
                self.settings.holdout_fraction
            )));
        }
        let ranges = self.tier_ranges(examples)?;
        let seq_len = self.settings.seq_len;

        let all_words: Vec<&str> = examples.iter().map(|e| e.word.as_str()).collect();
        let all_classes: Vec<_> = examples.iter().map(|e| e.label).collect();
        let full = encoded(encoder, &all_words, &all_classes, seq_len)?;

        let mut tiers = Vec::with_capacity(NUM_TIERS);
        for (tier, (start, end)) in DifficultyTier::ALL.into_iter().zip(ranges) {
            let slice = &examples[start..end];
            if slice.is_empty() {
                return Err(Error::Validation(format!("tier {tier} has no examples")));
            }
            let (train_idx, holdout_idx) = self.holdout_split(slice.len(), tier);
            let pick = |idx: &[usize]| -> (Vec<&str>, Vec<_>) {
                idx.iter()
                    .map(|&i| (slice[i].word.as_str(), slice[i].label))
                    .unzip()
            };
            let (train_words, train_classes) = pick(&train_idx);
            let (holdout_words, holdout_classes) = pick(&holdout_idx);
            tiers.push(TierSplit {
                tier,
                train: encoded(encoder, &train_words, &train_classes, seq_len)?,
                holdout: encoded(encoder, &holdout_words, &holdout_classes, seq_len)?,
                train_words: train_words.into_iter().map(str::to_string).collect(),
            });
        }

        let staged = StagedData::from_tiers(tiers, full)?;
        info!(
            train = staged.train().len(),
            test = staged.test().len(),
            tier_sizes = ?staged.tiers().iter().map(|t| t.train.len()).collect::<Vec<_>>(),
            "corpus staged"
        );
        Ok(staged)
    }

    /// Half-open row ranges of each tier.
    fn tier_ranges(&self, examples: &[Example]) -> Result<[(usize, usize); NUM_TIERS]> {
        let n = examples.len();
        let [b1, b2] = match self.settings.tier_boundaries {
            Some(bounds) => bounds,
            None => {
                if examples.windows(2).any(|w| w[0].difficulty > w[1].difficulty) {
                    return Err(Error::Validation(
                        "examples must be sorted by difficulty".to_string(),
                    ));
                }
                let first = |tier: DifficultyTier| {
                    examples.iter().position(|e| e.difficulty >= tier).unwrap_or(n)
                };
                [first(DifficultyTier::Medium), first(DifficultyTier::Hard)]
            }
        };
        if b1 > b2 || b2 > n {
            return Err(Error::Validation(format!(
                "tier boundaries [{b1}, {b2}] are not ordered within {n} examples"
            )));
        }
        Ok([(0, b1), (b1, b2), (b2, n)])
    }

    /// Shuffled split into (train, holdout) positions.
    ///
    /// Holdout size is `ceil(len * fraction)`; a tier of at least two rows
    /// always keeps one row on each side.
    fn holdout_split(&self, len: usize, tier: DifficultyTier) -> (Vec<usize>, Vec<usize>) {
        let mut order: Vec<usize> = (0..len).collect();
        let mut rng = StdRng::seed_from_u64(self.settings.seed.wrapping_add(tier.index() as u64));
        order.shuffle(&mut rng);
        let mut n_holdout = holdout_rows(len, self.settings.holdout_fraction);
        if len >= 2 {
            n_holdout = n_holdout.clamp(1, len - 1);
        } else {
            n_holdout = 0;
        }
        let holdout = order[..n_holdout].to_vec();
        let train = order[n_holdout..].to_vec();
        (train, holdout)
    }
}

fn encoded<E: WordEncoder + ?Sized>(
    encoder: &E,
    words: &[&str],
    classes: &[WordClass],
    seq_len: usize,
) -> Result<Dataset> {
    let features = encode_words(encoder, words, seq_len)?;
    let mut labels = ndarray::Array2::zeros((classes.len(), NUM_CLASSES));
    for (i, class) in classes.iter().enumerate() {
        labels[[i, class.index()]] = 1.0;
    }
    Dataset::new(features, labels)
}
