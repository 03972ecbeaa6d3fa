//! Teaching updates against a stored model

mod common;

use std::fs;

use common::ScriptedLearner;
use ensenar::corpus::WordClass;
use ensenar::registry::{ArtifactFormat, ModelRegistry};
use ensenar::tokenizer::VowelClassEncoder;
use ensenar::train::{TeachingBatch, TeachingSettings, TeachingUpdater};
use ensenar::Error;
use tempfile::TempDir;

fn batch() -> TeachingBatch {
    TeachingBatch::from_tags([("aire", "d"), ("baúl", "h"), ("mesa", "g")]).unwrap()
}

#[test]
fn test_three_words_give_three_rows() {
    let dir = TempDir::new().unwrap();
    let registry = ModelRegistry::open(dir.path(), ArtifactFormat::Json).unwrap();
    // No entry of the output rounds to 1
    registry.save(&ScriptedLearner::new(), "max").unwrap();

    let outcome = TeachingUpdater::default()
        .teach(&registry, "max", &batch(), &VowelClassEncoder::new())
        .unwrap();
    assert_eq!(outcome.summary.len(), 3);
    let expected: Vec<WordClass> = outcome.summary.iter().map(|r| r.expected).collect();
    assert_eq!(expected, WordClass::ALL.to_vec());
    for row in &outcome.summary {
        assert!(WordClass::ALL.contains(&row.predicted));
    }
    assert_eq!(outcome.mistakes().count(), 2);
    assert_eq!(registry.load("max").unwrap().fit_count(), 1);
}

#[test]
fn test_failed_fit_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let registry = ModelRegistry::open(dir.path(), ArtifactFormat::Json).unwrap();
    registry.save(&ScriptedLearner::new().failing_after(0), "max").unwrap();
    let path = registry.path_for("max").unwrap();
    let before = fs::read(&path).unwrap();

    let err = TeachingUpdater::default()
        .teach(&registry, "max", &batch(), &VowelClassEncoder::new())
        .unwrap_err();
    assert!(matches!(err, Error::Training { .. }));
    assert!(err.to_string().contains("teaching max"));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_unknown_model_is_not_found() {
    let dir = TempDir::new().unwrap();
    let registry = ModelRegistry::<ScriptedLearner>::open(dir.path(), ArtifactFormat::Json).unwrap();
    let err = TeachingUpdater::default()
        .teach(&registry, "ghost", &batch(), &VowelClassEncoder::new())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_word_longer_than_model_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    let registry = ModelRegistry::open(dir.path(), ArtifactFormat::Json).unwrap();
    registry.save(&ScriptedLearner::new(), "max").unwrap();
    let path = registry.path_for("max").unwrap();
    let before = fs::read(&path).unwrap();

    let long = TeachingBatch::from_tags([
        ("electroencefalografista", "g"),
        ("baúl", "h"),
        ("aire", "d"),
    ])
    .unwrap();
    let err = TeachingUpdater::default()
        .teach(&registry, "max", &long, &VowelClassEncoder::new())
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_single_word_batch_is_too_small() {
    let dir = TempDir::new().unwrap();
    let registry = ModelRegistry::open(dir.path(), ArtifactFormat::Json).unwrap();
    registry.save(&ScriptedLearner::new(), "max").unwrap();
    let one = TeachingBatch::from_tags([("aire", "d")]).unwrap();
    let err = TeachingUpdater::new(TeachingSettings::default())
        .teach(&registry, "max", &one, &VowelClassEncoder::new())
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_five_word_batch_trains_on_four() {
    let dir = TempDir::new().unwrap();
    let registry = ModelRegistry::open(dir.path(), ArtifactFormat::Json).unwrap();
    registry.save(&ScriptedLearner::new(), "max").unwrap();
    let five = TeachingBatch::from_tags([
        ("aire", "d"),
        ("baúl", "h"),
        ("mesa", "g"),
        ("piano", "d"),
        ("frío", "h"),
    ])
    .unwrap();
    TeachingUpdater::default()
        .teach(&registry, "max", &five, &VowelClassEncoder::new())
        .unwrap();
    assert_eq!(registry.load("max").unwrap().partitions, vec![(4, 1)]);
}

#[test]
fn test_padding_counts_punctuation() {
    let dir = TempDir::new().unwrap();
    let registry = ModelRegistry::open(dir.path(), ArtifactFormat::Json).unwrap();
    registry.save(&ScriptedLearner::new(), "max").unwrap();
    // 15 letters fit the 16 inputs, the trailing marks push it to 17
    let marked = TeachingBatch::from_tags([
        ("anticonstitucio!!", "d"),
        ("baúl", "h"),
        ("aire", "d"),
    ])
    .unwrap();
    let err = TeachingUpdater::default()
        .teach(&registry, "max", &marked, &VowelClassEncoder::new())
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(registry.load("max").unwrap().fit_count(), 0);
}
