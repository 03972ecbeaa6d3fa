//! Property tests for stratified k-fold training
//!
//! - Five folds give five history segments
//! - Segment lengths match each fold's (possibly early-stopped) epochs
//! - Folds partition the rows and keep class proportions

mod common;

use common::ScriptedLearner;
use ensenar::train::{CrossValidationTrainer, StratifiedKFold, TrainerSettings};
use proptest::collection::vec;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_five_segments(
        per_tier in 8usize..25,
        epochs in 1usize..8,
        script in vec(0.0f32..1.0, 1..6),
        patience in 0usize..3,
    ) {
        let staged = common::staged(per_tier);
        let settings = TrainerSettings { patience, ..TrainerSettings::default() };
        let trainer = CrossValidationTrainer::new(StratifiedKFold::default(), settings);
        let mut model = ScriptedLearner::new().with_val_accuracy(script);
        let report = trainer.run(&mut model, staged.train(), epochs).unwrap();

        prop_assert_eq!(report.folds.len(), 5);
        prop_assert_eq!(report.aggregated.segments.len(), 5);
        for (segment, fold) in report.aggregated.segments.iter().zip(&report.folds) {
            prop_assert_eq!(*segment, fold.epochs());
            prop_assert!(*segment >= 1 && *segment <= epochs);
        }
        let total: usize = report.aggregated.segments.iter().sum();
        prop_assert_eq!(total, report.aggregated.epochs());
    }

    #[test]
    fn prop_folds_partition_rows(classes in vec(0usize..3, 10..200), seed in any::<u64>()) {
        let splitter = StratifiedKFold::new(5).with_seed(seed);
        let folds = splitter.split(&classes).unwrap();
        let mut seen = vec![0usize; classes.len()];
        for (train, test) in &folds {
            prop_assert_eq!(train.len() + test.len(), classes.len());
            for &i in test {
                seen[i] += 1;
            }
        }
        prop_assert!(seen.iter().all(|&c| c == 1));

        let sizes: Vec<usize> = folds.iter().map(|(_, t)| t.len()).collect();
        let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
        prop_assert!(max - min <= 1, "fold sizes {:?}", sizes);

        for class in 0..3 {
            let total = classes.iter().filter(|&&c| c == class).count();
            for (_, test) in &folds {
                let in_fold = test.iter().filter(|&&i| classes[i] == class).count();
                prop_assert!(in_fold * 5 <= total + 5 && in_fold * 5 + 5 >= total);
            }
        }
    }
}

#[test]
fn test_fold_failure_names_fold() {
    let staged = common::staged(10);
    let mut model = ScriptedLearner::new().failing_after(2);
    let err = CrossValidationTrainer::default()
        .run(&mut model, staged.train(), 1)
        .unwrap_err();
    assert!(err.to_string().contains("fold 2"), "{err}");
}
