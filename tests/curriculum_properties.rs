//! Property tests for curriculum accumulation
//!
//! - Accumulator size never shrinks across stages
//! - Each stage's fit set extends the previous one

mod common;

use common::{corpus, ScriptedLearner};
use ensenar::corpus::{DatasetStager, StagingSettings};
use ensenar::tokenizer::VowelClassEncoder;
use ensenar::train::{CrossValidationTrainer, CurriculumPlan, CurriculumScheduler, TrainerSettings};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_accumulator_is_monotone(
        per_tier in 10usize..30,
        epochs in proptest::collection::vec(1usize..4, 3),
        seed in any::<u64>(),
    ) {
        let settings = StagingSettings { seed, ..StagingSettings::default() };
        let staged = DatasetStager::new(settings)
            .stage(&corpus(per_tier), &VowelClassEncoder::new())
            .unwrap();
        let plan = CurriculumPlan::new(
            staged.increments(3).unwrap(),
            epochs.clone(),
            vec![0.15, 0.25, 0.30],
        )
        .unwrap();
        let scheduler = CurriculumScheduler::new(TrainerSettings::default(), CrossValidationTrainer::default());
        let mut model = ScriptedLearner::new();
        let report = scheduler.run(&mut model, &plan).unwrap();

        let sizes: Vec<usize> = report.stages.iter().map(|s| s.examples).collect();
        prop_assert!(sizes.windows(2).all(|w| w[0] <= w[1]), "sizes {:?}", sizes);
        prop_assert_eq!(*sizes.last().unwrap(), staged.train().len());

        prop_assert_eq!(model.fit_count(), 3);
        for pair in model.fits.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            prop_assert!(next.len() >= prev.len());
            prop_assert_eq!(&next[..prev.len()], &prev[..]);
        }
    }

    #[test]
    fn prop_kfold_curriculum_fits_every_fold(per_tier in 10usize..20, stages in 1usize..=3) {
        let staged = common::staged(per_tier);
        let plan = CurriculumPlan::with_kfold(staged.increments(stages).unwrap(), vec![1; stages]).unwrap();
        let scheduler = CurriculumScheduler::new(TrainerSettings::default(), CrossValidationTrainer::default());
        let mut model = ScriptedLearner::new();
        let report = scheduler.run(&mut model, &plan).unwrap();
        prop_assert_eq!(model.fit_count(), 5 * stages);
        prop_assert_eq!(report.aggregated.segments.len(), 5 * stages);
        let sizes: Vec<usize> = report.stages.iter().map(|s| s.examples).collect();
        prop_assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn test_mismatched_plan_fails_before_fitting() {
    let staged = common::staged(10);
    let err = CurriculumPlan::new(staged.increments(3).unwrap(), vec![1, 1], vec![0.1, 0.2, 0.3]);
    assert!(matches!(err, Err(ensenar::Error::Validation(_))));
}

#[test]
fn test_stage_failure_names_stage() {
    let staged = common::staged(10);
    let plan = CurriculumPlan::new(staged.increments(3).unwrap(), vec![1, 1, 1], vec![0.2, 0.2, 0.2]).unwrap();
    let scheduler = CurriculumScheduler::new(TrainerSettings::default(), CrossValidationTrainer::default());
    let mut model = ScriptedLearner::new().failing_after(1);
    let err = scheduler.run(&mut model, &plan).unwrap_err();
    assert!(err.to_string().contains("stage 1"), "{err}");
}
