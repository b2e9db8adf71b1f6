//! Property-based tests for the patching pipeline invariants.

use proptest::prelude::*;

use cp_config::MergeWeighting;
use cp_core::mock_predictor::{BucketPredictor, MajorityPredictor, ThresholdPredictor};
use cp_core::partition::partition;
use cp_core::patches::{PatchEnsemble, PatchStatus};
use cp_core::redefine::{redefine, strip_augmentation, with_base_label};
use cp_core::{
    Correctness, Dataset, Predictor, Record, RegionDecider, RegionDecision, Result, Schema,
    SlidingBatchStore,
};

const CLASSES: [&str; 3] = ["a", "b", "c"];

fn dataset(rows: &[(f64, usize)]) -> Dataset {
    let records = rows.iter().map(|&(x, l)| Record::new(vec![x], l)).collect();
    match Dataset::from_records(Schema::numeric(1, &CLASSES), records) {
        Ok(data) => data,
        Err(err) => panic!("generated rows must fit the schema: {}", err),
    }
}

fn trained_base() -> ThresholdPredictor {
    let mut base = ThresholdPredictor::new(0, 0.5, 0, 1);
    base.train(&dataset(&[(0.0, 0)])).unwrap();
    base
}

fn rows() -> impl Strategy<Value = Vec<(f64, usize)>> {
    prop::collection::vec((0.0..1.0f64, 0usize..3), 1..40)
}

fn sorted(mut cuts: Vec<f64>) -> Vec<f64> {
    cuts.sort_by(|a, b| a.total_cmp(b));
    cuts.dedup();
    cuts
}

fn cuts() -> impl Strategy<Value = Vec<f64>> {
    let raw = prop::collection::vec(0.05..0.95f64, 0..4);
    raw.prop_map(sorted)
}

// ============================================================================
// Sliding window
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The store never exceeds its capacity and evicts oldest first.
    #[test]
    fn window_is_bounded_fifo(
        capacity in 1usize..6,
        sizes in prop::collection::vec(1usize..5, 0..30),
    ) {
        let mut store = SlidingBatchStore::new(capacity);
        for (index, size) in sizes.iter().enumerate() {
            let rows: Vec<(f64, usize)> = (0..*size).map(|_| (index as f64, 0)).collect();
            store.add_batch(dataset(&rows));
            prop_assert!(store.len() <= capacity);

            let oldest = index + 1 - store.len();
            let first = store.get_batch(0).unwrap();
            prop_assert_eq!(first.records()[0].features()[0], oldest as f64);
        }
    }

    /// Batch-age weighting sums to the offset-weighted record count.
    #[test]
    fn batch_age_weights_follow_offsets(sizes in prop::collection::vec(1usize..5, 1..6)) {
        let mut store = SlidingBatchStore::new(sizes.len());
        for size in &sizes {
            store.add_batch(dataset(&vec![(0.0, 0); *size]));
        }
        let merged = store.merged(MergeWeighting::BatchAge).unwrap();
        let expected: f64 = sizes
            .iter()
            .enumerate()
            .map(|(offset, size)| offset.max(1) as f64 * *size as f64)
            .sum();
        prop_assert_eq!(merged.len(), sizes.iter().sum::<usize>());
        prop_assert!((merged.total_weight() - expected).abs() < 1e-9);

        let uniform = store.merged(MergeWeighting::Uniform).unwrap();
        prop_assert!((uniform.total_weight() - merged.len() as f64).abs() < 1e-9);
    }
}

// ============================================================================
// Problem redefinition
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Labels are wrong/right and `right` means the base was correct.
    #[test]
    fn redefined_labels_track_base_correctness(rows in rows(), augment in any::<bool>()) {
        let base = trained_base();
        let data = dataset(&rows);
        let redefined = redefine(&data, &base, augment).unwrap();

        prop_assert_eq!(redefined.dataset.len(), data.len());
        prop_assert_eq!(redefined.failures, 0);
        for (original, relabelled) in data.iter().zip(redefined.dataset.iter()) {
            let right = base.classify(original).unwrap() == original.label();
            let expected = if right { Correctness::Right } else { Correctness::Wrong };
            prop_assert_eq!(relabelled.label(), expected.label());
        }
    }

    /// Prepending then stripping the base label restores the record.
    #[test]
    fn augmentation_round_trips(
        features in prop::collection::vec(-1e6..1e6f64, 0..8),
        label in 0usize..3,
        predicted in prop::option::of(0usize..3),
    ) {
        let record = Record::new(features, label);
        let augmented = with_base_label(&record, predicted);
        prop_assert_eq!(augmented.num_features(), record.num_features() + 1);
        prop_assert_eq!(strip_augmentation(&augmented), record);
    }
}

// ============================================================================
// Partitioning and patches
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every record decided wrong lands in its own region's subset, and
    /// nothing decided right lands anywhere.
    #[test]
    fn partition_is_complete_and_exact(rows in rows(), cuts in cuts()) {
        let base = trained_base();
        let data = dataset(&rows);
        let redefined = redefine(&data, &base, false).unwrap();
        let mut decider = RegionDecider::new(Box::new(BucketPredictor::new(0, cuts)));
        decider.train(&redefined.dataset).unwrap();

        let subsets = partition(&data, &decider);
        prop_assert_eq!(subsets.skipped(), 0);

        let mut expected = vec![0usize; subsets.len()];
        for record in &data {
            match decider.classify(record).unwrap() {
                RegionDecision::Decided { verdict: Correctness::Wrong, region } => {
                    let slot = if subsets.is_multi_region() { region } else { 0 };
                    expected[slot] += 1;
                }
                RegionDecision::Decided { .. } => {}
                RegionDecision::Undecided => {
                    return Err(TestCaseError::fail("built decider left a record undecided"));
                }
            }
        }
        prop_assert_eq!(subsets.sizes(), expected);
    }

    /// Only subsets of at least the minimum size get a patch.
    #[test]
    fn patch_threshold_is_respected(rows in rows(), cuts in cuts(), min_size in 1usize..8) {
        // All-wrong decider training data puts every record in some subset.
        let all_wrong: Vec<(f64, usize)> = rows.iter().map(|&(x, _)| (x, 0)).collect();
        let training = Dataset::from_records(
            Schema::numeric(1, &CLASSES).with_correctness_classes(),
            all_wrong.iter().map(|&(x, l)| Record::new(vec![x], l)).collect(),
        ).unwrap();
        let mut decider = RegionDecider::new(Box::new(BucketPredictor::new(0, cuts)));
        decider.train(&training).unwrap();

        let subsets = partition(&dataset(&rows), &decider);
        let factory = || -> Result<Box<dyn Predictor>> { Ok(Box::new(MajorityPredictor::new())) };
        let ensemble = PatchEnsemble::train(&subsets, &factory, min_size);

        prop_assert_eq!(ensemble.len(), subsets.len());
        for (region, size) in subsets.sizes().into_iter().enumerate() {
            let status = &ensemble.statuses()[region];
            if size < min_size {
                prop_assert_eq!(status, &PatchStatus::TooSmall { size });
                prop_assert!(!ensemble.has_patch(region));
            } else {
                prop_assert_eq!(status, &PatchStatus::Trained { size });
                prop_assert!(ensemble.has_patch(region));
            }
        }
    }
}
