//! Fuzz target for the patching classifier's stream handling.
//!
//! Drives a small classifier with arbitrary records (wrong arity,
//! out-of-range labels, NaN features) and phase switches. Every call
//! must return a value or an error; nothing may panic.

#![no_main]

use arbitrary::Arbitrary;
use cp_common::{Record, Schema};
use cp_config::{PatchingConfig, PredictorNames};
use cp_core::mock_predictor::mock_registry;
use cp_core::PatchingClassifier;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Step {
    Train { features: Vec<f64>, label: u8 },
    Classify { features: Vec<f64> },
    EnablePatching,
    Reset,
}

#[derive(Debug, Arbitrary)]
struct Input {
    batch_size: u8,
    batches_to_keep: u8,
    augment: bool,
    steps: Vec<Step>,
}

fuzz_target!(|input: Input| {
    let config = PatchingConfig::default()
        .with_batch_size(usize::from(input.batch_size % 8) + 1)
        .with_batches_to_keep(usize::from(input.batches_to_keep % 4) + 1)
        .with_min_patch_size(2)
        .with_base_label_feature(input.augment)
        .with_predictors(PredictorNames {
            base: "threshold".to_string(),
            decider: "buckets".to_string(),
            patch: "majority".to_string(),
        });
    let schema = Schema::numeric(1, &["a", "b", "c"]);
    let Ok(mut classifier) = PatchingClassifier::from_registry(config, schema, &mock_registry())
    else {
        return;
    };

    for step in input.steps.into_iter().take(256) {
        match step {
            Step::Train { features, label } => {
                let _ = classifier.train(Record::new(features, usize::from(label)));
            }
            Step::Classify { features } => {
                let _ = classifier.votes(&Record::new(features, 0));
            }
            Step::EnablePatching => {
                classifier.enable_patching();
            }
            Step::Reset => classifier.reset(),
        }
    }
});
