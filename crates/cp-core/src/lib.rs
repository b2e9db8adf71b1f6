//! Classifier patching core library.
//!
//! A patching classifier wraps a base predictor that stops learning once
//! patching is enabled. From then on it learns *where* the base predictor
//! is wrong and trains small patch predictors for those regions only:
//! - Sliding batch store of recent labelled data
//! - Problem redefinition into a wrong/right correctness problem
//! - Region decider over the redefined problem
//! - Partitioning of errors into per-region subsets
//! - Patch ensemble with per-region routing
//! - Orchestrator tying the stream, update cycles and classification together
//!
//! Predictors are supplied by the embedding application through
//! [`predictor::PredictorFactory`] implementations.

pub mod decider;
pub mod evaluate;
pub mod logging;
pub mod orchestrator;
pub mod partition;
pub mod patches;
pub mod predictor;
pub mod redefine;
pub mod store;

// Re-export test utilities for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock_predictor;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use decider::{DeciderState, RegionDecider, RegionDecision};
pub use orchestrator::{
    Classification, ModelSnapshot, PatchingClassifier, PatchingReader, Phase, Route,
    TrainOutcome, UpdateReport,
};
pub use patches::{PatchEnsemble, PatchLookup, PatchStatus};
pub use predictor::{
    Predictor, PredictorFactories, PredictorFactory, PredictorRegistry, RegionAware, Role,
};
pub use store::SlidingBatchStore;

pub use cp_common::{Correctness, Dataset, Label, PatchError, Record, RegionId, Result, Schema};
pub use cp_config::PatchingConfig;
