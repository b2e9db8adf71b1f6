//! Scripted predictors and record generators for testing.
//!
//! None of these learners is meant to be accurate. They are small,
//! deterministic and easy to reason about, which makes them useful for
//! driving the patching pipeline into specific states:
//!
//! - [`MajorityPredictor`]: weighted majority label, no features used
//! - [`ThresholdPredictor`]: one cut on one feature
//! - [`BucketPredictor`]: region-aware majority per feature bucket
//! - [`FailingPredictor`]: fails in training or classification on demand
//!
//! # Example
//!
//! ```ignore
//! use cp_core::mock_predictor::{mock_registry, MockRng, MockStream};
//!
//! let registry = mock_registry();
//! let mut rng = MockRng::new(7);
//! let records = MockStream::new(2).generate(&mut rng, 100, |f| usize::from(f[0] > 0.5));
//! ```

use cp_common::{Dataset, Label, PatchError, Record, RegionId, Result};

use crate::predictor::{Predictor, PredictorRegistry, RegionAware};

// ============================================================================
// Deterministic RNG
// ============================================================================

/// Simple linear congruential generator for reproducible test data.
///
/// Not cryptographically secure.
#[derive(Debug, Clone)]
pub struct MockRng {
    state: u64,
}

impl MockRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    /// Pseudo-random f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Pseudo-random value in [min, max].
    pub fn range(&mut self, min: u64, max: u64) -> u64 {
        min + (self.next_u64() % (max - min + 1))
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

impl Default for MockRng {
    fn default() -> Self {
        Self::new(42)
    }
}

fn untrained(name: &str) -> PatchError {
    PatchError::Classification(format!("{} has not been trained", name))
}

// ============================================================================
// Predictors
// ============================================================================

/// Always predicts one fixed label once trained.
#[derive(Debug, Clone)]
pub struct ConstantPredictor {
    label: Label,
    trained: bool,
}

impl ConstantPredictor {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            trained: false,
        }
    }
}

impl Predictor for ConstantPredictor {
    fn name(&self) -> &str {
        "constant"
    }

    fn train(&mut self, _data: &Dataset) -> Result<()> {
        self.trained = true;
        Ok(())
    }

    fn classify(&self, _record: &Record) -> Result<Label> {
        if !self.trained {
            return Err(untrained(self.name()));
        }
        Ok(self.label)
    }
}

/// Predicts the weighted majority label of its training data.
#[derive(Debug, Clone, Default)]
pub struct MajorityPredictor {
    label: Option<Label>,
}

impl MajorityPredictor {
    pub fn new() -> Self {
        Self::default()
    }
}

fn weighted_majority<'a>(records: impl Iterator<Item = &'a Record>) -> Option<Label> {
    let mut weights: Vec<f64> = Vec::new();
    for record in records {
        let label = record.label();
        if weights.len() <= label {
            weights.resize(label + 1, 0.0);
        }
        weights[label] += record.weight();
    }
    // Ties go to the lowest label.
    weights
        .iter()
        .enumerate()
        .fold(None, |best: Option<(Label, f64)>, (label, &w)| match best {
            Some((_, bw)) if bw >= w => best,
            _ if w > 0.0 => Some((label, w)),
            _ => best,
        })
        .map(|(label, _)| label)
}

impl Predictor for MajorityPredictor {
    fn name(&self) -> &str {
        "majority"
    }

    fn train(&mut self, data: &Dataset) -> Result<()> {
        self.label = weighted_majority(data.iter());
        if self.label.is_none() {
            return Err(PatchError::EmptyDataset);
        }
        Ok(())
    }

    fn classify(&self, _record: &Record) -> Result<Label> {
        self.label.ok_or_else(|| untrained(self.name()))
    }
}

/// Predicts `above` when `feature >= cut`, else `below`.
///
/// Training only marks the predictor usable; the rule is fixed.
#[derive(Debug, Clone)]
pub struct ThresholdPredictor {
    feature: usize,
    cut: f64,
    below: Label,
    above: Label,
    trained: bool,
}

impl ThresholdPredictor {
    pub fn new(feature: usize, cut: f64, below: Label, above: Label) -> Self {
        Self {
            feature,
            cut,
            below,
            above,
            trained: false,
        }
    }
}

impl Predictor for ThresholdPredictor {
    fn name(&self) -> &str {
        "threshold"
    }

    fn train(&mut self, _data: &Dataset) -> Result<()> {
        self.trained = true;
        Ok(())
    }

    fn classify(&self, record: &Record) -> Result<Label> {
        if !self.trained {
            return Err(untrained(self.name()));
        }
        let value = record.feature(self.feature).ok_or_else(|| {
            PatchError::Classification(format!("record has no feature {}", self.feature))
        })?;
        if value.is_nan() {
            return Err(PatchError::Classification("missing value".to_string()));
        }
        Ok(if value >= self.cut {
            self.above
        } else {
            self.below
        })
    }
}

/// Region-aware learner: one region per bucket of a feature.
///
/// `cuts` must be ascending; bucket `i` holds values in
/// `[cuts[i-1], cuts[i])`. Each bucket predicts the weighted majority label
/// of the training records that fell into it, and buckets that saw no
/// training data predict the global majority.
#[derive(Debug, Clone)]
pub struct BucketPredictor {
    feature: usize,
    cuts: Vec<f64>,
    labels: Vec<Label>,
}

impl BucketPredictor {
    pub fn new(feature: usize, cuts: Vec<f64>) -> Self {
        Self {
            feature,
            cuts,
            labels: Vec::new(),
        }
    }

    fn bucket(&self, record: &Record) -> Result<RegionId> {
        let value = record.feature(self.feature).ok_or_else(|| {
            PatchError::Classification(format!("record has no feature {}", self.feature))
        })?;
        if value.is_nan() {
            return Err(PatchError::Classification("missing value".to_string()));
        }
        Ok(self.cuts.iter().take_while(|cut| value >= **cut).count())
    }
}

impl Predictor for BucketPredictor {
    fn name(&self) -> &str {
        "buckets"
    }

    fn train(&mut self, data: &Dataset) -> Result<()> {
        let global = weighted_majority(data.iter()).ok_or(PatchError::EmptyDataset)?;
        let buckets = self.cuts.len() + 1;
        let mut members: Vec<Vec<&Record>> = vec![Vec::new(); buckets];
        for record in data {
            // Records without a usable value only count globally.
            if let Ok(bucket) = self.bucket(record) {
                members[bucket].push(record);
            }
        }
        self.labels = members
            .into_iter()
            .map(|records| weighted_majority(records.into_iter()).unwrap_or(global))
            .collect();
        Ok(())
    }

    fn classify(&self, record: &Record) -> Result<Label> {
        self.classify_with_region(record).map(|(label, _)| label)
    }

    fn as_region_aware(&self) -> Option<&dyn RegionAware> {
        Some(self)
    }
}

impl RegionAware for BucketPredictor {
    fn region_count(&self) -> usize {
        self.cuts.len() + 1
    }

    fn classify_with_region(&self, record: &Record) -> Result<(Label, RegionId)> {
        if self.labels.is_empty() {
            return Err(untrained(self.name()));
        }
        let bucket = self.bucket(record)?;
        Ok((self.labels[bucket], bucket))
    }
}

/// Where a [`FailingPredictor`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    Train,
    Classify,
}

/// Fails in training or in classification.
#[derive(Debug, Clone)]
pub struct FailingPredictor {
    mode: FailureMode,
}

impl FailingPredictor {
    pub fn new(mode: FailureMode) -> Self {
        Self { mode }
    }
}

impl Predictor for FailingPredictor {
    fn name(&self) -> &str {
        "failing"
    }

    fn train(&mut self, _data: &Dataset) -> Result<()> {
        match self.mode {
            FailureMode::Train => Err(PatchError::training("failing", "scripted training failure")),
            FailureMode::Classify => Ok(()),
        }
    }

    fn classify(&self, _record: &Record) -> Result<Label> {
        Err(PatchError::Classification(
            "scripted classification failure".to_string(),
        ))
    }
}

// ============================================================================
// Factories
// ============================================================================

/// Registry with every scripted predictor under a stable name.
///
/// | name        | predictor                                  |
/// |-------------|--------------------------------------------|
/// | `majority`  | [`MajorityPredictor`]                      |
/// | `constant`  | [`ConstantPredictor`] of label 0           |
/// | `threshold` | [`ThresholdPredictor`] on feature 0 at 0.5 |
/// | `buckets`   | [`BucketPredictor`] on feature 0, cuts at 0.5 |
/// | `failing`   | [`FailingPredictor`] failing in training   |
pub fn mock_registry() -> PredictorRegistry {
    PredictorRegistry::new()
        .with("majority", || -> Result<Box<dyn Predictor>> {
            Ok(Box::new(MajorityPredictor::new()))
        })
        .with("constant", || -> Result<Box<dyn Predictor>> {
            Ok(Box::new(ConstantPredictor::new(0)))
        })
        .with("threshold", || -> Result<Box<dyn Predictor>> {
            Ok(Box::new(ThresholdPredictor::new(0, 0.5, 0, 1)))
        })
        .with("buckets", || -> Result<Box<dyn Predictor>> {
            Ok(Box::new(BucketPredictor::new(0, vec![0.5])))
        })
        .with("failing", || -> Result<Box<dyn Predictor>> {
            Ok(Box::new(FailingPredictor::new(FailureMode::Train)))
        })
}

// ============================================================================
// Record generation
// ============================================================================

/// Generator of labelled records with uniform features in [0, 1).
#[derive(Debug, Clone)]
pub struct MockStream {
    num_features: usize,
}

impl MockStream {
    pub fn new(num_features: usize) -> Self {
        Self { num_features }
    }

    /// One record whose label is `label_of(features)`.
    pub fn record<F>(&self, rng: &mut MockRng, label_of: F) -> Record
    where
        F: Fn(&[f64]) -> Label,
    {
        let features: Vec<f64> = (0..self.num_features).map(|_| rng.next_f64()).collect();
        let label = label_of(features.as_slice());
        Record::new(features, label)
    }

    /// `count` records labelled by `label_of`.
    pub fn generate<F>(&self, rng: &mut MockRng, count: usize, label_of: F) -> Vec<Record>
    where
        F: Fn(&[f64]) -> Label,
    {
        (0..count).map(|_| self.record(rng, &label_of)).collect()
    }
}
