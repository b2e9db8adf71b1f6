//! Records and label types.

use serde::{Deserialize, Serialize};

/// Class label: an index into the class domain of a [`crate::Schema`].
pub type Label = usize;

/// Identifier of a decision region (a tree leaf, a rule, ...).
pub type RegionId = usize;

/// A feature vector plus a label and an instance weight.
///
/// Records are treated as immutable by the patching pipeline. The only
/// mutations (prepending a derived feature, overwriting the label,
/// retagging the weight) are always applied to copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    features: Vec<f64>,
    label: Label,
    #[serde(default = "default_weight")]
    weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Record {
    /// Create a record with unit weight.
    pub fn new(features: Vec<f64>, label: Label) -> Self {
        Record {
            features,
            label,
            weight: 1.0,
        }
    }

    /// Set the instance weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn features(&self) -> &[f64] {
        &self.features
    }

    /// Feature value at `index`, if present.
    pub fn feature(&self, index: usize) -> Option<f64> {
        self.features.get(index).copied()
    }

    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Overwrite the label.
    pub fn relabel(&mut self, label: Label) {
        self.label = label;
    }

    /// Insert a derived feature in front of all others.
    pub fn prepend_feature(&mut self, value: f64) {
        self.features.insert(0, value);
    }

    /// Remove and return the leading feature.
    pub fn remove_first_feature(&mut self) -> Option<f64> {
        if self.features.is_empty() {
            None
        } else {
            Some(self.features.remove(0))
        }
    }
}

/// Outcome of the redefined problem: did the base predictor get it right?
///
/// The ordering is load-bearing: `Wrong` is label 0 and `Right` is label 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correctness {
    Wrong,
    Right,
}

impl Correctness {
    /// Class names of the redefined problem, indexed by label.
    pub const CLASS_NAMES: [&'static str; 2] = ["wrong", "right"];

    pub fn label(self) -> Label {
        match self {
            Correctness::Wrong => 0,
            Correctness::Right => 1,
        }
    }

    /// Map a label of the redefined problem back to a verdict.
    pub fn from_label(label: Label) -> Option<Self> {
        match label {
            0 => Some(Correctness::Wrong),
            1 => Some(Correctness::Right),
            _ => None,
        }
    }

    /// `Right` iff the prediction matches the true label.
    pub fn of(predicted: Label, actual: Label) -> Self {
        if predicted == actual {
            Correctness::Right
        } else {
            Correctness::Wrong
        }
    }

    pub fn as_str(self) -> &'static str {
        Self::CLASS_NAMES[self.label()]
    }
}

impl std::fmt::Display for Correctness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
