//! Accuracy measurements used in update reports.

use serde::Serialize;

use cp_common::{Dataset, Label, Record, Result};

use crate::predictor::Predictor;

/// Weighted hit counts of a predictor on a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Accuracy {
    pub correct: f64,
    pub total: f64,
    /// Records the predictor failed to classify (counted as misses).
    pub failures: usize,
}

impl Accuracy {
    /// Fraction of weight classified correctly; `None` for no weight.
    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0.0).then(|| self.correct / self.total)
    }
}

/// Weighted accuracy of an arbitrary classification function.
pub fn accuracy_by<F>(data: &Dataset, mut classify: F) -> Accuracy
where
    F: FnMut(&Record) -> Result<Label>,
{
    let mut acc = Accuracy::default();
    for record in data {
        acc.total += record.weight();
        match classify(record) {
            Ok(label) if label == record.label() => acc.correct += record.weight(),
            Ok(_) => {}
            Err(_) => acc.failures += 1,
        }
    }
    acc
}

/// Weighted accuracy of `predictor` on `data`.
pub fn accuracy(data: &Dataset, predictor: &dyn Predictor) -> Accuracy {
    accuracy_by(data, |record| predictor.classify(record))
}
