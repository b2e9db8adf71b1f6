//! Problem redefinition: relabel a dataset by base-predictor correctness.
//!
//! The redefined problem keeps every feature and replaces the class with
//! `wrong` (0) or `right` (1). Optionally the base prediction itself is
//! prepended as a numeric feature named [`BASE_LABEL_FEATURE`]; the same
//! augmentation is then applied to records before they reach the decider
//! or a patch, so that training and classification see the same layout.

use cp_common::{Correctness, Dataset, Label, Record, Result};

use crate::predictor::Predictor;

/// Name of the prepended base-prediction feature.
pub const BASE_LABEL_FEATURE: &str = "baseLabel";

/// A relabelled dataset plus bookkeeping about how it was produced.
#[derive(Debug, Clone)]
pub struct RedefinedProblem {
    /// Records labelled `wrong`/`right`, in input order.
    pub dataset: Dataset,
    /// Records the base predictor failed to classify (labelled `wrong`).
    pub failures: usize,
    /// Records labelled `wrong`, failures included.
    pub wrong: usize,
}

/// Relabel `data` by whether `base` classifies each record correctly.
///
/// The input is not modified. A record the base predictor cannot classify
/// is labelled `wrong`, and its base-label feature (if `augment` is set)
/// is NaN.
pub fn redefine(data: &Dataset, base: &dyn Predictor, augment: bool) -> Result<RedefinedProblem> {
    let mut schema = data.schema().with_correctness_classes();
    if augment {
        schema = schema.with_prepended_feature(BASE_LABEL_FEATURE);
    }

    let mut failures = 0;
    let mut wrong = 0;
    let mut records = Vec::with_capacity(data.len());

    for record in data {
        let predicted = match base.classify(record) {
            Ok(label) => Some(label),
            Err(err) => {
                failures += 1;
                tracing::debug!(error = %err, "base predictor failed during redefinition");
                None
            }
        };

        let correctness = predicted
            .map(|label| Correctness::of(label, record.label()))
            .unwrap_or(Correctness::Wrong);
        if correctness == Correctness::Wrong {
            wrong += 1;
        }

        let mut relabelled = if augment {
            with_base_label(record, predicted)
        } else {
            record.clone()
        };
        relabelled.relabel(correctness.label());
        records.push(relabelled);
    }

    if failures > 0 {
        tracing::warn!(
            failures,
            total = data.len(),
            "base predictor failed on some records; they were labelled wrong"
        );
    }

    Ok(RedefinedProblem {
        dataset: Dataset::from_records(schema, records)?,
        failures,
        wrong,
    })
}

/// Encode a base prediction as a feature value; NaN when there is none.
pub fn base_label_value(predicted: Option<Label>) -> f64 {
    predicted.map(|label| label as f64).unwrap_or(f64::NAN)
}

/// Decode a base-label feature back into a label.
pub fn label_from_feature(value: f64) -> Option<Label> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Some(value as Label)
    } else {
        None
    }
}

/// Copy of `record` with the base prediction prepended.
pub fn with_base_label(record: &Record, predicted: Option<Label>) -> Record {
    let mut augmented = record.clone();
    augmented.prepend_feature(base_label_value(predicted));
    augmented
}

/// Prepend the base prediction for `record`, as done at classify time.
///
/// Unlike [`redefine`], a base failure is an error here: the caller falls
/// back to the base predictor instead of routing a NaN feature.
pub fn augment_record(record: &Record, base: &dyn Predictor) -> Result<(Record, Label)> {
    let predicted = base.classify(record)?;
    Ok((with_base_label(record, Some(predicted)), predicted))
}

/// Prepend the base prediction to every record of `data`.
///
/// Labels are kept; records the base cannot classify get a NaN feature.
pub fn augment_dataset(data: &Dataset, base: &dyn Predictor) -> Result<Dataset> {
    let schema = data.schema().with_prepended_feature(BASE_LABEL_FEATURE);
    let records = data
        .iter()
        .map(|record| with_base_label(record, base.classify(record).ok()))
        .collect();
    Dataset::from_records(schema, records)
}

/// Remove the prepended base-label feature.
pub fn strip_augmentation(record: &Record) -> Record {
    let mut stripped = record.clone();
    stripped.remove_first_feature();
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_common::{PatchError, Schema};

    /// Predicts label 1 when the first feature is positive; fails on NaN.
    struct Positive;

    impl Predictor for Positive {
        fn name(&self) -> &str {
            "positive"
        }
        fn train(&mut self, _data: &Dataset) -> Result<()> {
            Ok(())
        }
        fn classify(&self, record: &Record) -> Result<Label> {
            let x = record.features()[0];
            if x.is_nan() {
                return Err(PatchError::Classification("missing value".into()));
            }
            Ok(Label::from(x > 0.0))
        }
    }

    fn data() -> Dataset {
        let schema = Schema::numeric(1, &["neg", "pos", "other"]);
        Dataset::from_records(
            schema,
            vec![
                Record::new(vec![1.0], 1),      // right
                Record::new(vec![-1.0], 1),     // wrong
                Record::new(vec![2.0], 2),      // wrong
                Record::new(vec![f64::NAN], 0), // failure
            ],
        )
        .unwrap()
    }

    #[test]
    fn relabels_by_correctness() {
        let input = data();
        let redefined = redefine(&input, &Positive, false).unwrap();
        let labels: Vec<Label> = redefined.dataset.iter().map(Record::label).collect();
        assert_eq!(labels, vec![1, 0, 0, 0]);
        assert_eq!(redefined.failures, 1);
        assert_eq!(redefined.wrong, 3);
        assert_eq!(
            redefined.dataset.schema().class_names(),
            &["wrong", "right"]
        );
        // Input untouched.
        assert_eq!(input.records()[0].label(), 1);
    }

    #[test]
    fn augmentation_prepends_base_label() {
        let redefined = redefine(&data(), &Positive, true).unwrap();
        let schema = redefined.dataset.schema();
        assert_eq!(schema.feature_names()[0], BASE_LABEL_FEATURE);
        assert_eq!(schema.num_features(), 2);

        let first = &redefined.dataset.records()[0];
        assert_eq!(first.features(), &[1.0, 1.0]);
        let failed = &redefined.dataset.records()[3];
        assert!(failed.features()[0].is_nan());
    }

    #[test]
    fn augment_record_fails_when_base_fails() {
        let missing = Record::new(vec![f64::NAN], 0);
        assert!(augment_record(&missing, &Positive).is_err());
        let (augmented, label) = augment_record(&Record::new(vec![3.0], 0), &Positive).unwrap();
        assert_eq!(label, 1);
        assert_eq!(augmented.features(), &[1.0, 3.0]);
    }

    #[test]
    fn augment_dataset_keeps_labels() {
        let augmented = augment_dataset(&data(), &Positive).unwrap();
        let labels: Vec<Label> = augmented.iter().map(Record::label).collect();
        assert_eq!(labels, vec![1, 1, 2, 0]);
        assert_eq!(augmented.schema().num_classes(), 3);
    }

    #[test]
    fn strip_undoes_augmentation() {
        let record = Record::new(vec![0.5, -4.0], 2).with_weight(3.0);
        let stripped = strip_augmentation(&with_base_label(&record, Some(1)));
        assert_eq!(stripped, record);
    }

    #[test]
    fn feature_decoding_rejects_non_labels() {
        assert_eq!(label_from_feature(2.0), Some(2));
        assert_eq!(label_from_feature(f64::NAN), None);
        assert_eq!(label_from_feature(-1.0), None);
        assert_eq!(label_from_feature(0.5), None);
    }
}
