//! Schemas and datasets.
//!
//! A [`Schema`] names the features and the class domain; a [`Dataset`] is an
//! ordered collection of records conforming to one schema. Datasets are
//! cheap to clone relative to the training work done on them, and every
//! transformation in the patching pipeline works on a copy.

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};
use crate::record::{Correctness, Label, Record};

/// Feature names and class domain shared by the records of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    feature_names: Vec<String>,
    class_names: Vec<String>,
}

impl Schema {
    pub fn new(feature_names: Vec<String>, class_names: Vec<String>) -> Self {
        Schema {
            feature_names,
            class_names,
        }
    }

    /// Schema with `num_features` anonymous features named `f0, f1, ...`.
    pub fn numeric(num_features: usize, class_names: &[&str]) -> Self {
        Schema {
            feature_names: (0..num_features).map(|i| format!("f{}", i)).collect(),
            class_names: class_names.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Name of a class label, if it is in the domain.
    pub fn class_name(&self, label: Label) -> Option<&str> {
        self.class_names.get(label).map(String::as_str)
    }

    /// Copy of this schema with a new feature in front.
    pub fn with_prepended_feature(&self, name: impl Into<String>) -> Schema {
        let mut feature_names = Vec::with_capacity(self.feature_names.len() + 1);
        feature_names.push(name.into());
        feature_names.extend(self.feature_names.iter().cloned());
        Schema {
            feature_names,
            class_names: self.class_names.clone(),
        }
    }

    /// Copy of this schema with the leading feature dropped.
    pub fn without_first_feature(&self) -> Option<Schema> {
        if self.feature_names.is_empty() {
            return None;
        }
        Some(Schema {
            feature_names: self.feature_names[1..].to_vec(),
            class_names: self.class_names.clone(),
        })
    }

    /// Copy of this schema whose class domain is `wrong, right`.
    pub fn with_correctness_classes(&self) -> Schema {
        Schema {
            feature_names: self.feature_names.clone(),
            class_names: Correctness::CLASS_NAMES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    /// Check that a record's shape and label fit this schema.
    pub fn check(&self, record: &Record) -> Result<()> {
        if record.num_features() != self.num_features() {
            return Err(PatchError::SchemaMismatch {
                expected: self.num_features(),
                actual: record.num_features(),
            });
        }
        if record.label() >= self.num_classes() {
            return Err(PatchError::LabelOutOfRange {
                label: record.label(),
                classes: self.num_classes(),
            });
        }
        Ok(())
    }
}

/// An ordered collection of records sharing one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    schema: Schema,
    records: Vec<Record>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new(schema: Schema) -> Self {
        Dataset {
            schema,
            records: Vec::new(),
        }
    }

    /// Create a dataset, checking every record against the schema.
    pub fn from_records(schema: Schema, records: Vec<Record>) -> Result<Self> {
        for record in &records {
            schema.check(record)?;
        }
        Ok(Dataset { schema, records })
    }

    /// Append a record after checking it against the schema.
    pub fn push(&mut self, record: Record) -> Result<()> {
        self.schema.check(&record)?;
        self.records.push(record);
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of instance weights.
    pub fn total_weight(&self) -> f64 {
        self.records.iter().map(Record::weight).sum()
    }

    /// Number of records per class label, indexed by label.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.schema.num_classes()];
        for record in &self.records {
            if let Some(slot) = counts.get_mut(record.label()) {
                *slot += 1;
            }
        }
        counts
    }

    /// An empty dataset with the same schema.
    pub fn empty_copy(&self) -> Dataset {
        Dataset::new(self.schema.clone())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Extend<Record> for Dataset {
    /// Extend without schema checks; callers append records taken from
    /// datasets with the same schema.
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::numeric(2, &["a", "b", "c"])
    }

    #[test]
    fn test_numeric_schema_names() {
        let s = schema();
        assert_eq!(s.feature_names(), &["f0".to_string(), "f1".to_string()]);
        assert_eq!(s.num_classes(), 3);
        assert_eq!(s.class_name(2), Some("c"));
        assert_eq!(s.class_name(3), None);
    }

    #[test]
    fn test_push_rejects_wrong_width() {
        let mut ds = Dataset::new(schema());
        let err = ds.push(Record::new(vec![1.0], 0)).unwrap_err();
        assert!(matches!(
            err,
            PatchError::SchemaMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert!(ds.is_empty());
    }

    #[test]
    fn test_push_rejects_label_out_of_domain() {
        let mut ds = Dataset::new(schema());
        let err = ds.push(Record::new(vec![1.0, 2.0], 3)).unwrap_err();
        assert!(matches!(
            err,
            PatchError::LabelOutOfRange {
                label: 3,
                classes: 3
            }
        ));
    }

    #[test]
    fn test_class_counts_and_weight() {
        let ds = Dataset::from_records(
            schema(),
            vec![
                Record::new(vec![0.0, 0.0], 0),
                Record::new(vec![1.0, 0.0], 2).with_weight(2.5),
                Record::new(vec![1.0, 1.0], 2),
            ],
        )
        .unwrap();
        assert_eq!(ds.class_counts(), vec![1, 0, 2]);
        assert!((ds.total_weight() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_schema_prepend_and_strip() {
        let s = schema();
        let augmented = s.with_prepended_feature("baseLabel");
        assert_eq!(augmented.num_features(), 3);
        assert_eq!(augmented.feature_names()[0], "baseLabel");
        assert_eq!(augmented.without_first_feature().unwrap(), s);
    }

    #[test]
    fn test_correctness_classes_replace_domain() {
        let s = schema().with_correctness_classes();
        assert_eq!(s.class_names(), &["wrong".to_string(), "right".to_string()]);
        assert_eq!(s.num_features(), 2);
    }

    #[test]
    fn test_empty_copy_keeps_schema() {
        let ds = Dataset::from_records(
            schema(),
            vec![
                Record::new(vec![0.0, 0.0], 0),
                Record::new(vec![1.0, 0.0], 1),
            ],
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        let empty = ds.empty_copy();
        assert!(empty.is_empty());
        assert_eq!(empty.schema(), ds.schema());
    }
}
