//! Sliding window of recent batches.

use std::collections::VecDeque;

use cp_common::Dataset;
use cp_config::MergeWeighting;

/// A flushed batch of training records.
pub type Batch = Dataset;

/// FIFO window holding at most `capacity` batches.
///
/// Adding a batch to a full window evicts the oldest one. The window can
/// be merged into a single training dataset, optionally weighting records
/// by how recent their batch is.
#[derive(Debug, Clone)]
pub struct SlidingBatchStore {
    capacity: usize,
    batches: VecDeque<Batch>,
}

impl SlidingBatchStore {
    pub fn new(capacity: usize) -> Self {
        SlidingBatchStore {
            capacity,
            batches: VecDeque::new(),
        }
    }

    /// Append a batch, evicting the oldest ones to stay within capacity.
    ///
    /// Returns the number of evicted batches.
    pub fn add_batch(&mut self, batch: Batch) -> usize {
        self.batches.push_back(batch);
        let mut evicted = 0;
        while self.batches.len() > self.capacity {
            self.batches.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            tracing::trace!(evicted, kept = self.batches.len(), "evicted old batches");
        }
        evicted
    }

    /// The `index`-th batch, oldest first.
    pub fn get_batch(&self, index: usize) -> Option<&Batch> {
        self.batches.get(index)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records across all held batches.
    pub fn total_records(&self) -> usize {
        self.batches.iter().map(Dataset::len).sum()
    }

    /// Batches oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }

    /// Concatenate all batches, oldest first, into one dataset.
    ///
    /// With [`MergeWeighting::Uniform`] weights are left as they are. With
    /// [`MergeWeighting::BatchAge`] the oldest batch is copied unchanged and
    /// every record of the batch at offset `i >= 1` gets weight `i`, so
    /// newer batches count more. Returns `None` for an empty window.
    pub fn merged(&self, weighting: MergeWeighting) -> Option<Dataset> {
        let mut batches = self.batches.iter();
        let mut merged = batches.next()?.clone();

        for (offset, batch) in batches.enumerate().map(|(i, b)| (i + 1, b)) {
            merged.extend(batch.iter().map(|record| {
                let mut record = record.clone();
                if weighting == MergeWeighting::BatchAge {
                    record.set_weight(offset as f64);
                }
                record
            }));
        }

        Some(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_common::{Record, Schema};

    fn batch(tag: f64, n: usize) -> Batch {
        let records = (0..n).map(|_| Record::new(vec![tag], 0)).collect();
        Dataset::from_records(Schema::numeric(1, &["a", "b"]), records).unwrap()
    }

    fn tags(store: &SlidingBatchStore) -> Vec<f64> {
        store.iter().map(|b| b.records()[0].features()[0]).collect()
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut store = SlidingBatchStore::new(2);
        assert_eq!(store.add_batch(batch(1.0, 1)), 0);
        assert_eq!(store.add_batch(batch(2.0, 1)), 0);
        assert_eq!(store.add_batch(batch(3.0, 1)), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(tags(&store), vec![2.0, 3.0]);
    }

    #[test]
    fn get_batch_out_of_range_is_none() {
        let mut store = SlidingBatchStore::new(3);
        store.add_batch(batch(1.0, 2));
        assert!(store.get_batch(0).is_some());
        assert!(store.get_batch(1).is_none());
    }

    #[test]
    fn unbounded_capacity_grows_on_demand() {
        let mut store = SlidingBatchStore::new(usize::MAX);
        assert_eq!(store.capacity(), usize::MAX);
        assert_eq!(store.add_batch(batch(1.0, 1)), 0);
        assert_eq!(store.add_batch(batch(2.0, 1)), 0);
        assert_eq!(tags(&store), vec![1.0, 2.0]);
    }

    #[test]
    fn merged_empty_is_none() {
        let store = SlidingBatchStore::new(3);
        assert!(store.merged(MergeWeighting::Uniform).is_none());
    }

    #[test]
    fn merged_uniform_keeps_weights() {
        let mut store = SlidingBatchStore::new(3);
        store.add_batch(batch(1.0, 2));
        store.add_batch(batch(2.0, 3));
        let merged = store.merged(MergeWeighting::Uniform).unwrap();
        assert_eq!(merged.len(), 5);
        assert_eq!(merged.total_weight(), 5.0);
        assert_eq!(store.total_records(), 5);
    }

    #[test]
    fn merged_batch_age_weights_by_offset() {
        let mut store = SlidingBatchStore::new(3);
        store.add_batch(batch(1.0, 1));
        store.add_batch(batch(2.0, 1));
        store.add_batch(batch(3.0, 1));
        let merged = store.merged(MergeWeighting::BatchAge).unwrap();
        let weights: Vec<f64> = merged.iter().map(Record::weight).collect();
        assert_eq!(weights, vec![1.0, 1.0, 2.0]);
        // The stored batches are untouched.
        assert_eq!(store.get_batch(2).unwrap().records()[0].weight(), 1.0);
    }

    #[test]
    fn clear_empties_window() {
        let mut store = SlidingBatchStore::new(1);
        store.add_batch(batch(1.0, 1));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 1);
    }
}
