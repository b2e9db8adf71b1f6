//! Split a dataset into per-region subsets of decider-flagged errors.

use cp_common::{Correctness, Dataset};

use crate::decider::{RegionDecider, RegionDecision};

/// The per-region error subsets produced by [`partition`].
#[derive(Debug, Clone)]
pub struct RegionSubsets {
    subsets: Vec<Dataset>,
    multi_region: bool,
    skipped: usize,
}

impl RegionSubsets {
    /// No subsets at all (used when there is no decider).
    pub fn empty() -> Self {
        RegionSubsets {
            subsets: Vec::new(),
            multi_region: false,
            skipped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }

    pub fn get(&self, region: usize) -> Option<&Dataset> {
        self.subsets.get(region)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dataset> {
        self.subsets.iter()
    }

    /// Whether subset `i` corresponds to decider region `i`.
    pub fn is_multi_region(&self) -> bool {
        self.multi_region
    }

    /// Records left out because the decider could not place them.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.subsets.iter().map(Dataset::len).collect()
    }
}

/// Partition `data` into the records the decider flags as `wrong`.
///
/// With a multi-region decider, subset `r` holds exactly the records
/// decided `wrong` in region `r`, so the subsets are pairwise disjoint.
/// Every region gets its own pass over `data` and each record is
/// re-decided on every pass. Otherwise there is a single subset of every
/// record decided `wrong`. Records the decider leaves undecided or fails
/// on are excluded.
pub fn partition(data: &Dataset, decider: &RegionDecider) -> RegionSubsets {
    let multi_region = decider.is_multi_region();
    let region_count = if multi_region {
        decider.region_count()
    } else {
        1
    };

    let mut excluded = vec![false; data.len()];
    let mut subsets = Vec::with_capacity(region_count);

    for region in 0..region_count {
        let mut subset = data.empty_copy();
        for (index, record) in data.iter().enumerate() {
            match decider.classify(record) {
                Ok(RegionDecision::Decided {
                    verdict: Correctness::Wrong,
                    region: decided,
                }) => {
                    let slot = if multi_region { decided } else { 0 };
                    if slot == region {
                        subset.extend(std::iter::once(record.clone()));
                    } else if slot >= region_count {
                        excluded[index] = true;
                    }
                }
                Ok(RegionDecision::Decided { .. }) => {}
                Ok(RegionDecision::Undecided) => excluded[index] = true,
                Err(err) => {
                    if !excluded[index] {
                        tracing::debug!(error = %err, "decider failed during partitioning");
                    }
                    excluded[index] = true;
                }
            }
        }
        subsets.push(subset);
    }

    let skipped = excluded.iter().filter(|e| **e).count();
    if skipped > 0 {
        tracing::warn!(
            skipped,
            total = data.len(),
            "records excluded from partitioning"
        );
    }

    RegionSubsets {
        subsets,
        multi_region,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{Predictor, RegionAware};
    use cp_common::{Label, PatchError, Record, RegionId, Result, Schema};

    /// Verdict = first feature, region = second feature.
    struct Scripted {
        regions: Option<usize>,
    }

    impl Predictor for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        fn train(&mut self, _data: &Dataset) -> Result<()> {
            Ok(())
        }
        fn classify(&self, record: &Record) -> Result<Label> {
            let v = record.features()[0];
            if v < 0.0 {
                return Err(PatchError::Classification("cannot place".into()));
            }
            Ok(v as Label)
        }
        fn as_region_aware(&self) -> Option<&dyn RegionAware> {
            self.regions.map(|_| self as &dyn RegionAware)
        }
    }

    impl RegionAware for Scripted {
        fn region_count(&self) -> usize {
            self.regions.unwrap_or(1)
        }
        fn classify_with_region(&self, record: &Record) -> Result<(Label, RegionId)> {
            Ok((self.classify(record)?, record.features()[1] as RegionId))
        }
    }

    fn built(regions: Option<usize>) -> RegionDecider {
        let mut decider = RegionDecider::new(Box::new(Scripted { regions }));
        let schema = Schema::numeric(2, &["a"]).with_correctness_classes();
        let seed = Dataset::from_records(schema, vec![Record::new(vec![0.0, 0.0], 0)]).unwrap();
        decider.train(&seed).unwrap();
        decider
    }

    fn data(rows: &[(f64, f64)]) -> Dataset {
        let records = rows
            .iter()
            .map(|&(v, r)| Record::new(vec![v, r], 0))
            .collect();
        Dataset::from_records(Schema::numeric(2, &["a", "b"]), records).unwrap()
    }

    #[test]
    fn multi_region_subsets_are_disjoint_and_complete() {
        let decider = built(Some(3));
        let input = data(&[(0.0, 0.0), (1.0, 0.0), (0.0, 2.0), (0.0, 2.0), (1.0, 1.0)]);
        let subsets = partition(&input, &decider);
        assert!(subsets.is_multi_region());
        assert_eq!(subsets.sizes(), vec![1, 0, 2]);
        assert_eq!(subsets.get(2).unwrap().schema(), input.schema());
    }

    #[test]
    fn single_region_keeps_all_wrong() {
        let decider = built(None);
        let input = data(&[(0.0, 0.0), (1.0, 0.0), (0.0, 5.0)]);
        let subsets = partition(&input, &decider);
        assert!(!subsets.is_multi_region());
        assert_eq!(subsets.sizes(), vec![2]);
    }

    #[test]
    fn failures_and_undecided_are_excluded() {
        let decider = built(Some(2));
        let input = data(&[(-1.0, 0.0), (0.0, 1.0)]);
        let subsets = partition(&input, &decider);
        assert_eq!(subsets.sizes(), vec![0, 1]);
        assert_eq!(subsets.skipped(), 1);

        let unbuilt = RegionDecider::new(Box::new(Scripted { regions: None }));
        let subsets = partition(&input, &unbuilt);
        assert_eq!(subsets.sizes(), vec![0]);
        assert_eq!(subsets.skipped(), 2);
    }

    #[test]
    fn out_of_range_region_is_skipped() {
        let decider = built(Some(2));
        let input = data(&[(0.0, 4.0)]);
        let subsets = partition(&input, &decider);
        assert_eq!(subsets.sizes(), vec![0, 0]);
        assert_eq!(subsets.skipped(), 1);
    }

    #[test]
    fn every_region_pass_redecides_each_record() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct Counting(Arc<AtomicUsize>);

        impl Predictor for Counting {
            fn name(&self) -> &str {
                "counting"
            }
            fn train(&mut self, _data: &Dataset) -> Result<()> {
                Ok(())
            }
            fn classify(&self, _record: &Record) -> Result<Label> {
                Ok(0)
            }
            fn as_region_aware(&self) -> Option<&dyn RegionAware> {
                Some(self)
            }
        }

        impl RegionAware for Counting {
            fn region_count(&self) -> usize {
                4
            }
            fn classify_with_region(&self, record: &Record) -> Result<(Label, RegionId)> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok((0, record.features()[1] as RegionId))
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let mut decider = RegionDecider::new(Box::new(Counting(calls.clone())));
        let input = data(&[(0.0, 0.0), (0.0, 3.0), (0.0, 3.0)]);
        decider.train(&input).unwrap();

        let subsets = partition(&input, &decider);
        assert_eq!(subsets.sizes(), vec![1, 0, 0, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 3 * 4);
    }
}
