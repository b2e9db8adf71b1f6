//! Region decider: learns where the base predictor is wrong.
//!
//! The decider wraps an arbitrary predictor trained on the redefined
//! wrong/right problem. If the wrapped predictor is region-aware, its
//! regions are used as-is; otherwise a region is synthesized from the
//! verdict itself (right records in region 1, wrong ones in region 0).

use serde::Serialize;

use cp_common::{Correctness, Dataset, PatchError, Record, RegionId, Result};

use crate::predictor::Predictor;

/// Build state of a [`RegionDecider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeciderState {
    Unbuilt,
    Built,
}

/// Answer of the decider for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionDecision {
    /// The decider could not give a verdict (it was never built).
    Undecided,
    /// Whether the base predictor is expected to be right, and where.
    Decided {
        verdict: Correctness,
        region: RegionId,
    },
}

impl RegionDecision {
    /// Numeric form: `-1` undecided, `0` wrong, `1` right.
    pub fn raw_label(&self) -> i64 {
        match self {
            RegionDecision::Undecided => -1,
            RegionDecision::Decided { verdict, .. } => verdict.label() as i64,
        }
    }

    /// Region of a decided verdict.
    pub fn region(&self) -> Option<RegionId> {
        match self {
            RegionDecision::Undecided => None,
            RegionDecision::Decided { region, .. } => Some(*region),
        }
    }

    pub fn is_wrong_in(&self, region: RegionId) -> bool {
        matches!(
            self,
            RegionDecision::Decided { verdict: Correctness::Wrong, region: r } if *r == region
        )
    }
}

/// A predictor of the wrong/right problem that reports regions.
pub struct RegionDecider {
    predictor: Box<dyn Predictor>,
    state: DeciderState,
}

impl RegionDecider {
    pub fn new(predictor: Box<dyn Predictor>) -> Self {
        RegionDecider {
            predictor,
            state: DeciderState::Unbuilt,
        }
    }

    /// Train the wrapped predictor on a redefined dataset.
    ///
    /// On failure the decider stays (or becomes) `Unbuilt` and the error
    /// is returned for the caller to log.
    pub fn train(&mut self, redefined: &Dataset) -> Result<()> {
        self.state = DeciderState::Unbuilt;
        if redefined.is_empty() {
            return Err(PatchError::EmptyDataset);
        }
        self.predictor
            .train(redefined)
            .map_err(|err| PatchError::training("region decider", err))?;
        self.state = DeciderState::Built;
        Ok(())
    }

    pub fn state(&self) -> DeciderState {
        self.state
    }

    pub fn is_built(&self) -> bool {
        self.state == DeciderState::Built
    }

    pub fn predictor_name(&self) -> &str {
        self.predictor.name()
    }

    /// Number of regions: the wrapped predictor's count, or 1.
    pub fn region_count(&self) -> usize {
        self.predictor
            .as_region_aware()
            .map(|aware| aware.region_count().max(1))
            .unwrap_or(1)
    }

    pub fn is_multi_region(&self) -> bool {
        self.region_count() > 1
    }

    /// Region used for records the wrapped predictor cannot place.
    pub fn default_region(&self) -> Option<RegionId> {
        match self.predictor.as_region_aware() {
            Some(aware) => aware.default_region(),
            None => Some(0),
        }
    }

    /// Decide whether the base predictor is right on `record`, and where.
    ///
    /// An unbuilt decider answers [`RegionDecision::Undecided`]. A wrapped
    /// predictor emitting a label outside {wrong, right} is an error.
    pub fn classify(&self, record: &Record) -> Result<RegionDecision> {
        if self.state == DeciderState::Unbuilt {
            return Ok(RegionDecision::Undecided);
        }

        let (label, region) = match self.predictor.as_region_aware() {
            Some(aware) => aware.classify_with_region(record)?,
            None => {
                let label = self.predictor.classify(record)?;
                (label, usize::from(label > 0))
            }
        };

        let verdict = Correctness::from_label(label).ok_or(PatchError::LabelOutOfRange {
            label,
            classes: Correctness::CLASS_NAMES.len(),
        })?;

        Ok(RegionDecision::Decided { verdict, region })
    }
}

impl std::fmt::Debug for RegionDecider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionDecider")
            .field("predictor", &self.predictor.name())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::RegionAware;
    use cp_common::{Label, Schema};

    /// Predicts `right` for a positive first feature; the second feature is the region.
    struct Sign {
        trained: bool,
        regions: Option<usize>,
        fail: bool,
    }

    impl Sign {
        fn plain() -> Self {
            Sign {
                trained: false,
                regions: None,
                fail: false,
            }
        }
    }

    impl Predictor for Sign {
        fn name(&self) -> &str {
            "sign"
        }
        fn train(&mut self, _data: &Dataset) -> Result<()> {
            if self.fail {
                return Err(PatchError::Classification("degenerate".into()));
            }
            self.trained = true;
            Ok(())
        }
        fn classify(&self, record: &Record) -> Result<Label> {
            if !self.trained {
                return Err(PatchError::Classification("untrained".into()));
            }
            let x = record.features()[0];
            Ok(if x >= 5.0 { 7 } else { Label::from(x > 0.0) })
        }
        fn as_region_aware(&self) -> Option<&dyn RegionAware> {
            self.regions.map(|_| self as &dyn RegionAware)
        }
    }

    impl RegionAware for Sign {
        fn region_count(&self) -> usize {
            self.regions.unwrap_or(1)
        }
        fn classify_with_region(&self, record: &Record) -> Result<(Label, RegionId)> {
            let label = self.classify(record)?;
            Ok((label, record.features()[1] as usize))
        }
    }

    fn redefined() -> Dataset {
        let schema = Schema::numeric(2, &["x"]).with_correctness_classes();
        Dataset::from_records(schema, vec![Record::new(vec![1.0, 0.0], 1)]).unwrap()
    }

    #[test]
    fn unbuilt_is_undecided() {
        let decider = RegionDecider::new(Box::new(Sign::plain()));
        let decision = decider.classify(&Record::new(vec![1.0, 0.0], 0)).unwrap();
        assert_eq!(decision, RegionDecision::Undecided);
        assert_eq!(decision.raw_label(), -1);
        assert_eq!(decision.region(), None);
    }

    #[test]
    fn plain_predictor_synthesizes_region_from_verdict() {
        let mut decider = RegionDecider::new(Box::new(Sign::plain()));
        decider.train(&redefined()).unwrap();
        assert!(decider.is_built());
        assert_eq!(decider.region_count(), 1);
        assert_eq!(decider.default_region(), Some(0));

        let right = decider.classify(&Record::new(vec![2.0, 0.0], 0)).unwrap();
        assert_eq!(
            right,
            RegionDecision::Decided {
                verdict: Correctness::Right,
                region: 1
            }
        );
        let wrong = decider.classify(&Record::new(vec![-2.0, 0.0], 0)).unwrap();
        assert!(wrong.is_wrong_in(0));
    }

    #[test]
    fn region_aware_predictor_reports_its_regions() {
        let mut decider = RegionDecider::new(Box::new(Sign {
            regions: Some(3),
            ..Sign::plain()
        }));
        decider.train(&redefined()).unwrap();
        assert_eq!(decider.region_count(), 3);
        assert!(decider.is_multi_region());
        assert_eq!(decider.default_region(), None);

        let decision = decider.classify(&Record::new(vec![-1.0, 2.0], 0)).unwrap();
        assert!(decision.is_wrong_in(2));
        assert!(!decision.is_wrong_in(0));
    }

    #[test]
    fn out_of_domain_label_is_error() {
        let mut decider = RegionDecider::new(Box::new(Sign::plain()));
        decider.train(&redefined()).unwrap();
        let far = Record::new(vec![9.0, 0.0], 0);
        let err = decider.classify(&far).unwrap_err();
        assert!(matches!(
            err,
            PatchError::LabelOutOfRange {
                label: 7,
                classes: 2
            }
        ));
    }

    #[test]
    fn failed_training_leaves_unbuilt() {
        let mut decider = RegionDecider::new(Box::new(Sign {
            fail: true,
            ..Sign::plain()
        }));
        let err = decider.train(&redefined()).unwrap_err();
        assert_eq!(err.code(), 20);
        assert_eq!(decider.state(), DeciderState::Unbuilt);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let mut decider = RegionDecider::new(Box::new(Sign::plain()));
        let empty = redefined().empty_copy();
        assert!(matches!(
            decider.train(&empty),
            Err(PatchError::EmptyDataset)
        ));
        assert!(!decider.is_built());
    }
}
