//! Per-region patch predictors.

use serde::Serialize;

use cp_common::{Label, Record, RegionId, Result};

use crate::partition::RegionSubsets;
use crate::predictor::{Predictor, PredictorFactory};

/// What happened to one region when the patches were trained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatchStatus {
    Trained { size: usize },
    TooSmall { size: usize },
    Failed { size: usize, message: String },
}

impl PatchStatus {
    pub fn is_trained(&self) -> bool {
        matches!(self, PatchStatus::Trained { .. })
    }
}

/// Result of asking the ensemble for a patched label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchLookup {
    Patched(Label),
    /// No patch covers the region; the caller falls back to the base.
    NotApplicable,
}

/// One optional patch predictor per region.
#[derive(Default)]
pub struct PatchEnsemble {
    patches: Vec<Option<Box<dyn Predictor>>>,
    statuses: Vec<PatchStatus>,
}

impl PatchEnsemble {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Train one patch per subset with at least `min_size` records.
    ///
    /// A patch that fails to train leaves its slot empty and is recorded
    /// as [`PatchStatus::Failed`]; the other regions are unaffected.
    pub fn train(subsets: &RegionSubsets, factory: &dyn PredictorFactory, min_size: usize) -> Self {
        let mut patches = Vec::with_capacity(subsets.len());
        let mut statuses = Vec::with_capacity(subsets.len());

        for (region, subset) in subsets.iter().enumerate() {
            let size = subset.len();
            if size < min_size {
                tracing::debug!(region, size, min_size, "region too small for a patch");
                patches.push(None);
                statuses.push(PatchStatus::TooSmall { size });
                continue;
            }

            let trained = factory.create().and_then(|mut patch| {
                patch.train(subset)?;
                Ok(patch)
            });
            match trained {
                Ok(patch) => {
                    tracing::debug!(region, size, predictor = patch.name(), "patch trained");
                    patches.push(Some(patch));
                    statuses.push(PatchStatus::Trained { size });
                }
                Err(err) => {
                    tracing::warn!(region, size, error = %err, "patch training failed");
                    patches.push(None);
                    statuses.push(PatchStatus::Failed {
                        size,
                        message: err.to_string(),
                    });
                }
            }
        }

        PatchEnsemble { patches, statuses }
    }

    /// Number of region slots, trained or not.
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn trained_count(&self) -> usize {
        self.patches.iter().filter(|p| p.is_some()).count()
    }

    pub fn has_patch(&self, region: RegionId) -> bool {
        matches!(self.patches.get(region), Some(Some(_)))
    }

    pub fn statuses(&self) -> &[PatchStatus] {
        &self.statuses
    }

    /// Classify `record` with the patch for `region`.
    ///
    /// In single-region mode every record is routed to slot 0 whatever
    /// region the decider reported.
    pub fn classify(
        &self,
        record: &Record,
        region: RegionId,
        multi_region: bool,
    ) -> Result<PatchLookup> {
        let slot = if multi_region { region } else { 0 };
        match self.patches.get(slot) {
            Some(Some(patch)) => patch.classify(record).map(PatchLookup::Patched),
            _ => Ok(PatchLookup::NotApplicable),
        }
    }
}

impl std::fmt::Debug for PatchEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchEnsemble")
            .field("statuses", &self.statuses)
            .finish()
    }
}
