//! The patching classifier: stream ingestion, update cycles and routing.
//!
//! Records are buffered into batches. Every full batch enters the sliding
//! window, and the merged window is used either to rebuild the base
//! predictor (while bootstrapping) or to run an update cycle (once patching
//! is enabled):
//!
//! 1. redefine the window as "was the base predictor right?"
//! 2. train a fresh region decider on the redefined problem
//! 3. optionally prepend the base prediction as a feature
//! 4. partition the window into per-region error subsets
//! 5. train one patch per large-enough subset
//! 6. publish decider and patches as one immutable snapshot
//!
//! Classification only ever reads a published [`ModelSnapshot`], so a
//! reader sees either the previous model or the new one, never a mix.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use cp_common::{Correctness, Dataset, Label, PatchError, Record, RegionId, Result, Schema};
use cp_config::{validate_config, ConfigSnapshot, LoadedConfig, PatchingConfig};

use crate::decider::{DeciderState, RegionDecider, RegionDecision};
use crate::evaluate::accuracy_by;
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::partition::{partition, RegionSubsets};
use crate::patches::{PatchEnsemble, PatchLookup, PatchStatus};
use crate::predictor::{Predictor, PredictorFactories, PredictorRegistry, Role};
use crate::redefine::{
    augment_dataset, augment_record, label_from_feature, redefine, strip_augmentation,
};
use crate::store::SlidingBatchStore;

/// Lifecycle phase of a [`PatchingClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Every full batch rebuilds the base predictor.
    Bootstrapping,
    /// Every full batch runs an update cycle; the base predictor is frozen.
    Patching,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Bootstrapping => write!(f, "bootstrapping"),
            Phase::Patching => write!(f, "patching"),
        }
    }
}

/// Which predictor produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// No decider yet, or the decider trusts the base predictor.
    Base,
    /// The decider trusts the base and its prediction was read back from
    /// the prepended feature.
    BaseFromFeature,
    /// A region patch.
    Patch(RegionId),
    /// Routing did not produce a label; the base predictor answered.
    Fallback,
}

/// A label plus the route that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub label: Label,
    pub route: Route,
}

/// Immutable published model: base predictor, decider and patches.
pub struct ModelSnapshot {
    base: Option<Arc<dyn Predictor>>,
    decider: Option<RegionDecider>,
    patches: PatchEnsemble,
    augment: bool,
    num_features: usize,
    num_classes: usize,
    version: u64,
}

impl ModelSnapshot {
    fn empty(augment: bool, schema: &Schema, version: u64) -> Self {
        ModelSnapshot {
            base: None,
            decider: None,
            patches: PatchEnsemble::empty(),
            augment,
            num_features: schema.num_features(),
            num_classes: schema.num_classes(),
            version,
        }
    }

    /// Whether a base predictor has been built.
    pub fn is_ready(&self) -> bool {
        self.base.is_some()
    }

    /// Increases with every publication.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn base_name(&self) -> Option<&str> {
        self.base.as_deref().map(Predictor::name)
    }

    pub fn decider(&self) -> Option<&RegionDecider> {
        self.decider.as_ref()
    }

    pub fn patches(&self) -> &PatchEnsemble {
        &self.patches
    }

    pub fn classify(&self, record: &Record) -> Result<Label> {
        self.classify_detailed(record).map(|c| c.label)
    }

    /// Classify `record` and report the route taken.
    ///
    /// Any failure while routing through the decider or a patch falls back
    /// to the base predictor on the original record. Without a base
    /// predictor the result is [`PatchError::ModelNotReady`]. Only the
    /// feature count is checked; the label may be a placeholder.
    pub fn classify_detailed(&self, record: &Record) -> Result<Classification> {
        if record.num_features() != self.num_features {
            return Err(PatchError::SchemaMismatch {
                expected: self.num_features,
                actual: record.num_features(),
            });
        }
        let base = self.base.as_deref().ok_or(PatchError::ModelNotReady)?;

        let Some(decider) = &self.decider else {
            let label = base.classify(record)?;
            return Ok(Classification {
                label,
                route: Route::Base,
            });
        };

        match self.route(base, decider, record) {
            Ok(Some(classification)) => return Ok(classification),
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(
                    target: event_names::CLASSIFY_FALLBACK,
                    error = %err,
                    "routing failed; using base predictor"
                );
            }
        }

        let label = base.classify(record)?;
        Ok(Classification {
            label,
            route: Route::Fallback,
        })
    }

    fn route(
        &self,
        base: &dyn Predictor,
        decider: &RegionDecider,
        record: &Record,
    ) -> Result<Option<Classification>> {
        let routed: Cow<'_, Record> = if self.augment {
            let (augmented, _) = augment_record(record, base)?;
            Cow::Owned(augmented)
        } else {
            Cow::Borrowed(record)
        };

        match decider.classify(&routed)? {
            RegionDecision::Undecided => Ok(None),
            RegionDecision::Decided {
                verdict: Correctness::Right,
                ..
            } => {
                if self.augment {
                    Ok(routed
                        .feature(0)
                        .and_then(label_from_feature)
                        .map(|label| Classification {
                            label,
                            route: Route::BaseFromFeature,
                        }))
                } else {
                    let label = base.classify(record)?;
                    Ok(Some(Classification {
                        label,
                        route: Route::Base,
                    }))
                }
            }
            RegionDecision::Decided {
                verdict: Correctness::Wrong,
                region,
            } => {
                let multi_region = decider.is_multi_region();
                match self.patches.classify(&routed, region, multi_region)? {
                    PatchLookup::Patched(label) => Ok(Some(Classification {
                        label,
                        route: Route::Patch(if multi_region { region } else { 0 }),
                    })),
                    PatchLookup::NotApplicable => Ok(None),
                }
            }
        }
    }

    /// One-hot vote vector over the class domain.
    pub fn votes(&self, record: &Record) -> Result<Vec<f64>> {
        let label = self.classify(record)?;
        if label >= self.num_classes {
            return Err(PatchError::LabelOutOfRange {
                label,
                classes: self.num_classes,
            });
        }
        let mut votes = vec![0.0; self.num_classes];
        votes[label] = 1.0;
        Ok(votes)
    }
}

impl fmt::Debug for ModelSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSnapshot")
            .field("version", &self.version)
            .field("base", &self.base_name())
            .field("decider", &self.decider)
            .field("patches", &self.patches)
            .field("augment", &self.augment)
            .finish()
    }
}

type SharedSnapshot = Arc<RwLock<Arc<ModelSnapshot>>>;

fn load(cell: &RwLock<Arc<ModelSnapshot>>) -> Arc<ModelSnapshot> {
    match cell.read() {
        Ok(guard) => Arc::clone(&guard),
        Err(poisoned) => {
            let guard = poisoned.into_inner();
            Arc::clone(&guard)
        }
    }
}

/// Read-only handle classifying against the latest published snapshot.
///
/// Cheap to clone and usable from any thread while the owning
/// [`PatchingClassifier`] keeps training.
#[derive(Clone)]
pub struct PatchingReader {
    committed: SharedSnapshot,
}

impl PatchingReader {
    pub fn snapshot(&self) -> Arc<ModelSnapshot> {
        load(&self.committed)
    }

    pub fn classify(&self, record: &Record) -> Result<Label> {
        self.snapshot().classify(record)
    }

    pub fn classify_detailed(&self, record: &Record) -> Result<Classification> {
        self.snapshot().classify_detailed(record)
    }

    pub fn votes(&self, record: &Record) -> Result<Vec<f64>> {
        self.snapshot().votes(record)
    }
}

impl fmt::Debug for PatchingReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchingReader")
            .field("version", &self.snapshot().version())
            .finish()
    }
}

/// Summary of one update cycle.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    /// 1-based update cycle number.
    pub update: u64,
    pub instances_seen: u64,
    pub merged_records: usize,
    pub redefinition_failures: usize,
    /// Records the base predictor got wrong (failures included).
    pub wrong_instances: usize,
    pub decider_state: DeciderState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decider_error: Option<String>,
    pub region_count: usize,
    pub subset_sizes: Vec<usize>,
    /// Records the decider could not place during partitioning.
    pub skipped_records: usize,
    pub patches: Vec<PatchStatus>,
    /// Base accuracy on each region subset; `None` for empty subsets.
    pub base_accuracy: Vec<Option<f64>>,
}

impl UpdateReport {
    fn new(update: u64, instances_seen: u64, merged_records: usize) -> Self {
        UpdateReport {
            update,
            instances_seen,
            merged_records,
            redefinition_failures: 0,
            wrong_instances: 0,
            decider_state: DeciderState::Unbuilt,
            decider_error: None,
            region_count: 0,
            subset_sizes: Vec::new(),
            skipped_records: 0,
            patches: Vec::new(),
            base_accuracy: Vec::new(),
        }
    }

    pub fn patches_trained(&self) -> usize {
        self.patches.iter().filter(|s| s.is_trained()).count()
    }
}

/// What a call to [`PatchingClassifier::train`] did.
#[derive(Debug)]
pub enum TrainOutcome {
    /// The record was added to the current batch.
    Buffered,
    /// The batch was flushed and the base predictor rebuilt on the window.
    BaseRebuilt { records: usize },
    /// The batch was flushed but the base predictor failed to train; the
    /// previously published model is kept.
    BaseBuildFailed(PatchError),
    /// The batch was flushed and an update cycle ran.
    Updated(UpdateReport),
}

/// Stream classifier that patches a base predictor where it is wrong.
pub struct PatchingClassifier {
    config: PatchingConfig,
    schema: Schema,
    factories: PredictorFactories,
    phase: Phase,
    store: SlidingBatchStore,
    batch: Dataset,
    updates: u64,
    instances_seen: u64,
    version: u64,
    committed: SharedSnapshot,
    log: LogContext,
    config_snapshot: ConfigSnapshot,
}

impl PatchingClassifier {
    /// Build a classifier from validated configuration and factories.
    ///
    /// Fails with a configuration-category error if the configuration is
    /// invalid, the schema has no classes, or a factory cannot produce a
    /// predictor.
    pub fn new(
        config: PatchingConfig,
        schema: Schema,
        factories: PredictorFactories,
    ) -> Result<Self> {
        let snapshot = ConfigSnapshot::new(&config);
        Self::build(config, schema, factories, snapshot)
    }

    /// Build a classifier resolving the configured predictor names.
    pub fn from_registry(
        config: PatchingConfig,
        schema: Schema,
        registry: &PredictorRegistry,
    ) -> Result<Self> {
        let factories = registry.resolve(&config.predictors)?;
        Self::new(config, schema, factories)
    }

    /// Build a classifier from a resolved configuration file.
    pub fn from_loaded(
        loaded: LoadedConfig,
        schema: Schema,
        registry: &PredictorRegistry,
    ) -> Result<Self> {
        let snapshot = ConfigSnapshot::from_loaded(&loaded);
        let factories = registry.resolve(&loaded.config.predictors)?;
        Self::build(loaded.config, schema, factories, snapshot)
    }

    fn build(
        config: PatchingConfig,
        schema: Schema,
        factories: PredictorFactories,
        config_snapshot: ConfigSnapshot,
    ) -> Result<Self> {
        validate_config(&config)?;
        if schema.num_classes() == 0 {
            return Err(PatchError::InvalidOption {
                field: "schema".to_string(),
                message: "class domain must not be empty".to_string(),
            });
        }
        factories.probe()?;

        let log = LogContext::default();
        log_event!(
            log,
            INFO,
            event_names::CLASSIFIER_CREATED,
            Stage::Init,
            "Patching classifier created",
            config_hash = config_snapshot.config_hash.as_str(),
            config_source = config_snapshot.source.as_str(),
            batch_size = config.batch_size,
            batches_to_keep = config.batches_to_keep,
            augment = config.use_base_label_as_feature
        );

        let initial = ModelSnapshot::empty(config.use_base_label_as_feature, &schema, 0);

        Ok(PatchingClassifier {
            store: SlidingBatchStore::new(config.batches_to_keep),
            batch: Dataset::new(schema.clone()),
            config,
            schema,
            factories,
            phase: Phase::Bootstrapping,
            updates: 0,
            instances_seen: 0,
            version: 0,
            committed: Arc::new(RwLock::new(Arc::new(initial))),
            log,
            config_snapshot,
        })
    }

    /// Tag every log event of this classifier with a stream label.
    pub fn with_stream_id(mut self, stream_id: impl Into<String>) -> Self {
        self.log = self.log.with_stream_id(stream_id);
        self
    }

    /// Feed one labelled record.
    pub fn train(&mut self, record: Record) -> Result<TrainOutcome> {
        if let Err(err) = self.batch.push(record) {
            log_event!(
                self.log,
                WARN,
                event_names::RECORD_REJECTED,
                Stage::Ingest,
                "Record rejected",
                error = tracing::field::display(&err)
            );
            return Err(err);
        }
        self.instances_seen += 1;

        if self.batch.len() < self.config.batch_size {
            return Ok(TrainOutcome::Buffered);
        }

        let batch = std::mem::replace(&mut self.batch, Dataset::new(self.schema.clone()));
        let flushed = batch.len();
        let evicted = self.store.add_batch(batch);
        log_event!(
            self.log,
            DEBUG,
            event_names::BATCH_FLUSHED,
            Stage::Ingest,
            "Batch flushed into window",
            records = flushed,
            evicted = evicted,
            window = self.store.len()
        );

        let merged = self
            .store
            .merged(self.config.merge_weighting)
            .unwrap_or_else(|| Dataset::new(self.schema.clone()));

        match (self.phase, self.snapshot().base.clone()) {
            (Phase::Patching, Some(base)) => {
                Ok(TrainOutcome::Updated(self.update_cycle(merged, base)))
            }
            (Phase::Patching, None) => {
                log_event!(
                    self.log,
                    WARN,
                    event_names::BASE_MISSING,
                    Stage::Bootstrap,
                    "Patching enabled without a base predictor; rebuilding base"
                );
                Ok(self.rebuild_base(&merged))
            }
            (Phase::Bootstrapping, _) => Ok(self.rebuild_base(&merged)),
        }
    }

    fn rebuild_base(&mut self, merged: &Dataset) -> TrainOutcome {
        let span = tracing::info_span!(
            "bootstrap",
            run_id = %self.log.run_id,
            stage = %Stage::Bootstrap
        );
        let _guard = span.enter();

        let built = self.factories.create(Role::Base).and_then(|mut base| {
            if merged.is_empty() {
                return Err(PatchError::EmptyDataset);
            }
            base.train(merged)
                .map_err(|err| PatchError::training("base predictor", err))?;
            Ok(base)
        });

        match built {
            Ok(base) => {
                log_event!(
                    self.log,
                    INFO,
                    event_names::BASE_REBUILT,
                    Stage::Bootstrap,
                    "Base predictor rebuilt",
                    records = merged.len(),
                    predictor = base.name()
                );
                let version = self.next_version();
                let snapshot = ModelSnapshot {
                    base: Some(Arc::from(base)),
                    ..ModelSnapshot::empty(
                        self.config.use_base_label_as_feature,
                        &self.schema,
                        version,
                    )
                };
                self.publish(snapshot);
                TrainOutcome::BaseRebuilt {
                    records: merged.len(),
                }
            }
            Err(err) => {
                log_event!(
                    self.log,
                    WARN,
                    event_names::BASE_BUILD_FAILED,
                    Stage::Bootstrap,
                    "Base predictor failed to train; keeping previous model",
                    error = tracing::field::display(&err)
                );
                TrainOutcome::BaseBuildFailed(err)
            }
        }
    }

    fn update_cycle(&mut self, data: Dataset, base: Arc<dyn Predictor>) -> UpdateReport {
        self.updates += 1;
        let update = self.updates;
        let span = tracing::info_span!("update", run_id = %self.log.run_id, update);
        let _guard = span.enter();

        let augment = self.config.use_base_label_as_feature;
        let mut report = UpdateReport::new(update, self.instances_seen, data.len());
        log_event!(
            self.log,
            INFO,
            event_names::UPDATE_STARTED,
            Stage::Redefine,
            "Update cycle started",
            merged_records = data.len()
        );

        let decider = self.build_decider(&data, base.as_ref(), augment, &mut report);

        let subsets = match &decider {
            Some(decider) => {
                let view = if augment {
                    augment_dataset(&data, base.as_ref())
                } else {
                    Ok(data)
                };
                match view {
                    Ok(view) => partition(&view, decider),
                    Err(err) => {
                        log_event!(
                            self.log,
                            WARN,
                            event_names::PARTITION_FINISHED,
                            Stage::Partition,
                            "Augmentation failed; no subsets this cycle",
                            error = tracing::field::display(&err)
                        );
                        RegionSubsets::empty()
                    }
                }
            }
            None => RegionSubsets::empty(),
        };
        report.subset_sizes = subsets.sizes();
        report.skipped_records = subsets.skipped();
        log_event!(
            self.log,
            DEBUG,
            event_names::PARTITION_FINISHED,
            Stage::Partition,
            "Error subsets built",
            subsets = subsets.len(),
            skipped = subsets.skipped()
        );

        report.base_accuracy = subsets
            .iter()
            .map(|subset| {
                accuracy_by(subset, |record| {
                    if augment {
                        base.classify(&strip_augmentation(record))
                    } else {
                        base.classify(record)
                    }
                })
                .ratio()
            })
            .collect();

        let patches = PatchEnsemble::train(
            &subsets,
            self.factories.patch.as_ref(),
            self.config.min_patch_size,
        );
        self.log_patches(patches.statuses());
        report.patches = patches.statuses().to_vec();

        let snapshot = ModelSnapshot {
            base: Some(base),
            decider,
            patches,
            augment,
            num_features: self.schema.num_features(),
            num_classes: self.schema.num_classes(),
            version: self.next_version(),
        };
        self.publish(snapshot);

        log_event!(
            self.log,
            INFO,
            event_names::UPDATE_FINISHED,
            Stage::Patch,
            "Update cycle committed",
            patches_trained = report.patches_trained(),
            regions = report.region_count
        );
        report
    }

    /// Redefine the window and train a fresh decider on it.
    ///
    /// Returns `None` only when no decider could be created at all; a
    /// decider that failed to train is returned unbuilt.
    fn build_decider(
        &self,
        data: &Dataset,
        base: &dyn Predictor,
        augment: bool,
        report: &mut UpdateReport,
    ) -> Option<RegionDecider> {
        let redefined = match redefine(data, base, augment) {
            Ok(redefined) => redefined,
            Err(err) => {
                report.decider_error = Some(err.to_string());
                log_event!(
                    self.log,
                    WARN,
                    event_names::DECIDER_FAILED,
                    Stage::Redefine,
                    "Problem redefinition failed",
                    error = tracing::field::display(&err)
                );
                return None;
            }
        };
        report.redefinition_failures = redefined.failures;
        report.wrong_instances = redefined.wrong;
        log_event!(
            self.log,
            DEBUG,
            event_names::REDEFINE_FINISHED,
            Stage::Redefine,
            "Window redefined as wrong/right",
            wrong = redefined.wrong,
            failures = redefined.failures
        );

        let predictor = match self.factories.create(Role::Decider) {
            Ok(predictor) => predictor,
            Err(err) => {
                report.decider_error = Some(err.to_string());
                log_event!(
                    self.log,
                    WARN,
                    event_names::DECIDER_FAILED,
                    Stage::Region,
                    "Decider factory failed",
                    error = tracing::field::display(&err)
                );
                return None;
            }
        };

        let mut decider = RegionDecider::new(predictor);
        match decider.train(&redefined.dataset) {
            Ok(()) => {
                report.region_count = decider.region_count();
                log_event!(
                    self.log,
                    INFO,
                    event_names::DECIDER_BUILT,
                    Stage::Region,
                    "Region decider built",
                    regions = decider.region_count(),
                    predictor = decider.predictor_name()
                );
            }
            Err(err) => {
                report.decider_error = Some(err.to_string());
                log_event!(
                    self.log,
                    WARN,
                    event_names::DECIDER_FAILED,
                    Stage::Region,
                    "Region decider failed to train; routing falls back to base",
                    error = tracing::field::display(&err)
                );
            }
        }
        report.decider_state = decider.state();
        Some(decider)
    }

    fn log_patches(&self, statuses: &[PatchStatus]) {
        for (region, status) in statuses.iter().enumerate() {
            match status {
                PatchStatus::Trained { size } => log_event!(
                    self.log,
                    INFO,
                    event_names::PATCH_TRAINED,
                    Stage::Patch,
                    "Patch trained",
                    region = region,
                    size = *size
                ),
                PatchStatus::TooSmall { size } => log_event!(
                    self.log,
                    DEBUG,
                    event_names::PATCH_SKIPPED,
                    Stage::Patch,
                    "Region below minimum patch size",
                    region = region,
                    size = *size
                ),
                PatchStatus::Failed { size, message } => log_event!(
                    self.log,
                    WARN,
                    event_names::PATCH_FAILED,
                    Stage::Patch,
                    "Patch failed to train",
                    region = region,
                    size = *size,
                    error = message.as_str()
                ),
            }
        }
    }

    fn next_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    fn publish(&self, snapshot: ModelSnapshot) {
        let snapshot = Arc::new(snapshot);
        match self.committed.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }

    /// Switch from bootstrapping to patching.
    ///
    /// Returns `false` (and changes nothing) if patching is already enabled.
    pub fn enable_patching(&mut self) -> bool {
        if self.phase == Phase::Patching {
            return false;
        }
        self.phase = Phase::Patching;
        log_event!(
            self.log,
            INFO,
            event_names::PATCHING_ENABLED,
            Stage::Init,
            "Patching enabled",
            instances_seen = self.instances_seen
        );
        true
    }

    /// Drop all learned state and buffered data; back to bootstrapping.
    pub fn reset(&mut self) {
        self.phase = Phase::Bootstrapping;
        self.store.clear();
        self.batch = Dataset::new(self.schema.clone());
        self.updates = 0;
        self.instances_seen = 0;
        let version = self.next_version();
        let empty = ModelSnapshot::empty(
            self.config.use_base_label_as_feature,
            &self.schema,
            version,
        );
        self.publish(empty);
        log_event!(
            self.log,
            INFO,
            event_names::CLASSIFIER_RESET,
            Stage::Init,
            "Classifier reset"
        );
    }

    /// The currently published model.
    pub fn snapshot(&self) -> Arc<ModelSnapshot> {
        load(&self.committed)
    }

    /// A handle for classifying from other threads.
    pub fn reader(&self) -> PatchingReader {
        PatchingReader {
            committed: Arc::clone(&self.committed),
        }
    }

    pub fn classify(&self, record: &Record) -> Result<Label> {
        self.snapshot().classify(record)
    }

    pub fn classify_detailed(&self, record: &Record) -> Result<Classification> {
        self.snapshot().classify_detailed(record)
    }

    pub fn votes(&self, record: &Record) -> Result<Vec<f64>> {
        self.snapshot().votes(record)
    }

    /// Whether the current model predicts the record's own label.
    pub fn correctly_classifies(&self, record: &Record) -> Result<bool> {
        Ok(self.classify(record)? == record.label())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of update cycles run since construction or reset.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn instances_seen(&self) -> u64 {
        self.instances_seen
    }

    /// Records buffered in the current, not yet flushed batch.
    pub fn instances_in_batch(&self) -> usize {
        self.batch.len()
    }

    pub fn store(&self) -> &SlidingBatchStore {
        &self.store
    }

    pub fn config(&self) -> &PatchingConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config_snapshot(&self) -> &ConfigSnapshot {
        &self.config_snapshot
    }

    pub fn log_context(&self) -> &LogContext {
        &self.log
    }

    /// Human-readable summary of the current model.
    pub fn describe(&self) -> String {
        let snapshot = self.snapshot();
        let mut lines = vec![
            format!("phase: {}", self.phase),
            format!(
                "window: {}/{} batches, {} records",
                self.store.len(),
                self.store.capacity(),
                self.store.total_records()
            ),
            format!("updates: {}", self.updates),
            format!("base: {}", snapshot.base_name().unwrap_or("not built")),
        ];
        match snapshot.decider() {
            Some(decider) => lines.push(format!(
                "decider: {} ({:?}, {} region(s))",
                decider.predictor_name(),
                decider.state(),
                decider.region_count()
            )),
            None => lines.push("decider: none".to_string()),
        }
        lines.push(format!(
            "patches: {}/{} trained",
            snapshot.patches().trained_count(),
            snapshot.patches().len()
        ));
        lines.join("\n")
    }
}

impl fmt::Debug for PatchingClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchingClassifier")
            .field("run_id", &self.log.run_id)
            .field("phase", &self.phase)
            .field("updates", &self.updates)
            .field("instances_seen", &self.instances_seen)
            .field("window", &self.store.len())
            .finish()
    }
}
