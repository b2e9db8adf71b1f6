//! Configuration snapshots for run provenance.
//!
//! A snapshot captures the exact effective configuration when a classifier
//! is built, so that the updates it logs can be tied back to it later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::LoadedConfig;
use crate::settings::{MergeWeighting, PatchingConfig};

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Where the configuration came from.
    pub source: String,

    /// Path the configuration was loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// SHA-256 of the canonical JSON rendering of the effective config.
    pub config_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub batch_size: usize,
    pub batches_to_keep: usize,
    pub use_base_label_as_feature: bool,
    pub min_patch_size: usize,
    pub merge_weighting: MergeWeighting,
    pub base_predictor: String,
    pub decider_predictor: String,
    pub patch_predictor: String,
}

impl ConfigSnapshot {
    /// Snapshot a configuration that was not loaded from disk.
    pub fn new(config: &PatchingConfig) -> Self {
        Self::build(config, "builtin default".to_string(), None)
    }

    /// Snapshot a resolved configuration, keeping its provenance.
    pub fn from_loaded(loaded: &LoadedConfig) -> Self {
        Self::build(
            &loaded.config,
            loaded.source.to_string(),
            loaded.path.as_ref().map(|p| p.display().to_string()),
        )
    }

    fn build(config: &PatchingConfig, source: String, path: Option<String>) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            source,
            path,
            config_hash: config_hash(config),
            summary: ConfigSummary {
                batch_size: config.batch_size,
                batches_to_keep: config.batches_to_keep,
                use_base_label_as_feature: config.use_base_label_as_feature,
                min_patch_size: config.min_patch_size,
                merge_weighting: config.merge_weighting,
                base_predictor: config.predictors.base.clone(),
                decider_predictor: config.predictors.decider.clone(),
                patch_predictor: config.predictors.patch.clone(),
            },
        }
    }

    /// Check whether two snapshots describe the same effective config.
    pub fn same_config(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }
}

/// Hash the canonical JSON rendering of a configuration.
pub fn config_hash(config: &PatchingConfig) -> String {
    let canonical = serde_json::to_string(config).unwrap_or_default();
    hash_content(&canonical)
}

/// Compute SHA-256 hash of content.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
