//! Typed patching configuration.
//!
//! Files may be TOML (`.toml`, the default) or JSON (`.json`). Every field
//! is optional on disk and falls back to the built-in default:
//!
//! ```toml
//! batch_size = 500
//! batches_to_keep = 5
//! use_base_label_as_feature = false
//! min_patch_size = 5
//! merge_weighting = "uniform"
//!
//! [predictors]
//! base = "random_forest"
//! decider = "random_forest"
//! patch = "random_forest"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, ValidationResult};

/// Instances observed between model updates.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Batches kept in the sliding store.
pub const DEFAULT_BATCHES_TO_KEEP: usize = 5;

/// Smallest region subset a patch is trained on.
pub const DEFAULT_MIN_PATCH_SIZE: usize = 5;

/// Predictor used for every role unless configured otherwise.
pub const DEFAULT_PREDICTOR: &str = "random_forest";

/// How instance weights are assigned when the sliding store is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeWeighting {
    /// Records keep the weight they arrived with.
    #[default]
    Uniform,
    /// Records of the batch at offset `i >= 1` from the oldest retained
    /// batch get weight `i`; the oldest batch is left untouched.
    BatchAge,
}

impl std::str::FromStr for MergeWeighting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uniform" | "none" => Ok(MergeWeighting::Uniform),
            "batch_age" | "batch-age" | "age" => Ok(MergeWeighting::BatchAge),
            _ => Err(format!("unknown merge weighting: {}", s)),
        }
    }
}

impl std::fmt::Display for MergeWeighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeWeighting::Uniform => write!(f, "uniform"),
            MergeWeighting::BatchAge => write!(f, "batch_age"),
        }
    }
}

/// Registry names of the predictors used for each role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictorNames {
    /// Predictor retrained on the full window until patching is enabled.
    pub base: String,
    /// Region-aware learner of the "was the base right here?" problem.
    pub decider: String,
    /// Learner trained per error region.
    pub patch: String,
}

impl Default for PredictorNames {
    fn default() -> Self {
        PredictorNames {
            base: DEFAULT_PREDICTOR.to_string(),
            decider: DEFAULT_PREDICTOR.to_string(),
            patch: DEFAULT_PREDICTOR.to_string(),
        }
    }
}

/// Complete patching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatchingConfig {
    /// Schema version of the file.
    pub schema_version: String,
    /// Number of instances to observe between model updates.
    pub batch_size: usize,
    /// Number of batches to keep in the sliding store.
    pub batches_to_keep: usize,
    /// Feed the base predictor's label to the decider and patches as an
    /// extra leading feature.
    pub use_base_label_as_feature: bool,
    /// Region subsets smaller than this defer to the base predictor.
    pub min_patch_size: usize,
    /// Weighting applied when merging the sliding store.
    pub merge_weighting: MergeWeighting,
    /// Predictor names per role.
    pub predictors: PredictorNames,
}

impl Default for PatchingConfig {
    fn default() -> Self {
        PatchingConfig {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            batches_to_keep: DEFAULT_BATCHES_TO_KEEP,
            use_base_label_as_feature: false,
            min_patch_size: DEFAULT_MIN_PATCH_SIZE,
            merge_weighting: MergeWeighting::Uniform,
            predictors: PredictorNames::default(),
        }
    }
}

impl PatchingConfig {
    /// Load a configuration file, choosing the parser by extension.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> ValidationResult<Self> {
        toml::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> ValidationResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> ValidationResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("Cannot render TOML: {}", e)))
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_batches_to_keep(mut self, batches_to_keep: usize) -> Self {
        self.batches_to_keep = batches_to_keep;
        self
    }

    pub fn with_base_label_feature(mut self, enabled: bool) -> Self {
        self.use_base_label_as_feature = enabled;
        self
    }

    pub fn with_min_patch_size(mut self, min_patch_size: usize) -> Self {
        self.min_patch_size = min_patch_size;
        self
    }

    pub fn with_merge_weighting(mut self, weighting: MergeWeighting) -> Self {
        self.merge_weighting = weighting;
        self
    }

    pub fn with_predictors(mut self, predictors: PredictorNames) -> Self {
        self.predictors = predictors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let config = PatchingConfig::default();
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.batches_to_keep, 5);
        assert_eq!(config.min_patch_size, 5);
        assert!(!config.use_base_label_as_feature);
        assert_eq!(config.merge_weighting, MergeWeighting::Uniform);
        assert_eq!(config.predictors.decider, "random_forest");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PatchingConfig::from_toml_str(
            r#"
batch_size = 4
merge_weighting = "batch_age"

[predictors]
decider = "rule_set"
"#,
        )
        .unwrap();
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.batches_to_keep, DEFAULT_BATCHES_TO_KEEP);
        assert_eq!(config.merge_weighting, MergeWeighting::BatchAge);
        assert_eq!(config.predictors.decider, "rule_set");
        assert_eq!(config.predictors.base, DEFAULT_PREDICTOR);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = PatchingConfig::from_toml_str("batch_sise = 4").unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }

    #[test]
    fn test_json_parsing() {
        let config =
            PatchingConfig::from_json_str(r#"{"use_base_label_as_feature": true}"#).unwrap();
        assert!(config.use_base_label_as_feature);
    }

    #[test]
    fn test_toml_render_parses_back() {
        let config = PatchingConfig::default()
            .with_batch_size(64)
            .with_merge_weighting(MergeWeighting::BatchAge);
        let text = config.to_toml_string().unwrap();
        assert_eq!(PatchingConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_merge_weighting_parse() {
        assert_eq!(
            "uniform".parse::<MergeWeighting>().unwrap(),
            MergeWeighting::Uniform
        );
        assert_eq!(
            "batch-age".parse::<MergeWeighting>().unwrap(),
            MergeWeighting::BatchAge
        );
        assert!("oldest".parse::<MergeWeighting>().is_err());
        assert_eq!(MergeWeighting::BatchAge.to_string(), "batch_age");
    }
}
