//! Error types for classifier patching.
//!
//! Errors are grouped into a small taxonomy:
//! - Configuration errors are fatal, but only at construction time
//! - Training errors are recovered locally by the update cycle
//! - Classification errors are converted into the base-predictor fallback;
//!   only `ModelNotReady` is ever surfaced to a stream caller
//!
//! Every variant carries a stable numeric code for machine parsing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for patching operations.
pub type Result<T> = std::result::Result<T, PatchError>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid options or predictor factories.
    Config,
    /// A predictor failed to fit its data.
    Training,
    /// A predictor could not produce a label.
    Classification,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Training => write!(f, "training"),
            ErrorCategory::Classification => write!(f, "classification"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for classifier patching.
#[derive(Error, Debug)]
pub enum PatchError {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no predictor named '{name}' is registered for the {role} role")]
    UnknownPredictor { role: String, name: String },

    #[error("predictor factory for the {role} role failed: {message}")]
    FactoryFailed { role: String, message: String },

    #[error("invalid value for {field}: {message}")]
    InvalidOption { field: String, message: String },

    // Training errors (20-29)
    #[error("training {component} failed: {message}")]
    Training { component: String, message: String },

    #[error("cannot train on an empty dataset")]
    EmptyDataset,

    #[error("schema mismatch: expected {expected} features, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    // Classification errors (30-39)
    #[error("model not ready: no base predictor has been built yet")]
    ModelNotReady,

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("region decider has not been built")]
    DeciderUnbuilt,

    #[error("label {label} is outside the class domain of {classes} classes")]
    LabelOutOfRange { label: usize, classes: usize },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PatchError {
    /// Shorthand for a training failure of a named component.
    pub fn training(component: impl Into<String>, message: impl std::fmt::Display) -> Self {
        PatchError::Training {
            component: component.into(),
            message: message.to_string(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Training errors
    /// - 30-39: Classification errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            PatchError::Config(_) => 10,
            PatchError::UnknownPredictor { .. } => 11,
            PatchError::FactoryFailed { .. } => 12,
            PatchError::InvalidOption { .. } => 13,
            PatchError::Training { .. } => 20,
            PatchError::EmptyDataset => 21,
            PatchError::SchemaMismatch { .. } => 22,
            PatchError::ModelNotReady => 30,
            PatchError::Classification(_) => 31,
            PatchError::DeciderUnbuilt => 32,
            PatchError::LabelOutOfRange { .. } => 33,
            PatchError::Io(_) => 60,
            PatchError::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            PatchError::Config(_)
            | PatchError::UnknownPredictor { .. }
            | PatchError::FactoryFailed { .. }
            | PatchError::InvalidOption { .. } => ErrorCategory::Config,

            PatchError::Training { .. }
            | PatchError::EmptyDataset
            | PatchError::SchemaMismatch { .. } => ErrorCategory::Training,

            PatchError::ModelNotReady
            | PatchError::Classification(_)
            | PatchError::DeciderUnbuilt
            | PatchError::LabelOutOfRange { .. } => ErrorCategory::Classification,

            PatchError::Io(_) | PatchError::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether the stream can keep going after this error.
    ///
    /// Configuration errors require a new classifier; everything else is
    /// absorbed by the fallback policy or goes away with more data.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PatchError::Config(_)
            | PatchError::UnknownPredictor { .. }
            | PatchError::FactoryFailed { .. }
            | PatchError::InvalidOption { .. } => false,

            PatchError::Training { .. } => true,
            PatchError::EmptyDataset => true,
            PatchError::SchemaMismatch { .. } => false,

            PatchError::ModelNotReady => true, // more training data fixes it
            PatchError::Classification(_) => true,
            PatchError::DeciderUnbuilt => true,
            PatchError::LabelOutOfRange { .. } => false,

            PatchError::Io(_) => true,
            PatchError::Json(_) => false,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            PatchError::Config(_) => "Configuration Error",
            PatchError::UnknownPredictor { .. } => "Unknown Predictor",
            PatchError::FactoryFailed { .. } => "Predictor Factory Failed",
            PatchError::InvalidOption { .. } => "Invalid Option",
            PatchError::Training { .. } => "Training Failed",
            PatchError::EmptyDataset => "Empty Dataset",
            PatchError::SchemaMismatch { .. } => "Schema Mismatch",
            PatchError::ModelNotReady => "Model Not Ready",
            PatchError::Classification(_) => "Classification Failed",
            PatchError::DeciderUnbuilt => "Region Decider Unbuilt",
            PatchError::LabelOutOfRange { .. } => "Label Out Of Range",
            PatchError::Io(_) => "I/O Error",
            PatchError::Json(_) => "JSON Error",
        }
    }
}
