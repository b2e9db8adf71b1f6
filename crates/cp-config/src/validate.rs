//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::settings::PatchingConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

impl From<ValidationError> for cp_common::PatchError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { field, message } => {
                cp_common::PatchError::InvalidOption { field, message }
            }
            other => cp_common::PatchError::Config(other.to_string()),
        }
    }
}

/// Validate a patching configuration semantically.
pub fn validate_config(config: &PatchingConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    require_positive("batch_size", config.batch_size)?;
    require_positive("batches_to_keep", config.batches_to_keep)?;
    require_positive("min_patch_size", config.min_patch_size)?;

    for (role, name) in [
        ("base", &config.predictors.base),
        ("decider", &config.predictors.decider),
        ("patch", &config.predictors.patch),
    ] {
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("predictors.{}", role),
                message: "predictor name must not be empty".to_string(),
            });
        }
    }

    Ok(())
}

fn require_positive(field: &str, value: usize) -> ValidationResult<()> {
    if value == 0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        validate_config(&PatchingConfig::default()).unwrap();
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = PatchingConfig::default().with_batch_size(0);
        match validate_config(&config) {
            Err(ValidationError::InvalidValue { field, .. }) => assert_eq!(field, "batch_size"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = PatchingConfig::default().with_batches_to_keep(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_predictor_name_rejected() {
        let mut config = PatchingConfig::default();
        config.predictors.patch = "  ".to_string();
        match validate_config(&config) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "predictors.patch")
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_converts_into_patch_error() {
        let err: cp_common::PatchError = ValidationError::InvalidValue {
            field: "batch_size".into(),
            message: "must be at least 1".into(),
        }
        .into();
        assert_eq!(err.code(), 13);

        let err: cp_common::PatchError = ValidationError::ParseError("bad toml".into()).into();
        assert_eq!(err.category(), cp_common::ErrorCategory::Config);
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn test_version_mismatch() {
        let config = PatchingConfig {
            schema_version: "0.9.0".to_string(),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.code(), 66);
    }
}
