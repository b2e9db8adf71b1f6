//! Classifier patching configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the patching configuration (TOML or JSON)
//! - Named presets for common stream profiles
//! - Config resolution (explicit path → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for run provenance

pub mod preset;
pub mod resolve;
pub mod settings;
pub mod snapshot;
pub mod validate;

pub use preset::{get_preset, PresetName};
pub use resolve::{load_config, resolve_config_path, ConfigSource, LoadedConfig};
pub use settings::{MergeWeighting, PatchingConfig, PredictorNames};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
