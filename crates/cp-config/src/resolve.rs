//! Configuration resolution and path discovery.
//!
//! Resolution order: explicit path → environment variables → XDG path → defaults.

use std::path::{Path, PathBuf};

use crate::settings::PatchingConfig;
use crate::validate::{validate_config, ValidationError, ValidationResult};

/// Where the configuration was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided by the caller.
    Explicit,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Explicit => write!(f, "explicit path"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "CP_CONFIG";
pub const ENV_CONFIG_DIR: &str = "CP_CONFIG_DIR";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "patching.toml";

/// Application name for XDG directories.
const APP_NAME: &str = "classifier-patching";

/// Configuration together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: PatchingConfig,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Resolve the configuration file path.
///
/// 1. Explicit path (must exist, otherwise an error is reported)
/// 2. `CP_CONFIG` environment variable
/// 3. `CP_CONFIG_DIR` environment variable + `patching.toml`
/// 4. XDG config directory (`~/.config/classifier-patching/patching.toml`)
/// 5. Built-in defaults (None)
pub fn resolve_config_path(
    explicit: Option<&Path>,
) -> ValidationResult<(Option<PathBuf>, ConfigSource)> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok((Some(path.to_path_buf()), ConfigSource::Explicit));
        }
        return Err(ValidationError::IoError(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok((Some(path), ConfigSource::Environment));
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return Ok((Some(path), ConfigSource::Environment));
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return Ok((Some(path), ConfigSource::XdgConfig));
        }
    }

    Ok((None, ConfigSource::BuiltinDefault))
}

/// Resolve, load and validate the configuration.
pub fn load_config(explicit: Option<&Path>) -> ValidationResult<LoadedConfig> {
    let (path, source) = resolve_config_path(explicit)?;

    let config = match &path {
        Some(p) => PatchingConfig::from_file(p)?,
        None => PatchingConfig::default(),
    };

    validate_config(&config)?;

    Ok(LoadedConfig {
        config,
        path,
        source,
    })
}

/// Get the XDG config directory for classifier patching.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::Explicit), "explicit path");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let err = resolve_config_path(Some(Path::new("/nonexistent/patching.toml"))).unwrap_err();
        assert!(matches!(err, ValidationError::IoError(_)));
    }

    #[test]
    fn test_xdg_dir_ends_with_app_name() {
        if let Some(dir) = xdg_config_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }
}
