//! Configuration presets for common stream profiles.
//!
//! - Reference: the classic batch-patching defaults with batch-age merge
//!   weighting
//! - Responsive: small batches and a short window, adapts quickly
//! - LongMemory: large batches and a deep window, for slow drift

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::settings::{MergeWeighting, PatchingConfig};

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetName {
    Reference,
    Responsive,
    LongMemory,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Reference,
        PresetName::Responsive,
        PresetName::LongMemory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Reference => "reference",
            PresetName::Responsive => "responsive",
            PresetName::LongMemory => "long_memory",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "reference" | "ref" | "default" => Some(PresetName::Reference),
            "responsive" | "fast" => Some(PresetName::Responsive),
            "long_memory" | "long-memory" | "slow" => Some(PresetName::LongMemory),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Reference => "Batches of 500, window of 5, batch-age merge weighting",
            PresetName::Responsive => "Batches of 100, window of 3, reacts quickly to drift",
            PresetName::LongMemory => "Batches of 1000, window of 10, for slowly drifting streams",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| format!("unknown preset: {}", s))
    }
}

/// Build the configuration for a preset.
pub fn get_preset(name: PresetName) -> PatchingConfig {
    match name {
        PresetName::Reference => {
            PatchingConfig::default().with_merge_weighting(MergeWeighting::BatchAge)
        }
        PresetName::Responsive => PatchingConfig::default()
            .with_batch_size(100)
            .with_batches_to_keep(3),
        PresetName::LongMemory => PatchingConfig::default()
            .with_batch_size(1000)
            .with_batches_to_keep(10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_config;

    #[test]
    fn test_all_presets_validate() {
        for name in PresetName::ALL {
            validate_config(&get_preset(*name)).unwrap();
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(PresetName::parse("fast"), Some(PresetName::Responsive));
        assert_eq!(
            PresetName::parse("Long-Memory"),
            Some(PresetName::LongMemory)
        );
        assert_eq!(PresetName::parse("nope"), None);
        assert_eq!("ref".parse::<PresetName>().unwrap(), PresetName::Reference);
    }

    #[test]
    fn test_reference_uses_batch_age() {
        let config = get_preset(PresetName::Reference);
        assert_eq!(config.merge_weighting, MergeWeighting::BatchAge);
        assert_eq!(config.batch_size, 500);
    }

    #[test]
    fn test_presets_are_deterministic() {
        for name in PresetName::ALL {
            assert_eq!(get_preset(*name), get_preset(*name));
        }
    }
}
