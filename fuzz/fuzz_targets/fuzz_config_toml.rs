//! Fuzz target for TOML patching configuration parsing.
//!
//! Parsing and validating arbitrary text must never panic, only return
//! an error.

#![no_main]

use cp_config::{validate_config, PatchingConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(config) = PatchingConfig::from_toml_str(data) {
        let _ = validate_config(&config);
    }
});
