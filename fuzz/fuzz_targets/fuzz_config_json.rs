//! Fuzz target for JSON patching configuration parsing.

#![no_main]

use cp_config::PatchingConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<PatchingConfig>(data);
});
