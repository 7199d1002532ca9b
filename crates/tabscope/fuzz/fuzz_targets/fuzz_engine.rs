//! Fuzz target for the analysis engine.
//!
//! Whatever the loader accepts, the engine must analyze without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabscope::{AnalysisEngine, Dataset, Loader};

fuzz_target!(|data: &[u8]| {
    if data.len() > 20_000 {
        return;
    }

    if let Ok(loaded) = Loader::new().load_bytes("fuzz.csv", data) {
        let dataset = Dataset::new("fuzz", vec![loaded.table]);
        let _ = AnalysisEngine::new().analyze(&dataset);
    }
});
