//! Fuzz target for the table loader.
//!
//! Loading arbitrary bytes as CSV, TSV or JSON records must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabscope::Loader;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let loader = Loader::new();
    for name in ["fuzz.csv", "fuzz.tsv", "fuzz.json", "fuzz"] {
        let _ = loader.load_bytes(name, data);
    }
});
