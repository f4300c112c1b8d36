#![no_main]

use libfuzzer_sys::fuzz_target;
use text_remove_gap::{GapConfig, remove_text_gap_no_sourcemap};

fuzz_target!(|data: &[u8]| {
    // Limit input size to keep the fuzzer fast and avoid OOM in pathological cases.
    let data = if data.len() > 256 * 1024 {
        &data[..256 * 1024]
    } else {
        data
    };

    let source = String::from_utf8_lossy(data);

    // Malformed directives are expected outcomes and must never crash.
    let _ = remove_text_gap_no_sourcemap(&source, &GapConfig::default());
});
