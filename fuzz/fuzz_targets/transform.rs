#![no_main]

use libfuzzer_sys::fuzz_target;
use text_remove_gap::{GapConfig, TextRemoveGap};

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > 256 * 1024 {
        &data[..256 * 1024]
    } else {
        data
    };

    let source = String::from_utf8_lossy(data);

    let configs = [
        GapConfig::default(),
        GapConfig {
            prefix: Some("x".to_string()),
            default_font_family: "Arial".to_string(),
            default_line_height: 1.5,
            ..GapConfig::default()
        },
    ];

    for config in &configs {
        let gap = TextRemoveGap::new(config).expect("bundled font table must load");
        if let Ok(out) = gap.transform(&source, "input.css") {
            // If creation succeeds, the sourcemap must be parseable JSON.
            let _ = serde_json::from_str::<serde_json::Value>(&out.sourcemap)
                .expect("sourcemap must be valid JSON when transform() returns Ok");
        }
    }
});
