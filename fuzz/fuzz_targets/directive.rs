#![no_main]

use libfuzzer_sys::fuzz_target;
use text_remove_gap::{
    SourcePosition,
    directive::parse_directive,
    font::parse_font_shorthand,
    metrics::{FontTable, resolve_metrics},
    offset::compute_offsets,
};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = std::str::from_utf8(data) else {
        return;
    };

    // The same text doubles as a `font` shorthand for the ambient settings.
    let ambient = parse_font_shorthand(value).unwrap_or_default();

    if let Ok(directive) = parse_directive(value, "text-remove-gap", SourcePosition::default()) {
        let table = FontTable::bundled().expect("bundled font table must load");
        let metrics = resolve_metrics(&directive, &ambient, &table, "serif", 1.0);
        let _ = compute_offsets(metrics.space, metrics.line_height, &metrics.unit);
    }
});
