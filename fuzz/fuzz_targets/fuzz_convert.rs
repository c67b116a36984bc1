#![no_main]

use flow2ts::{convert, ConversionOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Smaller limit for the full pipeline (more expensive per byte)
    if source.len() > 10_000 {
        return;
    }

    // A parse error is the only acceptable failure without formatting;
    // anything the parser accepts must convert
    let _ = convert(source, &ConversionOptions::default());

    let inlined = ConversionOptions {
        inline_utility_types: true,
        ..ConversionOptions::default()
    };
    let _ = convert(source, &inlined);
});
