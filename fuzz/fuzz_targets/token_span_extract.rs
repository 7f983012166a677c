//! Fuzz target for token span extraction on arbitrary captions.
//!
//! Run with:
//!   cargo +nightly fuzz run token_span_extract

#![no_main]

use harlequin::ir::TokenSpan;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let (bounds, text) = data.split_at(2);
    let Ok(caption) = std::str::from_utf8(text) else {
        return;
    };

    let span = TokenSpan::new(bounds[0] as usize, bounds[1] as usize);
    let extracted = span.extract(caption);
    assert_eq!(extracted.is_some(), span.is_within(caption.chars().count()));
});
