//! Fuzz target for grounded COCO JSON parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse

#![no_main]

use harlequin::ir::io_coco_json::from_coco_slice;
use harlequin::AnnotationStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Annotation files past 10MB add nothing the parser hasn't seen.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(dataset) = from_coco_slice(data) {
        let _ = AnnotationStore::from_dataset(dataset);
    }
});
