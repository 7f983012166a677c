#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const VALID_FIXTURE: &str = "tests/fixtures/sample_valid.coco.json";
pub const INVALID_FIXTURE: &str = "tests/fixtures/sample_invalid.coco.json";

/// Samples in the search fixture.
pub const SEARCH_SAMPLES: usize = 10_000;

/// Indices whose caption is exactly "a blue dog runs through a field .".
pub const BLUE_DOG_INDICES: [usize; 2] = [1815, 1896];

/// Indices whose caption matches `a \w+ dog runs through a field .`.
pub const ANY_DOG_INDICES: [usize; 6] = [1815, 1896, 2922, 4823, 6757, 9951];

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Copies the valid fixture into `dir` next to an `images/` directory
/// holding a blank 32x24 BMP for every image record.
///
/// Returns `(image_root, ann_file)`.
pub fn write_valid_dataset(dir: &Path) -> (PathBuf, PathBuf) {
    let root = dir.join("images");
    for name in ["1.bmp", "2.bmp", "3.bmp"] {
        write_bmp(&root.join(name), 32, 24);
    }

    let ann_file = dir.join("instances_test.json");
    fs::copy(VALID_FIXTURE, &ann_file).expect("copy fixture");
    (root, ann_file)
}

/// Captions for the search fixture, in position order.
pub fn search_captions() -> Vec<String> {
    (0..SEARCH_SAMPLES)
        .map(|i| match i {
            500 => "A Blue Dog Runs Through A Field .".to_string(),
            1815 | 1896 => "a blue dog runs through a field .".to_string(),
            2922 => "a brown dog runs through a field .".to_string(),
            4823 => "a black dog runs through a field .".to_string(),
            6757 => "a white dog runs through a field .".to_string(),
            9951 => "a spotted dog runs through a field .".to_string(),
            7000 => "the blue dog runs through a field .".to_string(),
            _ => format!("sample {} shows a cat sitting on a mat .", i),
        })
        .collect()
}

/// A caption-only COCO file with [`SEARCH_SAMPLES`] images.
///
/// Image ids are `10 * index + 1`, written in reverse order so position
/// order has to come from sorting ids rather than from the file.
pub fn search_fixture_json() -> String {
    let images: Vec<serde_json::Value> = search_captions()
        .into_iter()
        .enumerate()
        .rev()
        .map(|(i, caption)| {
            serde_json::json!({
                "id": 10 * i as u64 + 1,
                "file_name": format!("{i}.jpg"),
                "height": 10,
                "width": 10,
                "caption": caption,
            })
        })
        .collect();

    serde_json::json!({ "images": images, "annotations": [], "categories": [] }).to_string()
}
