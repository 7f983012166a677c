#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};

use harlequin::ir::{Annotation, BBox, Category, Dataset, Image, ImageId};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Words captions are built from. Includes non-ASCII words so spans have to
/// count characters rather than bytes.
pub const WORDS: [&str; 12] = [
    "a", "dog", "cat", "runs", "through", "field", "café", "naïve", "man", "blue", "jacket", ".",
];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Character ranges of every word in a caption built by [`caption_from_words`].
pub fn word_spans(words: &[&str]) -> Vec<(usize, usize)> {
    let mut spans = Vec::with_capacity(words.len());
    let mut start = 0;
    for word in words {
        let end = start + word.chars().count();
        spans.push((start, end));
        start = end + 1;
    }
    spans
}

pub fn caption_from_words(words: &[&str]) -> String {
    words.join(" ")
}

/// Image ids in file order, grouped annotations per image in file order.
pub fn annotations_by_image(dataset: &Dataset) -> BTreeMap<ImageId, Vec<&Annotation>> {
    let mut grouped: BTreeMap<ImageId, Vec<&Annotation>> = BTreeMap::new();
    for ann in &dataset.annotations {
        grouped.entry(ann.image_id).or_default().push(ann);
    }
    grouped
}

/// Datasets with unique, unsorted image ids, captions drawn from [`WORDS`]
/// and annotations grounded on whole words of their image's caption.
pub fn arb_dataset(max_images: usize, max_cats: usize, max_anns: usize) -> BoxedStrategy<Dataset> {
    assert!(max_images > 0, "max_images must be > 0");
    assert!(max_cats > 0, "max_cats must be > 0");

    (1usize..=max_images, 1usize..=max_cats, 0usize..=max_anns)
        .prop_flat_map(|(image_count, category_count, ann_count)| {
            (
                proptest::collection::hash_set(1u64..100_000, image_count..=image_count),
                proptest::collection::vec(
                    (
                        proptest::collection::vec(0usize..WORDS.len(), 1..12),
                        (2u32..=4096, 2u32..=4096),
                    ),
                    image_count..=image_count,
                ),
                category_count..=category_count,
                proptest::collection::vec(ann_seed_strategy(), ann_count..=ann_count),
            )
                .prop_map(|(ids, image_seeds, category_count, ann_seeds)| {
                    build_dataset(ids, image_seeds, category_count, ann_seeds)
                })
        })
        .boxed()
}

type ImageSeed = (Vec<usize>, (u32, u32));
type AnnSeed = (u16, u16, u16, u32, u32, u32, u32);

fn ann_seed_strategy() -> impl Strategy<Value = AnnSeed> {
    (
        any::<u16>(),
        any::<u16>(),
        any::<u16>(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
    )
}

fn build_dataset(
    ids: HashSet<u64>,
    image_seeds: Vec<ImageSeed>,
    category_count: usize,
    ann_seeds: Vec<AnnSeed>,
) -> Dataset {
    let images: Vec<Image> = ids
        .into_iter()
        .zip(image_seeds)
        .map(|(id, (word_idx, (width, height)))| {
            let words: Vec<&str> = word_idx.iter().map(|&i| WORDS[i]).collect();
            Image::new(
                id,
                format!("{id:012}.jpg"),
                width,
                height,
                caption_from_words(&words),
            )
        })
        .collect();

    let categories: Vec<Category> = (0..category_count)
        .map(|idx| Category::new((idx + 1) as u64, format!("category_{idx}")))
        .collect();

    let annotations: Vec<Annotation> = ann_seeds
        .into_iter()
        .enumerate()
        .map(|(idx, seed)| {
            let (image_seed, category_seed, word_seed, sx, sy, sw, sh) = seed;
            let image = &images[image_seed as usize % images.len()];
            let category = &categories[category_seed as usize % categories.len()];

            let words: Vec<&str> = image.caption.split(' ').collect();
            let spans = word_spans(&words);
            let (start, end) = spans[word_seed as usize % spans.len()];

            Annotation::new(
                (idx + 1) as u64,
                image.id,
                category.id,
                bbox_from_seed(image.width, image.height, sx, sy, sw, sh),
            )
            .with_span(start, end)
        })
        .collect();

    Dataset {
        images,
        annotations,
        categories,
    }
}

fn bbox_from_seed(width: u32, height: u32, sx: u32, sy: u32, sw: u32, sh: u32) -> BBox {
    let x = sx % (width - 1);
    let y = sy % (height - 1);
    let w = 1 + sw % (width - x);
    let h = 1 + sh % (height - y);

    BBox::from_xywh(x as f64, y as f64, w as f64, h as f64)
}
