use harlequin::ir::io_coco_json::from_coco_str;
use harlequin::{search, AnnotationStore, HarlequinDataset, Pattern, SearchOptions};

mod common;

fn search_dataset() -> HarlequinDataset {
    let dataset = from_coco_str(&common::search_fixture_json()).expect("parse search fixture");
    let store = AnnotationStore::from_dataset(dataset).expect("index search fixture");
    HarlequinDataset::new("images", store)
}

fn indices_for(ds: &HarlequinDataset, pattern: &str, opts: &SearchOptions) -> Vec<usize> {
    let pattern = Pattern::new(pattern, opts).expect("compile pattern");
    search(ds, &pattern).expect("search").indices
}

#[test]
fn search_by_string() {
    let ds = search_dataset();
    assert_eq!(ds.len(), common::SEARCH_SAMPLES);

    let pattern = Pattern::new("a blue dog runs through a field .", &SearchOptions::default())
        .expect("compile pattern");
    let matches = search(&ds, &pattern).expect("search");

    assert_eq!(matches.indices, common::BLUE_DOG_INDICES.to_vec());
    assert_eq!(matches.ids.len(), 2);
}

#[test]
fn search_by_regex() {
    let ds = search_dataset();
    let indices = indices_for(
        &ds,
        r"a \w+ dog runs through a field .",
        &SearchOptions::default(),
    );
    assert_eq!(indices, common::ANY_DOG_INDICES.to_vec());
}

#[test]
fn search_ids_match_positions() {
    let ds = search_dataset();
    let pattern =
        Pattern::new(r"a \w+ dog runs", &SearchOptions::default()).expect("compile pattern");
    let matches = search(&ds, &pattern).expect("search");

    for (index, id) in matches.iter() {
        assert_eq!(ds.get_id(index).unwrap(), id);
        assert_eq!(id.as_u64(), 10 * index as u64 + 1);
    }
}

#[test]
fn search_ignore_case_adds_mixed_case_caption() {
    let ds = search_dataset();
    let opts = SearchOptions {
        ignore_case: true,
        literal: true,
    };
    let indices = indices_for(&ds, "a blue dog runs through a field .", &opts);
    assert_eq!(indices, vec![500, 1815, 1896]);
}

#[test]
fn search_is_idempotent() {
    let ds = search_dataset();
    let pattern = Pattern::new(r"dog", &SearchOptions::default()).expect("compile pattern");

    let first = search(&ds, &pattern).expect("first search");
    let second = search(&ds, &pattern).expect("second search");

    assert_eq!(first, second);
    assert!(first.indices.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn search_without_matches_is_empty() {
    let ds = search_dataset();
    let indices = indices_for(&ds, "a purple giraffe", &SearchOptions::default());
    assert!(indices.is_empty());
}
