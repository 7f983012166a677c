//! Indexed, read-only view over a parsed annotation file.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use log::{debug, info};

use crate::error::HarlequinError;
use crate::ir::io_coco_json::read_coco_json;
use crate::ir::{Annotation, Category, CategoryId, Dataset, Image, ImageId};

/// Parsed COCO records plus the lookup tables the dataset accessor needs.
///
/// Indices point into the owned [`Dataset`] vectors, so every lookup hands
/// out borrows of the original records. Nothing is mutable after
/// construction.
#[derive(Debug)]
pub struct AnnotationStore {
    dataset: Dataset,
    images: HashMap<ImageId, usize>,
    annotations_by_image: HashMap<ImageId, Vec<usize>>,
    categories: HashMap<CategoryId, usize>,
}

impl AnnotationStore {
    /// Parses `path` and indexes it.
    pub fn load(path: &Path) -> Result<Self, HarlequinError> {
        info!("loading annotations from {}", path.display());
        let started = Instant::now();
        let dataset = read_coco_json(path)?;
        debug!("parsed {} in {:.2?}", path.display(), started.elapsed());

        Self::from_dataset(dataset)
    }

    /// Indexes an already parsed dataset.
    ///
    /// # Errors
    /// Fails with [`HarlequinError::MalformedAnnotations`] if two image
    /// records share an id, since sample ids would then be ambiguous.
    pub fn from_dataset(dataset: Dataset) -> Result<Self, HarlequinError> {
        let started = Instant::now();

        let mut images = HashMap::with_capacity(dataset.images.len());
        for (idx, image) in dataset.images.iter().enumerate() {
            if let Some(first) = images.insert(image.id, idx) {
                return Err(HarlequinError::MalformedAnnotations {
                    message: format!(
                        "duplicate image id {} (records {} and {})",
                        image.id, first, idx
                    ),
                });
            }
        }

        let mut annotations_by_image: HashMap<ImageId, Vec<usize>> = HashMap::new();
        for (idx, ann) in dataset.annotations.iter().enumerate() {
            annotations_by_image.entry(ann.image_id).or_default().push(idx);
        }

        // Later duplicates win, as in most COCO tooling.
        let categories = dataset
            .categories
            .iter()
            .enumerate()
            .map(|(idx, cat)| (cat.id, idx))
            .collect();

        debug!(
            "indexed {} images, {} annotations, {} categories in {:.2?}",
            dataset.images.len(),
            dataset.annotations.len(),
            dataset.categories.len(),
            started.elapsed()
        );

        Ok(Self {
            dataset,
            images,
            annotations_by_image,
            categories,
        })
    }

    /// The underlying records, in file order.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn image(&self, id: ImageId) -> Option<&Image> {
        self.images.get(&id).map(|&idx| &self.dataset.images[idx])
    }

    pub fn contains_image(&self, id: ImageId) -> bool {
        self.images.contains_key(&id)
    }

    /// Annotations whose `image_id` is `id`, in file order.
    pub fn annotations_for(&self, id: ImageId) -> Vec<&Annotation> {
        self.annotations_by_image
            .get(&id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&idx| &self.dataset.annotations[idx])
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories
            .get(&id)
            .map(|&idx| &self.dataset.categories[idx])
    }

    /// All image ids, ascending.
    pub fn image_ids(&self) -> Vec<ImageId> {
        let mut ids: Vec<ImageId> = self.images.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
