//! Indexed access to the samples of a grounded COCO dataset.
//!
//! A sample is one captioned image plus its target annotations. Samples are
//! addressed either by position (`0..len()`) or by their image id; the
//! position order is the ascending order of image ids and never changes
//! once the dataset is loaded.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use log::debug;

use crate::error::HarlequinError;
use crate::ir::{Annotation, CategoryId, Image, ImageId};
use crate::store::AnnotationStore;

/// A dataset of captioned images backed by an annotation file and an image
/// directory.
#[derive(Debug)]
pub struct HarlequinDataset {
    root: PathBuf,
    store: AnnotationStore,
    ids: Vec<ImageId>,
}

impl HarlequinDataset {
    /// Loads `ann_file` and resolves image files against `root`.
    ///
    /// # Example
    /// ```no_run
    /// use harlequin::HarlequinDataset;
    ///
    /// let ds = HarlequinDataset::open(
    ///     "data/harlequin/images",
    ///     "data/harlequin/annotations/instances_test.json",
    /// )?;
    /// let id = ds.get_id(0)?;
    /// println!("{}", ds.get_image_annotation(id)?.caption);
    /// # Ok::<(), harlequin::HarlequinError>(())
    /// ```
    pub fn open(
        root: impl Into<PathBuf>,
        ann_file: impl AsRef<Path>,
    ) -> Result<Self, HarlequinError> {
        let store = AnnotationStore::load(ann_file.as_ref())?;
        Ok(Self::new(root, store))
    }

    /// Wraps an existing store.
    pub fn new(root: impl Into<PathBuf>, store: AnnotationStore) -> Self {
        let ids = store.image_ids();
        Self {
            root: root.into(),
            store,
            ids,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sample ids in position order.
    pub fn ids(&self) -> &[ImageId] {
        &self.ids
    }

    /// Returns the id of the sample at `index`.
    pub fn get_id(&self, index: usize) -> Result<ImageId, HarlequinError> {
        self.ids
            .get(index)
            .copied()
            .ok_or(HarlequinError::IndexOutOfRange {
                index,
                len: self.ids.len(),
            })
    }

    /// Returns the image record (with caption) of sample `id`.
    pub fn get_image_annotation(&self, id: ImageId) -> Result<&Image, HarlequinError> {
        self.store
            .image(id)
            .ok_or(HarlequinError::SampleNotFound(id))
    }

    /// Returns the target annotations of sample `id`, in file order.
    pub fn get_target_annotations(&self, id: ImageId) -> Result<Vec<&Annotation>, HarlequinError> {
        if !self.store.contains_image(id) {
            return Err(HarlequinError::SampleNotFound(id));
        }
        Ok(self.store.annotations_for(id))
    }

    /// Path of the image file of sample `id`.
    pub fn image_path(&self, id: ImageId) -> Result<PathBuf, HarlequinError> {
        let record = self.get_image_annotation(id)?;
        Ok(self.root.join(&record.file_name))
    }

    /// Loads and decodes the image of sample `id` as RGB.
    pub fn get_image(&self, id: ImageId) -> Result<DynamicImage, HarlequinError> {
        let path = self.image_path(id)?;
        if !path.is_file() {
            return Err(HarlequinError::ImageNotFound { path });
        }

        let read_error = |source: image::ImageError| HarlequinError::ImageRead {
            path: path.clone(),
            source,
        };

        // The format comes from the file contents; extensions in scraped
        // caption sets often lie.
        let decoded = ImageReader::open(&path)?
            .with_guessed_format()
            .map_err(|err| read_error(image::ImageError::IoError(err)))?
            .decode()
            .map_err(read_error)?;
        debug!(
            "loaded {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );

        Ok(DynamicImage::ImageRgb8(decoded.into_rgb8()))
    }

    /// Returns the name of category `category_id`.
    pub fn get_category(&self, category_id: CategoryId) -> Result<&str, HarlequinError> {
        self.store
            .category(category_id)
            .map(|cat| cat.name.as_str())
            .ok_or(HarlequinError::CategoryNotFound(category_id))
    }

    /// Returns the image and target annotations of the sample at `index`.
    pub fn sample(&self, index: usize) -> Result<(DynamicImage, Vec<&Annotation>), HarlequinError> {
        let id = self.get_id(index)?;
        let image = self.get_image(id)?;
        let targets = self.get_target_annotations(id)?;
        Ok((image, targets))
    }

    /// Iterates over every sample in position order.
    pub fn samples(
        &self,
    ) -> impl Iterator<Item = Result<(DynamicImage, Vec<&Annotation>), HarlequinError>> + '_ {
        (0..self.len()).map(move |index| self.sample(index))
    }

    /// Returns the caption phrase each target of sample `id` is grounded to.
    ///
    /// Each target contributes the text of its first token span; targets
    /// without spans are skipped.
    pub fn get_queries(&self, id: ImageId) -> Result<Vec<&str>, HarlequinError> {
        let caption = &self.get_image_annotation(id)?.caption;

        self.store
            .annotations_for(id)
            .into_iter()
            .filter_map(|ann| ann.primary_span().map(|span| (ann, span)))
            .map(|(ann, span)| {
                span.extract(caption)
                    .ok_or_else(|| HarlequinError::InvalidTokenSpan {
                        annotation: ann.id,
                        start: span.start,
                        end: span.end,
                        caption_len: caption.chars().count(),
                    })
            })
            .collect()
    }
}
