//! Annotation store
//!
//! Mutable source of truth for the current image and its annotations. One
//! store backs one editing session; a new OCR run replaces everything in it.

use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Annotation, Polygon};
use crate::error::{AnnotatorError, Result};

/// One stored region. Confidence is `None` for manually added regions.
#[derive(Debug, Clone, PartialEq)]
struct Region {
    bbox: Polygon,
    text: String,
    confidence: Option<f32>,
}

/// Current image plus its ordered annotations
#[derive(Debug, Default)]
pub struct AnnotationStore {
    image_path: Option<PathBuf>,
    image: Option<RgbImage>,
    regions: Vec<Region>,
}

impl AnnotationStore {
    /// Create an empty store with no image loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `image_path` and replace the whole annotation set.
    ///
    /// The image is decoded before anything is replaced, so a decode failure
    /// leaves the previous state intact.
    pub fn load(
        &mut self,
        image_path: &Path,
        boxes: Vec<Polygon>,
        texts: Vec<String>,
        confidences: Vec<f32>,
    ) -> Result<()> {
        let image = image::open(image_path)
            .map_err(|source| AnnotatorError::ImageDecode {
                path: image_path.to_path_buf(),
                source,
            })?
            .to_rgb8();

        if boxes.len() != texts.len() {
            warn!(
                "Box/text count mismatch ({} vs {}), keeping the common prefix",
                boxes.len(),
                texts.len()
            );
        }

        let mut scores = confidences.into_iter();
        let regions = boxes
            .into_iter()
            .zip(texts)
            .map(|(bbox, text)| Region {
                bbox,
                text,
                confidence: scores.next(),
            })
            .collect::<Vec<_>>();

        info!(
            "Loaded {:?} ({}x{}) with {} annotations",
            image_path,
            image.width(),
            image.height(),
            regions.len()
        );

        self.image_path = Some(image_path.to_path_buf());
        self.image = Some(image);
        self.regions = regions;
        Ok(())
    }

    /// Current annotations with positional ids `0..n`
    pub fn list(&self) -> Vec<Annotation> {
        self.regions
            .iter()
            .enumerate()
            .map(|(id, region)| Annotation {
                id,
                bbox: region.bbox.clone(),
                text: region.text.clone(),
            })
            .collect()
    }

    /// Replace the text at `id`. Returns `false` when `id` is out of range.
    pub fn update(&mut self, id: usize, new_text: impl Into<String>) -> bool {
        match self.regions.get_mut(id) {
            Some(region) => {
                region.text = new_text.into();
                debug!("Updated text of annotation {}", id);
                true
            }
            None => false,
        }
    }

    /// Remove the annotation at `id`, shifting later ids down by one.
    /// Returns `false` when `id` is out of range.
    pub fn delete(&mut self, id: usize) -> bool {
        if id >= self.regions.len() {
            return false;
        }
        self.regions.remove(id);
        debug!("Deleted annotation {}, {} remain", id, self.regions.len());
        true
    }

    /// Append a manual annotation; its id is the previous length.
    pub fn add(&mut self, bbox: Polygon, text: impl Into<String>) -> usize {
        self.regions.push(Region {
            bbox,
            text: text.into(),
            confidence: None,
        });
        let id = self.regions.len() - 1;
        debug!("Added annotation {}", id);
        id
    }

    /// Number of annotations
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether there are no annotations
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Confidence of the annotation at `id`, `None` if absent or out of range
    pub fn confidence(&self, id: usize) -> Option<f32> {
        self.regions.get(id).and_then(|r| r.confidence)
    }

    /// Path of the loaded source image
    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    /// Decoded source image
    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    /// Polygons in sequence order
    pub fn boxes(&self) -> impl Iterator<Item = &Polygon> + '_ {
        self.regions.iter().map(|r| &r.bbox)
    }

    /// Texts in sequence order
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.regions.iter().map(|r| r.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        vec![[x, y], [x + size, y], [x + size, y + size], [x, y + size]]
    }

    fn write_test_image(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("page.png");
        RgbImage::from_pixel(64, 48, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn loaded_store(dir: &TempDir, n: usize) -> AnnotationStore {
        let path = write_test_image(dir);
        let boxes = (0..n).map(|i| square(i as f64 * 10.0, 0.0, 8.0)).collect();
        let texts = (0..n).map(|i| format!("text-{i}")).collect();
        let scores = (0..n).map(|i| i as f32 / 4.0).collect();
        let mut store = AnnotationStore::new();
        store.load(&path, boxes, texts, scores).unwrap();
        store
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = AnnotationStore::new();
        assert!(store.is_empty());
        assert!(store.image().is_none());
        assert!(store.image_path().is_none());
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_load_happy_path() {
        let dir = TempDir::new().unwrap();
        let path = write_test_image(&dir);
        let mut store = AnnotationStore::new();

        store
            .load(
                &path,
                vec![square(0.0, 0.0, 10.0)],
                vec!["Hello".to_string()],
                vec![0.9],
            )
            .unwrap();

        assert_eq!(
            store.list(),
            vec![Annotation {
                id: 0,
                bbox: vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
                text: "Hello".to_string(),
            }]
        );
        assert_eq!(store.confidence(0), Some(0.9));
        assert_eq!(store.image_path(), Some(path.as_path()));
        assert_eq!(store.image().map(|i| i.dimensions()), Some((64, 48)));
    }

    #[test]
    fn test_load_replaces_previous_set() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir, 3);
        let path = write_test_image(&dir);

        store
            .load(&path, vec![square(1.0, 1.0, 2.0)], vec!["only".into()], vec![0.1])
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].text, "only");
    }

    #[test]
    fn test_load_decode_failure_keeps_state() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir, 2);
        let before = store.list();

        let bogus = dir.path().join("not_an_image.png");
        std::fs::write(&bogus, b"definitely not a png").unwrap();
        let result = store.load(&bogus, vec![], vec![], vec![]);

        assert!(matches!(result, Err(AnnotatorError::ImageDecode { .. })));
        assert_eq!(store.list(), before);
        assert_ne!(store.image_path(), Some(bogus.as_path()));
    }

    #[test]
    fn test_load_missing_file_is_decode_error() {
        let mut store = AnnotationStore::new();
        let result = store.load(Path::new("/nonexistent/page.png"), vec![], vec![], vec![]);
        assert!(matches!(result, Err(AnnotatorError::ImageDecode { .. })));
        assert!(store.image().is_none());
    }

    #[test]
    fn test_update_changes_only_target() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir, 4);
        let before = store.list();

        for id in 0..4 {
            let mut s = AnnotationStore::new();
            s.regions = store.regions.clone();
            assert!(s.update(id, "edited"));
            let after = s.list();
            assert_eq!(after.len(), before.len());
            for (a, b) in after.iter().zip(&before) {
                assert_eq!(a.bbox, b.bbox);
                if a.id == id {
                    assert_eq!(a.text, "edited");
                } else {
                    assert_eq!(a.text, b.text);
                }
            }
        }

        assert!(store.update(2, "x"));
        assert_eq!(store.confidence(2), Some(0.5));
    }

    #[test]
    fn test_out_of_range_edits_leave_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir, 3);
        let before = store.list();

        assert!(!store.update(3, "nope"));
        assert!(!store.update(usize::MAX, "nope"));
        assert!(!store.delete(3));
        assert!(!store.delete(100));

        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_edits_on_empty_store_fail() {
        let mut store = AnnotationStore::new();
        assert!(!store.update(0, "x"));
        assert!(!store.delete(0));
    }

    #[test]
    fn test_delete_reindexes_and_preserves_order() {
        let dir = TempDir::new().unwrap();
        let mut store = loaded_store(&dir, 4);
        let before = store.list();

        assert!(store.delete(1));
        let after = store.list();

        assert_eq!(after.len(), 3);
        assert_eq!(after.iter().map(|a| a.id).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(after[0].text, before[0].text);
        assert_eq!(after[1].text, before[2].text);
        assert_eq!(after[1].bbox, before[2].bbox);
        assert_eq!(after[2].text, before[3].text);
        assert_eq!(store.confidence(1), Some(0.5));
    }

    #[test]
    fn test_add_then_delete_scenario() {
        let dir = TempDir::new().unwrap();
        let path = write_test_image(&dir);
        let mut store = AnnotationStore::new();
        store
            .load(&path, vec![square(0.0, 0.0, 10.0)], vec!["Hello".into()], vec![0.9])
            .unwrap();

        let id = store.add(square(20.0, 20.0, 10.0), "World");
        assert_eq!(id, 1);
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.confidence(1), None);

        assert!(store.delete(0));
        assert_eq!(
            store.list(),
            vec![Annotation {
                id: 0,
                bbox: vec![[20.0, 20.0], [30.0, 20.0], [30.0, 30.0], [20.0, 30.0]],
                text: "World".to_string(),
            }]
        );
        assert_eq!(store.confidence(0), None);
    }

    #[test]
    fn test_load_truncates_mismatched_lengths() {
        let dir = TempDir::new().unwrap();
        let path = write_test_image(&dir);
        let mut store = AnnotationStore::new();
        store
            .load(
                &path,
                vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)],
                vec!["a".into()],
                vec![],
            )
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.confidence(0), None);
        assert_eq!(store.boxes().count(), store.texts().count());
    }
}
