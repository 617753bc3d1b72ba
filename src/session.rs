//! Annotation session
//!
//! Owns the store for one editing session and turns UI actions (process
//! image, update text, delete box, add box, save) into store/renderer/export
//! calls. Every action answers with values the UI can show directly: the
//! rendered image path, the table rows and a status message.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::annotation::{format_bbox, AnnotationStore, Polygon};
use crate::config::ExportSettings;
use crate::error::Result;
use crate::export;
use crate::ocr::{OcrOutput, Recognizer};
use crate::render::Renderer;

/// One row of the annotation table
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: usize,
    pub text: String,
    pub bbox: String,
    pub confidence: Option<f32>,
}

/// Result of a UI action.
///
/// `image` and `rows` are `None` when the action failed and the display
/// should stay as it is.
#[derive(Debug, Clone, Default)]
pub struct ActionOutcome {
    pub image: Option<PathBuf>,
    pub rows: Option<Vec<TableRow>>,
    pub message: String,
}

impl ActionOutcome {
    fn unchanged(message: impl Into<String>) -> Self {
        Self {
            image: None,
            rows: None,
            message: message.into(),
        }
    }

    /// Whether the action changed what should be displayed
    pub fn is_refresh(&self) -> bool {
        self.rows.is_some()
    }
}

/// One annotation session: a store plus the components acting on it
pub struct AnnotationSession {
    store: AnnotationStore,
    recognizer: Arc<dyn Recognizer>,
    renderer: Renderer,
    export: ExportSettings,
}

impl AnnotationSession {
    pub fn new(recognizer: Arc<dyn Recognizer>, renderer: Renderer, export: ExportSettings) -> Self {
        Self {
            store: AnnotationStore::new(),
            recognizer,
            renderer,
            export,
        }
    }

    /// Recognizer used for new images, for running OCR off the UI thread
    pub fn recognizer(&self) -> Arc<dyn Recognizer> {
        Arc::clone(&self.recognizer)
    }

    /// Read-only view of the store
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Font used for labels, so the UI can display the same scripts
    pub fn font_path(&self) -> Option<&Path> {
        self.renderer.font_path()
    }

    /// Run OCR on `image_path` and replace the annotation set
    pub fn process_image(&mut self, image_path: &Path) -> ActionOutcome {
        let result = self.recognizer.recognize(image_path);
        self.apply_recognition(image_path, result)
    }

    /// Apply an OCR result obtained for `image_path`.
    ///
    /// On any failure the previous annotation set is kept.
    pub fn apply_recognition(
        &mut self,
        image_path: &Path,
        result: Result<OcrOutput>,
    ) -> ActionOutcome {
        let output = match result {
            Ok(output) => output,
            Err(e) => {
                warn!("OCR failed for {:?}: {}", image_path, e);
                return ActionOutcome::unchanged(format!("OCR failed: {e}"));
            }
        };

        let count = output.len();
        let OcrOutput {
            boxes,
            texts,
            scores,
        } = output;
        if let Err(e) = self.store.load(image_path, boxes, texts, scores) {
            warn!("{}", e);
            return ActionOutcome::unchanged(format!("Failed to load image: {e}"));
        }

        self.refresh(format!("Recognized {count} text regions"))
    }

    /// Replace the text of annotation `id`
    pub fn update_text(&mut self, id: i64, new_text: &str) -> ActionOutcome {
        let updated = usize::try_from(id)
            .map(|index| self.store.update(index, new_text))
            .unwrap_or(false);
        if updated {
            self.refresh(format!("Text ID {id} updated"))
        } else {
            ActionOutcome::unchanged(format!("Failed to update text ID {id}"))
        }
    }

    /// Delete annotation `id`; later ids shift down by one
    pub fn delete_box(&mut self, id: i64) -> ActionOutcome {
        let deleted = usize::try_from(id)
            .map(|index| self.store.delete(index))
            .unwrap_or(false);
        if deleted {
            self.refresh(format!("Box ID {id} deleted"))
        } else {
            ActionOutcome::unchanged(format!("Failed to delete box ID {id}"))
        }
    }

    /// Append a manual annotation
    pub fn add_box(&mut self, bbox: Polygon, text: &str) -> ActionOutcome {
        if self.store.image().is_none() {
            return ActionOutcome::unchanged("Load an image before adding boxes");
        }
        if bbox.is_empty() {
            return ActionOutcome::unchanged("Box needs at least one point");
        }
        let id = self.store.add(bbox, text);
        self.refresh(format!("Box ID {id} added"))
    }

    /// Save annotations to `<output_dir>/<image stem>_annotations.{json,txt}`.
    ///
    /// Both arms carry the status message; `Err` means nothing was saved.
    pub fn save(&self) -> std::result::Result<String, String> {
        let Some(image_path) = self.store.image_path().filter(|_| !self.store.is_empty()) else {
            return Err("No annotations to save".to_string());
        };

        let output_dir = &self.export.output_dir;
        if let Err(e) = std::fs::create_dir_all(output_dir) {
            warn!("Failed to create {:?}: {}", output_dir, e);
            return Err(format!("Save failed: cannot create {}: {e}", output_dir.display()));
        }

        let stem = image_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let json_path = output_dir.join(format!("{stem}_annotations.json"));
        info!("Saving {} annotations for {:?}", self.store.len(), image_path);

        match export::export(image_path, &self.store.list(), &json_path) {
            Ok((json_path, txt_path)) => Ok(format!(
                "Annotations saved:\nJSON: {}\nTXT: {}",
                json_path.display(),
                txt_path.display()
            )),
            Err(e) => {
                warn!("{}", e);
                Err(format!("Save failed: {e}"))
            }
        }
    }

    /// Current table rows
    pub fn rows(&self) -> Vec<TableRow> {
        self.store
            .list()
            .into_iter()
            .map(|ann| TableRow {
                id: ann.id,
                bbox: format_bbox(&ann.bbox),
                confidence: self.store.confidence(ann.id),
                text: ann.text,
            })
            .collect()
    }

    /// Re-render and collect rows after a successful change
    fn refresh(&self, message: String) -> ActionOutcome {
        let rows = self.rows();
        let annotations = self.store.boxes().zip(self.store.texts());
        match self.renderer.render(self.store.image(), annotations) {
            Ok(image) => {
                info!("{}", message);
                ActionOutcome {
                    image,
                    rows: Some(rows),
                    message,
                }
            }
            Err(e) => {
                warn!("Render failed: {}", e);
                ActionOutcome {
                    image: None,
                    rows: Some(rows),
                    message: format!("{message} (render failed: {e})"),
                }
            }
        }
    }
}
