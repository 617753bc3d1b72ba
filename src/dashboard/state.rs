//! Dashboard view state management

use std::path::PathBuf;

use crate::session::{ActionOutcome, TableRow};

/// Kind of status message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Info,
    Success,
    Error,
}

/// Action requested by the view, executed by the app after rendering
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    /// Run OCR on an image file
    Process(PathBuf),
    /// Replace the text of an annotation
    UpdateText { id: i64, text: String },
    /// Delete an annotation
    DeleteBox { id: i64 },
    /// Add a rectangular annotation
    AddBox { rect: [f64; 4], text: String },
    /// Save annotations to disk
    Save,
}

/// Overall dashboard state
#[derive(Default)]
pub struct DashboardState {
    /// Image path entry field
    pub image_path_input: String,
    /// Annotation id entry field
    pub text_id: i64,
    /// Replacement / new annotation text
    pub new_text: String,
    /// Rectangle for a new box: x0, y0, x1, y1
    pub add_rect: [f64; 4],
    /// Rows currently displayed
    pub rows: Vec<TableRow>,
    /// Last status message
    pub message: String,
    pub message_kind: MessageKind,
    /// Rendered image currently displayed
    pub preview_path: Option<PathBuf>,
    /// Set when the preview file changed and the texture must be reloaded
    pub preview_dirty: bool,
    /// Texture of the rendered image
    pub preview_texture: Option<egui::TextureHandle>,
    /// Image whose OCR request is in flight
    pub processing: Option<PathBuf>,
}

impl std::fmt::Debug for DashboardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardState")
            .field("image_path_input", &self.image_path_input)
            .field("text_id", &self.text_id)
            .field("new_text", &self.new_text)
            .field("add_rect", &self.add_rect)
            .field("rows", &self.rows.len())
            .field("message", &self.message)
            .field("message_kind", &self.message_kind)
            .field("preview_path", &self.preview_path)
            .field("preview_dirty", &self.preview_dirty)
            .field("preview_texture", &self.preview_texture.as_ref().map(|_| "<texture>"))
            .field("processing", &self.processing)
            .finish()
    }
}

impl DashboardState {
    /// Apply an action outcome to the displayed values.
    ///
    /// A failed action only updates the message; the image and table keep
    /// showing the previous state.
    pub fn apply_outcome(&mut self, outcome: ActionOutcome) {
        let refreshed = outcome.is_refresh();
        if let Some(rows) = outcome.rows {
            self.rows = rows;
        }
        if refreshed {
            self.preview_path = outcome.image;
            self.preview_dirty = true;
        }
        self.set_message(
            outcome.message,
            if refreshed {
                MessageKind::Success
            } else {
                MessageKind::Error
            },
        );
    }

    /// Replace the status message
    pub fn set_message(&mut self, message: impl Into<String>, kind: MessageKind) {
        self.message = message.into();
        self.message_kind = kind;
    }

    /// Fill the edit fields from a table row
    pub fn select_row(&mut self, id: usize) {
        if let Some(row) = self.rows.iter().find(|r| r.id == id) {
            self.text_id = row.id as i64;
            self.new_text = row.text.clone();
        }
    }

    /// Currently selected row id, if it exists
    pub fn selected_id(&self) -> Option<usize> {
        usize::try_from(self.text_id)
            .ok()
            .filter(|id| self.rows.iter().any(|r| r.id == *id))
    }

    /// Whether an OCR request is running
    pub fn is_processing(&self) -> bool {
        self.processing.is_some()
    }
}
