//! Annotation export
//!
//! Writes the current annotation set as a JSON document plus a sibling
//! plain-text listing. Both describe the same annotations in the same order.
//! There is no rollback: if the text file fails, the JSON file stays.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::annotation::{format_bbox, Annotation};
use crate::error::{AnnotatorError, Result};

/// Separator line between plain-text records
const SEPARATOR_WIDTH: usize = 50;

/// Structured export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationFile {
    /// Source image the annotations belong to
    pub image_path: String,
    /// Annotations in sequence order (confidence is not exported)
    pub annotations: Vec<Annotation>,
}

/// Plain-text path derived from the structured path (`.json` -> `.txt`)
pub fn text_path_for(output_path: &Path) -> PathBuf {
    let candidate = output_path.with_extension("txt");
    if candidate == output_path {
        let mut name = output_path.as_os_str().to_owned();
        name.push(".txt");
        PathBuf::from(name)
    } else {
        candidate
    }
}

/// Plain-text listing: id/text line, bbox line, separator per annotation
pub fn format_text(annotations: &[Annotation]) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut out = String::new();
    for ann in annotations {
        let _ = writeln!(out, "ID: {}, Text: {}", ann.id, ann.text);
        let _ = writeln!(out, "BBox: {}", format_bbox(&ann.bbox));
        let _ = writeln!(out, "{separator}");
    }
    out
}

/// Write `annotations` to `output_path` (JSON) and its `.txt` sibling.
///
/// Returns `(json_path, txt_path)`.
pub fn export(
    image_path: &Path,
    annotations: &[Annotation],
    output_path: &Path,
) -> Result<(PathBuf, PathBuf)> {
    let document = AnnotationFile {
        image_path: image_path.to_string_lossy().into_owned(),
        annotations: annotations.to_vec(),
    };

    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| AnnotatorError::write(output_path, e))?;
    std::fs::write(output_path, json).map_err(|e| AnnotatorError::write(output_path, e))?;

    let text_path = text_path_for(output_path);
    std::fs::write(&text_path, format_text(annotations))
        .map_err(|e| AnnotatorError::write(&text_path, e))?;

    info!(
        "Exported {} annotations to {:?} and {:?}",
        annotations.len(),
        output_path,
        text_path
    );
    Ok((output_path.to_path_buf(), text_path))
}
