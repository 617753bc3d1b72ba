//! OCR Layer
//!
//! Talks to a remote PaddleOCR-style inference endpoint. The image is sent
//! base64-encoded in a JSON body and the response is unpacked from
//! `result.ocrResults[0].prunedResult` into polygons, texts and scores.

pub mod client;

pub use client::HttpOcrClient;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::annotation::Polygon;
use crate::error::{AnnotatorError, Result};

/// JSON pointer to the recognition payload inside the response
const PRUNED_RESULT_POINTER: &str = "/result/ocrResults/0/prunedResult";

/// Something that turns an image file into recognized text regions
pub trait Recognizer: Send + Sync {
    /// Run OCR on the image at `image_path`
    fn recognize(&self, image_path: &Path) -> Result<OcrOutput>;
}

/// Recognition result: three parallel, same-length sequences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    /// Detected polygons
    pub boxes: Vec<Polygon>,
    /// Recognized text per polygon
    pub texts: Vec<String>,
    /// Confidence per polygon (0.0 - 1.0)
    pub scores: Vec<f32>,
}

impl OcrOutput {
    /// Number of recognized regions
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether nothing was recognized
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Request body sent to the OCR endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRequest {
    /// Base64 encoded file bytes
    pub file: String,
    /// 0 = PDF, 1 = image
    pub file_type: u8,
    pub visualize: bool,
    pub use_doc_unwarping: bool,
}

/// The `prunedResult` object of a response
#[derive(Debug, Deserialize)]
struct PrunedResult {
    dt_polys: Vec<Polygon>,
    rec_texts: Vec<String>,
    rec_scores: Vec<f32>,
}

/// Validate and unpack an OCR response body
pub fn parse_response(body: &Value) -> Result<OcrOutput> {
    let pruned = body.pointer(PRUNED_RESULT_POINTER).ok_or_else(|| {
        AnnotatorError::MalformedResponse(format!(
            "missing {}",
            PRUNED_RESULT_POINTER.trim_start_matches('/').replace('/', ".")
        ))
    })?;

    let PrunedResult {
        dt_polys,
        rec_texts,
        rec_scores,
    } = PrunedResult::deserialize(pruned)
        .map_err(|e| AnnotatorError::MalformedResponse(e.to_string()))?;

    if dt_polys.len() != rec_texts.len() || dt_polys.len() != rec_scores.len() {
        return Err(AnnotatorError::MalformedResponse(format!(
            "length mismatch: {} polygons, {} texts, {} scores",
            dt_polys.len(),
            rec_texts.len(),
            rec_scores.len()
        )));
    }

    Ok(OcrOutput {
        boxes: dt_polys,
        texts: rec_texts,
        scores: rec_scores,
    })
}
