//! Annotated image rendering
//!
//! Draws every polygon outline and its label onto a copy of the loaded image
//! and writes the result to a single fixed output path. The file is
//! overwritten by every render, so only one session may render per path.

pub mod font;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::annotation::{extent, Extent, Polygon};
use crate::config::RenderSettings;
use crate::error::{AnnotatorError, Result};

/// Gap between a polygon edge and its label, in pixels
const LABEL_GAP: f64 = 2.0;

/// Upper bound for the configured outline thickness
const MAX_BOX_THICKNESS: u32 = 64;

/// Renders annotation overlays to the configured output path
pub struct Renderer {
    settings: RenderSettings,
    font: Option<FontVec>,
    font_path: Option<PathBuf>,
}

impl Renderer {
    /// Create a renderer, loading the configured font or probing system fonts.
    ///
    /// An explicitly configured font that cannot be loaded is an error; a
    /// failed probe only disables labels.
    pub fn new(settings: RenderSettings) -> Result<Self> {
        let font = match &settings.font_path {
            Some(path) => Some((path.clone(), font::load_font(path)?)),
            None => font::discover_font(),
        };
        Ok(Self::with_font(settings, font))
    }

    /// Create a renderer with an already loaded font (or none)
    pub fn with_font(settings: RenderSettings, font: Option<(PathBuf, FontVec)>) -> Self {
        let (font_path, font) = match font {
            Some((path, font)) => (Some(path), Some(font)),
            None => (None, None),
        };
        Self {
            settings,
            font,
            font_path,
        }
    }

    /// Path every render is written to
    pub fn output_path(&self) -> &Path {
        &self.settings.output_path
    }

    /// File the label font was loaded from, if any
    pub fn font_path(&self) -> Option<&Path> {
        self.font_path.as_deref()
    }

    /// Draw `annotations` onto a copy of `image`, in sequence order
    pub fn compose<'a, I>(&self, image: &RgbImage, annotations: I) -> RgbImage
    where
        I: IntoIterator<Item = (&'a Polygon, &'a str)>,
    {
        let mut canvas = image.clone();
        let box_color = Rgb(self.settings.box_color);
        let text_color = Rgb(self.settings.text_color);
        let scale = PxScale::from(self.settings.font_size);

        for (bbox, text) in annotations {
            draw_polygon(&mut canvas, bbox, box_color, self.settings.box_thickness);

            let (Some(font), Some(bounds)) = (&self.font, extent(bbox)) else {
                continue;
            };
            if text.is_empty() {
                continue;
            }
            let (x, y) = label_anchor(&bounds, self.settings.font_size);
            draw_text_mut(&mut canvas, text_color, x, y, scale, font, text);
        }

        canvas
    }

    /// Render and write to the output path.
    ///
    /// Returns `Ok(None)` when no image is loaded.
    pub fn render<'a, I>(&self, image: Option<&RgbImage>, annotations: I) -> Result<Option<PathBuf>>
    where
        I: IntoIterator<Item = (&'a Polygon, &'a str)>,
    {
        let Some(image) = image else {
            debug!("Render skipped: no image loaded");
            return Ok(None);
        };

        let composed = self.compose(image, annotations);
        let path = &self.settings.output_path;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AnnotatorError::write(parent, e))?;
        }
        composed
            .save(path)
            .map_err(|e| AnnotatorError::write(path, e))?;

        info!("Rendered annotations to {:?}", path);
        Ok(Some(path.clone()))
    }
}

/// Where to place a label for a polygon with the given extent.
///
/// Above the top edge when that stays inside the image, otherwise just below
/// the bottom edge. The x coordinate follows the left edge, clamped to 0.
pub fn label_anchor(bounds: &Extent, label_height: f32) -> (i32, i32) {
    let x = bounds.min_x.max(0.0).round() as i32;
    let above = bounds.min_y - label_height as f64 - LABEL_GAP;
    let y = if above >= 0.0 {
        above
    } else {
        bounds.max_y + LABEL_GAP
    };
    (x, y.round() as i32)
}

/// Draw a closed polygon outline `thickness` pixels wide
fn draw_polygon(canvas: &mut RgbImage, bbox: &[[f64; 2]], color: Rgb<u8>, thickness: u32) {
    if bbox.is_empty() {
        return;
    }
    let thickness = thickness.clamp(1, MAX_BOX_THICKNESS) as i32;
    let low = -(thickness - 1) / 2;
    let high = thickness / 2;

    for (i, start) in bbox.iter().enumerate() {
        let end = bbox[(i + 1) % bbox.len()];
        for offset in low..=high {
            let d = offset as f32;
            let (sx, sy) = (start[0] as f32, start[1] as f32);
            let (ex, ey) = (end[0] as f32, end[1] as f32);
            draw_line_segment_mut(canvas, (sx + d, sy), (ex + d, ey), color);
            draw_line_segment_mut(canvas, (sx, sy + d), (ex, ey + d), color);
        }
    }
}
