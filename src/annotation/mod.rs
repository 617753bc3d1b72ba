//! Annotation data model
//!
//! An annotation is one recognized text region: a polygon in image pixel
//! coordinates plus its (possibly edited) text. Ids are positional and are
//! recomputed on every read, so deleting annotation 0 turns annotation 1 into
//! annotation 0.

pub mod store;

pub use store::AnnotationStore;

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Ordered polygon points `[x, y]` in image pixel coordinates
pub type Polygon = Vec<[f64; 2]>;

/// One annotation as seen by the UI and the exporter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Position in the current sequence
    pub id: usize,
    /// Region outline
    pub bbox: Polygon,
    /// Recognized or edited text
    pub text: String,
}

/// Axis-aligned extent of a polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Compute the bounding extent of a polygon, `None` when it has no points
pub fn extent(bbox: &[[f64; 2]]) -> Option<Extent> {
    let first = bbox.first()?;
    let init = Extent {
        min_x: first[0],
        min_y: first[1],
        max_x: first[0],
        max_y: first[1],
    };
    Some(bbox.iter().fold(init, |acc, [x, y]| Extent {
        min_x: acc.min_x.min(*x),
        min_y: acc.min_y.min(*y),
        max_x: acc.max_x.max(*x),
        max_y: acc.max_y.max(*y),
    }))
}

/// Axis-aligned rectangle as a four-point polygon (clockwise from top-left)
pub fn rect_polygon(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    let (left, right) = (x0.min(x1), x0.max(x1));
    let (top, bottom) = (y0.min(y1), y0.max(y1));
    vec![[left, top], [right, top], [right, bottom], [left, bottom]]
}

/// Format a polygon as `[[x, y], [x, y], ...]`
pub fn format_bbox(bbox: &[[f64; 2]]) -> String {
    let mut out = String::from("[");
    for (i, [x, y]) in bbox.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "[{x}, {y}]");
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_of_quad() {
        let bbox = vec![[3.0, 4.0], [10.5, 2.0], [11.0, 9.0], [2.0, 8.0]];
        let e = extent(&bbox).unwrap();
        assert_eq!(e.min_x, 2.0);
        assert_eq!(e.min_y, 2.0);
        assert_eq!(e.max_x, 11.0);
        assert_eq!(e.max_y, 9.0);
    }

    #[test]
    fn test_extent_of_empty_polygon() {
        assert!(extent(&[]).is_none());
    }

    #[test]
    fn test_rect_polygon_normalizes_corners() {
        let poly = rect_polygon(30.0, 30.0, 20.0, 20.0);
        assert_eq!(
            poly,
            vec![[20.0, 20.0], [30.0, 20.0], [30.0, 30.0], [20.0, 30.0]]
        );
    }

    #[test]
    fn test_format_bbox() {
        let bbox = vec![[0.0, 0.0], [10.5, 0.0], [10.5, 10.0]];
        assert_eq!(format_bbox(&bbox), "[[0, 0], [10.5, 0], [10.5, 10]]");
        assert_eq!(format_bbox(&[]), "[]");
    }

    #[test]
    fn test_annotation_json_shape() {
        let ann = Annotation {
            id: 0,
            bbox: vec![[0.0, 0.0], [10.0, 0.0]],
            text: "Hello".to_string(),
        };
        let value = serde_json::to_value(&ann).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 0, "bbox": [[0.0, 0.0], [10.0, 0.0]], "text": "Hello"})
        );
    }
}
