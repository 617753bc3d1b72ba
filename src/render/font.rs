//! Label font loading
//!
//! Recognized text is frequently CJK, so system fonts with wide script
//! coverage are probed before falling back to Latin-only faces.

use ab_glyph::FontVec;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{AnnotatorError, Result};

/// Well-known font files, most script coverage first
const FONT_CANDIDATES: &[&str] = &[
    // Linux
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
    "/usr/share/fonts/wenquanyi/wqy-microhei/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf",
    // macOS
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    // Windows
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
    "C:\\Windows\\Fonts\\simsun.ttc",
    // Latin-only fallbacks
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load a font file (first face of a collection)
pub fn load_font(path: &Path) -> Result<FontVec> {
    let data = std::fs::read(path).map_err(|e| AnnotatorError::FontLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    FontVec::try_from_vec_and_index(data, 0).map_err(|e| AnnotatorError::FontLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Probe the well-known font locations
pub fn discover_font() -> Option<(PathBuf, FontVec)> {
    for candidate in FONT_CANDIDATES {
        let path = Path::new(candidate);
        if !path.exists() {
            continue;
        }
        match load_font(path) {
            Ok(font) => {
                info!("Using label font {:?}", path);
                return Some((path.to_path_buf(), font));
            }
            Err(e) => debug!("Skipping font candidate: {}", e),
        }
    }
    warn!("No usable system font found; labels will not be drawn");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_font_missing_file() {
        let result = load_font(Path::new("/nonexistent/font.ttf"));
        assert!(matches!(result, Err(AnnotatorError::FontLoad { .. })));
    }

    #[test]
    fn test_load_font_invalid_data() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a font at all").unwrap();

        let result = load_font(file.path());
        assert!(matches!(result, Err(AnnotatorError::FontLoad { .. })));
    }
}
