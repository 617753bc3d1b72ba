//! Application Configuration
//!
//! OCR endpoint, rendering and export settings stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote OCR endpoint settings
    pub ocr: OcrSettings,
    /// Annotated image rendering settings
    pub render: RenderSettings,
    /// Annotation export settings
    pub export: ExportSettings,
}

/// Remote OCR endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// URL the image is POSTed to
    pub endpoint: String,
    /// Input discriminator sent as `fileType` (0 = PDF, 1 = image)
    pub file_type: u8,
    /// Ask the service to return a visualization
    pub visualize: bool,
    /// Ask the service to run document unwarping
    pub use_doc_unwarping: bool,
    /// Request timeout in seconds (0 = transport default)
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8012/ocr".to_string(),
            file_type: 1,
            visualize: false,
            use_doc_unwarping: false,
            timeout_secs: 60,
        }
    }
}

/// Annotated image rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Fixed path the rendered image is written to (overwritten on every render)
    pub output_path: PathBuf,
    /// Polygon outline color (RGB)
    pub box_color: [u8; 3],
    /// Polygon outline thickness in pixels
    pub box_thickness: u32,
    /// Label color (RGB)
    pub text_color: [u8; 3],
    /// Label height in pixels
    pub font_size: f32,
    /// Explicit font file; system fonts are probed when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            output_path: std::env::temp_dir()
                .join("ocr-annotator")
                .join("temp_annotation.png"),
            box_color: [0, 255, 0],
            box_thickness: 1,
            text_color: [255, 0, 0],
            font_size: 20.0,
            font_path: None,
        }
    }
}

/// Annotation export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory the JSON/TXT annotation files are saved into
    pub output_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("annotations"),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        // OCR defaults
        assert_eq!(config.ocr.endpoint, "http://localhost:8012/ocr");
        assert_eq!(config.ocr.file_type, 1);
        assert!(!config.ocr.visualize);
        assert!(!config.ocr.use_doc_unwarping);
        assert_eq!(config.ocr.timeout_secs, 60);

        // Render defaults
        assert_eq!(config.render.box_color, [0, 255, 0]);
        assert_eq!(config.render.box_thickness, 1);
        assert!((config.render.font_size - 20.0).abs() < 0.01);
        assert!(config.render.font_path.is_none());
        assert!(config.render.output_path.ends_with("temp_annotation.png"));

        // Export defaults
        assert_eq!(config.export.output_dir, PathBuf::from("annotations"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.ocr.endpoint, parsed.ocr.endpoint);
        assert_eq!(config.render.output_path, parsed.render.output_path);
        assert_eq!(config.export.output_dir, parsed.export.output_dir);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [ocr]
            endpoint = "http://ocr.internal:9000/ocr"
            use_doc_unwarping = true
            "#,
        )
        .unwrap();

        assert_eq!(parsed.ocr.endpoint, "http://ocr.internal:9000/ocr");
        assert!(parsed.ocr.use_doc_unwarping);
        assert_eq!(parsed.ocr.file_type, 1);
        assert_eq!(parsed.render.box_thickness, 1);
        assert_eq!(parsed.export.output_dir, PathBuf::from("annotations"));
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.render.font_path = Some(PathBuf::from("/fonts/NotoSansCJK.ttc"));
        config.ocr.timeout_secs = 5;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.render.font_path, config.render.font_path);
        assert_eq!(loaded.ocr.timeout_secs, 5);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
