//! Summary strip for the loaded image and its annotations

use egui::{Color32, RichText};

use crate::annotation::AnnotationStore;
use crate::dashboard::theme::ThemeColors;

/// Scores below this are counted as low confidence
const LOW_CONFIDENCE: f32 = 0.5;

/// What the summary strip shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    /// File name of the loaded image
    pub image_name: Option<String>,
    /// Width and height of the loaded image
    pub dimensions: Option<(u32, u32)>,
    pub annotations: usize,
    /// OCR regions scored below `LOW_CONFIDENCE`; manual boxes have no score
    pub low_confidence: usize,
    pub recognizing: bool,
    pub last_action_failed: bool,
}

impl SessionSummary {
    /// Summarize the store as it is now
    pub fn collect(store: &AnnotationStore, recognizing: bool, last_action_failed: bool) -> Self {
        let image_name = store.image_path().map(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        });
        let low_confidence = (0..store.len())
            .filter_map(|id| store.confidence(id))
            .filter(|score| *score < LOW_CONFIDENCE)
            .count();

        Self {
            image_name,
            dimensions: store.image().map(|image| image.dimensions()),
            annotations: store.len(),
            low_confidence,
            recognizing,
            last_action_failed,
        }
    }

    /// First line: image name and size
    pub fn headline(&self) -> String {
        match (&self.image_name, self.dimensions) {
            (Some(name), Some((w, h))) => format!("{name}  {w}x{h}"),
            (Some(name), None) => name.clone(),
            _ => "No image loaded".to_string(),
        }
    }

    fn indicator(&self) -> Color32 {
        if self.recognizing {
            ThemeColors::ACCENT_WARNING
        } else if self.last_action_failed {
            ThemeColors::ACCENT_ERROR
        } else if self.image_name.is_some() {
            ThemeColors::ACCENT_SUCCESS
        } else {
            ThemeColors::TEXT_SECONDARY
        }
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(ThemeColors::BG_MEDIUM)
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    let (dot, _) =
                        ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                    ui.painter().circle_filled(dot.center(), 4.0, self.indicator());

                    ui.label(
                        RichText::new(self.headline())
                            .strong()
                            .color(ThemeColors::TEXT_PRIMARY),
                    );
                    if self.recognizing {
                        ui.spinner();
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if self.low_confidence > 0 {
                            ui.label(
                                RichText::new(format!("{} low score", self.low_confidence))
                                    .color(ThemeColors::ACCENT_WARNING),
                            );
                        }
                        ui.label(
                            RichText::new(format!("{} annotations", self.annotations))
                                .color(ThemeColors::TEXT_SECONDARY),
                        );
                    });
                });
            });
    }
}
