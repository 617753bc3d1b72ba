//! Annotation table component

use egui::RichText;
use egui_extras::{Column, TableBuilder};

use crate::dashboard::theme::ThemeColors;
use crate::session::TableRow;

/// Render the annotation rows. Returns the id of a row whose ID cell was clicked.
pub fn render_annotation_table(
    ui: &mut egui::Ui,
    rows: &[TableRow],
    selected: Option<usize>,
    max_height: f32,
) -> Option<usize> {
    if rows.is_empty() {
        ui.label(
            RichText::new("No annotations yet")
                .italics()
                .color(ThemeColors::TEXT_MUTED),
        );
        return None;
    }

    let mut clicked = None;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(40.0))
        .column(Column::initial(220.0).at_least(80.0).clip(true))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder().at_least(120.0).clip(true))
        .max_scroll_height(max_height)
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("ID");
            });
            header.col(|ui| {
                ui.strong("Text");
            });
            header.col(|ui| {
                ui.strong("Score");
            });
            header.col(|ui| {
                ui.strong("BBox");
            });
        })
        .body(|body| {
            body.rows(20.0, rows.len(), |mut row| {
                let item = &rows[row.index()];
                row.col(|ui| {
                    let is_selected = selected == Some(item.id);
                    if ui
                        .selectable_label(is_selected, item.id.to_string())
                        .on_hover_text("Select for editing")
                        .clicked()
                    {
                        clicked = Some(item.id);
                    }
                });
                row.col(|ui| {
                    ui.label(&item.text);
                });
                row.col(|ui| {
                    let score = item
                        .confidence
                        .map(|c| format!("{c:.3}"))
                        .unwrap_or_default();
                    ui.label(RichText::new(score).color(ThemeColors::TEXT_SECONDARY));
                });
                row.col(|ui| {
                    ui.label(RichText::new(&item.bbox).monospace().small());
                });
            });
        });

    clicked
}
