//! Annotation view
//!
//! Left: image selection and edit controls. Right: rendered preview and the
//! annotation table.

use egui::{Color32, RichText};
use std::path::PathBuf;
use tracing::warn;

use crate::dashboard::components::{render_annotation_table, SessionSummary};
use crate::dashboard::state::{DashboardAction, DashboardState, MessageKind};
use crate::dashboard::theme::ThemeColors;

/// Render the controls panel. Returns the action requested this frame, if any.
pub fn render_controls_panel(
    ui: &mut egui::Ui,
    state: &mut DashboardState,
    endpoint: &str,
) -> Option<DashboardAction> {
    let mut action = None;
    let busy = state.is_processing();

    ui.heading("OCR Annotator");
    ui.label(
        RichText::new("Run OCR on an image, then review and correct the results")
            .small()
            .color(ThemeColors::TEXT_MUTED),
    );
    ui.add_space(12.0);

    // Image selection
    ui.label(RichText::new("Image").strong());
    ui.add(
        egui::TextEdit::singleline(&mut state.image_path_input)
            .hint_text("Path to image (or drop a file on the window)")
            .desired_width(f32::INFINITY),
    );
    ui.horizontal(|ui| {
        let can_run = !busy && !state.image_path_input.trim().is_empty();
        if ui
            .add_enabled(can_run, egui::Button::new("Run OCR").fill(ThemeColors::ACCENT_PRIMARY))
            .clicked()
        {
            action = Some(DashboardAction::Process(PathBuf::from(
                state.image_path_input.trim(),
            )));
        }
        if busy {
            ui.spinner();
            ui.label(RichText::new("Recognizing...").color(ThemeColors::ACCENT_WARNING));
        }
    });
    ui.label(
        RichText::new(format!("Endpoint: {endpoint}"))
            .small()
            .color(ThemeColors::TEXT_MUTED),
    );

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    // Edit by id
    ui.label(RichText::new("Edit annotation").strong());
    ui.horizontal(|ui| {
        ui.label("ID");
        ui.add(egui::DragValue::new(&mut state.text_id).range(-1..=i64::MAX));
    });
    ui.add(
        egui::TextEdit::singleline(&mut state.new_text)
            .hint_text("New text")
            .desired_width(f32::INFINITY),
    );
    ui.horizontal(|ui| {
        if ui.add_enabled(!busy, egui::Button::new("Update text")).clicked() {
            action = Some(DashboardAction::UpdateText {
                id: state.text_id,
                text: state.new_text.clone(),
            });
        }
        if ui
            .add_enabled(
                !busy,
                egui::Button::new(RichText::new("Delete box").color(ThemeColors::ACCENT_ERROR)),
            )
            .clicked()
        {
            action = Some(DashboardAction::DeleteBox { id: state.text_id });
        }
    });

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    // Manual box
    ui.label(RichText::new("Add box").strong());
    egui::Grid::new("add_box_grid")
        .num_columns(4)
        .spacing([6.0, 4.0])
        .show(ui, |ui| {
            let [x0, y0, x1, y1] = &mut state.add_rect;
            ui.label("x0");
            ui.add(egui::DragValue::new(x0).speed(1.0));
            ui.label("y0");
            ui.add(egui::DragValue::new(y0).speed(1.0));
            ui.end_row();
            ui.label("x1");
            ui.add(egui::DragValue::new(x1).speed(1.0));
            ui.label("y1");
            ui.add(egui::DragValue::new(y1).speed(1.0));
            ui.end_row();
        });
    if ui
        .add_enabled(!busy, egui::Button::new("Add box with text"))
        .on_hover_text("Uses the text field above")
        .clicked()
    {
        action = Some(DashboardAction::AddBox {
            rect: state.add_rect,
            text: state.new_text.clone(),
        });
    }

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    if ui
        .add_enabled(!busy, egui::Button::new("Save annotations"))
        .clicked()
    {
        action = Some(DashboardAction::Save);
    }

    ui.add_space(12.0);
    render_message(ui, state);

    action
}

/// Render the preview image and the annotation table
pub fn render_results_panel(
    ui: &mut egui::Ui,
    state: &mut DashboardState,
    summary: &SessionSummary,
) {
    refresh_preview_texture(ui.ctx(), state);

    summary.show(ui);

    ui.add_space(8.0);

    let available = ui.available_size();
    let preview_height = (available.y * 0.6).max(120.0);
    let preview_size = egui::vec2(available.x, preview_height);

    egui::Frame::none()
        .fill(ThemeColors::BG_MEDIUM)
        .rounding(egui::Rounding::same(4.0))
        .show(ui, |ui| {
            ui.set_min_size(preview_size);
            ui.set_max_size(preview_size);

            match &state.preview_texture {
                Some(texture) => {
                    // Fit the texture inside the preview area, keeping aspect ratio
                    let tex_size = texture.size_vec2();
                    let scale = (preview_size.x / tex_size.x).min(preview_size.y / tex_size.y);
                    let scaled_size = tex_size * scale;
                    let (rect, _) = ui.allocate_exact_size(preview_size, egui::Sense::hover());
                    let image_rect = egui::Rect::from_center_size(rect.center(), scaled_size);
                    ui.painter().image(
                        texture.id(),
                        image_rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            RichText::new("Run OCR to see the annotated image")
                                .color(ThemeColors::TEXT_MUTED),
                        );
                    });
                }
            }
        });

    ui.add_space(8.0);

    let table_height = ui.available_height() - 30.0;
    if let Some(id) =
        render_annotation_table(ui, &state.rows, state.selected_id(), table_height.max(60.0))
    {
        state.select_row(id);
    }
}

/// Reload the preview texture after the rendered file changed
fn refresh_preview_texture(ctx: &egui::Context, state: &mut DashboardState) {
    if !state.preview_dirty {
        return;
    }
    state.preview_dirty = false;

    let Some(path) = state.preview_path.clone() else {
        state.preview_texture = None;
        return;
    };

    match image::open(&path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(
                [rgba.width() as usize, rgba.height() as usize],
                rgba.as_raw(),
            );
            match state.preview_texture.as_mut() {
                Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
                None => {
                    state.preview_texture = Some(ctx.load_texture(
                        "annotation_preview",
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
            }
        }
        Err(e) => {
            warn!("Failed to load rendered image {:?}: {}", path, e);
            state.set_message(
                format!("Failed to display {}: {e}", path.display()),
                MessageKind::Error,
            );
        }
    }
}

/// Render the last status message
fn render_message(ui: &mut egui::Ui, state: &DashboardState) {
    if state.message.is_empty() {
        return;
    }
    let color = match state.message_kind {
        MessageKind::Info => ThemeColors::TEXT_SECONDARY,
        MessageKind::Success => ThemeColors::ACCENT_SUCCESS,
        MessageKind::Error => ThemeColors::ACCENT_ERROR,
    };
    egui::Frame::none()
        .fill(ThemeColors::BG_LIGHT)
        .rounding(egui::Rounding::same(4.0))
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(&state.message).color(color));
        });
}
