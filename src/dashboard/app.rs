//! Dashboard application entry point

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use eframe::egui;
use std::path::PathBuf;
use tracing::{error, info};

use crate::annotation::rect_polygon;
use crate::dashboard::components::SessionSummary;
use crate::dashboard::state::{DashboardAction, DashboardState, MessageKind};
use crate::dashboard::theme;
use crate::dashboard::views::{render_controls_panel, render_results_panel};
use crate::error::Result;
use crate::ocr::OcrOutput;
use crate::session::AnnotationSession;

/// OCR request running on a worker thread
struct PendingOcr {
    image_path: PathBuf,
    receiver: Receiver<Result<OcrOutput>>,
}

/// The annotation dashboard application
pub struct DashboardApp {
    /// Editing session owning the annotation store
    session: AnnotationSession,
    /// Dashboard-specific state
    dashboard_state: DashboardState,
    /// OCR endpoint shown in the controls panel
    endpoint: String,
    /// Whether theme has been applied
    theme_applied: bool,
    /// In-flight OCR request
    pending_ocr: Option<PendingOcr>,
    /// Image to process as soon as the window is up
    initial_image: Option<PathBuf>,
}

impl DashboardApp {
    /// Create a new dashboard application
    pub fn new(session: AnnotationSession, endpoint: String, initial_image: Option<PathBuf>) -> Self {
        let mut dashboard_state = DashboardState::default();
        if let Some(path) = &initial_image {
            dashboard_state.image_path_input = path.display().to_string();
        }
        Self {
            session,
            dashboard_state,
            endpoint,
            theme_applied: false,
            pending_ocr: None,
            initial_image,
        }
    }

    /// Start OCR for `image_path` on a worker thread.
    ///
    /// The store is only touched once the result is back on the UI thread.
    fn start_ocr(&mut self, image_path: PathBuf) {
        if self.pending_ocr.is_some() {
            return;
        }

        info!("Starting OCR for {:?}", image_path);
        let recognizer = self.session.recognizer();
        let (tx, rx) = bounded(1);
        let worker_path = image_path.clone();
        std::thread::spawn(move || {
            let _ = tx.send(recognizer.recognize(&worker_path));
        });

        self.dashboard_state.image_path_input = image_path.display().to_string();
        self.dashboard_state.processing = Some(image_path.clone());
        self.dashboard_state
            .set_message(format!("Recognizing {}...", image_path.display()), MessageKind::Info);
        self.pending_ocr = Some(PendingOcr {
            image_path,
            receiver: rx,
        });
    }

    /// Apply the OCR result if the worker has finished
    fn poll_ocr(&mut self) {
        let Some(pending) = &self.pending_ocr else {
            return;
        };

        let result = match pending.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                error!("OCR worker exited without a result");
                self.pending_ocr = None;
                self.dashboard_state.processing = None;
                self.dashboard_state
                    .set_message("OCR worker stopped unexpectedly", MessageKind::Error);
                return;
            }
        };

        let image_path = pending.image_path.clone();
        self.pending_ocr = None;
        self.dashboard_state.processing = None;
        let outcome = self.session.apply_recognition(&image_path, result);
        self.dashboard_state.apply_outcome(outcome);
    }

    /// Execute an action requested by the view
    fn handle_action(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::Process(path) => self.start_ocr(path),
            DashboardAction::UpdateText { id, text } => {
                let outcome = self.session.update_text(id, &text);
                self.dashboard_state.apply_outcome(outcome);
            }
            DashboardAction::DeleteBox { id } => {
                let outcome = self.session.delete_box(id);
                self.dashboard_state.apply_outcome(outcome);
            }
            DashboardAction::AddBox { rect, text } => {
                let [x0, y0, x1, y1] = rect;
                let outcome = self.session.add_box(rect_polygon(x0, y0, x1, y1), &text);
                self.dashboard_state.apply_outcome(outcome);
            }
            DashboardAction::Save => {
                match self.session.save() {
                    Ok(message) => self.dashboard_state.set_message(message, MessageKind::Success),
                    Err(message) => self.dashboard_state.set_message(message, MessageKind::Error),
                }
            }
        }
    }

    /// Pick up an image file dropped on the window
    fn take_dropped_image(ctx: &egui::Context) -> Option<PathBuf> {
        ctx.input(|i| i.raw.dropped_files.iter().find_map(|f| f.path.clone()))
    }

    /// Create eframe options for the dashboard window
    pub fn options() -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1200.0, 760.0])
                .with_min_inner_size([800.0, 500.0])
                .with_drag_and_drop(true)
                .with_title("OCR Annotator"),
            ..Default::default()
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme once
        if !self.theme_applied {
            theme::apply_theme(ctx);
            if let Some(font_path) = self.session.font_path() {
                theme::install_text_font(ctx, font_path);
            }
            self.theme_applied = true;
        }

        if let Some(path) = self.initial_image.take() {
            self.start_ocr(path);
        }
        if let Some(path) = Self::take_dropped_image(ctx) {
            self.start_ocr(path);
        }

        self.poll_ocr();

        // Keep polling while a request is in flight
        if self.pending_ocr.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        let summary = SessionSummary::collect(
            self.session.store(),
            self.pending_ocr.is_some(),
            self.dashboard_state.message_kind == MessageKind::Error,
        );
        let mut action = None;

        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::Frame::none().inner_margin(12.0).show(ui, |ui| {
                    action = render_controls_panel(ui, &mut self.dashboard_state, &self.endpoint);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none().inner_margin(16.0).show(ui, |ui| {
                render_results_panel(ui, &mut self.dashboard_state, &summary);
            });
        });

        if let Some(action) = action {
            self.handle_action(action);
        }
    }
}

/// Run the dashboard application
pub fn run_dashboard(
    session: AnnotationSession,
    endpoint: String,
    initial_image: Option<PathBuf>,
) -> std::result::Result<(), eframe::Error> {
    let app = DashboardApp::new(session, endpoint, initial_image);
    eframe::run_native(
        "OCR Annotator",
        DashboardApp::options(),
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
