//! Dashboard views

pub mod annotate;

pub use annotate::{render_controls_panel, render_results_panel};
