//! Dashboard UI Module
//!
//! Desktop window for running OCR on an image and editing the results.

pub mod app;
pub mod components;
pub mod state;
pub mod theme;
pub mod views;

pub use app::run_dashboard;
