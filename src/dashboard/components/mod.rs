//! Reusable UI components for the dashboard

pub mod annotation_table;
pub mod session_summary;

pub use annotation_table::render_annotation_table;
pub use session_summary::SessionSummary;
