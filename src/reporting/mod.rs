//! Analysis and reporting
//!
//! This module computes summary statistics, writes the PDF report, renders
//! the static charts, and provides structured logging for the application.

pub mod charts;
pub mod logging;
pub mod pdf;
pub mod summary;

// Re-export commonly used items
pub use charts::{ChartLabels, Histogram, StaticChartExporter};
pub use pdf::ReportGenerator;
pub use summary::{Summary, describe};
