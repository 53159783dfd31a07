//! forestwatch: reports, charts and a dashboard for socioeconomic and
//! deforestation data
//!
//! The binary runs a fixed sequence over one dataset: load it and
//! forward-fill missing cells, write a PDF summary, write two PNG charts,
//! then serve a single-page dashboard whose dropdown filters a bar chart.
//!
//! Module layout:
//! - [`core`]: error type and constants
//! - [`config`]: TOML configuration and CLI merging
//! - [`dataset`]: loading and the observation table
//! - [`reporting`]: statistics, PDF report, charts and logging
//! - [`dashboard`]: the filter binding, page and HTTP server
//! - [`pipeline`]: the stages wired together
//! - [`ui`]: command line, progress and completions

pub mod config;
pub mod core;
pub mod dashboard;
pub mod dataset;
pub mod pipeline;
pub mod reporting;
pub mod ui;

// Re-export commonly used items
pub use crate::config::{CliConfig, ColumnNames, Config, FailurePolicy};
pub use crate::core::{ErrorCategory, ForestError, Result};
pub use crate::dashboard::{ActivityFilter, Binding, ChartSpec, DashboardState};
pub use crate::dataset::{CsvLoader, LoadDataset, ObservationTable};
pub use crate::pipeline::{Artifact, ArtifactSummary, Pipeline};
