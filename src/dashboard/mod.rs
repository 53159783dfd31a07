//! Interactive dashboard
//!
//! This module serves a single page with a dropdown-driven bar chart and a
//! static time series chart. The page's only interaction is an update
//! request issued when the dropdown changes.

pub mod binding;
pub mod page;
pub mod server;

// Re-export commonly used items
pub use binding::{ActivityFilter, Binding, ChartSpec};
pub use page::DashboardPage;
pub use server::{DashboardState, UpdateRequest, UpdateResponse, create_router};
