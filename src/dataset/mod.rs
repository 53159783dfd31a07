//! Dataset loading
//!
//! This module reads the delimited input file into an in-memory
//! observation table and forward-fills missing cells.

pub mod loader;
pub mod table;

// Re-export commonly used items
pub use loader::{CsvLoader, LoadDataset};
pub use table::{Column, ColumnData, ObservationTable};
