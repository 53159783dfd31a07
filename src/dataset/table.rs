//! In-memory observation table
//!
//! Columns are stored column-major. A column is either numeric or text,
//! and every cell may be missing (`None`).

use rustc_hash::FxHashSet;

use crate::core::error::{ForestError, Result};

/// Cells of a single column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(cells) => cells.len(),
            ColumnData::Text(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Numeric(cells) => cells.get(row).is_some_and(Option::is_none),
            ColumnData::Text(cells) => cells.get(row).is_some_and(Option::is_none),
        }
    }

    fn forward_fill(&mut self) -> usize {
        match self {
            ColumnData::Numeric(cells) => fill_forward(cells),
            ColumnData::Text(cells) => fill_forward(cells),
        }
    }
}

/// Replace each missing cell with the nearest preceding value.
/// Leading missing cells have no predecessor and stay missing.
fn fill_forward<T: Clone>(cells: &mut [Option<T>]) -> usize {
    let mut last: Option<T> = None;
    let mut filled = 0;

    for cell in cells.iter_mut() {
        match cell {
            Some(value) => last = Some(value.clone()),
            None => {
                if let Some(previous) = &last {
                    *cell = Some(previous.clone());
                    filled += 1;
                }
            }
        }
    }

    filled
}

/// Render a number the way it would appear as a category label.
/// Integral values drop the fractional part (`2020.0` -> `2020`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, cells: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(cells),
        }
    }

    pub fn text<S: Into<String>>(name: impl Into<String>, cells: Vec<Option<S>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(cells.into_iter().map(|c| c.map(Into::into)).collect()),
        }
    }

    /// Cell rendered as a label, `None` when missing
    pub fn display_value(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(cells) => cells.get(row).copied().flatten().map(format_number),
            ColumnData::Text(cells) => cells.get(row).cloned().flatten(),
        }
    }
}

/// The loaded dataset. Immutable once handed to report, chart and
/// dashboard stages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationTable {
    columns: Vec<Column>,
    rows: usize,
}

impl ObservationTable {
    /// Build a table, checking that column names are unique and that all
    /// columns have the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);

        let mut seen = FxHashSet::default();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ForestError::MalformedData(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
            if column.data.len() != rows {
                return Err(ForestError::MalformedData(format!(
                    "column '{}' has {} rows, expected {rows}",
                    column.name,
                    column.data.len()
                )));
            }
        }

        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`column`](Self::column) but a missing column is an error
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| ForestError::ColumnNotFound(name.to_string()))
    }

    /// Numeric cells of a column
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        match &self.require(name)?.data {
            ColumnData::Numeric(cells) => Ok(cells),
            ColumnData::Text(_) => Err(ForestError::ColumnType(format!(
                "column '{name}' is not numeric"
            ))),
        }
    }

    /// Every cell of a column rendered as a label
    pub fn category_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self.require(name)?;
        Ok((0..self.rows).map(|row| column.display_value(row)).collect())
    }

    /// Distinct non-missing labels of a column in first-seen order
    pub fn distinct_values(&self, name: &str) -> Result<Vec<String>> {
        let mut seen = FxHashSet::default();
        let mut distinct = Vec::new();
        for value in self.category_values(name)?.into_iter().flatten() {
            if seen.insert(value.clone()) {
                distinct.push(value);
            }
        }
        Ok(distinct)
    }

    /// Row indices whose label in `column` equals `value`
    pub fn rows_matching(&self, column: &str, value: &str) -> Result<Vec<usize>> {
        let column = self.require(column)?;
        Ok((0..self.rows)
            .filter(|&row| column.display_value(row).as_deref() == Some(value))
            .collect())
    }

    /// Forward-fill every column in place. Returns the number of cells filled.
    pub fn forward_fill(&mut self) -> usize {
        self.columns
            .iter_mut()
            .map(|column| column.data.forward_fill())
            .sum()
    }

    /// `(column, row)` of every missing cell
    pub fn missing_cells(&self) -> Vec<(String, usize)> {
        let mut missing = Vec::new();
        for column in &self.columns {
            for row in 0..self.rows {
                if column.data.is_missing(row) {
                    missing.push((column.name.clone(), row));
                }
            }
        }
        missing
    }
}
