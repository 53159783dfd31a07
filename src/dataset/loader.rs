use log::{debug, info};

use crate::core::constants::columns;
use crate::core::error::{ForestError, Result};
use crate::dataset::table::{Column, ColumnData, ObservationTable};

use std::io;
use std::path::Path;

pub trait LoadDataset {
    fn load(&self, path: &Path) -> Result<ObservationTable>;
}

/// Loads delimited text with a header row.
///
/// Cells are trimmed; an empty cell or one of
/// [`MISSING_TOKENS`](crate::core::constants::columns::MISSING_TOKENS) is
/// missing. A column whose non-missing cells all parse as numbers becomes
/// numeric, anything else is text. The table is forward-filled before it is
/// returned and then checked against the required columns.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    delimiter: u8,
    required: Vec<String>,
    numeric: Vec<String>,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            required: Vec::new(),
            numeric: Vec::new(),
        }
    }
}

impl LoadDataset for CsvLoader {
    fn load(&self, path: &Path) -> Result<ObservationTable> {
        if !path.is_file() {
            return Err(ForestError::FileNotFound(path.display().to_string()));
        }

        let reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut table = self.read_records(reader)?;
        let filled = table.forward_fill();
        debug!(
            "Forward-filled {filled} cell(s) in {} ({} rows)",
            path.display(),
            table.len()
        );

        self.check_schema(&table)?;
        info!(
            "Loaded {} rows x {} columns from {}",
            table.len(),
            table.columns().len(),
            path.display()
        );
        Ok(table)
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Columns that must be present
    pub fn require_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Columns that must be present and numeric
    pub fn require_numeric<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric.extend(names.into_iter().map(Into::into));
        self
    }

    /// Parse delimited text without filling or schema checks
    pub fn parse<R: io::Read>(&self, input: R) -> Result<ObservationTable> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(input);
        self.read_records(reader)
    }

    fn read_records<R: io::Read>(&self, mut reader: csv::Reader<R>) -> Result<ObservationTable> {
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

        for record in reader.records() {
            let record = record?;
            for (cells, field) in raw.iter_mut().zip(record.iter()) {
                cells.push(Self::parse_cell(field));
            }
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, cells)| Column {
                name,
                data: Self::infer_column(cells),
            })
            .collect();

        ObservationTable::new(columns)
    }

    fn parse_cell(field: &str) -> Option<String> {
        if columns::MISSING_TOKENS.contains(&field) {
            None
        } else {
            Some(field.to_string())
        }
    }

    // `inf`, `NAN` and overflowing literals like `1e400` still parse, but
    // they count as missing cells
    fn infer_column(cells: Vec<Option<String>>) -> ColumnData {
        let parsed: Option<Vec<Option<f64>>> = cells
            .iter()
            .map(|cell| match cell {
                Some(text) => text
                    .parse::<f64>()
                    .ok()
                    .map(|value| value.is_finite().then_some(value)),
                None => Some(None),
            })
            .collect();

        match parsed {
            Some(numbers) => ColumnData::Numeric(numbers),
            None => ColumnData::Text(cells),
        }
    }

    fn check_schema(&self, table: &ObservationTable) -> Result<()> {
        for name in &self.required {
            table.require(name)?;
        }
        for name in &self.numeric {
            table.numeric(name)?;
        }
        Ok(())
    }
}
