//! Descriptive statistics
//!
//! Mirrors the usual `describe` table: numeric columns get count, mean,
//! sample standard deviation, min, quartiles and max. A table without
//! numeric columns describes its text columns instead (count, unique,
//! top, freq).

use rustc_hash::FxHashMap;

use crate::dataset::{ColumnData, ObservationTable};

const NUMERIC_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
const TEXT_ROWS: [&str; 4] = ["count", "unique", "top", "freq"];

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn from_cells(name: &str, cells: &[Option<f64>]) -> Self {
        let mut values: Vec<f64> = cells
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        values.sort_by(f64::total_cmp);

        Self {
            name: name.to_string(),
            count: values.len(),
            mean: mean(&values),
            std: sample_std(&values),
            min: values.first().copied(),
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values.last().copied(),
        }
    }

    fn cells(&self) -> Vec<String> {
        let count = Some(self.count as f64);
        [
            count,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
        .iter()
        .map(|value| format_stat(*value))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSummary {
    pub name: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

impl TextSummary {
    pub fn from_cells(name: &str, cells: &[Option<String>]) -> Self {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        let mut order: Vec<&str> = Vec::new();
        for value in cells.iter().flatten() {
            let entry = counts.entry(value.as_str()).or_insert_with(|| {
                order.push(value.as_str());
                0
            });
            *entry += 1;
        }

        // Most frequent; ties go to the value seen first
        let mut top: Option<(&str, usize)> = None;
        for &value in &order {
            let freq = counts[value];
            if top.is_none_or(|(_, best)| freq > best) {
                top = Some((value, freq));
            }
        }

        Self {
            name: name.to_string(),
            count: cells.iter().flatten().count(),
            unique: order.len(),
            top: top.map(|(value, _)| value.to_string()),
            freq: top.map(|(_, freq)| freq).unwrap_or(0),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.count.to_string(),
            self.unique.to_string(),
            self.top.clone().unwrap_or_else(|| "NaN".to_string()),
            self.freq.to_string(),
        ]
    }
}

/// Summary statistics of a table
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    Numeric(Vec<NumericSummary>),
    Text(Vec<TextSummary>),
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        match self {
            Summary::Numeric(columns) => columns.is_empty(),
            Summary::Text(columns) => columns.is_empty(),
        }
    }

    pub fn numeric(&self, name: &str) -> Option<&NumericSummary> {
        match self {
            Summary::Numeric(columns) => columns.iter().find(|c| c.name == name),
            Summary::Text(_) => None,
        }
    }

    /// Fixed-width text block: one line per statistic, one column per
    /// dataset column
    pub fn to_text(&self) -> String {
        match self {
            Summary::Numeric(columns) => render_grid(
                &NUMERIC_ROWS,
                columns.iter().map(|c| (c.name.as_str(), c.cells())).collect(),
            ),
            Summary::Text(columns) => render_grid(
                &TEXT_ROWS,
                columns.iter().map(|c| (c.name.as_str(), c.cells())).collect(),
            ),
        }
    }
}

pub fn describe(table: &ObservationTable) -> Summary {
    let numeric: Vec<NumericSummary> = table
        .columns()
        .iter()
        .filter_map(|column| match &column.data {
            ColumnData::Numeric(cells) => Some(NumericSummary::from_cells(&column.name, cells)),
            ColumnData::Text(_) => None,
        })
        .collect();

    if !numeric.is_empty() {
        return Summary::Numeric(numeric);
    }

    Summary::Text(
        table
            .columns()
            .iter()
            .filter_map(|column| match &column.data {
                ColumnData::Text(cells) => Some(TextSummary::from_cells(&column.name, cells)),
                ColumnData::Numeric(_) => None,
            })
            .collect(),
    )
}

fn render_grid(row_labels: &[&str], columns: Vec<(&str, Vec<String>)>) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let label_width = row_labels.iter().map(|l| l.len()).max().unwrap_or(0);
    let widths: Vec<usize> = columns
        .iter()
        .map(|(name, cells)| {
            cells
                .iter()
                .map(|c| c.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(row_labels.len() + 1);

    let mut header = " ".repeat(label_width);
    for ((name, _), width) in columns.iter().zip(&widths) {
        header.push_str(&format!("  {name:>width$}"));
    }
    lines.push(header);

    for (row, label) in row_labels.iter().enumerate() {
        let mut line = format!("{label:<label_width$}");
        for ((_, cells), width) in columns.iter().zip(&widths) {
            let cell = cells.get(row).map(String::as_str).unwrap_or("");
            line.push_str(&format!("  {cell:>width$}"));
        }
        lines.push(line);
    }

    lines.join("\n")
}

fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.6}"),
        _ => "NaN".to_string(),
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with `n - 1` in the denominator
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((squares / (values.len() - 1) as f64).sqrt())
}

/// Quantile of sorted values with linear interpolation between ranks
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value present");
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_numeric_summary_matches_describe() {
        let summary =
            NumericSummary::from_cells("x", &[Some(4.0), Some(1.0), None, Some(3.0), Some(2.0)]);

        assert_eq!(summary.count, 4);
        assert_close(summary.mean, 2.5);
        assert_close(summary.std, 1.290994);
        assert_close(summary.min, 1.0);
        assert_close(summary.q25, 1.75);
        assert_close(summary.median, 2.5);
        assert_close(summary.q75, 3.25);
        assert_close(summary.max, 4.0);
    }

    #[test]
    fn test_single_value_has_no_std() {
        let summary = NumericSummary::from_cells("x", &[Some(7.0)]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.std, None);
        assert_close(summary.q25, 7.0);
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let summary = NumericSummary::from_cells(
            "x",
            &[Some(f64::INFINITY), Some(1.0), Some(f64::NAN), Some(3.0)],
        );
        assert_eq!(summary.count, 2);
        assert_close(summary.mean, 2.0);
        assert_close(summary.max, 3.0);
    }

    #[test]
    fn test_empty_column() {
        let summary = NumericSummary::from_cells("x", &[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.cells()[0], "0.000000");
        assert_eq!(summary.cells()[1], "NaN");
    }

    #[test]
    fn test_text_summary() {
        let cells: Vec<Option<String>> = ["b", "a", "a", "b", "c"]
            .iter()
            .map(|s| Some(s.to_string()))
            .chain(std::iter::once(None))
            .collect();
        let summary = TextSummary::from_cells("activity", &cells);

        assert_eq!(summary.count, 5);
        assert_eq!(summary.unique, 3);
        // "b" and "a" tie; "b" was seen first
        assert_eq!(summary.top.as_deref(), Some("b"));
        assert_eq!(summary.freq, 2);
    }

    #[test]
    fn test_describe_skips_text_columns() {
        let table = ObservationTable::new(vec![
            Column::numeric("year", vec![Some(2020.0), Some(2021.0)]),
            Column::text("activity", vec![Some("A"), Some("B")]),
        ])
        .unwrap();

        let summary = describe(&table);
        assert!(summary.numeric("year").is_some());
        assert!(summary.numeric("activity").is_none());
    }

    #[test]
    fn test_describe_text_only_table() {
        let table =
            ObservationTable::new(vec![Column::text("activity", vec![Some("A"), Some("A")])])
                .unwrap();

        match describe(&table) {
            Summary::Text(columns) => {
                assert_eq!(columns.len(), 1);
                assert_eq!(columns[0].freq, 2);
            }
            other => panic!("expected text summary, got {other:?}"),
        }
    }

    #[test]
    fn test_describe_without_columns() {
        let table = ObservationTable::default();
        let summary = describe(&table);
        assert!(summary.is_empty());
        assert_eq!(summary.to_text(), "");
    }

    #[test]
    fn test_to_text_layout() {
        let table = ObservationTable::new(vec![
            Column::numeric("year", vec![Some(2020.0), Some(2021.0)]),
            Column::numeric("income", vec![Some(10.0), Some(30.0)]),
        ])
        .unwrap();

        let text = describe(&table).to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "              year     income");
        assert_eq!(lines[1], "count     2.000000   2.000000");
        assert_eq!(lines[2], "mean   2020.500000  20.000000");
        assert!(lines[8].starts_with("max"));

        // Every line has the same width
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn test_quantile_bounds() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(3.0));
        assert_eq!(quantile(&[], 0.5), None);
    }
}
