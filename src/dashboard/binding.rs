//! Dropdown-driven chart binding
//!
//! A [`Binding`] ties one input component to one output component. When the
//! input changes, its [`ActivityFilter`] selects the matching rows and
//! describes them as a bar chart. Applying a filter never touches the table,
//! so the same selection always produces the same chart.

use log::{debug, warn};

use crate::config::ColumnNames;
use crate::core::constants::{charts, dashboard};
use crate::core::error::Result;
use crate::dataset::ObservationTable;
use crate::reporting::charts::{ChartLabels, bar_chart_svg, mean_by_key};

/// Chart description produced for one selection
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub labels: ChartLabels,
    /// The selected category value
    pub category: String,
    /// Rows whose category equals the selection, including rows that have
    /// no year or measure to plot
    pub matched_rows: usize,
    /// `(year, measure)` of every plottable matched row, in file order
    pub points: Vec<(f64, f64)>,
}

impl ChartSpec {
    /// One bar per year: the mean measure of that year's rows
    pub fn bars(&self) -> Vec<(f64, f64)> {
        mean_by_key(&self.points)
    }

    pub fn row_count(&self) -> usize {
        self.matched_rows
    }

    pub fn is_empty(&self) -> bool {
        self.matched_rows == 0
    }

    pub fn measures(&self) -> Vec<f64> {
        self.points.iter().map(|&(_, measure)| measure).collect()
    }

    pub fn to_svg(&self) -> Result<String> {
        bar_chart_svg(
            &self.labels,
            &self.bars(),
            (charts::SVG_WIDTH, charts::SVG_HEIGHT),
        )
    }
}

/// Selects rows by category and plots a measure against the year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityFilter {
    category_column: String,
    year_column: String,
    measure_column: String,
}

impl Default for ActivityFilter {
    fn default() -> Self {
        Self::from_columns(&ColumnNames::default())
    }
}

impl ActivityFilter {
    pub fn new(
        category_column: impl Into<String>,
        year_column: impl Into<String>,
        measure_column: impl Into<String>,
    ) -> Self {
        Self {
            category_column: category_column.into(),
            year_column: year_column.into(),
            measure_column: measure_column.into(),
        }
    }

    pub fn from_columns(columns: &ColumnNames) -> Self {
        Self::new(&columns.activity, &columns.year, &columns.bar_measure)
    }

    pub fn category_column(&self) -> &str {
        &self.category_column
    }

    /// Distinct category values in file order
    pub fn options(&self, table: &ObservationTable) -> Result<Vec<String>> {
        table.distinct_values(&self.category_column)
    }

    /// The initial selection: the first category value in file order
    pub fn default_value(&self, table: &ObservationTable) -> Result<Option<String>> {
        Ok(self.options(table)?.into_iter().next())
    }

    pub fn apply(&self, table: &ObservationTable, value: &str) -> Result<ChartSpec> {
        let rows = table.rows_matching(&self.category_column, value)?;
        let years = table.numeric(&self.year_column)?;
        let measures = table.numeric(&self.measure_column)?;

        let points: Vec<(f64, f64)> = rows
            .iter()
            .filter_map(|&row| Some((years[row]?, measures[row]?)))
            .collect();

        if rows.is_empty() {
            warn!(
                "No rows with {} = '{value}'; showing an empty chart",
                self.category_column
            );
        } else {
            debug!(
                "Selected {} row(s) with {} = '{value}' ({} plottable)",
                rows.len(),
                self.category_column,
                points.len()
            );
        }

        Ok(ChartSpec {
            labels: ChartLabels::new(
                format!("{} by year: {value}", self.measure_column),
                charts::TIMESERIES_X,
                self.measure_column.as_str(),
            ),
            category: value.to_string(),
            matched_rows: rows.len(),
            points,
        })
    }
}

/// One input component wired to one output component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub input: String,
    pub output: String,
    filter: ActivityFilter,
}

impl Binding {
    pub fn new(input: impl Into<String>, output: impl Into<String>, filter: ActivityFilter) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            filter,
        }
    }

    /// The activity dropdown bound to the activity chart
    pub fn activity(columns: &ColumnNames) -> Self {
        Self::new(
            dashboard::DROPDOWN_ID,
            dashboard::ACTIVITY_CHART_ID,
            ActivityFilter::from_columns(columns),
        )
    }

    pub fn filter(&self) -> &ActivityFilter {
        &self.filter
    }

    pub fn handles(&self, input: &str) -> bool {
        self.input == input
    }

    pub fn update(&self, table: &ObservationTable, value: &str) -> Result<ChartSpec> {
        self.filter.apply(table, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ForestError;
    use crate::dataset::Column;

    fn scenario_table() -> ObservationTable {
        ObservationTable::new(vec![
            Column::numeric("year", vec![Some(2020.0), Some(2021.0), Some(2021.0)]),
            Column::text("activity", vec![Some("A"), Some("A"), Some("B")]),
            Column::numeric("deforested_area", vec![Some(10.0), Some(20.0), Some(5.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_filter_selects_matching_rows() -> Result<()> {
        let filter = ActivityFilter::default();
        let table = scenario_table();

        let a = filter.apply(&table, "A")?;
        assert_eq!(a.row_count(), 2);
        assert_eq!(a.measures(), vec![10.0, 20.0]);
        assert_eq!(a.category, "A");

        let b = filter.apply(&table, "B")?;
        assert_eq!(b.row_count(), 1);
        assert_eq!(b.measures(), vec![5.0]);
        Ok(())
    }

    #[test]
    fn test_default_is_first_value_in_file_order() -> Result<()> {
        let table = ObservationTable::new(vec![
            Column::numeric("year", vec![Some(2020.0), Some(2021.0), Some(2022.0)]),
            Column::text("activity", vec![Some("Soy"), Some("Cattle"), Some("Soy")]),
            Column::numeric("deforested_area", vec![Some(1.0), Some(2.0), Some(3.0)]),
        ])
        .unwrap();
        let filter = ActivityFilter::default();

        assert_eq!(filter.options(&table)?, vec!["Soy", "Cattle"]);
        assert_eq!(filter.default_value(&table)?.as_deref(), Some("Soy"));
        Ok(())
    }

    #[test]
    fn test_unknown_value_yields_empty_chart() -> Result<()> {
        let spec = ActivityFilter::default().apply(&scenario_table(), "Mining")?;
        assert!(spec.is_empty());
        assert!(spec.points.is_empty());
        assert!(spec.bars().is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_table_yields_empty_chart() -> Result<()> {
        let table = ObservationTable::new(vec![
            Column::numeric("year", vec![]),
            Column::text::<String>("activity", vec![]),
            Column::numeric("deforested_area", vec![]),
        ])
        .unwrap();
        let filter = ActivityFilter::default();

        assert_eq!(filter.default_value(&table)?, None);
        assert!(filter.apply(&table, "A")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_apply_is_pure() -> Result<()> {
        let table = scenario_table();
        let before = table.clone();
        let filter = ActivityFilter::default();

        let first = filter.apply(&table, "A")?;
        let second = filter.apply(&table, "A")?;

        assert_eq!(first, second);
        assert_eq!(table, before);
        Ok(())
    }

    #[test]
    fn test_rows_without_measure_are_counted_not_plotted() -> Result<()> {
        let table = ObservationTable::new(vec![
            Column::numeric("year", vec![None, Some(2021.0)]),
            Column::text("activity", vec![Some("A"), Some("A")]),
            Column::numeric("deforested_area", vec![Some(4.0), Some(6.0)]),
        ])
        .unwrap();

        let spec = ActivityFilter::default().apply(&table, "A")?;
        assert_eq!(spec.row_count(), 2);
        assert_eq!(spec.points, vec![(2021.0, 6.0)]);
        Ok(())
    }

    #[test]
    fn test_bars_average_per_year() -> Result<()> {
        let spec = ActivityFilter::default().apply(&scenario_table(), "A")?;
        assert_eq!(spec.bars(), vec![(2020.0, 10.0), (2021.0, 20.0)]);
        Ok(())
    }

    #[test]
    fn test_numeric_category_column() -> Result<()> {
        let table = ObservationTable::new(vec![
            Column::numeric("year", vec![Some(2020.0), Some(2021.0)]),
            Column::numeric("code", vec![Some(7.0), Some(8.0)]),
            Column::numeric("deforested_area", vec![Some(1.0), Some(2.0)]),
        ])
        .unwrap();
        let filter = ActivityFilter::new("code", "year", "deforested_area");

        assert_eq!(filter.options(&table)?, vec!["7", "8"]);
        assert_eq!(filter.apply(&table, "7")?.row_count(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_measure_column() {
        let filter = ActivityFilter::new("activity", "year", "area_agropecuaria");
        let result = filter.apply(&scenario_table(), "A");
        assert!(matches!(result, Err(ForestError::ColumnNotFound(_))));
    }

    #[test]
    fn test_binding_dispatch() -> Result<()> {
        let binding = Binding::activity(&ColumnNames::default());
        assert!(binding.handles("activity-dropdown"));
        assert!(!binding.handles("year-dropdown"));
        assert_eq!(binding.output, "activity-chart");

        let spec = binding.update(&scenario_table(), "B")?;
        assert_eq!(spec.row_count(), 1);
        Ok(())
    }

    #[test]
    fn test_chart_spec_svg() -> Result<()> {
        let spec = ActivityFilter::default().apply(&scenario_table(), "A")?;
        let svg = spec.to_svg()?;
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
        Ok(())
    }
}
