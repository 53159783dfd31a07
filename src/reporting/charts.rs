//! Chart rendering
//!
//! The drawing functions are generic over the plotters backend so the same
//! code produces the PNG files written at startup and the SVG fragments
//! served by the dashboard.

use log::{debug, warn};
use plotters::chart::MeshStyle;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters_backend::DrawingErrorKind;

use crate::config::ColumnNames;
use crate::core::constants::charts;
use crate::core::error::{ForestError, Result};
use crate::dataset::ObservationTable;
use crate::reporting::summary::sample_std;

use std::io;
use std::path::Path;

type DrawResult<DB> = std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Title and axis descriptions of a chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLabels {
    pub title: String,
    pub x: String,
    pub y: String,
}

impl ChartLabels {
    pub fn new(title: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn distribution() -> Self {
        Self::new(
            charts::DISTRIBUTION_TITLE,
            charts::DISTRIBUTION_X,
            charts::DISTRIBUTION_Y,
        )
    }

    pub fn timeseries() -> Self {
        Self::new(
            charts::TIMESERIES_TITLE,
            charts::TIMESERIES_X,
            charts::TIMESERIES_Y,
        )
    }
}

/// Equal-width histogram. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning their range. A
    /// constant sample is centred in a unit-wide range. Non-finite values
    /// are not counted.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let (mut low, mut high) = bounds(values.iter().copied());

        if values.is_empty() {
            return Self {
                edges: vec![0.0, 1.0],
                counts: Vec::new(),
            };
        }
        if low == high {
            low -= 0.5;
            high += 0.5;
        }

        let width = (high - low) / bins as f64;
        let edges = (0..=bins).map(|i| low + width * i as f64).collect();
        let mut counts = vec![0; bins];
        for value in values {
            // The last bin includes its upper edge
            let index = (((value - low) / width) as usize).min(bins - 1);
            counts[index] += 1;
        }

        Self { edges, counts }
    }

    pub fn start(&self) -> f64 {
        self.edges.first().copied().unwrap_or(0.0)
    }

    pub fn end(&self) -> f64 {
        self.edges.last().copied().unwrap_or(1.0)
    }

    pub fn bin_width(&self) -> f64 {
        match self.counts.len() {
            0 => 0.0,
            n => (self.end() - self.start()) / n as f64,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(lower edge, upper edge, count)` per bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }

    /// Kernel density of `values` sampled across the histogram range and
    /// scaled so the curve is comparable with the bar heights
    pub fn density_curve(&self, values: &[f64]) -> Vec<(f64, f64)> {
        let Some(bandwidth) = scott_bandwidth(values) else {
            return Vec::new();
        };

        let scale = values.len() as f64 * self.bin_width();
        let step = (self.end() - self.start()) / (charts::KDE_GRID_POINTS - 1) as f64;
        (0..charts::KDE_GRID_POINTS)
            .map(|i| {
                let x = self.start() + step * i as f64;
                (x, gaussian_kde(values, bandwidth, x) * scale)
            })
            .collect()
    }
}

/// Scott's rule: sample standard deviation times `n^(-1/5)`. `None` for
/// fewer than two values or a constant sample.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let std = sample_std(values)?;
    if std <= 0.0 || !std.is_finite() {
        return None;
    }
    Some(std * (values.len() as f64).powf(-0.2))
}

/// Gaussian kernel density estimate at `x`
pub fn gaussian_kde(values: &[f64], bandwidth: f64, x: f64) -> f64 {
    if values.is_empty() || bandwidth <= 0.0 {
        return 0.0;
    }
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    values
        .iter()
        .map(|v| {
            let z = (x - v) / bandwidth;
            (-0.5 * z * z).exp()
        })
        .sum::<f64>()
        * norm
}

/// Mean of `value` per distinct `key`, sorted by key
pub fn mean_by_key(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut means: Vec<(f64, f64)> = Vec::new();
    let mut run: Option<(f64, f64, usize)> = None;
    for (key, value) in sorted {
        run = match run {
            Some((current, sum, count)) if current == key => Some((current, sum + value, count + 1)),
            Some((current, sum, count)) => {
                means.push((current, sum / count as f64));
                Some((key, value, 1))
            }
            None => Some((key, value, 1)),
        };
    }
    if let Some((key, sum, count)) = run {
        means.push((key, sum / count as f64));
    }
    means
}

/// `(x, y)` pairs of two numeric columns, skipping rows where either is
/// missing or not finite
pub fn paired_values(xs: &[Option<f64>], ys: &[Option<f64>]) -> Vec<(f64, f64)> {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

fn padded_range(low: f64, high: f64, include_zero: bool) -> std::ops::Range<f64> {
    let (mut low, mut high) = if low.is_finite() && high.is_finite() {
        (low, high)
    } else {
        (0.0, 1.0)
    };
    if include_zero {
        low = low.min(0.0);
        high = high.max(0.0);
    }
    if low == high {
        return (low - 1.0)..(high + 1.0);
    }
    let pad = (high - low) * 0.05;
    let low = if include_zero && low == 0.0 { 0.0 } else { low - pad };
    low..(high + pad)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn year_label(value: &f64) -> String {
    format!("{value:.0}")
}

/// Draws without any text when `labels` is `None`
pub fn draw_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: Option<&ChartLabels>,
    histogram: &Histogram,
    density: &[(f64, f64)],
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let tallest = histogram.counts.iter().copied().max().unwrap_or(0) as f64;
    let (_, peak) = bounds(density.iter().map(|p| p.1));
    let y_range = padded_range(0.0, tallest.max(peak), true);

    let mut chart = chart_builder(root, labels, 24)
        .build_cartesian_2d(histogram.start()..histogram.end(), y_range)?;

    let mut mesh = chart.configure_mesh();
    describe_axes(&mut mesh, labels);
    mesh.draw()?;

    chart.draw_series(histogram.bins().map(|(low, high, count)| {
        Rectangle::new([(low, 0.0), (high, count as f64)], BLUE.mix(0.6).filled())
    }))?;

    if !density.is_empty() {
        chart.draw_series(LineSeries::new(
            density.iter().copied(),
            ShapeStyle::from(&RED).stroke_width(2),
        ))?;
    }

    root.present()
}

pub fn draw_line_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: Option<&ChartLabels>,
    points: &[(f64, f64)],
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let (x_low, x_high) = bounds(points.iter().map(|p| p.0));
    let (y_low, y_high) = bounds(points.iter().map(|p| p.1));

    let mut chart = chart_builder(root, labels, 24).build_cartesian_2d(
        padded_range(x_low, x_high, false),
        padded_range(y_low, y_high, true),
    )?;

    let mut mesh = chart.configure_mesh();
    describe_axes(&mut mesh, labels);
    mesh.x_label_formatter(&year_label).draw()?;

    chart.draw_series(LineSeries::new(
        points.iter().copied(),
        ShapeStyle::from(&BLUE).stroke_width(2),
    ))?;
    chart.draw_series(
        points
            .iter()
            .map(|&point| Circle::new(point, 4, BLUE.filled())),
    )?;

    root.present()
}

/// One bar per `(year, value)`
pub fn draw_bar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    labels: Option<&ChartLabels>,
    bars: &[(f64, f64)],
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let (x_low, x_high) = bounds(bars.iter().map(|b| b.0));
    let (y_low, y_high) = bounds(bars.iter().map(|b| b.1));
    let x_range = if bars.is_empty() {
        0.0..1.0
    } else {
        (x_low - 0.5)..(x_high + 0.5)
    };

    let mut chart = chart_builder(root, labels, 20)
        .build_cartesian_2d(x_range, padded_range(y_low, y_high, true))?;

    let mut mesh = chart.configure_mesh();
    describe_axes(&mut mesh, labels);
    mesh.x_label_formatter(&year_label).draw()?;

    chart.draw_series(bars.iter().map(|&(year, value)| {
        Rectangle::new([(year - 0.4, 0.0), (year + 0.4, value)], BLUE.mix(0.7).filled())
    }))?;

    root.present()
}

fn chart_builder<'a, 'b, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    labels: Option<&ChartLabels>,
    title_size: u32,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(root);
    builder.margin(10);
    if let Some(labels) = labels {
        builder
            .caption(labels.title.as_str(), ("sans-serif", title_size))
            .x_label_area_size(40)
            .y_label_area_size(60);
    }
    builder
}

// Tick labels are only drawn into label areas, so an unlabelled chart has
// no text at all
fn describe_axes<DB: DrawingBackend>(
    mesh: &mut MeshStyle<'_, '_, RangedCoordf64, RangedCoordf64, DB>,
    labels: Option<&ChartLabels>,
) {
    if let Some(labels) = labels {
        mesh.x_desc(labels.x.as_str()).y_desc(labels.y.as_str());
    }
}

fn render_error<E: std::fmt::Display>(err: E) -> ForestError {
    ForestError::Render(err.to_string())
}

/// Runs `draw` with labels, then once more without any text if no font
/// could be loaded for them
fn draw_labelled<DB, F>(root: &DrawingArea<DB, Shift>, labels: &ChartLabels, draw: F) -> Result<()>
where
    DB: DrawingBackend,
    F: Fn(&DrawingArea<DB, Shift>, Option<&ChartLabels>) -> DrawResult<DB>,
{
    match draw(root, Some(labels)) {
        Err(DrawingAreaErrorKind::BackendError(DrawingErrorKind::FontError(err))) => {
            warn!("No usable font for '{}' ({err}), drawing it without text", labels.title);
            draw(root, None).map_err(render_error)
        }
        result => result.map_err(render_error),
    }
}

pub fn line_chart_svg(labels: &ChartLabels, points: &[(f64, f64)], size: (u32, u32)) -> Result<String> {
    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        draw_labelled(&root, labels, |root, labels| draw_line_chart(root, labels, points))?;
    }
    Ok(buffer)
}

pub fn bar_chart_svg(labels: &ChartLabels, bars: &[(f64, f64)], size: (u32, u32)) -> Result<String> {
    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        draw_labelled(&root, labels, |root, labels| draw_bar_chart(root, labels, bars))?;
    }
    Ok(buffer)
}

/// Writes the income distribution and yearly deforestation PNG files
#[derive(Debug, Clone)]
pub struct StaticChartExporter {
    width: u32,
    height: u32,
    bins: usize,
    columns: ColumnNames,
}

impl Default for StaticChartExporter {
    fn default() -> Self {
        Self {
            width: charts::DEFAULT_WIDTH,
            height: charts::DEFAULT_HEIGHT,
            bins: charts::DEFAULT_BINS,
            columns: ColumnNames::default(),
        }
    }
}

impl StaticChartExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    /// Non-missing, finite income values
    pub fn income_values(&self, table: &ObservationTable) -> Result<Vec<f64>> {
        Ok(table
            .numeric(&self.columns.income)?
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .collect())
    }

    /// Mean deforested area per year, sorted by year
    pub fn yearly_series(&self, table: &ObservationTable) -> Result<Vec<(f64, f64)>> {
        let years = table.numeric(&self.columns.year)?;
        let areas = table.numeric(&self.columns.deforested_area)?;
        Ok(mean_by_key(&paired_values(years, areas)))
    }

    pub fn export_distribution(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        let values = self.income_values(table)?;
        let histogram = Histogram::from_values(&values, self.bins);
        let density = histogram.density_curve(&values);

        ensure_parent_exists(path)?;
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        draw_labelled(&root, &ChartLabels::distribution(), |root, labels| {
            draw_histogram(root, labels, &histogram, &density)
        })?;

        debug!(
            "Wrote distribution chart ({} values, {} bins) to {}",
            values.len(),
            self.bins,
            path.display()
        );
        Ok(())
    }

    pub fn export_timeseries(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        let points = self.yearly_series(table)?;

        ensure_parent_exists(path)?;
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        draw_labelled(&root, &ChartLabels::timeseries(), |root, labels| {
            draw_line_chart(root, labels, &points)
        })?;

        debug!(
            "Wrote time series chart ({} years) to {}",
            points.len(),
            path.display()
        );
        Ok(())
    }

    /// The time series as an SVG fragment for the dashboard
    pub fn timeseries_svg(&self, table: &ObservationTable) -> Result<String> {
        let points = self.yearly_series(table)?;
        line_chart_svg(
            &ChartLabels::timeseries(),
            &points,
            (charts::SVG_WIDTH, charts::SVG_HEIGHT),
        )
    }
}

// The bitmap backend only reports write failures when presenting
fn ensure_parent_exists(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(ForestError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory does not exist: {}", parent.display()),
            )))
        }
        _ => Ok(()),
    }
}
