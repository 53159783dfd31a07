//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::constants::{charts, columns, dashboard, failure_policies, paths, report};
use crate::core::error::{ForestError, Result};

/// What to do when the report or a chart cannot be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure, attempt the remaining artifacts, still serve
    #[default]
    Continue,
    /// Abort on the first failed artifact
    FailFast,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Continue => failure_policies::CONTINUE,
            FailurePolicy::FailFast => failure_policies::FAIL_FAST,
        }
    }
}

/// Header names of the logical dataset columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub year: String,
    pub income: String,
    pub deforested_area: String,
    pub activity: String,
    /// Measure on the activity bar chart
    pub bar_measure: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            year: columns::YEAR.to_string(),
            income: columns::INCOME.to_string(),
            deforested_area: columns::DEFORESTED_AREA.to_string(),
            activity: columns::ACTIVITY.to_string(),
            bar_measure: columns::BAR_MEASURE.to_string(),
        }
    }
}

impl ColumnNames {
    /// Columns that must hold numbers
    pub fn numeric(&self) -> Vec<&str> {
        let mut names = vec![
            self.year.as_str(),
            self.income.as_str(),
            self.deforested_area.as_str(),
        ];
        if !names.contains(&self.bar_measure.as_str()) {
            names.push(self.bar_measure.as_str());
        }
        names
    }

    fn all(&self) -> [(&'static str, &str); 5] {
        [
            ("year", self.year.as_str()),
            ("income", self.income.as_str()),
            ("deforested_area", self.deforested_area.as_str()),
            ("activity", self.activity.as_str()),
            ("bar_measure", self.bar_measure.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input dataset path
    pub input_path: Option<String>,

    /// PDF report output path
    pub report_path: Option<String>,

    /// Income histogram output path
    pub distribution_chart_path: Option<String>,

    /// Deforestation time-series output path
    pub timeseries_chart_path: Option<String>,

    /// Field delimiter, a single ASCII character
    pub delimiter: Option<String>,

    /// Histogram bin count
    pub histogram_bins: Option<usize>,

    /// PNG width in pixels
    pub chart_width: Option<u32>,

    /// PNG height in pixels
    pub chart_height: Option<u32>,

    /// Dashboard bind host
    pub host: Option<String>,

    /// Dashboard bind port
    pub port: Option<u16>,

    /// Report/chart failure handling
    pub failure_policy: Option<FailurePolicy>,

    /// Development mode: logs every dashboard update
    pub debug: Option<bool>,

    /// Enable verbose logging
    pub verbose: Option<bool>,

    /// Title line of the PDF report
    pub report_title: Option<String>,

    /// Heading of the dashboard page
    pub dashboard_title: Option<String>,

    /// Dataset header names
    #[serde(default)]
    pub columns: ColumnNames,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: Some(paths::INPUT.to_string()),
            report_path: Some(paths::REPORT.to_string()),
            distribution_chart_path: Some(paths::DISTRIBUTION_CHART.to_string()),
            timeseries_chart_path: Some(paths::TIMESERIES_CHART.to_string()),
            delimiter: Some(",".to_string()),
            histogram_bins: Some(charts::DEFAULT_BINS),
            chart_width: Some(charts::DEFAULT_WIDTH),
            chart_height: Some(charts::DEFAULT_HEIGHT),
            host: Some(dashboard::DEFAULT_HOST.to_string()),
            port: Some(dashboard::DEFAULT_PORT),
            failure_policy: Some(FailurePolicy::Continue),
            debug: Some(false),
            verbose: Some(false),
            report_title: Some(report::DEFAULT_TITLE.to_string()),
            dashboard_title: Some(dashboard::DEFAULT_TITLE.to_string()),
            columns: ColumnNames::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults for absent keys
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ForestError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let parsed: Config = toml::from_str(&content).map_err(|e| {
            ForestError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::default().overlay(parsed);
        config.validate()?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations
    pub fn load_from_standard_locations() -> Self {
        if let Ok(config) = Self::load_from_file(paths::CONFIG_FILE) {
            return config;
        }

        // Parent directories (up to 3 levels)
        for i in 1..=3 {
            let path = format!("{}{}", "../".repeat(i), paths::CONFIG_FILE);
            if let Ok(config) = Self::load_from_file(&path) {
                return config;
            }
        }

        Self::default()
    }

    /// Values set in `other` replace ours
    fn overlay(mut self, other: Config) -> Self {
        fn pick<T>(base: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *base = value;
            }
        }

        pick(&mut self.input_path, other.input_path);
        pick(&mut self.report_path, other.report_path);
        pick(&mut self.distribution_chart_path, other.distribution_chart_path);
        pick(&mut self.timeseries_chart_path, other.timeseries_chart_path);
        pick(&mut self.delimiter, other.delimiter);
        pick(&mut self.histogram_bins, other.histogram_bins);
        pick(&mut self.chart_width, other.chart_width);
        pick(&mut self.chart_height, other.chart_height);
        pick(&mut self.host, other.host);
        pick(&mut self.port, other.port);
        pick(&mut self.failure_policy, other.failure_policy);
        pick(&mut self.debug, other.debug);
        pick(&mut self.verbose, other.verbose);
        pick(&mut self.report_title, other.report_title);
        pick(&mut self.dashboard_title, other.dashboard_title);
        self.columns = other.columns;
        self
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Input & output
        if let Some(ref input) = cli_config.input_path {
            self.input_path = Some(input.clone());
        }
        if let Some(ref report) = cli_config.report_path {
            self.report_path = Some(report.clone());
        }
        if let Some(ref path) = cli_config.distribution_chart_path {
            self.distribution_chart_path = Some(path.clone());
        }
        if let Some(ref path) = cli_config.timeseries_chart_path {
            self.timeseries_chart_path = Some(path.clone());
        }
        if let Some(ref delimiter) = cli_config.delimiter {
            self.delimiter = Some(delimiter.clone());
        }
        if let Some(bins) = cli_config.histogram_bins {
            self.histogram_bins = Some(bins);
        }

        // Dashboard
        if let Some(ref host) = cli_config.host {
            self.host = Some(host.clone());
        }
        if let Some(port) = cli_config.port {
            self.port = Some(port);
        }
        if cli_config.debug {
            self.debug = Some(true);
        }

        // Behavior
        if cli_config.fail_fast {
            self.failure_policy = Some(FailurePolicy::FailFast);
        }

        // Output & verbosity
        if cli_config.verbose {
            self.verbose = Some(true);
        }
    }

    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(self.input_path.as_deref().unwrap_or(paths::INPUT))
    }

    pub fn report_path(&self) -> PathBuf {
        PathBuf::from(self.report_path.as_deref().unwrap_or(paths::REPORT))
    }

    pub fn distribution_chart_path(&self) -> PathBuf {
        PathBuf::from(
            self.distribution_chart_path
                .as_deref()
                .unwrap_or(paths::DISTRIBUTION_CHART),
        )
    }

    pub fn timeseries_chart_path(&self) -> PathBuf {
        PathBuf::from(
            self.timeseries_chart_path
                .as_deref()
                .unwrap_or(paths::TIMESERIES_CHART),
        )
    }

    /// Delimiter as a byte; falls back to `,` when unset or invalid
    pub fn delimiter_byte(&self) -> u8 {
        match self.delimiter.as_deref().map(str::as_bytes) {
            Some([byte]) if byte.is_ascii() => *byte,
            _ => b',',
        }
    }

    pub fn histogram_bins(&self) -> usize {
        self.histogram_bins.unwrap_or(charts::DEFAULT_BINS)
    }

    pub fn chart_size(&self) -> (u32, u32) {
        (
            self.chart_width.unwrap_or(charts::DEFAULT_WIDTH),
            self.chart_height.unwrap_or(charts::DEFAULT_HEIGHT),
        )
    }

    /// `host:port` for the dashboard listener
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.host.as_deref().unwrap_or(dashboard::DEFAULT_HOST),
            self.port.unwrap_or(dashboard::DEFAULT_PORT)
        )
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy.unwrap_or_default()
    }

    pub fn is_debug(&self) -> bool {
        self.debug.unwrap_or(false)
    }

    pub fn report_title(&self) -> &str {
        self.report_title.as_deref().unwrap_or(report::DEFAULT_TITLE)
    }

    pub fn dashboard_title(&self) -> &str {
        self.dashboard_title
            .as_deref()
            .unwrap_or(dashboard::DEFAULT_TITLE)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(ref delimiter) = self.delimiter
            && !(delimiter.len() == 1 && delimiter.is_ascii())
        {
            return Err(ForestError::Config(format!(
                "Delimiter '{delimiter}' is invalid. Expected a single ASCII character."
            )));
        }

        if let Some(bins) = self.histogram_bins
            && !(1..=charts::MAX_BINS).contains(&bins)
        {
            return Err(ForestError::Config(format!(
                "Histogram bin count {bins} is invalid. Expected a value between 1-{}.",
                charts::MAX_BINS
            )));
        }

        for (name, value) in [("chart_width", self.chart_width), ("chart_height", self.chart_height)] {
            if let Some(pixels) = value
                && !(charts::MIN_DIMENSION..=charts::MAX_DIMENSION).contains(&pixels)
            {
                return Err(ForestError::Config(format!(
                    "{name} of {pixels}px is invalid. Expected a value between {}-{}.",
                    charts::MIN_DIMENSION,
                    charts::MAX_DIMENSION
                )));
            }
        }

        if let Some(ref host) = self.host
            && host.trim().is_empty()
        {
            return Err(ForestError::Config("Host cannot be empty.".to_string()));
        }

        for (role, header) in self.columns.all() {
            if header.trim().is_empty() {
                return Err(ForestError::Config(format!(
                    "Column name for '{role}' cannot be empty."
                )));
            }
        }

        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Input & output
    pub input_path: Option<String>,              // [INPUT]
    pub report_path: Option<String>,             // --report
    pub distribution_chart_path: Option<String>, // --distribution-chart
    pub timeseries_chart_path: Option<String>,   // --timeseries-chart
    pub delimiter: Option<String>,               // --delimiter
    pub histogram_bins: Option<usize>,           // --bins

    // Dashboard
    pub host: Option<String>, // --host
    pub port: Option<u16>,    // --port
    pub no_serve: bool,       // --no-serve
    pub debug: bool,          // --debug

    // Behavior
    pub fail_fast: bool, // --fail-fast

    // Output & verbosity
    pub quiet: bool,   // --quiet
    pub verbose: bool, // --verbose

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
