// Command-line interface definitions and parsing for forestwatch

use crate::config::CliConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Dataset to load (default: socioeconomic_data.csv)
    pub input: Option<String>,

    // Input & Output
    /// PDF report path (default: socioeconomic_report.pdf)
    #[arg(long, value_name = "PATH", help_heading = "Input & Output")]
    pub report: Option<String>,

    /// Income histogram path (default: income_distribution.png)
    #[arg(long, value_name = "PATH", help_heading = "Input & Output")]
    pub distribution_chart: Option<String>,

    /// Deforestation time series path (default: deforestation_by_year.png)
    #[arg(long, value_name = "PATH", help_heading = "Input & Output")]
    pub timeseries_chart: Option<String>,

    /// Field delimiter of the dataset (default: ,)
    #[arg(long, value_name = "CHAR", help_heading = "Input & Output")]
    pub delimiter: Option<String>,

    /// Histogram bins (default: 30)
    #[arg(long, value_name = "COUNT", help_heading = "Input & Output")]
    pub bins: Option<usize>,

    // Dashboard
    /// Address to bind (default: 127.0.0.1)
    #[arg(long, value_name = "HOST", help_heading = "Dashboard")]
    pub host: Option<String>,

    /// Port to bind (default: 8050)
    #[arg(long, value_name = "PORT", help_heading = "Dashboard")]
    pub port: Option<u16>,

    /// Write the report and charts, then exit without serving
    #[arg(long, help_heading = "Dashboard")]
    pub no_serve: bool,

    /// Log every dashboard update
    #[arg(long, help_heading = "Dashboard")]
    pub debug: bool,

    // Behavior
    /// Stop at the first report or chart that fails
    #[arg(long, help_heading = "Behavior")]
    pub fail_fast: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, help_heading = "Configuration")]
    pub no_config: bool,

    // Output & Verbosity
    /// Suppress progress output
    #[arg(short = 'q', long, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, help_heading = "Output & Verbosity")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    #[command(arg_required_else_help = true)]
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Convert derive-based CLI arguments directly to CliConfig structure
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    CliConfig {
        input_path: cli.input.clone(),
        report_path: cli.report.clone(),
        distribution_chart_path: cli.distribution_chart.clone(),
        timeseries_chart_path: cli.timeseries_chart.clone(),
        delimiter: cli.delimiter.clone(),
        histogram_bins: cli.bins,
        host: cli.host.clone(),
        port: cli.port,
        no_serve: cli.no_serve,
        debug: cli.debug,
        fail_fast: cli.fail_fast,
        quiet: cli.quiet,
        verbose: cli.verbose,
        config_file: cli.config.clone(),
        no_config: cli.no_config,
    }
}
