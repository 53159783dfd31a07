use crate::config::Config;
use crate::dataset::ObservationTable;
use log::{debug, error, info, warn};
use std::path::Path;

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    debug!("Logger initialized with level: {level:?}");
}

/// Log configuration information
pub fn log_config_info(config: &Config) {
    let (width, height) = config.chart_size();

    info!(
        "Input: {} (delimiter '{}')",
        config.input_path().display(),
        config.delimiter_byte() as char
    );
    info!(
        "Outputs: report={}, distribution={}, timeseries={}",
        config.report_path().display(),
        config.distribution_chart_path().display(),
        config.timeseries_chart_path().display()
    );
    info!(
        "Charts: bins={}, size={width}x{height}",
        config.histogram_bins()
    );
    info!(
        "Dashboard: address={}, debug={}, failure_policy={}",
        config.bind_address(),
        config.is_debug(),
        config.failure_policy().as_str()
    );
    debug!(
        "Columns: year={}, income={}, deforested_area={}, activity={}, bar_measure={}",
        config.columns.year,
        config.columns.income,
        config.columns.deforested_area,
        config.columns.activity,
        config.columns.bar_measure
    );
}

/// Log the shape of a loaded dataset and any cells forward-fill could not fill
pub fn log_dataset_info(path: &Path, table: &ObservationTable) {
    info!(
        "Dataset {}: {} rows, columns [{}]",
        path.display(),
        table.len(),
        table.column_names().join(", ")
    );

    let missing = table.missing_cells();
    if !missing.is_empty() {
        warn!(
            "{} leading cell(s) have no earlier value to fill from",
            missing.len()
        );
        for (column, row) in &missing {
            debug!("  missing: column '{column}', row {row}");
        }
    }
}

/// Log completion of a pipeline stage
pub fn log_stage_complete(stage: &str, output: Option<&Path>, duration_ms: u128) {
    match output {
        Some(path) => info!("✅ {stage} complete: {} ({duration_ms}ms)", path.display()),
        None => info!("✅ {stage} complete ({duration_ms}ms)"),
    }
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

/// Log warning information
pub fn log_warning(message: &str) {
    warn!("{message}");
}
