//! The run sequence: load, report, charts, serve
//!
//! Each stage is callable on its own and returns a `Result`. Loading is
//! always fatal. Artifact failures are handled by the configured
//! [`FailurePolicy`].

use log::debug;

use crate::config::{Config, FailurePolicy};
use crate::core::error::Result;
use crate::dashboard::DashboardState;
use crate::dashboard::server;
use crate::dataset::{CsvLoader, LoadDataset, ObservationTable};
use crate::reporting::charts::StaticChartExporter;
use crate::reporting::logging::{log_dataset_info, log_error, log_stage_complete};
use crate::reporting::pdf::ReportGenerator;
use crate::ui::progress::ProgressReporter;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Files written before the dashboard starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Report,
    DistributionChart,
    TimeseriesChart,
}

impl Artifact {
    pub const ALL: [Artifact; 3] = [
        Artifact::Report,
        Artifact::DistributionChart,
        Artifact::TimeseriesChart,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Artifact::Report => "Report",
            Artifact::DistributionChart => "Distribution chart",
            Artifact::TimeseriesChart => "Time series chart",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
pub struct ArtifactOutcome {
    pub artifact: Artifact,
    pub path: PathBuf,
    pub result: Result<()>,
}

/// What the artifact stages produced
#[derive(Debug, Default)]
pub struct ArtifactSummary {
    pub outcomes: Vec<ArtifactOutcome>,
    /// Set when [`FailurePolicy::FailFast`] skipped the remaining artifacts
    pub stopped_early: bool,
}

impl ArtifactSummary {
    /// The error that stopped the run, if any. Outcomes written before the
    /// failure are only reported by the summary itself.
    pub fn into_result(self) -> Result<Self> {
        if !self.stopped_early {
            return Ok(self);
        }
        match self.outcomes.into_iter().find_map(|o| o.result.err()) {
            Some(e) => Err(e),
            None => Ok(Self::default()),
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn written(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A loader that requires every mapped column
    pub fn loader(&self) -> CsvLoader {
        let columns = &self.config.columns;
        CsvLoader::new()
            .with_delimiter(self.config.delimiter_byte())
            .require_columns([columns.activity.as_str()])
            .require_numeric(columns.numeric())
    }

    pub fn load(&self) -> Result<ObservationTable> {
        let started = Instant::now();
        let path = self.config.input_path();
        let table = self.loader().load(&path)?;
        log_dataset_info(&path, &table);
        log_stage_complete("Load", None, started.elapsed().as_millis());
        Ok(table)
    }

    pub fn report(&self, table: &ObservationTable) -> Result<PathBuf> {
        let path = self.config.report_path();
        ReportGenerator::new(self.config.report_title()).write(table, &path)?;
        Ok(path)
    }

    fn chart_exporter(&self) -> StaticChartExporter {
        let (width, height) = self.config.chart_size();
        StaticChartExporter::new()
            .with_size(width, height)
            .with_bins(self.config.histogram_bins())
            .with_columns(self.config.columns.clone())
    }

    pub fn distribution_chart(&self, table: &ObservationTable) -> Result<PathBuf> {
        let path = self.config.distribution_chart_path();
        self.chart_exporter().export_distribution(table, &path)?;
        Ok(path)
    }

    pub fn timeseries_chart(&self, table: &ObservationTable) -> Result<PathBuf> {
        let path = self.config.timeseries_chart_path();
        self.chart_exporter().export_timeseries(table, &path)?;
        Ok(path)
    }

    fn artifact_path(&self, artifact: Artifact) -> PathBuf {
        match artifact {
            Artifact::Report => self.config.report_path(),
            Artifact::DistributionChart => self.config.distribution_chart_path(),
            Artifact::TimeseriesChart => self.config.timeseries_chart_path(),
        }
    }

    fn write_artifact(&self, artifact: Artifact, table: &ObservationTable) -> Result<PathBuf> {
        match artifact {
            Artifact::Report => self.report(table),
            Artifact::DistributionChart => self.distribution_chart(table),
            Artifact::TimeseriesChart => self.timeseries_chart(table),
        }
    }

    /// Write the report and both charts.
    ///
    /// Under [`FailurePolicy::FailFast`] the run stops at the first failure
    /// and the summary is marked `stopped_early`. Under
    /// [`FailurePolicy::Continue`] every artifact is attempted. Failures are
    /// recorded in the summary either way.
    pub fn run_artifacts(
        &self,
        table: &ObservationTable,
        progress: &ProgressReporter,
    ) -> ArtifactSummary {
        let policy = self.config.failure_policy();
        let mut summary = ArtifactSummary::default();

        for artifact in Artifact::ALL {
            let path = self.artifact_path(artifact);
            let spinner = progress.start_stage(&format!("Writing {}", path.display()));
            let started = Instant::now();

            let result = match self.write_artifact(artifact, table) {
                Ok(_) => {
                    progress.finish_stage(spinner, &format!("{artifact} written"));
                    log_stage_complete(artifact.name(), Some(&path), started.elapsed().as_millis());
                    Ok(())
                }
                Err(e) => {
                    progress.fail_stage(spinner, &format!("{artifact} failed"));
                    log_error(&format!("{artifact} failed ({})", path.display()), Some(&e));
                    Err(e)
                }
            };
            let failed = result.is_err();
            summary.outcomes.push(ArtifactOutcome {
                artifact,
                path,
                result,
            });

            if failed && policy == FailurePolicy::FailFast {
                summary.stopped_early = true;
                break;
            }
        }

        debug!(
            "Artifacts: {} written, {} failed",
            summary.written().count(),
            summary.failures().count()
        );
        summary
    }

    pub fn dashboard_state(&self, table: Arc<ObservationTable>) -> Result<DashboardState> {
        DashboardState::new(table, &self.config)
    }

    pub async fn bind(&self) -> Result<tokio::net::TcpListener> {
        server::bind(&self.config.bind_address()).await
    }

    /// Serve the dashboard until the process is killed
    pub async fn serve(&self, listener: tokio::net::TcpListener, state: DashboardState) -> Result<()> {
        server::serve(listener, Arc::new(state)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ErrorCategory, ForestError};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const DATA: &str = "year,income,deforested_area,activity\n\
                        2020,1000,10,A\n\
                        2021,,20,A\n\
                        2021,1500,5,B\n";

    fn config_in(dir: &Path, data: &str) -> Config {
        let input = dir.join("data.csv");
        fs::write(&input, data).unwrap();
        Config {
            input_path: Some(input.display().to_string()),
            report_path: Some(dir.join("report.pdf").display().to_string()),
            distribution_chart_path: Some(dir.join("income.png").display().to_string()),
            timeseries_chart_path: Some(dir.join("years.png").display().to_string()),
            chart_width: Some(300),
            chart_height: Some(200),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_fills_and_validates() -> Result<()> {
        let dir = TempDir::new()?;
        let pipeline = Pipeline::new(config_in(dir.path(), DATA));

        let table = pipeline.load()?;
        assert_eq!(table.len(), 3);
        assert_eq!(table.numeric("income")?[1], Some(1000.0));
        Ok(())
    }

    #[test]
    fn test_run_artifacts_writes_everything() -> Result<()> {
        let dir = TempDir::new()?;
        let pipeline = Pipeline::new(config_in(dir.path(), DATA));
        let table = pipeline.load()?;

        let summary = pipeline.run_artifacts(&table, &ProgressReporter::disabled());

        assert!(summary.all_succeeded());
        assert!(!summary.stopped_early);
        assert_eq!(summary.written().count(), 3);
        assert!(dir.path().join("report.pdf").exists());
        assert!(dir.path().join("income.png").exists());
        assert!(dir.path().join("years.png").exists());
        Ok(())
    }

    #[test]
    fn test_missing_income_fails_before_writing() -> Result<()> {
        let dir = TempDir::new()?;
        let pipeline = Pipeline::new(config_in(
            dir.path(),
            "year,deforested_area,activity\n2020,10,A\n",
        ));

        let error = pipeline.load().unwrap_err();
        assert!(matches!(&error, ForestError::ColumnNotFound(name) if name == "income"));
        assert_eq!(error.category(), ErrorCategory::Load);
        assert!(!dir.path().join("income.png").exists());
        assert!(!dir.path().join("report.pdf").exists());
        Ok(())
    }

    #[test]
    fn test_continue_policy_attempts_remaining_artifacts() -> Result<()> {
        let dir = TempDir::new()?;
        let mut config = config_in(dir.path(), DATA);
        config.report_path = Some(dir.path().join("missing/report.pdf").display().to_string());
        let pipeline = Pipeline::new(config);
        let table = pipeline.load()?;

        let summary = pipeline.run_artifacts(&table, &ProgressReporter::disabled());

        assert!(!summary.all_succeeded());
        assert!(!summary.stopped_early);
        let failed: Vec<Artifact> = summary.failures().map(|o| o.artifact).collect();
        assert_eq!(failed, vec![Artifact::Report]);
        assert!(dir.path().join("income.png").exists());
        assert!(dir.path().join("years.png").exists());
        Ok(())
    }

    #[test]
    fn test_fail_fast_policy_stops_at_first_failure() -> Result<()> {
        let dir = TempDir::new()?;
        let mut config = config_in(dir.path(), DATA);
        config.report_path = Some(dir.path().join("missing/report.pdf").display().to_string());
        config.failure_policy = Some(FailurePolicy::FailFast);
        let pipeline = Pipeline::new(config);
        let table = pipeline.load()?;

        let summary = pipeline.run_artifacts(&table, &ProgressReporter::disabled());

        assert!(summary.stopped_early);
        assert_eq!(summary.outcomes.len(), 1);
        assert!(matches!(summary.into_result(), Err(ForestError::Io(_))));
        assert!(!dir.path().join("income.png").exists());
        Ok(())
    }

    #[test]
    fn test_fail_fast_keeps_artifacts_written_before_failure() -> Result<()> {
        let dir = TempDir::new()?;
        let mut config = config_in(dir.path(), DATA);
        config.timeseries_chart_path = Some(dir.path().join("missing/years.png").display().to_string());
        config.failure_policy = Some(FailurePolicy::FailFast);
        let pipeline = Pipeline::new(config);
        let table = pipeline.load()?;

        let summary = pipeline.run_artifacts(&table, &ProgressReporter::disabled());

        assert!(summary.stopped_early);
        let written: Vec<Artifact> = summary.written().map(|o| o.artifact).collect();
        assert_eq!(written, vec![Artifact::Report, Artifact::DistributionChart]);
        let failed: Vec<Artifact> = summary.failures().map(|o| o.artifact).collect();
        assert_eq!(failed, vec![Artifact::TimeseriesChart]);
        assert!(summary.into_result().is_err());
        Ok(())
    }

    #[test]
    fn test_into_result_keeps_continue_summary() -> Result<()> {
        let dir = TempDir::new()?;
        let mut config = config_in(dir.path(), DATA);
        config.report_path = Some(dir.path().join("missing/report.pdf").display().to_string());
        let pipeline = Pipeline::new(config);
        let table = pipeline.load()?;

        let summary = pipeline
            .run_artifacts(&table, &ProgressReporter::disabled())
            .into_result()?;
        assert_eq!(summary.failures().count(), 1);
        Ok(())
    }

    #[test]
    fn test_custom_column_names() -> Result<()> {
        let dir = TempDir::new()?;
        let mut config = config_in(
            dir.path(),
            "ano;renda;desmatamento;atividade\n2020;1000;10;Soja\n2021;1200;12;Gado\n",
        );
        config.delimiter = Some(";".to_string());
        config.columns.year = "ano".to_string();
        config.columns.income = "renda".to_string();
        config.columns.deforested_area = "desmatamento".to_string();
        config.columns.activity = "atividade".to_string();
        config.columns.bar_measure = "desmatamento".to_string();
        let pipeline = Pipeline::new(config);

        let table = pipeline.load()?;
        let summary = pipeline.run_artifacts(&table, &ProgressReporter::disabled());
        assert!(summary.all_succeeded());

        let state = pipeline.dashboard_state(Arc::new(table))?;
        assert_eq!(state.default_value(), Some("Soja"));
        Ok(())
    }

    #[test]
    fn test_artifact_names() {
        assert_eq!(Artifact::Report.to_string(), "Report");
        assert_eq!(Artifact::ALL.len(), 3);
    }
}
