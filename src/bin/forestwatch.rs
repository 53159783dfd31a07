use clap::{CommandFactory, Parser};
use forestwatch::config::{CliConfig, Config};
use forestwatch::core::constants::display;
use forestwatch::core::{ErrorCategory, ForestError};
use forestwatch::pipeline::{Artifact, ArtifactSummary, Pipeline};
use forestwatch::reporting::logging;
use forestwatch::ui::ProgressReporter;
use forestwatch::ui::completion::print_completions;
use forestwatch::ui::{Cli, Commands, cli_to_config};

use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle completion commands first
    if let Some(exit_code) = handle_completion_commands(&cli) {
        std::process::exit(exit_code);
    }

    match run_forestwatch(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(err) = e.downcast_ref::<ForestError>()
                && err.category() == ErrorCategory::Load
            {
                eprintln!("No report or charts were written.");
            }
            std::process::exit(1);
        }
    }
}

/// Handle completion commands and return exit code if a completion command was processed
pub fn handle_completion_commands(cli: &Cli) -> Option<i32> {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut app = Cli::command();
            print_completions(shell, &mut app);
            Some(0)
        }
        None => None,
    }
}

/// Load, write the artifacts, then serve the dashboard unless told not to
pub async fn run_forestwatch(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let cli_config = cli_to_config(cli);
    let config = load_and_merge_config(&cli_config)?;

    let verbose = cli_config.verbose || config.verbose.unwrap_or(false) || config.is_debug();
    logging::init_logger(verbose, cli_config.quiet);
    logging::log_config_info(&config);

    let pipeline = Pipeline::new(config);
    let progress = ProgressReporter::new(!cli_config.quiet);

    let spinner = progress.start_stage("Loading dataset");
    let table = match pipeline.load() {
        Ok(table) => {
            progress.finish_stage(spinner, &format!("Loaded {} rows", table.len()));
            table
        }
        Err(e) => {
            progress.fail_stage(spinner, "Loading failed");
            return Err(e.into());
        }
    };

    let summary = pipeline.run_artifacts(&table, &progress);
    print_artifact_summary(&summary);
    let summary = summary.into_result()?;

    if cli_config.no_serve {
        return Ok(if summary.all_succeeded() { 0 } else { 1 });
    }

    if !summary.all_succeeded() {
        logging::log_warning(&format!(
            "Serving the dashboard although {} artifact(s) failed",
            summary.failures().count()
        ));
    }

    let state = pipeline.dashboard_state(Arc::new(table))?;
    let listener = pipeline.bind().await?;
    println!(
        "{} Dashboard running at http://{}",
        display::SERVER_EMOJI,
        listener.local_addr()?
    );
    pipeline.serve(listener, state).await?;
    Ok(0)
}

fn print_artifact_summary(summary: &ArtifactSummary) {
    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(()) if outcome.artifact == Artifact::Report => println!(
                "{} Report generated: {}",
                display::REPORT_EMOJI,
                outcome.path.display()
            ),
            Ok(()) => println!(
                "{} Chart saved: {}",
                display::CHART_EMOJI,
                outcome.path.display()
            ),
            Err(e) => eprintln!(
                "{} {} failed ({}): {e}",
                display::ERROR_EMOJI,
                outcome.artifact,
                outcome.path.display()
            ),
        }
    }
}

/// Load configuration from file and merge with CLI arguments
pub fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()
    };

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    config.validate()?;
    Ok(config)
}
