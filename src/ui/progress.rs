use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinners shown on stderr while pipeline stages run
pub struct ProgressReporter {
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start a spinner for an indeterminate stage
    pub fn start_stage(&self, message: &str) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    pub fn finish_stage(&self, spinner: Option<ProgressBar>, message: &str) {
        if let Some(pb) = spinner {
            pb.finish_with_message(format!("✓ {message}"));
        }
    }

    pub fn fail_stage(&self, spinner: Option<ProgressBar>, message: &str) {
        if let Some(pb) = spinner {
            pb.abandon_with_message(format!("✗ {message}"));
        }
    }
}
