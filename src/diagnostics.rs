//! Warning aggregation and diagnostic summaries.

use std::path::{Path, PathBuf};

use crate::{error::Error, fetcher::FailedTask, paths::display_path};

/// Details about a font file that could not be downloaded.
#[derive(Debug, Clone)]
pub struct FailedDownload {
    /// Destination the file was meant for.
    pub(crate) path: PathBuf,
    /// Reason the download failed.
    pub(crate) reason: String,
}

/// Aggregates warnings and failed downloads for a command run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    /// Print verbose-only messages.
    verbose: bool,
    /// Collected warning messages.
    warnings: Vec<String>,
    /// Collected failed download records.
    failed: Vec<FailedDownload>,
}

impl Diagnostics {
    /// Create a new diagnostics collector.
    pub(crate) fn new(verbose: bool) -> Self {
        Self {
            verbose,
            warnings: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Record a warning and print it immediately.
    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        eprintln!("Warning: {message}");
        self.warnings.push(message);
    }

    /// Record an error that does not stop the command.
    pub(crate) fn warn_error(&mut self, error: &Error) {
        self.warn(error.to_string());
    }

    /// Print a message only in verbose mode.
    pub(crate) fn info(&self, message: impl Into<String>) {
        if self.verbose {
            eprintln!("{}", message.into());
        }
    }

    /// Record failed downloads without printing them.
    pub(crate) fn record_failed(&mut self, failed: &[FailedTask]) {
        self.failed.extend(failed.iter().map(|task| FailedDownload {
            path: task.task.destination.clone(),
            reason: task.error.to_string(),
        }));
    }

    /// Print a summary for failed downloads if any were recorded.
    pub(crate) fn print_failed_summary(&self) {
        if self.failed.is_empty() {
            return;
        }

        eprintln!("Failed to download {} file(s):", self.failed.len());
        for failed in &self.failed {
            eprintln!("  - {}: {}", display_failed(&failed.path), failed.reason);
        }
    }

    /// Print a warning summary when warnings were emitted.
    pub(crate) fn print_warning_summary(&self) {
        if self.warnings.is_empty() {
            return;
        }

        eprintln!("Completed with {} warning(s).", self.warnings.len());
    }
}

/// Short form of a failed destination path.
fn display_failed(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| display_path(path))
}
