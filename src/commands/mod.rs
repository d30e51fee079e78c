//! CLI command implementations.

use std::{
    io::{self, IsTerminal, Write},
    path::Path,
    sync::Arc,
};

use inquire::{Confirm, error::InquireError};

use crate::{
    catalog::Catalog,
    config::Config,
    diagnostics::Diagnostics,
    error::{Error, Result},
    fetcher::{FetchReport, Fetcher, Progress},
    http::ReqwestClient,
    installer::{InstallState, StateHook},
    palette::fmt_summary,
    variant::family_from_dir_name,
};

/// Output color handling selection.
#[derive(Debug, Clone, Copy)]
pub enum ColorChoice {
    /// Colorize only when output is a TTY.
    Auto,
    /// Always colorize output.
    Always,
    /// Never colorize output.
    Never,
}

impl ColorChoice {
    /// Determine whether color output should be enabled.
    pub(crate) fn enabled(self) -> bool {
        match self {
            Self::Auto => io::stdout().is_terminal(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Everything a command needs to talk to the catalog.
pub(crate) struct Session {
    /// Loaded configuration.
    pub(crate) config: Config,
    /// Catalog sources.
    pub(crate) catalog: Catalog,
    /// Download pool with terminal progress.
    pub(crate) fetcher: Fetcher,
    /// Warning collector.
    pub(crate) diagnostics: Diagnostics,
    /// Whether output is colored.
    pub(crate) use_color: bool,
}

impl Session {
    /// Load config and build the HTTP client, catalog and fetcher.
    pub(crate) fn open(color: ColorChoice, verbose: bool) -> Result<Self> {
        let config = Config::load()?;
        let client = Arc::new(
            ReqwestClient::new(config.request_timeout)
                .map_err(|source| Error::HttpSetup { source })?,
        );
        let catalog = Catalog::google(&config, client.clone());
        let fetcher = Fetcher::new(client).with_progress(Arc::new(print_progress));

        let diagnostics = Diagnostics::new(verbose);
        diagnostics.info(format!("Fonts directory: {}", config.fonts_dir.display()));
        diagnostics.info(format!("Cache directory: {}", config.cache_dir.display()));

        Ok(Self {
            config,
            catalog,
            fetcher,
            diagnostics,
            use_color: color.enabled(),
        })
    }

    /// Print end-of-command summaries.
    pub(crate) fn finish(&self) {
        self.diagnostics.print_failed_summary();
        self.diagnostics.print_warning_summary();
    }
}

/// Print the batch summary and record failures.
pub(crate) fn report_fetch(diagnostics: &mut Diagnostics, report: &FetchReport, use_color: bool) {
    clear_progress();
    println!(
        "{}",
        fmt_summary(report.succeeded, report.failed.len(), report.cached, use_color)
    );
    diagnostics.record_failed(&report.failed);
}

/// Print `Downloading '<family>' (03/12)` and return to the line start.
fn print_progress(progress: Progress<'_>) {
    let width = progress.total.to_string().len();
    print!(
        "Downloading '{}' ({:0width$}/{})\x1b[K\r",
        progress_label(&progress.task.destination),
        progress.position,
        progress.total,
    );
    // Progress output is cosmetic; a failed flush is ignored.
    io::stdout().flush().unwrap_or_default();
}

/// Clear a pending progress line.
fn clear_progress() {
    print!("\x1b[K");
    io::stdout().flush().unwrap_or_default();
}

/// Family label for a download destination.
///
/// File stems have the form `<Family_Name>-<suffix>`; the suffix is dropped.
fn progress_label(destination: &Path) -> String {
    let stem = destination
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let family = stem.rsplit_once('-').map_or(stem.as_str(), |(family, _)| family);
    family_from_dir_name(family)
}

/// Install state observer that prints each transition in verbose mode.
pub(crate) fn state_hook(verbose: bool) -> StateHook {
    Arc::new(move |family: &str, state| {
        if verbose {
            eprintln!("{}", state_line(family, state));
        }
    })
}

/// Verbose line for a family entering `state`.
fn state_line(family: &str, state: InstallState) -> String {
    let step = match state {
        InstallState::NotInstalled => "not installed",
        InstallState::Resolving => "resolving",
        InstallState::FetchingManifest => "fetching metadata and manifest",
        InstallState::DownloadingFonts => "downloading fonts",
        InstallState::Installed => "installed",
        InstallState::Removing => "removing",
    };
    format!("'{family}': {step}")
}

/// Prompt for confirmation unless `assume_yes` is set.
pub(crate) fn confirm(message: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    match Confirm::new(message).with_default(true).prompt() {
        Ok(value) => Ok(value),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            Err(Error::PromptCanceled)
        }
        Err(error) => Err(Error::PromptFailed {
            message: error.to_string(),
        }),
    }
}

// Command modules are ordered alphabetically - maintain this order.
/// Info command implementation.
pub mod info;
/// Install command implementation.
pub mod install;
/// List command implementation.
pub mod list;
/// Preview command implementation.
pub mod preview;
/// Remove command implementation.
pub mod remove;
/// Search command implementation.
pub mod search;
/// Update command implementation.
pub mod update;
/// Webfont command implementation.
pub mod webfont;
