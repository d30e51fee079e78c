//! CLI parsing and command dispatch.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::{commands, error::Result};

/// Parsed command line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "gfont",
    version,
    about = "Search, install and pack Google Fonts families",
    disable_version_flag = true
)]
struct Cli {
    /// Print version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
    /// Control colored output.
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorMode,
    /// Enable verbose output.
    #[arg(long, global = true)]
    verbose: bool,
    /// Command to execute.
    #[command(subcommand)]
    command: Command,
}

/// Supported color output modes.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorMode {
    /// Only colorize when stdout is a TTY.
    Auto,
    /// Always colorize output.
    Always,
    /// Never colorize output.
    Never,
}

// Commands are ordered alphabetically - maintain this order.
/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Show information about a family.
    Info {
        /// Family name (case-insensitive, `_` for spaces).
        family: String,
        /// Print the catalog record as JSON.
        #[arg(long, conflicts_with = "license")]
        raw: bool,
        /// Print the family's license text.
        #[arg(long)]
        license: bool,
    },
    /// Install families into the fonts directory.
    Install {
        /// Family names to install.
        #[arg(required = true)]
        families: Vec<String>,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
        /// Download every file even when a fresh copy exists.
        #[arg(long)]
        no_cache: bool,
    },
    /// List installed families.
    #[command(alias = "ls")]
    List {
        /// List the whole catalog, marking installed families.
        #[arg(long)]
        all: bool,
    },
    /// Render a sample image of a family.
    Preview {
        /// Family name.
        family: String,
        /// Sample text to render.
        #[arg(long)]
        text: Option<String>,
    },
    /// Remove installed families.
    #[command(alias = "rm")]
    Remove {
        /// Family names to remove.
        #[arg(required = true)]
        families: Vec<String>,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Search the catalog; every keyword must match.
    Search {
        /// Keywords to match against family names.
        #[arg(required = true)]
        keywords: Vec<String>,
        /// Require whole-name matches instead of substrings.
        #[arg(long)]
        exact: bool,
    },
    /// Reinstall families that changed upstream.
    Update {
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Pack families as self-hosted webfonts.
    Webfont {
        /// `family[:variant,...]`, e.g. `Roboto:400,700i`.
        #[arg(required = true)]
        families: Vec<String>,
        /// Output directory.
        #[arg(long)]
        dir: PathBuf,
        /// Download every file even when a fresh copy exists.
        #[arg(long)]
        no_cache: bool,
        /// Empty the family font directory first.
        #[arg(long)]
        clean: bool,
        /// CSS `font-display` value.
        #[arg(long, default_value = "swap")]
        display: String,
        /// Also write a ZIP archive of the pack.
        #[arg(long)]
        zip: bool,
    },
}

/// Run the requested command.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let color = cli.color.into_choice();

    // Match arms are ordered alphabetically - maintain this order.
    match cli.command {
        Command::Info {
            family,
            raw,
            license,
        } => commands::info::run(color, cli.verbose, family, raw, license).await,
        Command::Install {
            families,
            yes,
            no_cache,
        } => commands::install::run(color, cli.verbose, families, yes, no_cache).await,
        Command::List { all } => commands::list::run(color, cli.verbose, all).await,
        Command::Preview { family, text } => {
            commands::preview::run(color, cli.verbose, family, text).await
        }
        Command::Remove { families, yes } => {
            commands::remove::run(color, cli.verbose, families, yes).await
        }
        Command::Search { keywords, exact } => {
            commands::search::run(color, cli.verbose, keywords, exact).await
        }
        Command::Update { yes } => commands::update::run(color, cli.verbose, yes).await,
        Command::Webfont {
            families,
            dir,
            no_cache,
            clean,
            display,
            zip,
        } => {
            commands::webfont::run(color, cli.verbose, families, dir, no_cache, clean, display, zip)
                .await
        }
    }
}

impl ColorMode {
    /// Convert a CLI color mode into a color choice.
    fn into_choice(self) -> commands::ColorChoice {
        match self {
            Self::Auto => commands::ColorChoice::Auto,
            Self::Always => commands::ColorChoice::Always,
            Self::Never => commands::ColorChoice::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_webfont_arguments() {
        let cli = Cli::try_parse_from([
            "gfont", "webfont", "Roboto:400,700i", "Lato", "--dir", "web", "--zip",
        ])
        .expect("parse");
        match cli.command {
            Command::Webfont {
                families,
                display,
                zip,
                ..
            } => {
                assert_eq!(families, vec!["Roboto:400,700i", "Lato"]);
                assert_eq!(display, "swap");
                assert!(zip);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn short_v_prints_version() {
        let error = Cli::try_parse_from(["gfont", "-v"]).expect_err("version exits");
        assert_eq!(error.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
