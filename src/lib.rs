#![warn(missing_docs)]
//! Library support for the gfont CLI.

/// Ordered catalog sources and family resolution.
mod catalog;
/// Command-line interface wiring and dispatch.
mod cli;
/// Command implementations.
mod commands;
/// Configuration loading and validation.
mod config;
/// Common diagnostics and warning aggregation.
mod diagnostics;
/// Error handling for the crate.
mod error;
/// Bounded parallel downloads.
mod fetcher;
/// HTTP client abstraction.
mod http;
/// Install, remove and update checks for families on disk.
mod installer;
/// Typed catalog records.
mod metadata;
/// Color palette and styling for CLI output.
mod palette;
/// Path expansion and normalization utilities.
mod paths;
/// Preview rendering through external tools.
mod preview;
/// Family name resolution and search.
mod resolver;
/// Catalog backends.
mod source;
/// Cached catalog snapshot and per-family metadata.
mod store;
/// Test fixtures and a scripted HTTP client.
#[cfg(test)]
mod testutil;
/// External program invocation.
mod tools;
/// Variant and family name normalization.
mod variant;
/// Self-hosted webfont packs.
mod webfont;

pub use crate::error::{Error, Result};

/// Run the CLI, returning a structured error on failure.
pub async fn run() -> Result<()> {
    cli::run().await
}
