//! Implementation of the `gfont search` command.

use std::collections::HashSet;

use crate::{
    commands::{ColorChoice, Session},
    error::Result,
    installer::Installer,
    palette::{fmt_description, fmt_family_name},
};

/// Execute the search command.
pub async fn run(color: ColorChoice, verbose: bool, keywords: Vec<String>, exact: bool) -> Result<()> {
    let session = Session::open(color, verbose)?;
    let results = session.catalog.search(&keywords, exact).await?;

    if results.is_empty() {
        println!("No families match '{}'", keywords.join(" "));
        return Ok(());
    }

    let installer = Installer::new(&session.config, &session.catalog, session.fetcher.clone());
    let installed: HashSet<String> = installer.list_installed().await?.into_iter().collect();

    for family in &results {
        let marker = if installed.contains(family) {
            format!(" {}", fmt_description("[installed]", session.use_color))
        } else {
            String::new()
        };
        println!("{}{marker}", fmt_family_name(family, session.use_color));
    }
    session.diagnostics.info(format!("{} matching families", results.len()));
    Ok(())
}
