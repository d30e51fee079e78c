//! Implementation of the `gfont list` command.

use std::collections::HashSet;

use crate::{
    commands::{ColorChoice, Session},
    error::Result,
    installer::Installer,
    palette::{fmt_description, fmt_family_name},
};

/// Execute the list command.
///
/// Lists installed families, or the whole catalog with installed families
/// marked when `all` is set.
pub async fn run(color: ColorChoice, verbose: bool, all: bool) -> Result<()> {
    let session = Session::open(color, verbose)?;
    let installer = Installer::new(&session.config, &session.catalog, session.fetcher.clone());
    let installed = installer.list_installed().await?;
    let use_color = session.use_color;

    if !all {
        if installed.is_empty() {
            println!("No installed font families");
        }
        for family in &installed {
            println!("{}", fmt_family_name(family, use_color));
        }
        return Ok(());
    }

    let installed: HashSet<String> = installed.into_iter().collect();
    for family in session.catalog.families(false).await? {
        if installed.contains(&family) {
            println!(
                "{} {}",
                fmt_family_name(&family, use_color),
                fmt_description("[installed]", use_color)
            );
        } else {
            println!("{}", fmt_family_name(&family, use_color));
        }
    }
    Ok(())
}
