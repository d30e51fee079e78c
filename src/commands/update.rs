//! Implementation of the `gfont update` command.

use crate::{
    commands::{ColorChoice, Session, confirm, install::report_install, state_hook},
    error::Result,
    installer::Installer,
    palette::fmt_family_name,
};

/// Execute the update command.
///
/// Refreshes the catalog, lists installed families with upstream changes and
/// reinstalls them without the font cache.
pub async fn run(color: ColorChoice, verbose: bool, yes: bool) -> Result<()> {
    let mut session = Session::open(color, verbose)?;
    let installer = Installer::new(&session.config, &session.catalog, session.fetcher.clone())
        .with_state_hook(state_hook(verbose));
    let use_color = session.use_color;

    let updatable = installer.check_for_updates().await?;
    if updatable.is_empty() {
        println!("All installed families are up to date");
        return Ok(());
    }

    println!("Updates available:");
    for family in &updatable {
        println!("  {}", fmt_family_name(family, use_color));
    }
    if !confirm(&format!("Update {} families?", updatable.len()), yes)? {
        return Ok(());
    }

    for family in &updatable {
        println!("Updating {}", fmt_family_name(family, use_color));
        let report = installer.install(family, true).await?;
        report_install(&mut session.diagnostics, &report, use_color);
    }

    session.finish();
    Ok(())
}
