//! Implementation of the `gfont remove` command.

use crate::{
    commands::{ColorChoice, Session, confirm, state_hook},
    error::Result,
    installer::Installer,
    palette::fmt_family_name,
};

/// Execute the remove command.
pub async fn run(color: ColorChoice, verbose: bool, families: Vec<String>, yes: bool) -> Result<()> {
    let mut session = Session::open(color, verbose)?;
    let installer = Installer::new(&session.config, &session.catalog, session.fetcher.clone())
        .with_state_hook(state_hook(verbose));
    let use_color = session.use_color;

    for raw in &families {
        let (_, family) = session.catalog.resolve(raw, true).await?;
        if !installer.family_dir(&family).is_dir() {
            println!("{} is not installed", fmt_family_name(&family, use_color));
            continue;
        }
        if !confirm(&format!("Remove '{family}'?"), yes)? {
            continue;
        }

        let report = installer.remove(&family).await?;
        if report.removed {
            println!("Removed {}", fmt_family_name(&report.family, use_color));
        }
        if let Some(warning) = &report.font_cache_warning {
            session.diagnostics.warn_error(warning);
        }
    }

    session.finish();
    Ok(())
}
