//! Implementation of the `gfont install` command.

use crate::{
    commands::{ColorChoice, Session, confirm, report_fetch, state_hook},
    diagnostics::Diagnostics,
    error::Result,
    installer::{InstallReport, Installer},
    palette::fmt_family_name,
    paths::display_path,
};

/// Execute the install command.
pub async fn run(
    color: ColorChoice,
    verbose: bool,
    families: Vec<String>,
    yes: bool,
    no_cache: bool,
) -> Result<()> {
    let mut session = Session::open(color, verbose)?;
    let installer = Installer::new(&session.config, &session.catalog, session.fetcher.clone())
        .with_state_hook(state_hook(verbose));

    let mut resolved = Vec::new();
    for raw in &families {
        let (source, family) = session.catalog.resolve(raw, true).await?;
        session
            .diagnostics
            .info(format!("Resolved '{raw}' to '{family}' ({})", source.id()));
        resolved.push(family);
    }
    let names: Vec<String> = resolved
        .iter()
        .map(|family| format!("'{family}'"))
        .collect();
    if !confirm(&format!("Install {}?", names.join(", ")), yes)? {
        println!("Aborted.");
        return Ok(());
    }

    for family in &resolved {
        println!("Installing {}", fmt_family_name(family, session.use_color));
        let report = installer.install(family, no_cache).await?;
        report_install(&mut session.diagnostics, &report, session.use_color);
    }

    session.finish();
    Ok(())
}

/// Print the outcome of one install.
pub(crate) fn report_install(diagnostics: &mut Diagnostics, report: &InstallReport, use_color: bool) {
    report_fetch(diagnostics, &report.fetch, use_color);
    if report.refreshed {
        diagnostics.info(format!("'{}' changed upstream; cached files ignored", report.family));
    }
    diagnostics.info(format!(
        "Wrote {} manifest file(s) to {}",
        report.manifest_files,
        display_path(&report.directory)
    ));
    if let Some(warning) = &report.font_cache_warning {
        diagnostics.warn_error(warning);
    }
}
