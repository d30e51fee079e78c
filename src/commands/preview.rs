//! Implementation of the `gfont preview` command.

use crate::{
    commands::{ColorChoice, Session},
    error::Result,
    palette::fmt_family_name,
    paths::display_path,
    preview::Previewer,
};

/// Execute the preview command.
pub async fn run(color: ColorChoice, verbose: bool, family: String, text: Option<String>) -> Result<()> {
    let mut session = Session::open(color, verbose)?;
    let previewer = Previewer::new(&session.config, &session.catalog, session.fetcher.clone());

    let report = previewer.preview(&family, text.as_deref()).await?;
    session.diagnostics.info(format!(
        "Previewing {} {} from {}",
        fmt_family_name(&report.family, session.use_color),
        report.variant,
        display_path(&report.font)
    ));
    for warning in &report.warnings {
        session.diagnostics.warn_error(warning);
    }
    if let Some(image) = &report.image {
        session
            .diagnostics
            .info(format!("Rendered {}", display_path(image)));
    }

    session.finish();
    Ok(())
}
