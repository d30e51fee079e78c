//! Implementation of the `gfont webfont` command.

use std::path::PathBuf;

use crate::{
    commands::{ColorChoice, Session, report_fetch},
    error::Result,
    palette::fmt_family_name,
    paths::display_path,
    webfont::{PackOptions, WebfontPacker, WebfontRequest},
};

/// Execute the webfont command.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    color: ColorChoice,
    verbose: bool,
    families: Vec<String>,
    dir: PathBuf,
    no_cache: bool,
    clean: bool,
    display: String,
    zip: bool,
) -> Result<()> {
    let requests = families
        .iter()
        .map(|arg| WebfontRequest::parse(arg))
        .collect::<Result<Vec<_>>>()?;

    let mut session = Session::open(color, verbose)?;
    let packer = WebfontPacker::new(&session.config, &session.catalog, session.fetcher.clone());
    let options = PackOptions {
        dir,
        clean,
        display,
        zip,
        bypass_cache: no_cache,
    };
    let use_color = session.use_color;

    for request in &requests {
        let report = packer.pack(request, &options).await?;
        report_fetch(&mut session.diagnostics, &report.fetch, use_color);
        println!(
            "Packed {} ({}) into {}",
            fmt_family_name(&report.family, use_color),
            report.variants.join(", "),
            display_path(&report.stylesheet)
        );
        session
            .diagnostics
            .info(format!("Font files in {}", display_path(&report.fonts_dir)));
        if let Some(archive) = &report.archive {
            println!("Archive: {}", display_path(archive));
        }
    }

    session.finish();
    Ok(())
}
