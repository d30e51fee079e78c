//! Implementation of the `gfont info` command.

use regex::Regex;

use crate::{
    commands::{ColorChoice, Session},
    error::{Error, Result},
    metadata::{FamilyMetadata, ManifestFile, license_name},
    palette::{fmt_description, fmt_heading, fmt_label},
    variant::normalize_variant,
};

/// Column width for wrapped description text.
const WRAP_WIDTH: usize = 78;

/// Manifest file holding the English description.
const DESCRIPTION_FILE: &str = "DESCRIPTION.en_us.html";

/// Execute the info command.
pub async fn run(
    color: ColorChoice,
    verbose: bool,
    family: String,
    raw: bool,
    license: bool,
) -> Result<()> {
    let mut session = Session::open(color, verbose)?;
    let (source, family) = session.catalog.resolve(&family, true).await?;
    session
        .diagnostics
        .info(format!("Resolved '{family}' in the {} catalog", source.id()));
    let metadata = source.detailed(&family).await?;

    if raw {
        let json = serde_json::to_string_pretty(&metadata).map_err(|source| {
            Error::MetadataEncode {
                family: family.clone(),
                source,
            }
        })?;
        println!("{json}");
        return Ok(());
    }

    let manifest = source.manifest(&family).await?;
    if license {
        let licenses = license_files(&manifest);
        if licenses.is_empty() {
            session
                .diagnostics
                .warn(format!("No license file is published for '{family}'"));
        }
        for file in licenses {
            println!("{}", file.contents.trim_end());
        }
        return Ok(());
    }

    let description = manifest
        .iter()
        .find(|file| file.filename == DESCRIPTION_FILE)
        .map(|file| plain_text(&file.contents))
        .transpose()?;
    print!(
        "{}",
        render_info(&metadata, description.as_deref(), session.use_color)
    );
    Ok(())
}

/// Format the info block for a detailed family record.
fn render_info(metadata: &FamilyMetadata, description: Option<&str>, use_color: bool) -> String {
    let mut lines = vec![
        fmt_heading(&metadata.family, use_color),
        "-".repeat(metadata.family.len().max(12)),
    ];
    let mut field = |name: &str, value: String| {
        lines.push(format!("{} : {value}", fmt_label(&format!("{name:<9}"), use_color)));
    };

    if let Some(version) = &metadata.version {
        field("Version", version.clone());
    }
    field("Category", metadata.category.clone());
    field("Subsets", metadata.subsets.join(", "));
    let variants: Vec<String> = metadata
        .variants
        .iter()
        .map(|variant| normalize_variant(variant, false).unwrap_or_else(|_| variant.clone()))
        .collect();
    field("Variants", variants.join(", "));

    if let Some(supplementary) = &metadata.supplementary {
        field("Designers", supplementary.designers.join(", "));
        field("License", license_name(&supplementary.license).to_string());
        if !supplementary.axes.is_empty() {
            let axes: Vec<String> = supplementary.axes.iter().map(|axis| axis.display()).collect();
            field("Axes", axes.join(" "));
        }
    }
    if let Some(modified) = &metadata.last_modified {
        field("Modified", modified.clone());
    }

    if let Some(description) = description.filter(|text| !text.is_empty()) {
        lines.push(String::new());
        lines.push(fmt_description(
            &textwrap::fill(description, WRAP_WIDTH),
            use_color,
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Manifest entries that carry license text.
fn license_files(manifest: &[ManifestFile]) -> Vec<&ManifestFile> {
    manifest
        .iter()
        .filter(|file| {
            let upper = file.filename.to_uppercase();
            upper.ends_with(".TXT")
                && ["OFL", "LICENSE", "UFL"].iter().any(|tag| upper.contains(tag))
        })
        .collect()
}

/// Strip tags and collapse whitespace in a description fragment.
fn plain_text(html: &str) -> Result<String> {
    let tags = Regex::new(r"<[^>]*>").map_err(|source| Error::InvalidPattern { source })?;
    let text = tags.replace_all(html, " ");
    Ok(text
        .replace("&amp;", "&")
        .replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{Axis, Supplementary},
        testutil::family_record,
    };

    #[test]
    fn renders_plain_info_block() {
        let mut metadata: FamilyMetadata =
            serde_json::from_value(family_record("Roboto", &["regular", "700italic"]))
                .expect("record");
        metadata.supplementary = Some(Supplementary {
            designers: vec!["Christian Robertson".to_string()],
            license: "apache2".to_string(),
            axes: vec![Axis {
                tag: "wght".to_string(),
                min: 100.0,
                max: 900.0,
            }],
        });

        let out = render_info(&metadata, Some("A neo-grotesque."), false);
        assert!(out.starts_with("Roboto\n------------\nVersion   : v1\nCategory  : "));
        assert!(out.contains("Variants  : 400, 700i"));
        assert!(out.contains("License   : Apache License, Version 2.0"));
        assert!(out.contains("Axes      : @wght=100>900"));
        assert!(out.ends_with("A neo-grotesque.\n"));
    }

    #[test]
    fn omits_missing_version() {
        let mut metadata: FamilyMetadata =
            serde_json::from_value(family_record("Lato", &["regular"])).expect("record");
        metadata.version = None;

        let out = render_info(&metadata, None, false);
        assert!(!out.contains("Version"));
        assert!(out.starts_with("Lato\n------------\nCategory  : "));
    }

    #[test]
    fn strips_description_markup() {
        let text = plain_text("<p>Open&nbsp;Sans is a <b>humanist</b>\n sans.</p>").expect("text");
        assert_eq!(text, "Open Sans is a humanist sans.");
    }

    #[test]
    fn picks_license_files() {
        let manifest = [
            ManifestFile {
                filename: "OFL.txt".to_string(),
                contents: "license".to_string(),
            },
            ManifestFile {
                filename: "DESCRIPTION.en_us.html".to_string(),
                contents: String::new(),
            },
        ];
        let found = license_files(&manifest);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].filename, "OFL.txt");
    }
}
