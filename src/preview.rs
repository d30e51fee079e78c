//! Rendering a sample image of a family with external tools.

use std::path::PathBuf;

use crate::{
    catalog::Catalog,
    config::Config,
    error::{Error, Result},
    fetcher::{DownloadTask, FetchOptions, Fetcher},
    installer::url_extension,
    tools::run_tool,
    variant::{family_dir_name, normalize_variant},
};

/// Subdirectory of the cache holding preview fonts and images.
const PREVIEWS_DIR: &str = "previews";

/// Sample text used when none is given.
const DEFAULT_TEXT: &str = "The quick brown fox jumps over the lazy dog";

/// Outcome of a preview.
#[derive(Debug)]
pub struct PreviewReport {
    /// Canonical family name.
    pub family: String,
    /// Variant that was previewed, short form.
    pub variant: String,
    /// Downloaded font file.
    pub font: PathBuf,
    /// Rendered image, when the renderer succeeded.
    pub image: Option<PathBuf>,
    /// Renderer or viewer problems.
    pub warnings: Vec<Error>,
}

/// Downloads one face of a family and hands it to the renderer and viewer.
pub struct Previewer<'a> {
    /// Catalog used for resolution.
    catalog: &'a Catalog,
    /// Download pool.
    fetcher: Fetcher,
    /// Batch options.
    options: FetchOptions,
    /// Font and image directory.
    previews_dir: PathBuf,
    /// Command producing an image from a font.
    renderer: String,
    /// Command displaying the image.
    viewer: String,
}

impl<'a> Previewer<'a> {
    /// Create a previewer caching under the configured cache directory.
    pub fn new(config: &Config, catalog: &'a Catalog, fetcher: Fetcher) -> Self {
        Self {
            catalog,
            fetcher,
            options: FetchOptions::from_config(config, false),
            previews_dir: config.cache_dir.join(PREVIEWS_DIR),
            renderer: config.preview_renderer.clone(),
            viewer: config.preview_viewer.clone(),
        }
    }

    /// Preview the regular face of a family, or its first face.
    pub async fn preview(&self, raw: &str, text: Option<&str>) -> Result<PreviewReport> {
        let (source, family) = self.catalog.resolve(raw, true).await?;
        let metadata = source.metadata(&family).await?;

        let variant = metadata
            .variants
            .iter()
            .find(|variant| variant.as_str() == "regular")
            .or_else(|| metadata.variants.first())
            .ok_or_else(|| Error::VariantUnavailable {
                family: family.clone(),
                variant: "400".to_string(),
            })?;
        let url = metadata
            .files
            .get(variant)
            .ok_or_else(|| Error::VariantUnavailable {
                family: family.clone(),
                variant: variant.clone(),
            })?;

        let stem = format!("{}-{}", family_dir_name(&family), normalize_variant(variant, true)?);
        let font = self.previews_dir.join(format!("{stem}{}", url_extension(url)));
        let task = DownloadTask::new(url.clone(), font.clone());
        let fetch = self.fetcher.fetch_all(vec![task], self.options).await?;
        if let Some(failed) = fetch.failed.into_iter().next() {
            return Err(failed.error);
        }

        let image = self.previews_dir.join(format!("{stem}.png"));
        let label = match text {
            Some(text) => text.to_string(),
            None => format!("{family}\n{DEFAULT_TEXT}"),
        };
        let render_args = vec![
            "-background".into(),
            "white".into(),
            "-fill".into(),
            "black".into(),
            "-font".into(),
            font.clone().into_os_string(),
            "-pointsize".into(),
            "48".into(),
            format!("label:{label}").into(),
            image.clone().into_os_string(),
        ];

        let mut warnings = Vec::new();
        let rendered = match run_tool(&self.renderer, render_args, true).await {
            Ok(()) => Some(image),
            Err(error) => {
                warnings.push(error);
                None
            }
        };
        if let Some(image) = &rendered
            && let Err(error) = run_tool(&self.viewer, [image.as_os_str()], false).await
        {
            warnings.push(error);
        }

        Ok(PreviewReport {
            family,
            variant: normalize_variant(variant, false)?,
            font,
            image: rendered,
            warnings,
        })
    }
}
