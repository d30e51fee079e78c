//! Self-hosted webfont packs.
//!
//! A pack is a stylesheet `<dir>/<kebab>.css` whose `url(...)` references
//! point at font files in `<dir>/<kebab>/`. Font files are named after a hash
//! of their remote URL, so repeated runs reuse what is already on disk.

use std::{
    collections::HashSet,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    catalog::Catalog,
    config::Config,
    error::{Error, Result},
    fetcher::{DownloadTask, FetchOptions, FetchReport, Fetcher, write_atomic},
    http::Agent,
    variant::{kebab_case, normalize_variants},
};

/// Matches `url(...)` references in a stylesheet.
const URL_PATTERN: &str = r"url\(([^)]+)\)";

/// Hex digits of the URL hash kept in file names.
const HASH_LEN: usize = 16;

/// A `family[:variant,variant...]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebfontRequest {
    /// Family as typed.
    pub family: String,
    /// Short variant tokens; empty means every variant.
    pub variants: Vec<String>,
}

impl WebfontRequest {
    /// Parse a command-line argument such as `Roboto:400,700i`.
    pub fn parse(arg: &str) -> Result<Self> {
        let (family, variants) = match arg.split_once(':') {
            Some((family, list)) => {
                let tokens: Vec<&str> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .collect();
                (family, normalize_variants(&tokens, false)?)
            }
            None => (arg, Vec::new()),
        };
        Ok(Self {
            family: family.trim().to_string(),
            variants,
        })
    }
}

/// Where and how to write a pack.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Output directory.
    pub dir: PathBuf,
    /// Empty the family font directory before downloading.
    pub clean: bool,
    /// CSS `font-display` value.
    pub display: String,
    /// Also bundle the pack into `<dir>/<kebab>.zip`.
    pub zip: bool,
    /// Download even when files already exist.
    pub bypass_cache: bool,
}

/// Outcome of packing one family.
#[derive(Debug)]
pub struct PackReport {
    /// Canonical family name.
    pub family: String,
    /// Variants included, short form.
    pub variants: Vec<String>,
    /// Stylesheet written.
    pub stylesheet: PathBuf,
    /// Directory holding the font files.
    pub fonts_dir: PathBuf,
    /// Download counts, after the retry pass.
    pub fetch: FetchReport,
    /// ZIP archive, when requested.
    pub archive: Option<PathBuf>,
}

/// Builds webfont packs from catalog stylesheets.
pub struct WebfontPacker<'a> {
    /// Catalog used for resolution and stylesheets.
    catalog: &'a Catalog,
    /// Download pool.
    fetcher: Fetcher,
    /// Batch options; `bypass_cache` comes from each pack.
    options: FetchOptions,
}

impl<'a> WebfontPacker<'a> {
    /// Create a packer using the configured pool settings.
    pub fn new(config: &Config, catalog: &'a Catalog, fetcher: Fetcher) -> Self {
        Self {
            catalog,
            fetcher,
            options: FetchOptions::from_config(config, false),
        }
    }

    /// Build a pack for one request.
    pub async fn pack(&self, request: &WebfontRequest, pack: &PackOptions) -> Result<PackReport> {
        let (source, family) = self.catalog.resolve(&request.family, true).await?;
        let metadata = source.metadata(&family).await?;
        let available = normalize_variants(&metadata.variants, false)?;

        let variants = if request.variants.is_empty() {
            available
        } else {
            for variant in &request.variants {
                if !available.contains(variant) {
                    return Err(Error::VariantUnavailable {
                        family: family.clone(),
                        variant: variant.clone(),
                    });
                }
            }
            request.variants.clone()
        };

        let css = source.webfont_css(&family, &variants, &pack.display).await?;
        let pattern = url_pattern()?;
        let kebab = kebab_case(&family);
        let fonts_dir = pack.dir.join(&kebab);

        if pack.clean {
            empty_dir(&fonts_dir)?;
        }

        let tasks = font_references(&pattern, &css)
            .into_iter()
            .map(|url| {
                let destination = fonts_dir.join(font_file_name(&kebab, &url));
                DownloadTask::new(url, destination).with_agent(Agent::Browser)
            })
            .collect();

        let mut options = self.options;
        options.bypass_cache = pack.bypass_cache;
        let mut fetch = self.fetcher.fetch_all(tasks, options).await?;
        if !fetch.failed.is_empty() {
            let retry = self.fetcher.fetch_all(fetch.failed_tasks(), options).await?;
            fetch.absorb_retry(retry);
        }

        let stylesheet = pack.dir.join(format!("{kebab}.css"));
        let rewritten = rewrite_urls(&pattern, &css, &kebab);
        write_atomic(&stylesheet, rewritten.as_bytes())?;

        let archive = if pack.zip {
            let path = pack.dir.join(format!("{kebab}.zip"));
            bundle(&pack.dir, &kebab, &path)?;
            Some(path)
        } else {
            None
        };

        Ok(PackReport {
            family,
            variants,
            stylesheet,
            fonts_dir,
            fetch,
            archive,
        })
    }
}

/// Compile the `url(...)` pattern.
fn url_pattern() -> Result<Regex> {
    Regex::new(URL_PATTERN).map_err(|source| Error::InvalidPattern { source })
}

/// Strip whitespace and optional quotes from a captured reference.
fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'')
}

/// Distinct font URLs referenced by `css`, in order of first appearance.
fn font_references(pattern: &Regex, css: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    pattern
        .captures_iter(css)
        .filter_map(|captures| captures.get(1))
        .map(|found| unquote(found.as_str()).to_string())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Stable local file name for a font URL.
pub fn font_file_name(kebab: &str, url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    format!("{kebab}-{}.woff2", &digest[..HASH_LEN])
}

/// Point every `url(...)` in `css` at the local copy under `<kebab>/`.
fn rewrite_urls(pattern: &Regex, css: &str, kebab: &str) -> String {
    pattern
        .replace_all(css, |captures: &Captures<'_>| {
            let url = captures.get(1).map_or("", |found| unquote(found.as_str()));
            format!("url({kebab}/{})", font_file_name(kebab, url))
        })
        .into_owned()
}

/// Remove a directory and its contents if it exists.
fn empty_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(error) => Err(Error::DirAccess {
            path: dir.to_path_buf(),
            source: error,
        }),
    }
}

/// Write `<kebab>.css` and the `<kebab>/` font directory into a ZIP archive.
fn bundle(dir: &Path, kebab: &str, output_path: &Path) -> Result<()> {
    let zip_error = |message: String| Error::ZipCreate {
        path: output_path.to_path_buf(),
        message,
    };

    let file = File::create(output_path).map_err(|e| zip_error(e.to_string()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let stylesheet = format!("{kebab}.css");
    let mut entries = vec![(stylesheet.clone(), dir.join(&stylesheet))];
    let fonts_dir = dir.join(kebab);
    let walk = fonts_dir
        .is_dir()
        .then(|| WalkDir::new(&fonts_dir).min_depth(1).sort_by_file_name());
    for entry in walk.into_iter().flatten() {
        let entry = entry.map_err(|e| zip_error(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        entries.push((format!("{kebab}/{name}"), entry.path().to_path_buf()));
    }

    for (archive_path, path) in entries {
        let contents = fs::read(&path).map_err(|source| Error::FileRead {
            path: path.clone(),
            source,
        })?;
        zip.start_file(archive_path, options)
            .map_err(|e| zip_error(e.to_string()))?;
        zip.write_all(&contents)
            .map_err(|e| zip_error(e.to_string()))?;
    }

    zip.finish().map_err(|e| zip_error(e.to_string()))?;
    Ok(())
}
