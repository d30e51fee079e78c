//! Installing and removing families under the fonts directory.
//!
//! Installed state lives only on disk: one directory per family, named with
//! spaces replaced by underscores, holding the manifest files and one binary
//! per variant. Installed families are the directories whose names the
//! catalog recognizes.

use std::{
    collections::HashSet,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use url::Url;

use crate::{
    catalog::Catalog,
    config::Config,
    error::{Error, Result},
    fetcher::{DownloadTask, FetchOptions, FetchReport, Fetcher, write_atomic},
    metadata::{FamilyMetadata, ManifestFile},
    tools::refresh_font_cache,
    variant::{family_dir_name, family_from_dir_name, normalize_variant},
};

/// Lifecycle of a family during install and removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// No directory exists for the family.
    NotInstalled,
    /// Typed input is being matched against the catalog.
    Resolving,
    /// Metadata and manifest files are being requested.
    FetchingManifest,
    /// Font binaries are being downloaded.
    DownloadingFonts,
    /// The family directory is populated.
    Installed,
    /// The family directory is being deleted.
    Removing,
}

/// Observer for state transitions, called with the family name.
pub type StateHook = Arc<dyn Fn(&str, InstallState) + Send + Sync>;

/// Outcome of installing one family.
#[derive(Debug)]
pub struct InstallReport {
    /// Canonical family name.
    pub family: String,
    /// Family directory.
    pub directory: PathBuf,
    /// Manifest files written.
    pub manifest_files: usize,
    /// Download counts, after the retry pass.
    pub fetch: FetchReport,
    /// Whether cached files were ignored because the catalog changed.
    pub refreshed: bool,
    /// Font cache refresh problem, if any.
    pub font_cache_warning: Option<Error>,
}

/// Outcome of removing one family.
#[derive(Debug)]
pub struct RemoveReport {
    /// Canonical family name.
    pub family: String,
    /// False when nothing was installed.
    pub removed: bool,
    /// Font cache refresh problem, if any.
    pub font_cache_warning: Option<Error>,
}

/// Installs, removes and inspects families on disk.
pub struct Installer<'a> {
    /// Catalog used for resolution and metadata.
    catalog: &'a Catalog,
    /// Download pool.
    fetcher: Fetcher,
    /// Batch options; `bypass_cache` is decided per install.
    options: FetchOptions,
    /// Root of installed families.
    fonts_dir: PathBuf,
    /// Command run after the font set changes.
    font_cache_command: String,
    /// Optional state observer.
    state_hook: Option<StateHook>,
}

impl<'a> Installer<'a> {
    /// Create an installer for the configured fonts directory.
    pub fn new(config: &Config, catalog: &'a Catalog, fetcher: Fetcher) -> Self {
        Self {
            catalog,
            fetcher,
            options: FetchOptions::from_config(config, false),
            fonts_dir: config.fonts_dir.clone(),
            font_cache_command: config.font_cache_command.clone(),
            state_hook: None,
        }
    }

    /// Report state transitions through `hook`.
    pub fn with_state_hook(mut self, hook: StateHook) -> Self {
        self.state_hook = Some(hook);
        self
    }

    /// Directory an installed family lives in.
    pub fn family_dir(&self, family: &str) -> PathBuf {
        self.fonts_dir.join(family_dir_name(family))
    }

    /// Notify the state observer.
    fn enter(&self, family: &str, state: InstallState) {
        if let Some(hook) = &self.state_hook {
            hook(family, state);
        }
    }

    /// Resolve, download and install a family.
    pub async fn install(&self, raw: &str, bypass_cache: bool) -> Result<InstallReport> {
        self.enter(raw, InstallState::Resolving);
        let (source, family) = self.catalog.resolve(raw, true).await?;

        self.enter(&family, InstallState::FetchingManifest);
        let metadata = source.detailed(&family).await?;
        let manifest = source.manifest(&family).await?;

        let directory = self.family_dir(&family);
        let tasks = font_tasks(&metadata, &directory)?;
        let manifest_files = write_manifest(&directory, &manifest)?;

        let refreshed = remote_is_newer(metadata.last_modified_at(), &tasks);
        let mut options = self.options;
        options.bypass_cache = bypass_cache || refreshed;

        self.enter(&family, InstallState::DownloadingFonts);
        let mut fetch = self.fetcher.fetch_all(tasks, options).await?;
        if !fetch.failed.is_empty() {
            let retry = self.fetcher.fetch_all(fetch.failed_tasks(), options).await?;
            fetch.absorb_retry(retry);
        }

        let font_cache_warning = refresh_font_cache(&self.font_cache_command).await;
        self.enter(&family, InstallState::Installed);

        Ok(InstallReport {
            family,
            directory,
            manifest_files,
            fetch,
            refreshed,
            font_cache_warning,
        })
    }

    /// Delete an installed family. Removing a family that is not installed is a no-op.
    pub async fn remove(&self, raw: &str) -> Result<RemoveReport> {
        self.enter(raw, InstallState::Resolving);
        let (_, family) = self.catalog.resolve(raw, true).await?;
        let directory = self.family_dir(&family);

        if !directory.is_dir() {
            self.enter(&family, InstallState::NotInstalled);
            return Ok(RemoveReport {
                family,
                removed: false,
                font_cache_warning: None,
            });
        }

        self.enter(&family, InstallState::Removing);
        fs::remove_dir_all(&directory).map_err(|error| Error::DirAccess {
            path: directory.clone(),
            source: error,
        })?;
        let font_cache_warning = refresh_font_cache(&self.font_cache_command).await;
        self.enter(&family, InstallState::NotInstalled);

        Ok(RemoveReport {
            family,
            removed: true,
            font_cache_warning,
        })
    }

    /// Installed families in catalog order.
    pub async fn list_installed(&self) -> Result<Vec<String>> {
        let on_disk = installed_dir_names(&self.fonts_dir)?;
        if on_disk.is_empty() {
            return Ok(Vec::new());
        }

        let families = self.catalog.families(false).await?;
        Ok(families
            .into_iter()
            .filter(|family| on_disk.contains(family))
            .collect())
    }

    /// Installed families the catalog reports as updated.
    ///
    /// Forces a catalog refresh first. A family is flagged when its
    /// `lastModified` date lies after the current time.
    pub async fn check_for_updates(&self) -> Result<Vec<String>> {
        self.catalog.families(true).await?;
        let now = Utc::now();

        let mut updatable = Vec::new();
        for family in self.list_installed().await? {
            let source = self.catalog.source_for(&family).await?;
            let metadata = source.metadata(&family).await?;
            if metadata.last_modified_at().is_some_and(|stamp| stamp > now) {
                updatable.push(family);
            }
        }
        Ok(updatable)
    }
}

/// One download task per variant, named `<Family_Name>-<StandardName><ext>`.
///
/// Fails with `InvalidVariant` before anything is written.
pub fn font_tasks(metadata: &FamilyMetadata, directory: &Path) -> Result<Vec<DownloadTask>> {
    let prefix = family_dir_name(&metadata.family);
    let mut tasks = Vec::new();

    for variant in &metadata.variants {
        let Some(url) = metadata.files.get(variant) else {
            continue;
        };
        let name = normalize_variant(variant, true)?;
        let filename = format!("{prefix}-{name}{}", url_extension(url));
        tasks.push(DownloadTask::new(url.clone(), directory.join(filename)));
    }
    Ok(tasks)
}

/// Extension of the last path segment of `url`, with its dot, or empty.
pub(crate) fn url_extension(url: &str) -> String {
    let path = Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    Path::new(&path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// True when the catalog changed after the oldest font already on disk.
fn remote_is_newer(last_modified: Option<DateTime<Utc>>, tasks: &[DownloadTask]) -> bool {
    let Some(last_modified) = last_modified else {
        return false;
    };
    let oldest = tasks
        .iter()
        .filter_map(|task| task.destination.metadata().ok()?.modified().ok())
        .min();
    oldest.is_some_and(|fetched: SystemTime| last_modified > DateTime::<Utc>::from(fetched))
}

/// Write manifest files into the family directory and return how many were written.
fn write_manifest(directory: &Path, files: &[ManifestFile]) -> Result<usize> {
    fs::create_dir_all(directory).map_err(|error| Error::FileWrite {
        path: directory.to_path_buf(),
        source: error,
    })?;

    for file in files {
        let plain = Path::new(&file.filename)
            .file_name()
            .is_some_and(|name| name == file.filename.as_str());
        if !plain || file.filename == ".." {
            return Err(Error::UnsafeFileName {
                filename: file.filename.clone(),
            });
        }
        write_atomic(&directory.join(&file.filename), file.contents.as_bytes())?;
    }
    Ok(files.len())
}

/// Family names derived from directories under `fonts_dir`.
fn installed_dir_names(fonts_dir: &Path) -> Result<HashSet<String>> {
    let entries = match fs::read_dir(fonts_dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(error) => {
            return Err(Error::DirAccess {
                path: fonts_dir.to_path_buf(),
                source: error,
            });
        }
    };

    Ok(entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .map(|name| family_from_dir_name(&name))
        .collect())
}
