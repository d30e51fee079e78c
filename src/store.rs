//! Disk-backed catalog cache.
//!
//! The store owns two caches under the cache directory: the whole catalog
//! listing (`families.json`) and one file per family for the fields that need
//! an extra request (`metadata/<family>.json`). Both are refreshed by age,
//! and both are memoized in memory for the rest of the process.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    http::{Agent, HttpClient, strip_json_prefix},
    metadata::{Axis, FamilyMetadata, ManifestFile, Supplementary},
    paths,
    variant::snake_case,
};

/// File name of the catalog snapshot inside the cache directory.
pub const SNAPSHOT_FILE: &str = "families.json";

/// Subdirectory holding per-family supplementary metadata.
const METADATA_DIR: &str = "metadata";

/// Per-family metadata endpoint; the family name is appended as a path segment.
const FAMILY_METADATA_URL: &str = "https://fonts.google.com/metadata/fonts";

/// Download-list endpoint returning manifest files for a family.
const DOWNLOAD_LIST_URL: &str = "https://fonts.google.com/download/list";

/// All known families keyed by canonical name, in alphabetical order.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogSnapshot {
    /// Family records keyed by family name.
    families: BTreeMap<String, FamilyMetadata>,
}

impl CatalogSnapshot {
    /// Build a snapshot from listing records. Later duplicates win.
    pub fn from_records(records: Vec<FamilyMetadata>) -> Self {
        let families = records
            .into_iter()
            .map(|record| (record.family.clone(), record))
            .collect();
        Self { families }
    }

    /// Family names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    /// Look up a family by canonical name.
    pub fn get(&self, family: &str) -> Option<&FamilyMetadata> {
        self.families.get(family)
    }

    /// True when the catalog knows `family`.
    pub fn contains(&self, family: &str) -> bool {
        self.families.contains_key(family)
    }
}

/// Body of the catalog listing endpoint.
#[derive(Debug, Deserialize)]
struct Listing {
    /// Family records.
    items: Vec<FamilyMetadata>,
}

/// Body of the per-family metadata endpoint.
#[derive(Debug, Deserialize)]
struct RemoteDetails {
    /// Designer records.
    #[serde(default)]
    designers: Vec<RemoteDesigner>,
    /// License shorthand.
    license: String,
    /// Variable axes.
    #[serde(default)]
    axes: Vec<Axis>,
}

/// A designer entry in the per-family metadata.
#[derive(Debug, Deserialize)]
struct RemoteDesigner {
    /// Designer name.
    name: String,
}

/// Body of the download-list endpoint.
#[derive(Debug, Deserialize)]
struct DownloadList {
    /// Manifest section.
    manifest: RemoteManifest,
}

/// Manifest section of a download list.
#[derive(Debug, Deserialize)]
struct RemoteManifest {
    /// Text files shipped with the family.
    #[serde(default)]
    files: Vec<ManifestFile>,
}

/// Catalog cache shared by every command in a process.
pub struct CatalogStore {
    /// Client for catalog requests.
    client: Arc<dyn HttpClient>,
    /// Cache directory root.
    cache_dir: PathBuf,
    /// Catalog listing URL.
    listing_url: String,
    /// Snapshot staleness threshold.
    catalog_max_age: Duration,
    /// Supplementary metadata staleness threshold.
    metadata_max_age: Duration,
    /// Snapshot loaded in this process.
    snapshot: Mutex<Option<Arc<CatalogSnapshot>>>,
    /// Supplementary metadata loaded in this process.
    supplementary: Mutex<HashMap<String, Supplementary>>,
}

impl CatalogStore {
    /// Create a store using the directories and windows from `config`.
    pub fn new(config: &Config, client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            cache_dir: config.cache_dir.clone(),
            listing_url: config.listing_url(),
            catalog_max_age: config.catalog_max_age,
            metadata_max_age: config.metadata_max_age,
            snapshot: Mutex::new(None),
            supplementary: Mutex::new(HashMap::new()),
        }
    }

    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(SNAPSHOT_FILE)
    }

    /// Path of the cached supplementary metadata for `family`.
    fn supplementary_path(&self, family: &str) -> PathBuf {
        self.cache_dir
            .join(METADATA_DIR)
            .join(format!("{}.json", snake_case(family)))
    }

    /// Return the catalog snapshot, refreshing it when stale or forced.
    pub async fn load(&self, force_refresh: bool) -> Result<Arc<CatalogSnapshot>> {
        let mut guard = self.snapshot.lock().await;

        if !force_refresh {
            if let Some(snapshot) = guard.as_ref() {
                return Ok(Arc::clone(snapshot));
            }

            let path = self.snapshot_path();
            if paths::is_fresh(&path, self.catalog_max_age)
                && let Some(snapshot) = read_json::<CatalogSnapshot>(&path)
            {
                let snapshot = Arc::new(snapshot);
                *guard = Some(Arc::clone(&snapshot));
                return Ok(snapshot);
            }
        }

        let body = self.fetch(&self.listing_url, Agent::Default).await?;
        let listing: Listing =
            serde_json::from_slice(&body).map_err(|error| Error::CatalogParse {
                url: self.listing_url.clone(),
                source: error,
            })?;
        let snapshot = CatalogSnapshot::from_records(listing.items);
        write_json(&self.snapshot_path(), &snapshot)?;

        let snapshot = Arc::new(snapshot);
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Return designers, license and axes for `family`.
    pub async fn supplementary(&self, family: &str) -> Result<Supplementary> {
        if let Some(known) = builtin_supplementary(family) {
            return Ok(known);
        }

        let mut cache = self.supplementary.lock().await;
        if let Some(cached) = cache.get(family) {
            return Ok(cached.clone());
        }

        let path = self.supplementary_path(family);
        if paths::is_fresh(&path, self.metadata_max_age)
            && let Some(cached) = read_json::<Supplementary>(&path)
        {
            cache.insert(family.to_string(), cached.clone());
            return Ok(cached);
        }

        let url = family_metadata_url(family)?;
        let body = self.fetch(&url, Agent::Default).await?;
        let details: RemoteDetails = serde_json::from_slice(strip_json_prefix(&body))
            .map_err(|error| Error::CatalogParse {
                url: url.clone(),
                source: error,
            })?;
        let supplementary = Supplementary {
            designers: details.designers.into_iter().map(|d| d.name).collect(),
            license: details.license,
            axes: details.axes,
        };

        write_json(&path, &supplementary)?;
        cache.insert(family.to_string(), supplementary.clone());
        Ok(supplementary)
    }

    /// Return the license and description files published for `family`.
    pub async fn manifest(&self, family: &str) -> Result<Vec<ManifestFile>> {
        if is_icon_family(family) {
            return Ok(Vec::new());
        }

        let url = download_list_url(family)?;
        let body = self.fetch(&url, Agent::Default).await?;
        let list: DownloadList = serde_json::from_slice(strip_json_prefix(&body)).map_err(
            |error| Error::CatalogParse {
                url: url.clone(),
                source: error,
            },
        )?;
        Ok(list.manifest.files)
    }

    /// Fetch raw bytes for the catalog layer. Failures are not retried here.
    pub async fn fetch(&self, url: &str, agent: Agent) -> Result<Vec<u8>> {
        self.client
            .get(url, agent)
            .await
            .map_err(|source| Error::CatalogFetch {
                url: url.to_string(),
                source,
            })
    }
}

/// True for the icon families whose metadata is not published per family.
fn is_icon_family(family: &str) -> bool {
    family.starts_with("Material Icons") || family.starts_with("Material Symbols")
}

/// Hardcoded supplementary metadata for icon families.
fn builtin_supplementary(family: &str) -> Option<Supplementary> {
    let axes = if family.starts_with("Material Symbols") {
        [
            ("opsz", 20.0, 48.0),
            ("wght", 100.0, 700.0),
            ("FILL", 0.0, 1.0),
            ("GRAD", -50.0, 200.0),
        ]
        .into_iter()
        .map(|(tag, min, max)| Axis {
            tag: tag.to_string(),
            min,
            max,
        })
        .collect()
    } else if family.starts_with("Material Icons") {
        Vec::new()
    } else {
        return None;
    };

    Some(Supplementary {
        designers: vec!["Google".to_string()],
        license: "apache2".to_string(),
        axes,
    })
}

/// URL of the per-family metadata endpoint.
pub fn family_metadata_url(family: &str) -> Result<String> {
    let mut url = Url::parse(FAMILY_METADATA_URL).map_err(|_| Error::InvalidUrl {
        url: FAMILY_METADATA_URL.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|()| Error::InvalidUrl {
            url: FAMILY_METADATA_URL.to_string(),
        })?
        .push(family);
    Ok(url.to_string())
}

/// URL of the download-list endpoint.
pub fn download_list_url(family: &str) -> Result<String> {
    Url::parse_with_params(DOWNLOAD_LIST_URL, &[("family", family)])
        .map(String::from)
        .map_err(|_| Error::InvalidUrl {
            url: DOWNLOAD_LIST_URL.to_string(),
        })
}

/// Read and decode a JSON cache file; unreadable or corrupt files yield `None`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = fs::read(path).ok()?;
    serde_json::from_slice(&contents).ok()
}

/// Overwrite a JSON cache file, creating parent directories.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| Error::CacheWrite {
            path: parent.to_path_buf(),
            source: error,
        })?;
    }
    let contents = serde_json::to_vec_pretty(value).map_err(|error| Error::CacheSerialize {
        path: path.to_path_buf(),
        source: error,
    })?;
    fs::write(path, contents).map_err(|error| Error::CacheWrite {
        path: path.to_path_buf(),
        source: error,
    })
}

#[cfg(test)]
mod tests {
    use std::{
        fs::{self, File},
        sync::Arc,
        time::{Duration, SystemTime},
    };

    use super::*;
    use crate::testutil::{FakeClient, TestFixture, family_record};

    /// Push the snapshot file's modification time `age` into the past.
    fn age_snapshot(store: &CatalogStore, age: Duration) {
        let stamp = SystemTime::now() - age;
        File::options()
            .write(true)
            .open(store.snapshot_path())
            .and_then(|file| file.set_modified(stamp))
            .expect("set mtime");
    }

    #[tokio::test]
    async fn memoizes_snapshot_within_process() {
        let fixture = TestFixture::new();
        let client = Arc::new(fixture.catalog_client(&[family_record("Roboto", &["regular"])]));
        let store = CatalogStore::new(&fixture.config(), client.clone());

        let first = store.load(false).await.expect("load");
        let second = store.load(false).await.expect("load");

        assert_eq!(first.names().count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(client.requests_for(&fixture.config().listing_url()), 1);
        assert!(store.snapshot_path().is_file());
    }

    #[tokio::test]
    async fn stale_snapshot_triggers_one_fetch() {
        let fixture = TestFixture::new();
        let config = fixture.config();
        let records = [family_record("Roboto", &["regular"])];

        let seed = Arc::new(fixture.catalog_client(&records));
        CatalogStore::new(&config, seed)
            .load(true)
            .await
            .expect("seed cache");

        let client = Arc::new(fixture.catalog_client(&records));
        let store = CatalogStore::new(&config, client.clone());
        age_snapshot(&store, config.catalog_max_age + Duration::from_secs(1));
        store.load(false).await.expect("load");
        assert_eq!(client.requests_for(&config.listing_url()), 1);
    }

    #[tokio::test]
    async fn fresh_snapshot_is_read_from_disk() {
        let fixture = TestFixture::new();
        let config = fixture.config();
        let records = [family_record("Roboto", &["regular"])];

        let seed = Arc::new(fixture.catalog_client(&records));
        CatalogStore::new(&config, seed)
            .load(true)
            .await
            .expect("seed cache");

        let client = Arc::new(fixture.catalog_client(&records));
        let store = CatalogStore::new(&config, client.clone());
        age_snapshot(&store, Duration::from_secs(1));
        let snapshot = store.load(false).await.expect("load");
        assert!(snapshot.contains("Roboto"));
        assert_eq!(client.total_requests(), 0);
    }

    #[tokio::test]
    async fn forced_refresh_replaces_snapshot() {
        let fixture = TestFixture::new();
        let config = fixture.config();
        let client = Arc::new(fixture.catalog_client(&[family_record("Roboto", &["regular"])]));
        let store = CatalogStore::new(&config, client.clone());
        store.load(false).await.expect("load");

        client.set_route(
            &config.listing_url(),
            TestFixture::listing_body(&[family_record("Lato", &["regular"])]),
        );
        let refreshed = store.load(true).await.expect("refresh");
        assert!(refreshed.contains("Lato"));
        assert!(!refreshed.contains("Roboto"));
        assert_eq!(client.requests_for(&config.listing_url()), 2);
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_refetched() {
        let fixture = TestFixture::new();
        let config = fixture.config();
        fs::create_dir_all(&config.cache_dir).expect("cache dir");
        fs::write(config.cache_dir.join(SNAPSHOT_FILE), "{not json").expect("write");

        let client = Arc::new(fixture.catalog_client(&[family_record("Roboto", &["regular"])]));
        let store = CatalogStore::new(&config, client.clone());
        let snapshot = store.load(false).await.expect("load");
        assert!(snapshot.contains("Roboto"));
        assert_eq!(client.requests_for(&config.listing_url()), 1);
    }

    #[tokio::test]
    async fn listing_failure_is_catalog_error() {
        let fixture = TestFixture::new();
        let config = fixture.config();
        let client = Arc::new(FakeClient::new());
        let store = CatalogStore::new(&config, client);

        let error = store.load(false).await.expect_err("should fail");
        assert!(matches!(error, Error::CatalogFetch { .. }));
    }

    #[tokio::test]
    async fn supplementary_is_cached_per_family() {
        let fixture = TestFixture::new();
        let config = fixture.config();
        let client = Arc::new(fixture.catalog_client(&[family_record("Open Sans", &["regular"])]));
        let store = CatalogStore::new(&config, client.clone());

        let details = store.supplementary("Open Sans").await.expect("details");
        assert_eq!(details.designers, vec!["Test Designer".to_string()]);
        assert_eq!(details.license, "ofl");
        store.supplementary("Open Sans").await.expect("details");

        let url = family_metadata_url("Open Sans").expect("url");
        assert_eq!(client.requests_for(&url), 1);
        assert!(config.cache_dir.join("metadata/open_sans.json").is_file());

        let other = CatalogStore::new(&config, client.clone());
        other.supplementary("Open Sans").await.expect("from disk");
        assert_eq!(client.requests_for(&url), 1);
    }

    #[tokio::test]
    async fn icon_families_skip_the_network() {
        let fixture = TestFixture::new();
        let client = Arc::new(FakeClient::new());
        let store = CatalogStore::new(&fixture.config(), client.clone());

        let symbols = store
            .supplementary("Material Symbols Outlined")
            .await
            .expect("builtin");
        assert_eq!(symbols.axes.len(), 4);
        assert_eq!(symbols.license, "apache2");
        assert!(store.manifest("Material Icons").await.expect("manifest").is_empty());
        assert_eq!(client.total_requests(), 0);
    }

    #[tokio::test]
    async fn reads_prefixed_manifest() {
        let fixture = TestFixture::new();
        let client = Arc::new(fixture.catalog_client(&[family_record("Roboto", &["regular"])]));
        let store = CatalogStore::new(&fixture.config(), client);

        let files = store.manifest("Roboto").await.expect("manifest");
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "OFL.txt");
    }

    #[test]
    fn builds_endpoint_urls() {
        assert_eq!(
            family_metadata_url("Open Sans").expect("url"),
            "https://fonts.google.com/metadata/fonts/Open%20Sans"
        );
        assert_eq!(
            download_list_url("Open Sans").expect("url"),
            "https://fonts.google.com/download/list?family=Open+Sans"
        );
    }
}
