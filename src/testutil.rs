//! Test utilities for setting up isolated catalog environments.
//!
//! This module provides a `TestFixture` with temporary font and cache
//! directories, and a scripted `FakeClient` standing in for the remote
//! catalog, metadata endpoints and font CDN.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::time::sleep;

use crate::{
    config::Config,
    error::HttpError,
    http::{Agent, HttpClient},
    store::{download_list_url, family_metadata_url},
    variant::kebab_case,
};

/// Scripted HTTP client recording every request.
#[derive(Default)]
pub struct FakeClient {
    /// URL to response body.
    routes: Mutex<HashMap<String, Vec<u8>>>,
    /// URLs that always answer with a server error.
    failing: Mutex<HashSet<String>>,
    /// Every request made, in order.
    requests: Mutex<Vec<(String, Agent)>>,
    /// Requests currently in progress.
    in_flight: AtomicUsize,
    /// Highest number of simultaneous requests seen.
    max_in_flight: AtomicUsize,
    /// Artificial latency per request.
    delay: Duration,
}

impl FakeClient {
    /// Create a client with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every request for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Add a route.
    pub fn with_route(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.set_route(url, body);
        self
    }

    /// Add or replace a route.
    pub fn set_route(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(url.to_string(), body.into());
    }

    /// Make `url` fail with status 500.
    pub fn fail(&self, url: &str) {
        self.failing
            .lock()
            .expect("failing lock")
            .insert(url.to_string());
    }

    /// Stop failing `url`.
    pub fn recover(&self, url: &str) {
        self.failing.lock().expect("failing lock").remove(url);
    }

    /// Number of requests made for `url`.
    pub fn requests_for(&self, url: &str) -> usize {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|(requested, _)| requested == url)
            .count()
    }

    /// Number of requests made with the given agent.
    pub fn requests_with_agent(&self, agent: Agent) -> usize {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|(_, used)| *used == agent)
            .count()
    }

    /// Total number of requests made.
    pub fn total_requests(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    /// Highest number of simultaneous requests seen.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn get(&self, url: &str, agent: Agent) -> Result<Vec<u8>, HttpError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((url.to_string(), agent));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().expect("failing lock").contains(url) {
            return Err(HttpError::Status { status: 500 });
        }
        self.routes
            .lock()
            .expect("routes lock")
            .get(url)
            .cloned()
            .ok_or(HttpError::Status { status: 404 })
    }
}

/// URL of a fake font binary for `family` and `variant`.
pub fn font_url(family: &str, variant: &str) -> String {
    format!("https://fonts.example/{}/{variant}.ttf", kebab_case(family))
}

/// A catalog listing record with one file per variant.
pub fn family_record(family: &str, variants: &[&str]) -> Value {
    let files: serde_json::Map<String, Value> = variants
        .iter()
        .map(|variant| ((*variant).to_string(), Value::from(font_url(family, variant))))
        .collect();
    json!({
        "kind": "webfonts#webfont",
        "family": family,
        "category": "sans-serif",
        "subsets": ["latin", "latin-ext"],
        "variants": variants,
        "files": files,
        "version": "v1",
        "lastModified": "2020-01-01",
    })
}

/// Test fixture with isolated font and cache directories.
pub struct TestFixture {
    /// Root temp directory (holds everything).
    _root: TempDir,
    /// Root of installed families.
    fonts_dir: PathBuf,
    /// Cache directory.
    cache_dir: PathBuf,
    /// Scratch directory for output that is neither fonts nor cache.
    scratch_dir: PathBuf,
}

impl TestFixture {
    /// Create a fixture with empty directories.
    pub fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        let fonts_dir = root.path().join("fonts");
        fs::create_dir_all(&fonts_dir).expect("create fonts dir");
        let scratch_dir = root.path().join("scratch");
        fs::create_dir_all(&scratch_dir).expect("create scratch dir");
        let cache_dir = root.path().join("cache");

        Self {
            _root: root,
            fonts_dir,
            cache_dir,
            scratch_dir,
        }
    }

    /// Root of installed families.
    pub fn fonts_dir(&self) -> &Path {
        &self.fonts_dir
    }

    /// Scratch directory outside the fonts and cache roots.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Config pointing at the fixture directories, with fast settings.
    pub fn config(&self) -> Config {
        let mut config = Config::with_dirs(self.fonts_dir.clone(), self.cache_dir.clone());
        config.catalog_url = "https://catalog.example/webfonts.json".to_string();
        config.max_workers = 4;
        config.retries = 2;
        config.font_cache_command = "gfont-test-missing-fc-cache".to_string();
        config.preview_renderer = "gfont-test-missing-renderer".to_string();
        config.preview_viewer = "gfont-test-missing-viewer".to_string();
        config
    }

    /// Serialize listing records the way the catalog endpoint does.
    pub fn listing_body(records: &[Value]) -> Vec<u8> {
        serde_json::to_vec(&json!({ "kind": "webfonts#webfontList", "items": records }))
            .expect("serialize listing")
    }

    /// A client serving the listing, metadata, manifests and font files for `records`.
    pub fn catalog_client(&self, records: &[Value]) -> FakeClient {
        let client = FakeClient::new().with_route(
            &self.config().listing_url(),
            Self::listing_body(records),
        );

        for record in records {
            let family = record["family"].as_str().expect("family name");
            let details = json!({
                "family": family,
                "designers": [{"name": "Test Designer"}],
                "license": "ofl",
                "axes": [{"tag": "wght", "min": 100.0, "max": 900.0}],
            });
            client.set_route(
                &family_metadata_url(family).expect("metadata url"),
                format!(")]}}'{details}"),
            );

            let manifest = json!({
                "manifest": {
                    "files": [
                        {"filename": "OFL.txt", "contents": format!("{family} license")},
                        {"filename": "DESCRIPTION.en_us.html", "contents": "<p>About</p>"},
                    ],
                    "fileRefs": [],
                }
            });
            client.set_route(
                &download_list_url(family).expect("download url"),
                format!(")]}}'{manifest}"),
            );

            if let Some(files) = record["files"].as_object() {
                for (variant, url) in files {
                    let url = url.as_str().expect("font url");
                    client.set_route(url, format!("{family} {variant}").into_bytes());
                }
            }
        }

        client
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_routes_and_counts_requests() {
        let client = FakeClient::new().with_route("https://a.example/x", b"x".to_vec());
        assert_eq!(
            client.get("https://a.example/x", Agent::Default).await,
            Ok(b"x".to_vec())
        );
        assert_eq!(
            client.get("https://a.example/y", Agent::Browser).await,
            Err(HttpError::Status { status: 404 })
        );
        assert_eq!(client.total_requests(), 2);
        assert_eq!(client.requests_with_agent(Agent::Browser), 1);
    }

    #[test]
    fn catalog_client_routes_every_endpoint() {
        let fixture = TestFixture::new();
        let record = family_record("Open Sans", &["regular", "700"]);
        let client = fixture.catalog_client(&[record]);
        let routes = client.routes.lock().expect("routes lock");
        assert_eq!(routes.len(), 5);
        assert!(routes.contains_key(&font_url("Open Sans", "700")));
    }
}
