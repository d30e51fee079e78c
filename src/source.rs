//! Catalog backends.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    http::{Agent, HttpClient},
    metadata::{FamilyMetadata, ManifestFile, Supplementary},
    resolver,
    store::{CatalogSnapshot, CatalogStore},
    variant::weight_and_italic,
};

/// CSS2 endpoint serving `@font-face` rules.
const CSS2_URL: &str = "https://fonts.googleapis.com/css2";

/// A catalog of font families that can be searched and downloaded from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short identifier used in messages.
    fn id(&self) -> &'static str;

    /// Current snapshot of the catalog, refreshed when `refresh` is set.
    async fn snapshot(&self, refresh: bool) -> Result<Arc<CatalogSnapshot>>;

    /// Designers, license and axes for a canonical family.
    async fn supplementary(&self, family: &str) -> Result<Supplementary>;

    /// License and description files for a canonical family.
    async fn manifest(&self, family: &str) -> Result<Vec<ManifestFile>>;

    /// Stylesheet declaring `variants` of a canonical family as webfonts.
    async fn webfont_css(&self, family: &str, variants: &[String], display: &str)
    -> Result<String>;

    /// Family names in catalog order.
    async fn families(&self, refresh: bool) -> Result<Vec<String>> {
        let snapshot = self.snapshot(refresh).await?;
        Ok(snapshot.names().map(str::to_string).collect())
    }

    /// Base catalog record for a canonical family.
    async fn metadata(&self, family: &str) -> Result<FamilyMetadata> {
        let snapshot = self.snapshot(false).await?;
        snapshot
            .get(family)
            .cloned()
            .ok_or_else(|| Error::FamilyNotFound {
                name: family.to_string(),
            })
    }

    /// Catalog record with supplementary fields filled in.
    async fn detailed(&self, family: &str) -> Result<FamilyMetadata> {
        let mut metadata = self.metadata(family).await?;
        metadata.supplementary = Some(self.supplementary(family).await?);
        Ok(metadata)
    }

    /// Resolve typed input to a family of this catalog.
    async fn resolve(&self, raw: &str, exact: bool) -> Result<String> {
        let snapshot = self.snapshot(false).await?;
        resolver::resolve(snapshot.names(), raw, exact)
    }

    /// Families matching every keyword.
    async fn search(&self, keywords: &[String], exact: bool) -> Result<Vec<String>> {
        let snapshot = self.snapshot(false).await?;
        Ok(resolver::search(snapshot.names(), keywords, exact))
    }
}

/// The Google Fonts catalog.
pub struct GoogleSource {
    /// Cached catalog data.
    store: CatalogStore,
}

impl GoogleSource {
    /// Create a source caching under the configured directories.
    pub fn new(config: &Config, client: Arc<dyn HttpClient>) -> Self {
        Self {
            store: CatalogStore::new(config, client),
        }
    }
}

#[async_trait]
impl CatalogSource for GoogleSource {
    fn id(&self) -> &'static str {
        "google"
    }

    async fn snapshot(&self, refresh: bool) -> Result<Arc<CatalogSnapshot>> {
        self.store.load(refresh).await
    }

    async fn supplementary(&self, family: &str) -> Result<Supplementary> {
        self.store.supplementary(family).await
    }

    async fn manifest(&self, family: &str) -> Result<Vec<ManifestFile>> {
        self.store.manifest(family).await
    }

    async fn webfont_css(
        &self,
        family: &str,
        variants: &[String],
        display: &str,
    ) -> Result<String> {
        let url = css2_url(family, variants, display)?;
        let body = self.store.fetch(&url, Agent::Browser).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Build a CSS2 request for `variants` of `family`.
///
/// Variants become `ital,wght` tuples sorted the way the API requires; the
/// `ital` axis is only requested when an italic variant is present.
pub fn css2_url(family: &str, variants: &[String], display: &str) -> Result<String> {
    let mut tuples = variants
        .iter()
        .map(|variant| weight_and_italic(variant))
        .collect::<Result<Vec<_>>>()?;
    tuples.sort_by_key(|(weight, italic)| (*italic, *weight));
    tuples.dedup();

    let family_param = if tuples.is_empty() {
        family.to_string()
    } else if tuples.iter().any(|(_, italic)| *italic) {
        let axes = tuples
            .iter()
            .map(|(weight, italic)| format!("{},{weight}", u8::from(*italic)))
            .collect::<Vec<_>>()
            .join(";");
        format!("{family}:ital,wght@{axes}")
    } else {
        let axes = tuples
            .iter()
            .map(|(weight, _)| weight.to_string())
            .collect::<Vec<_>>()
            .join(";");
        format!("{family}:wght@{axes}")
    };

    Url::parse_with_params(CSS2_URL, &[("family", family_param.as_str()), ("display", display)])
        .map(String::from)
        .map_err(|_| Error::InvalidUrl {
            url: CSS2_URL.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testutil::{TestFixture, family_record};

    #[test]
    fn builds_css2_tuples() {
        let variants = vec!["700i".to_string(), "400".to_string(), "700".to_string()];
        let url = css2_url("Open Sans", &variants, "swap").expect("url");
        let parsed = Url::parse(&url).expect("parse");
        let family = parsed
            .query_pairs()
            .find(|(key, _)| key == "family")
            .map(|(_, value)| value.into_owned());
        assert_eq!(family.as_deref(), Some("Open Sans:ital,wght@0,400;0,700;1,700"));
    }

    #[test]
    fn omits_ital_axis_for_upright_variants() {
        let variants = vec!["regular".to_string(), "300".to_string()];
        let url = css2_url("Lato", &variants, "swap").expect("url");
        let parsed = Url::parse(&url).expect("parse");
        let family = parsed
            .query_pairs()
            .find(|(key, _)| key == "family")
            .map(|(_, value)| value.into_owned());
        assert_eq!(family.as_deref(), Some("Lato:wght@300;400"));
    }

    #[tokio::test]
    async fn detailed_fills_supplementary_fields() {
        let fixture = TestFixture::new();
        let client = Arc::new(fixture.catalog_client(&[family_record("Roboto", &["regular"])]));
        let source = GoogleSource::new(&fixture.config(), client);

        let base = source.metadata("Roboto").await.expect("metadata");
        assert!(base.supplementary.is_none());
        let detailed = source.detailed("Roboto").await.expect("detailed");
        let supplementary = detailed.supplementary.expect("supplementary");
        assert_eq!(supplementary.axes.len(), 1);
    }

    #[tokio::test]
    async fn resolves_and_searches_snapshot() {
        let fixture = TestFixture::new();
        let records = [
            family_record("Open Sans", &["regular"]),
            family_record("Open Sans Condensed", &["300"]),
            family_record("PT Sans", &["regular"]),
        ];
        let client = Arc::new(fixture.catalog_client(&records));
        let source = GoogleSource::new(&fixture.config(), client);

        let keywords = vec!["open".to_string(), "sans".to_string()];
        let found = source.search(&keywords, false).await.expect("search");
        assert_eq!(found, vec!["Open Sans", "Open Sans Condensed"]);
        let family = source.resolve("pt_sans", true).await.expect("resolve");
        assert_eq!(family, "PT Sans");
    }
}
