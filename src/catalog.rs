//! Ordered collection of catalog sources.

use std::sync::Arc;

use crate::{
    config::Config,
    error::{Error, Result},
    http::HttpClient,
    source::{CatalogSource, GoogleSource},
};

/// Catalog sources consulted in order.
pub struct Catalog {
    /// Sources, highest priority first.
    sources: Vec<Box<dyn CatalogSource>>,
}

impl Catalog {
    /// Create a catalog from explicit sources.
    pub fn new(sources: Vec<Box<dyn CatalogSource>>) -> Self {
        Self { sources }
    }

    /// The default catalog: Google Fonts only.
    pub fn google(config: &Config, client: Arc<dyn HttpClient>) -> Self {
        Self::new(vec![Box::new(GoogleSource::new(config, client))])
    }

    /// Resolve typed input, trying each source in turn.
    ///
    /// Only "not found" moves on to the next source; any other failure
    /// aborts resolution.
    pub async fn resolve(&self, raw: &str, exact: bool) -> Result<(&dyn CatalogSource, String)> {
        for source in &self.sources {
            match source.resolve(raw, exact).await {
                Ok(family) => return Ok((source.as_ref(), family)),
                Err(Error::FamilyNotFound { .. }) => continue,
                Err(error) => return Err(error),
            }
        }
        Err(Error::FamilyNotFound {
            name: raw.to_string(),
        })
    }

    /// Find the source that lists an exact canonical family name.
    pub async fn source_for(&self, family: &str) -> Result<&dyn CatalogSource> {
        for source in &self.sources {
            if source.snapshot(false).await?.contains(family) {
                return Ok(source.as_ref());
            }
        }
        Err(Error::FamilyNotFound {
            name: family.to_string(),
        })
    }

    /// Families matching every keyword across all sources.
    pub async fn search(&self, keywords: &[String], exact: bool) -> Result<Vec<String>> {
        let mut results = Vec::new();
        for source in &self.sources {
            results.extend(source.search(keywords, exact).await?);
        }
        Ok(results)
    }

    /// Every family across all sources, refreshing when asked.
    pub async fn families(&self, refresh: bool) -> Result<Vec<String>> {
        let mut results = Vec::new();
        for source in &self.sources {
            results.extend(source.families(refresh).await?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testutil::{FakeClient, TestFixture, family_record};

    #[tokio::test]
    async fn falls_through_to_later_sources() {
        let first = TestFixture::new();
        let second = TestFixture::new();
        let catalog = Catalog::new(vec![
            Box::new(GoogleSource::new(
                &first.config(),
                Arc::new(first.catalog_client(&[family_record("Lato", &["regular"])])),
            )),
            Box::new(GoogleSource::new(
                &second.config(),
                Arc::new(second.catalog_client(&[family_record("Roboto", &["regular"])])),
            )),
        ]);

        let (_, family) = catalog.resolve("roboto", true).await.expect("resolve");
        assert_eq!(family, "Roboto");
        assert_eq!(catalog.families(false).await.expect("families"), vec!["Lato", "Roboto"]);

        let error = catalog.resolve("inter", true).await.err().expect("should fail");
        assert!(matches!(error, Error::FamilyNotFound { .. }));
    }

    #[tokio::test]
    async fn catalog_errors_stop_resolution() {
        let fixture = TestFixture::new();
        let catalog = Catalog::google(&fixture.config(), Arc::new(FakeClient::new()));

        let error = catalog.resolve("roboto", true).await.err().expect("should fail");
        assert!(matches!(error, Error::CatalogFetch { .. }));
    }
}
