//! Lazily loaded release catalog.
//!
//! The first `load()` fetches and parses the release log; concurrent callers
//! await that same load and every later caller gets the memoized result.
//! Failures are memoized too: advisories are optional, so a broken catalog
//! is logged once and then treated as absent.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use runguard_core::{CatalogProvider, ReleaseCatalog};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::{CatalogConfig, CatalogSource};
use crate::error::{CatalogError, CatalogResult};

const USER_AGENT_VALUE: &str = concat!("runguard-catalog/", env!("CARGO_PKG_VERSION"));

/// Release catalog backed by a URL or file, loaded at most once.
#[derive(Debug)]
pub struct RemoteCatalog {
    config: CatalogConfig,
    client: reqwest::Client,
    cell: OnceCell<Option<ReleaseCatalog>>,
}

impl RemoteCatalog {
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| CatalogError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            config,
            client,
            cell: OnceCell::new(),
        })
    }

    pub fn from_env() -> CatalogResult<Self> {
        Self::new(CatalogConfig::from_env())
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Load the catalog once; later calls return the memoized outcome.
    pub async fn load(&self) -> Option<&ReleaseCatalog> {
        self.cell
            .get_or_init(|| async {
                match self.fetch().await {
                    Ok(catalog) => {
                        debug!(releases = catalog.len(), "release catalog loaded");
                        Some(catalog)
                    }
                    Err(e) => {
                        warn!(error = %e, "release catalog unavailable, advisories will be approximate");
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    /// Whether a load has completed (successfully or not).
    pub fn is_settled(&self) -> bool {
        self.cell.initialized()
    }

    /// Fetch and parse the release log, bypassing the memoized result.
    pub async fn fetch(&self) -> CatalogResult<ReleaseCatalog> {
        let text = match &self.config.source {
            None => {
                return Err(CatalogError::Config {
                    message: "no catalog source configured".to_string(),
                })
            }
            Some(CatalogSource::Url(url)) => self.fetch_url(url).await?,
            Some(CatalogSource::Path(path)) => {
                debug!(path = %path.display(), "reading release catalog");
                tokio::fs::read_to_string(path).await?
            }
        };

        Ok(ReleaseCatalog::parse(&text)?)
    }

    async fn fetch_url(&self, url: &str) -> CatalogResult<String> {
        debug!(url = %url, "fetching release catalog");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(CatalogError::Network {
                message: format!("HTTP {}: {}", status.as_u16(), snippet),
            });
        }

        response
            .text()
            .await
            .map_err(|e| CatalogError::InvalidResponse {
                message: format!("failed to read catalog body: {}", e),
            })
    }
}

impl CatalogProvider for RemoteCatalog {
    fn catalog(&self) -> Option<&ReleaseCatalog> {
        self.cell.get().and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_url() {
        let result = RemoteCatalog::new(CatalogConfig::default().with_url("file:///etc/passwd"));
        assert!(matches!(result, Err(CatalogError::Config { .. })));
    }

    #[tokio::test]
    async fn test_unconfigured_catalog_settles_empty() {
        let catalog = RemoteCatalog::new(CatalogConfig::default()).unwrap();
        assert!(!catalog.is_settled());
        assert!(catalog.catalog().is_none());

        assert!(catalog.load().await.is_none());
        assert!(catalog.is_settled());
        assert!(matches!(
            catalog.fetch().await,
            Err(CatalogError::Config { .. })
        ));
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT_VALUE.starts_with("runguard-catalog/"));
    }
}
