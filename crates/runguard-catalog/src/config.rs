//! Catalog loader configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Where the release log is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// HTTP(S) URL of a plaintext/markdown release log.
    Url(String),
    /// Local file holding the same content.
    Path(PathBuf),
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "url:{}", url),
            Self::Path(path) => write!(f, "path:{}", path.display()),
        }
    }
}

/// Catalog loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Release log location. Without one, advisories fall back to probing.
    #[serde(default)]
    pub source: Option<CatalogSource>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl CatalogConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `RUNGUARD_CATALOG_URL` | Release log URL (takes precedence) |
    /// | `RUNGUARD_CATALOG_PATH` | Release log file |
    /// | `RUNGUARD_CATALOG_TIMEOUT` | Request timeout in seconds (default: 30) |
    pub fn from_env() -> Self {
        let source = std::env::var("RUNGUARD_CATALOG_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(CatalogSource::Url)
            .or_else(|| {
                std::env::var_os("RUNGUARD_CATALOG_PATH")
                    .filter(|v| !v.is_empty())
                    .map(|v| CatalogSource::Path(PathBuf::from(v)))
            });

        Self {
            source,
            timeout_secs: std::env::var("RUNGUARD_CATALOG_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
        }
    }

    /// Set the release log URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.source = Some(CatalogSource::Url(url.into()));
        self
    }

    /// Set the release log file.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(CatalogSource::Path(path.into()));
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Reject URLs that are not absolute http(s) URLs.
    pub fn validate(&self) -> CatalogResult<()> {
        let Some(CatalogSource::Url(raw)) = &self.source else {
            return Ok(());
        };

        let url = url::Url::parse(raw).map_err(|e| CatalogError::Config {
            message: format!("invalid catalog URL '{}': {}", raw, e),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(CatalogError::Config {
                message: format!("unsupported catalog URL scheme '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("RUNGUARD_CATALOG_URL");
        std::env::remove_var("RUNGUARD_CATALOG_PATH");
        std::env::remove_var("RUNGUARD_CATALOG_TIMEOUT");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = CatalogConfig::from_env();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    #[serial]
    fn test_from_env_url_takes_precedence() {
        clear_env();
        std::env::set_var("RUNGUARD_CATALOG_URL", "https://example.com/Releases.md");
        std::env::set_var("RUNGUARD_CATALOG_PATH", "/tmp/Releases.md");
        std::env::set_var("RUNGUARD_CATALOG_TIMEOUT", "5");

        let config = CatalogConfig::from_env();
        clear_env();

        assert_eq!(
            config.source,
            Some(CatalogSource::Url(
                "https://example.com/Releases.md".to_string()
            ))
        );
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    #[serial]
    fn test_from_env_path() {
        clear_env();
        std::env::set_var("RUNGUARD_CATALOG_PATH", "/tmp/Releases.md");
        std::env::set_var("RUNGUARD_CATALOG_TIMEOUT", "not-a-number");

        let config = CatalogConfig::from_env();
        clear_env();

        assert_eq!(
            config.source,
            Some(CatalogSource::Path(PathBuf::from("/tmp/Releases.md")))
        );
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_validate_urls() {
        assert!(CatalogConfig::default().validate().is_ok());
        assert!(CatalogConfig::default()
            .with_url("https://example.com/Releases.md")
            .validate()
            .is_ok());
        assert!(CatalogConfig::default()
            .with_path("relative/Releases.md")
            .validate()
            .is_ok());

        let err = CatalogConfig::default()
            .with_url("ftp://example.com/Releases.md")
            .validate()
            .unwrap_err();
        assert!(matches!(err, CatalogError::Config { .. }));

        assert!(CatalogConfig::default()
            .with_url("not a url")
            .validate()
            .is_err());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(
            CatalogSource::Url("https://example.com/r.md".to_string()).to_string(),
            "url:https://example.com/r.md"
        );
        assert_eq!(
            CatalogSource::Path(PathBuf::from("/tmp/r.md")).to_string(),
            "path:/tmp/r.md"
        );
    }
}
