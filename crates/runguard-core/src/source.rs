//! Version sources: what is running, and what has been released.

use std::sync::Arc;

use crate::range::VersionRange;
use crate::types::RuntimeVersionSet;
use crate::version::VersionTriple;

/// Supplies the running system's component versions.
pub trait VersionSource {
    fn runtime_versions(&self) -> RuntimeVersionSet;
}

impl VersionSource for RuntimeVersionSet {
    fn runtime_versions(&self) -> RuntimeVersionSet {
        self.clone()
    }
}

/// Non-blocking access to a release catalog of the primary component.
///
/// Returns `None` while the catalog is unavailable; the guard then falls back
/// to probing synthesized versions.
pub trait CatalogProvider: Send + Sync {
    fn catalog(&self) -> Option<&ReleaseCatalog>;
}

impl<T: CatalogProvider + ?Sized> CatalogProvider for Arc<T> {
    fn catalog(&self) -> Option<&ReleaseCatalog> {
        (**self).catalog()
    }
}

/// Release catalog parse failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no release headings found in catalog ({lines} lines scanned)")]
pub struct CatalogParseError {
    pub lines: usize,
}

/// Every known release of the primary component, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseCatalog {
    releases: Vec<VersionTriple>,
}

impl ReleaseCatalog {
    pub fn new(releases: impl IntoIterator<Item = VersionTriple>) -> Self {
        let mut releases: Vec<_> = releases.into_iter().collect();
        releases.sort();
        releases.dedup();
        Self { releases }
    }

    /// Parse a markdown release log.
    ///
    /// Every heading whose first word is a version counts as a release:
    ///
    /// ```text
    /// ### 1.9.2 / 2021.04.23
    /// ## v1.9.1
    /// ```
    pub fn parse(text: &str) -> Result<Self, CatalogParseError> {
        let mut lines = 0;
        let releases: Vec<VersionTriple> = text
            .lines()
            .inspect(|_| lines += 1)
            .filter_map(|line| {
                let heading = line.trim_start().strip_prefix('#')?;
                let first = heading.trim_start_matches('#').split_whitespace().next()?;
                VersionTriple::parse(first)
            })
            .collect();

        if releases.is_empty() {
            return Err(CatalogParseError { lines });
        }

        Ok(Self::new(releases))
    }

    pub fn releases(&self) -> &[VersionTriple] {
        &self.releases
    }

    pub fn latest(&self) -> Option<VersionTriple> {
        self.releases.last().copied()
    }

    pub fn max_satisfying(&self, range: &VersionRange) -> Option<VersionTriple> {
        range.max_satisfying(&self.releases)
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

impl CatalogProvider for ReleaseCatalog {
    fn catalog(&self) -> Option<&ReleaseCatalog> {
        Some(self)
    }
}
