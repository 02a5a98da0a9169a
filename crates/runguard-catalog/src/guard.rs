//! Version guard that waits for the release catalog before advising.

use std::sync::Arc;

use runguard_core::{
    Advisory, GuardConfig, GuardResult, VersionGuard, VersionRequirement, VersionSource,
};

use crate::remote::RemoteCatalog;

/// A [`VersionGuard`] wired to a shared [`RemoteCatalog`].
///
/// Several guards may share one catalog handle; it is still loaded once.
#[derive(Debug, Clone)]
pub struct CatalogGuard {
    guard: VersionGuard,
    catalog: Arc<RemoteCatalog>,
}

impl CatalogGuard {
    pub fn new(source: &impl VersionSource, catalog: Arc<RemoteCatalog>) -> Self {
        let guard = VersionGuard::new(source).with_catalog(catalog.clone());
        Self { guard, catalog }
    }

    pub fn with_config(mut self, config: GuardConfig) -> Self {
        self.guard = self.guard.with_config(config);
        self
    }

    pub fn guard(&self) -> &VersionGuard {
        &self.guard
    }

    pub fn catalog(&self) -> &RemoteCatalog {
        &self.catalog
    }

    /// Check `requirement`, then load the catalog and advise if asked to.
    ///
    /// Malformed requirements and range violations are reported before any
    /// I/O; the catalog is only loaded once every component passed.
    pub async fn ensure_version(
        &self,
        requirement: &VersionRequirement,
        emit_advisories: bool,
        caller: Option<&str>,
    ) -> GuardResult<()> {
        self.guard.check(requirement, caller)?;
        if !emit_advisories {
            return Ok(());
        }

        self.catalog.load().await;
        self.guard.ensure_version(requirement, true, caller)
    }

    pub async fn assess(
        &self,
        requirement: &VersionRequirement,
        caller: Option<&str>,
    ) -> GuardResult<Vec<Advisory>> {
        self.guard.check(requirement, caller)?;
        self.catalog.load().await;
        self.guard.assess(requirement, caller)
    }
}
