//! The version guard.
//!
//! Components are always evaluated in [`Component::ALL`] order, never in the
//! order a caller's mapping happens to list them, so errors and advisories
//! are reproducible. The first violation aborts the check.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{GuardError, GuardResult};
use crate::range::VersionRange;
use crate::source::{CatalogProvider, VersionSource};
use crate::types::{
    Advisory, AdvisoryLevel, AdvisorySource, Component, GuardConfig, RuntimeVersionSet,
    VersionRequirement, MAX_SCAN_SPAN,
};
use crate::version::{truncate_range, truncate_version, VersionTriple};

/// Checks version requirements against the running system.
#[derive(Clone)]
pub struct VersionGuard {
    versions: RuntimeVersionSet,
    catalog: Option<Arc<dyn CatalogProvider>>,
    config: GuardConfig,
}

impl std::fmt::Debug for VersionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionGuard")
            .field("versions", &self.versions)
            .field(
                "catalog_loaded",
                &self.catalog.as_ref().is_some_and(|c| c.catalog().is_some()),
            )
            .field("config", &self.config)
            .finish()
    }
}

impl VersionGuard {
    /// Snapshot the running versions from `source`.
    pub fn new(source: &impl VersionSource) -> Self {
        Self {
            versions: source.runtime_versions(),
            catalog: None,
            config: GuardConfig::default(),
        }
    }

    /// Use real releases for advisories on the primary component.
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogProvider>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn versions(&self) -> &RuntimeVersionSet {
        &self.versions
    }

    /// Fail unless every required component satisfies its range.
    ///
    /// With `emit_advisories`, newer compatible versions are reported through
    /// `tracing`: minor upgrades at `warn`, patch upgrades at `info`.
    /// `caller` identifies the code declaring the requirement and is included
    /// in errors and advisories.
    pub fn ensure_version(
        &self,
        requirement: &VersionRequirement,
        emit_advisories: bool,
        caller: Option<&str>,
    ) -> GuardResult<()> {
        let advisories = self.evaluate(requirement, emit_advisories, caller)?;
        for advisory in &advisories {
            emit(advisory);
        }
        Ok(())
    }

    /// Satisfaction check only: no advisory is computed and nothing is logged.
    pub fn check(
        &self,
        requirement: &VersionRequirement,
        caller: Option<&str>,
    ) -> GuardResult<()> {
        self.evaluate(requirement, false, caller).map(|_| ())
    }

    /// Same checks as [`ensure_version`](Self::ensure_version), returning the
    /// advisories instead of logging them.
    pub fn assess(
        &self,
        requirement: &VersionRequirement,
        caller: Option<&str>,
    ) -> GuardResult<Vec<Advisory>> {
        self.evaluate(requirement, true, caller)
    }

    fn evaluate(
        &self,
        requirement: &VersionRequirement,
        advise: bool,
        caller: Option<&str>,
    ) -> GuardResult<Vec<Advisory>> {
        let ranges = requirement.normalize()?;
        let mut advisories = Vec::new();

        for component in Component::ALL {
            let Some(required) = ranges.get(&component) else {
                continue;
            };
            let Some(reported) = self.versions.get(component) else {
                debug!(component = %component, "running version unknown, skipping");
                continue;
            };

            let running = truncate_version(reported);
            let range = VersionRange::parse(&truncate_range(required))?;

            let satisfied = VersionTriple::parse(&running).filter(|triple| range.matches(triple));
            let Some(running) = satisfied else {
                return Err(GuardError::VersionMismatch {
                    component,
                    running,
                    required: required.clone(),
                    caller: caller.map(String::from),
                });
            };

            if !advise {
                continue;
            }
            if let Some(advisory) = self.advise(component, running, &range, required, caller) {
                advisories.push(advisory);
            }
        }

        Ok(advisories)
    }

    fn advise(
        &self,
        component: Component,
        running: VersionTriple,
        range: &VersionRange,
        required: &str,
        caller: Option<&str>,
    ) -> Option<Advisory> {
        let (latest, source) = self.max_satisfying(component, running, range)?;
        let level = advisory_level(running, latest)?;

        Some(Advisory {
            component,
            level,
            source,
            running,
            latest,
            range: required.to_string(),
            caller: caller.map(String::from),
        })
    }

    fn max_satisfying(
        &self,
        component: Component,
        running: VersionTriple,
        range: &VersionRange,
    ) -> Option<(VersionTriple, AdvisorySource)> {
        // Release data only exists for the primary component.
        if !component.is_primary() {
            debug!(component = %component, "no release data, skipping advisory");
            return None;
        }

        match self.catalog.as_ref().and_then(|c| c.catalog()) {
            Some(catalog) => catalog
                .max_satisfying(range)
                .map(|latest| (latest, AdvisorySource::Catalog)),
            None => Some((
                self.probe_max_satisfying(running, range),
                AdvisorySource::Estimate,
            )),
        }
    }

    /// Highest synthesized version on the running major satisfying `range`.
    ///
    /// Minors are probed from `running.minor + minor_scan_span` down; within a
    /// minor, patches from the top of the patch span down. `running` itself
    /// satisfies the range, so the scan always ends there at the latest.
    /// Both spans are capped at [`MAX_SCAN_SPAN`], since the config fields
    /// are public.
    fn probe_max_satisfying(&self, running: VersionTriple, range: &VersionRange) -> VersionTriple {
        let minor_span = self.config.minor_scan_span.min(MAX_SCAN_SPAN);
        let patch_span = self.config.patch_scan_span.min(MAX_SCAN_SPAN);
        let top_minor = running.minor.saturating_add(minor_span);

        for minor in (running.minor..=top_minor).rev() {
            let (floor, top_patch) = if minor == running.minor {
                (running.patch, running.patch.saturating_add(patch_span))
            } else {
                (0, patch_span)
            };

            for patch in (floor..=top_patch).rev() {
                let candidate = VersionTriple::new(running.major, minor, patch);
                if range.matches(&candidate) {
                    return candidate;
                }
            }
        }

        running
    }
}

/// Minor takes precedence: a minor advisory is never followed by a patch one.
fn advisory_level(running: VersionTriple, latest: VersionTriple) -> Option<AdvisoryLevel> {
    if latest <= running {
        None
    } else if (latest.major, latest.minor) != (running.major, running.minor) {
        Some(AdvisoryLevel::Minor)
    } else {
        Some(AdvisoryLevel::Patch)
    }
}

fn emit(advisory: &Advisory) {
    match advisory.level {
        AdvisoryLevel::Minor => warn!(
            component = %advisory.component,
            source = ?advisory.source,
            running = %advisory.running,
            latest = %advisory.latest,
            range = %advisory.range,
            caller = ?advisory.caller,
            "{}; consider upgrading",
            advisory
        ),
        AdvisoryLevel::Patch => info!(
            component = %advisory.component,
            source = ?advisory.source,
            running = %advisory.running,
            latest = %advisory.latest,
            range = %advisory.range,
            caller = ?advisory.caller,
            "{}",
            advisory
        ),
    }
}

/// One-shot check against `source` without keeping a guard around.
pub fn ensure_version(
    source: &impl VersionSource,
    requirement: &VersionRequirement,
    emit_advisories: bool,
    caller: Option<&str>,
) -> GuardResult<()> {
    VersionGuard::new(source).ensure_version(requirement, emit_advisories, caller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ReleaseCatalog;

    fn v(major: u64, minor: u64, patch: u64) -> VersionTriple {
        VersionTriple::new(major, minor, patch)
    }

    fn guard(runtime: &str) -> VersionGuard {
        VersionGuard::new(&RuntimeVersionSet::new().with(Component::Runtime, runtime))
    }

    #[test]
    fn test_advisory_level() {
        assert_eq!(advisory_level(v(1, 9, 4), v(1, 9, 4)), None);
        assert_eq!(advisory_level(v(1, 9, 4), v(1, 9, 2)), None);
        assert_eq!(advisory_level(v(1, 9, 4), v(1, 9, 7)), Some(AdvisoryLevel::Patch));
        assert_eq!(advisory_level(v(1, 9, 4), v(1, 26, 0)), Some(AdvisoryLevel::Minor));
        assert_eq!(advisory_level(v(1, 9, 4), v(2, 9, 4)), Some(AdvisoryLevel::Minor));
    }

    #[test]
    fn test_probe_stays_within_scan_span() {
        let guard = guard("1.9.4").with_config(
            GuardConfig::default()
                .with_minor_scan_span(5)
                .with_patch_scan_span(3),
        );
        let range = VersionRange::parse(">=1.8.0").unwrap();
        assert_eq!(guard.probe_max_satisfying(v(1, 9, 4), &range), v(1, 14, 3));
    }

    #[test]
    fn test_probe_finds_highest_patch_on_running_minor() {
        let guard = guard("1.9.4");
        let range = VersionRange::parse("~1.9.2").unwrap();
        assert_eq!(guard.probe_max_satisfying(v(1, 9, 4), &range), v(1, 9, 104));

        let range = VersionRange::parse("<1.9.5").unwrap();
        assert_eq!(guard.probe_max_satisfying(v(1, 9, 4), &range), v(1, 9, 4));
    }

    #[test]
    fn test_probe_skips_gaps_between_or_branches() {
        let guard = guard("1.9.4");
        let range = VersionRange::parse("1.9.4 || 1.12.7").unwrap();
        assert_eq!(guard.probe_max_satisfying(v(1, 9, 4), &range), v(1, 12, 7));
    }

    #[test]
    fn test_catalog_takes_precedence_over_probe() {
        let catalog = ReleaseCatalog::new([v(1, 9, 4), v(1, 9, 6), v(1, 10, 0)]);
        let guard = guard("1.9.4").with_catalog(Arc::new(catalog));
        let range = VersionRange::parse("~1.9").unwrap();
        assert_eq!(
            guard.max_satisfying(Component::Runtime, v(1, 9, 4), &range),
            Some((v(1, 9, 6), AdvisorySource::Catalog))
        );
    }

    #[test]
    fn test_advisory_without_catalog_is_estimate() {
        let advisories = guard("1.9.4").assess(&">=1.8.0".into(), None).unwrap();
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].source, AdvisorySource::Estimate);
        assert_eq!(advisories[0].latest, v(1, 109, 100));
        assert!(advisories[0].to_string().starts_with("runtime may have"));
    }

    #[test]
    fn test_oversized_spans_are_capped_at_scan_time() {
        let guard = guard("1.9.4").with_config(GuardConfig {
            minor_scan_span: u64::MAX,
            patch_scan_span: 0,
        });

        let range = VersionRange::parse("^1").unwrap();
        assert_eq!(
            guard.probe_max_satisfying(v(1, 9, 4), &range),
            v(1, 9 + MAX_SCAN_SPAN, 0)
        );
    }

    #[test]
    fn test_check_reports_mismatch_without_advising() {
        let catalog = ReleaseCatalog::new([v(1, 9, 4), v(1, 26, 0)]);
        let guard = guard("1.9.4").with_catalog(Arc::new(catalog));

        assert!(guard.check(&">=1.8.0".into(), None).is_ok());
        assert!(matches!(
            guard.check(&"1.9.3".into(), Some("app")),
            Err(GuardError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_non_primary_components_are_not_advised() {
        let guard = guard("1.9.4");
        let range = VersionRange::parse(">=4").unwrap();
        assert_eq!(guard.max_satisfying(Component::Compiler, v(4, 2, 3), &range), None);
    }

    #[test]
    fn test_debug_reports_catalog_state() {
        let guard = guard("1.9.4");
        assert!(format!("{:?}", guard).contains("catalog_loaded: false"));
    }
}
