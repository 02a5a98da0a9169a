//! Runtime version guard.
//!
//! Lets a library or application declare the runtime versions it needs and
//! fail early with a clear error when the host does not provide them:
//!
//! - Semver range checks for the runtime, its compiler and its engine
//! - Upgrade advisories when a newer compatible version exists
//! - Release catalog parsing for accurate advisories
//!
//! # Quick Start
//!
//! ```
//! use runguard_core::{Component, RuntimeVersionSet, VersionGuard, VersionRequirement};
//!
//! # fn example() -> anyhow::Result<()> {
//! let running = RuntimeVersionSet::new()
//!     .with(Component::Runtime, "1.9.4")
//!     .with(Component::Compiler, "4.2.3");
//! let guard = VersionGuard::new(&running);
//!
//! // A bare range applies to the runtime.
//! guard.ensure_version(&">=1.8.0".into(), true, None)?;
//!
//! // Or constrain several components at once.
//! let requirement: VersionRequirement =
//!     [("runtime", "<1.9.5"), ("compiler", "4.0.0 - 4.5.2")].into_iter().collect();
//! guard.ensure_version(&requirement, true, Some("my-lib"))?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Advisories
//!
//! | Condition | Level |
//! |-----------|-------|
//! | A newer minor (or major) release satisfies the range | `warn` |
//! | Only a newer patch release satisfies the range | `info` |
//!
//! Advisories are computed for the runtime only. With a [`ReleaseCatalog`]
//! attached they consider real releases; without one, versions on the
//! running major are synthesized and scanned, and the advisory is marked
//! [`AdvisorySource::Estimate`].

pub mod error;
pub mod guard;
pub mod range;
pub mod source;
pub mod types;
pub mod version;

// Re-export main types
pub use error::{ErrorKind, GuardError, GuardResult};
pub use guard::{ensure_version, VersionGuard};
pub use range::VersionRange;
pub use source::{CatalogParseError, CatalogProvider, ReleaseCatalog, VersionSource};
pub use types::{
    Advisory, AdvisoryLevel, AdvisorySource, Component, GuardConfig, RuntimeVersionSet,
    VersionRequirement, MAX_SCAN_SPAN,
};
pub use version::{truncate_range, truncate_version, VersionTriple};
