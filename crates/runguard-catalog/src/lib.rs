//! Release catalog loading for the runguard version guard.
//!
//! Advisories about newer compatible runtime versions are most accurate when
//! they consider real releases. This crate loads a markdown release log from
//! a URL or a file, at most once per [`RemoteCatalog`] handle, and plugs it
//! into the guard:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use runguard_catalog::{CatalogConfig, CatalogGuard, RemoteCatalog};
//! use runguard_core::{Component, RuntimeVersionSet};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let catalog = Arc::new(RemoteCatalog::new(
//!     CatalogConfig::default().with_url("https://example.com/Releases.md"),
//! )?);
//! let running = RuntimeVersionSet::new().with(Component::Runtime, "1.9.4");
//!
//! let guard = CatalogGuard::new(&running, catalog);
//! guard.ensure_version(&">=1.8.0".into(), true, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! A catalog that cannot be loaded only degrades advisories; it never fails
//! a version check.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `RUNGUARD_CATALOG_URL` | Release log URL |
//! | `RUNGUARD_CATALOG_PATH` | Release log file (used when no URL is set) |
//! | `RUNGUARD_CATALOG_TIMEOUT` | Request timeout in seconds (default: 30) |

pub mod config;
pub mod error;
pub mod guard;
pub mod remote;

pub use config::{CatalogConfig, CatalogSource};
pub use error::{CatalogError, CatalogResult};
pub use guard::CatalogGuard;
pub use remote::RemoteCatalog;
