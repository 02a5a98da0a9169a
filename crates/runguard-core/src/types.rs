//! Data model: components, running versions, requirements and advisories.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};
use crate::version::VersionTriple;

/// A runtime component whose version can be constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    /// The runtime itself. Bare range requirements apply to this component.
    Runtime,
    /// The bundled compiler or transpiler.
    Compiler,
    /// The embedded execution engine.
    Engine,
}

impl Component {
    /// Canonical evaluation order.
    pub const ALL: [Component; 3] = [Component::Runtime, Component::Compiler, Component::Engine];

    /// Component that bare range requirements are scoped to.
    pub const PRIMARY: Component = Component::Runtime;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Compiler => "compiler",
            Self::Engine => "engine",
        }
    }

    pub fn is_primary(&self) -> bool {
        *self == Self::PRIMARY
    }

    /// Comma separated list of the recognized keys, for error messages.
    pub fn allowed_keys() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown component: {}", s))
    }
}

/// Raw version strings reported by the running system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeVersionSet {
    versions: BTreeMap<Component, String>,
}

impl RuntimeVersionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reported version of a component.
    pub fn with(mut self, component: Component, version: impl Into<String>) -> Self {
        self.versions.insert(component, version.into());
        self
    }

    pub fn get(&self, component: Component) -> Option<&str> {
        self.versions.get(&component).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// A version requirement as supplied by the caller.
///
/// Deserializes from either a JSON string or an object of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionRequirement {
    /// A single range applied to [`Component::PRIMARY`].
    Primary(String),

    /// Ranges keyed by component name. Unknown names are ignored.
    ByComponent(BTreeMap<String, String>),
}

impl VersionRequirement {
    /// Build a requirement from a dynamically typed value.
    ///
    /// `null`, numbers, arrays and objects with non-string values are
    /// rejected as malformed.
    pub fn from_value(value: serde_json::Value) -> GuardResult<Self> {
        match value {
            serde_json::Value::Null => Err(GuardError::malformed(format!(
                "requirement is missing; expected a range or a mapping of {}",
                Component::allowed_keys()
            ))),
            serde_json::Value::String(range) => Ok(Self::Primary(range)),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| match value {
                    serde_json::Value::String(range) => Ok((key, range)),
                    other => Err(GuardError::malformed(format!(
                        "range for '{}' must be a string, got {}",
                        key, other
                    ))),
                })
                .collect::<GuardResult<BTreeMap<_, _>>>()
                .map(Self::ByComponent),
            other => Err(GuardError::malformed(format!(
                "requirement must be a range string or a mapping, got {}",
                other
            ))),
        }
    }

    /// Normalize to ranges keyed by recognized component.
    ///
    /// Fails when no recognized component remains.
    pub fn normalize(&self) -> GuardResult<BTreeMap<Component, String>> {
        let normalized: BTreeMap<Component, String> = match self {
            Self::Primary(range) => BTreeMap::from([(Component::PRIMARY, range.clone())]),
            Self::ByComponent(map) => map
                .iter()
                .filter_map(|(key, range)| {
                    key.parse::<Component>()
                        .ok()
                        .map(|component| (component, range.clone()))
                })
                .collect(),
        };

        if normalized.is_empty() {
            return Err(GuardError::malformed(format!(
                "no recognized component; allowed keys: {}",
                Component::allowed_keys()
            )));
        }

        Ok(normalized)
    }
}

impl From<&str> for VersionRequirement {
    fn from(range: &str) -> Self {
        Self::Primary(range.to_string())
    }
}

impl From<String> for VersionRequirement {
    fn from(range: String) -> Self {
        Self::Primary(range)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VersionRequirement {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::ByComponent(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// How far behind the newest compatible version the running one is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryLevel {
    /// A newer minor (or major) release satisfies the range. Logged at `warn`.
    Minor,
    /// Only a newer patch release satisfies the range. Logged at `info`.
    Patch,
}

/// Where the newer version in an [`Advisory`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorySource {
    /// A release listed in the loaded release catalog.
    Catalog,
    /// A synthesized version; no release data was available.
    Estimate,
}

/// A non-fatal notice that a newer compatible version exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub component: Component,
    pub level: AdvisoryLevel,
    pub source: AdvisorySource,
    pub running: VersionTriple,
    /// Highest satisfying version. For estimates this is an upper bound of
    /// the scan, not a known release.
    pub latest: VersionTriple,
    /// Range as supplied by the caller.
    pub range: String,
    #[serde(default)]
    pub caller: Option<String>,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.level {
            AdvisoryLevel::Minor => "a newer minor release",
            AdvisoryLevel::Patch => "a patch release",
        };
        match self.source {
            AdvisorySource::Catalog => write!(
                f,
                "{} {} is {} satisfying \"{}\" (running {})",
                self.component, self.latest, what, self.range, self.running
            )?,
            AdvisorySource::Estimate => write!(
                f,
                "{} may have {} satisfying \"{}\" (running {}, range allows up to {})",
                self.component, what, self.range, self.running, self.latest
            )?,
        }
        if let Some(caller) = &self.caller {
            write!(f, " for {}", caller)?;
        }
        Ok(())
    }
}

/// Upper bound for both scan spans.
pub const MAX_SCAN_SPAN: u64 = 1000;

/// Guard tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Minor versions above the running one probed when no catalog is loaded.
    /// Clamped to [`MAX_SCAN_SPAN`].
    #[serde(default = "default_scan_span", deserialize_with = "deserialize_scan_span")]
    pub minor_scan_span: u64,

    /// Patch versions above the running one probed when no catalog is loaded.
    /// Clamped to [`MAX_SCAN_SPAN`].
    #[serde(default = "default_scan_span", deserialize_with = "deserialize_scan_span")]
    pub patch_scan_span: u64,
}

fn default_scan_span() -> u64 {
    100
}

fn deserialize_scan_span<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(|span| span.min(MAX_SCAN_SPAN))
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            minor_scan_span: default_scan_span(),
            patch_scan_span: default_scan_span(),
        }
    }
}

impl GuardConfig {
    pub fn with_minor_scan_span(mut self, span: u64) -> Self {
        self.minor_scan_span = span.min(MAX_SCAN_SPAN);
        self
    }

    pub fn with_patch_scan_span(mut self, span: u64) -> Self {
        self.patch_scan_span = span.min(MAX_SCAN_SPAN);
        self
    }
}
