//! Version triples and qualifier truncation.
//!
//! Runtimes report versions with extra segments (`9.1.269.2`) or qualifiers
//! (`1.9.4-rc.1`). Everything here reduces them to a plain
//! `major.minor.patch` triple before comparison.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A `major.minor.patch` version.
///
/// Field order gives the derived `Ord` its lexicographic semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionTriple {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionTriple {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version string.
    ///
    /// Requires at least three numeric components. Components past the third
    /// are ignored, as is a qualifier glued to the patch number
    /// (`4-rc.1`, `4+build.7`). A leading `v` is accepted.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let mut parts = trimmed.split('.');
        let major = parse_numeric(parts.next()?, false)?;
        let minor = parse_numeric(parts.next()?, false)?;
        let patch = parse_numeric(parts.next()?, true)?;

        Some(Self::new(major, minor, patch))
    }

    pub(crate) fn to_semver(self) -> semver::Version {
        semver::Version::new(self.major, self.minor, self.patch)
    }
}

fn parse_numeric(part: &str, allow_qualifier: bool) -> Option<u64> {
    let digits_end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    if digits_end == 0 {
        return None;
    }

    let rest = &part[digits_end..];
    if !rest.is_empty() && !(allow_qualifier && rest.starts_with(['-', '+'])) {
        return None;
    }

    part[..digits_end].parse().ok()
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionTriple {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("not a major.minor.patch version: {}", s))
    }
}

impl From<VersionTriple> for semver::Version {
    fn from(triple: VersionTriple) -> Self {
        triple.to_semver()
    }
}

/// Truncate a reported version to at most three numeric components.
///
/// Strings that do not look like a version are returned trimmed but
/// otherwise untouched so the caller can report them verbatim.
pub fn truncate_version(raw: &str) -> String {
    match VersionTriple::parse(raw) {
        Some(triple) => triple.to_string(),
        None => raw.trim().to_string(),
    }
}

fn qualified_triple() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // A full triple followed by extra numeric segments and/or a
        // pre-release or build qualifier.
        Regex::new(r"(\d+\.\d+\.\d+)(?:\.\d+)*(?:[-+][0-9A-Za-z][0-9A-Za-z.+-]*)?")
            .expect("qualifier pattern is valid")
    })
}

/// Truncate every full version token in a range expression.
///
/// `>=1.9.4.1 <2.0.0-rc.1` becomes `>=1.9.4 <2.0.0`. Pre-release and build
/// distinctions are lost, which is accepted for host runtimes.
pub fn truncate_range(range: &str) -> String {
    qualified_triple().replace_all(range, "$1").into_owned()
}
