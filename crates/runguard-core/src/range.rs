//! Range expressions.
//!
//! Accepts the familiar range syntax used by package managers and
//! translates each `||` branch into a [`semver::VersionReq`], which does the
//! actual comparator evaluation:
//!
//! | Input | Meaning |
//! |-------|---------|
//! | `1.9.3` | exactly 1.9.3 |
//! | `1.9` / `1.9.x` | any 1.9.* |
//! | `>=1.8.0 <2` | both comparators (space is AND) |
//! | `1.8.0 - 2.0.0` | inclusive hyphen range |
//! | `1.5.2 \|\| ^1.8` | either branch |
//! | `*`, `x`, empty | any version |

use std::fmt;

use semver::VersionReq;

use crate::error::{GuardError, GuardResult};
use crate::version::VersionTriple;

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '~', '^'];
const OPERATORS: &[&str] = &["", "=", "<", "<=", ">", ">=", "~", "^"];

/// A parsed range expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    branches: Vec<VersionReq>,
}

impl VersionRange {
    /// Parse a range expression.
    ///
    /// Syntax errors are reported as [`GuardError::MalformedRequirement`].
    pub fn parse(input: &str) -> GuardResult<Self> {
        let branches = input
            .split("||")
            .map(|branch| {
                let translated = translate_branch(branch).map_err(|reason| {
                    GuardError::malformed(format!("invalid range \"{}\": {}", input.trim(), reason))
                })?;
                VersionReq::parse(&translated).map_err(|e| {
                    GuardError::malformed(format!("invalid range \"{}\": {}", input.trim(), e))
                })
            })
            .collect::<GuardResult<Vec<_>>>()?;

        Ok(Self {
            raw: input.trim().to_string(),
            branches,
        })
    }

    /// Whether `version` satisfies any branch.
    pub fn matches(&self, version: &VersionTriple) -> bool {
        let version = version.to_semver();
        self.branches.iter().any(|req| req.matches(&version))
    }

    /// Highest candidate satisfying the range.
    pub fn max_satisfying<'a, I>(&self, candidates: I) -> Option<VersionTriple>
    where
        I: IntoIterator<Item = &'a VersionTriple>,
    {
        candidates
            .into_iter()
            .filter(|candidate| self.matches(candidate))
            .max()
            .copied()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Translate one `||` branch into `semver` comparator syntax.
fn translate_branch(branch: &str) -> Result<String, String> {
    let tokens: Vec<&str> = branch.split_whitespace().collect();

    if tokens.contains(&"-") {
        let [low, "-", high] = tokens.as_slice() else {
            return Err(format!("hyphen range must be 'A - B', got \"{}\"", branch.trim()));
        };
        let bounds: Vec<String> = [
            hyphen_bound(low)?.map(|low| format!(">={}", low)),
            hyphen_bound(high)?.map(|high| format!("<={}", high)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if bounds.is_empty() {
            return Ok("*".to_string());
        }
        return Ok(bounds.join(", "));
    }

    let mut comparators = Vec::new();
    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        // Allow whitespace between an operator and its version (`>= 1.8.0`).
        let comparator = if token.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            let version = iter
                .next()
                .ok_or_else(|| format!("operator '{}' has no version", token))?;
            format!("{}{}", token, version)
        } else {
            token.to_string()
        };

        if let Some(translated) = translate_comparator(&comparator)? {
            comparators.push(translated);
        }
    }

    if comparators.is_empty() {
        return Ok("*".to_string());
    }
    Ok(comparators.join(", "))
}

/// Translate a single comparator. `None` means it matches everything.
fn translate_comparator(comparator: &str) -> Result<Option<String>, String> {
    let split = comparator
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(comparator.len());
    let (op, version) = comparator.split_at(split);

    if !OPERATORS.contains(&op) {
        return Err(format!("unknown operator '{}'", op));
    }
    if version.is_empty() {
        return Err(format!("operator '{}' has no version", op));
    }

    match strip_wildcards(version) {
        None => match op {
            "<" | ">" => Err(format!("'{}' cannot be combined with a wildcard", op)),
            _ => Ok(None),
        },
        Some(partial) if op.is_empty() => Ok(Some(format!("={}", partial))),
        Some(partial) => Ok(Some(format!("{}{}", op, partial))),
    }
}

/// A wildcard bound (`*`) leaves that side of the range open.
fn hyphen_bound(token: &str) -> Result<Option<String>, String> {
    if token.starts_with(OPERATOR_CHARS) {
        return Err(format!("hyphen range bound '{}' cannot carry an operator", token));
    }
    Ok(strip_wildcards(token))
}

/// Drop the `v` prefix and trailing wildcard components: `v1.9.x` -> `1.9`.
///
/// Returns `None` when nothing but wildcards remain.
fn strip_wildcards(version: &str) -> Option<String> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let parts: Vec<&str> = version
        .split('.')
        .take_while(|part| !matches!(*part, "*" | "x" | "X"))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}
