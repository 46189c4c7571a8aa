//! Constraint parsing and selection of the newest matching tag.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease, Version, VersionReq};

use crate::error::CheckoutError;
use crate::git::{TagCatalog, TagEntry};

/// A parsed semantic version constraint.
///
/// Grammar:
/// - `||` separates alternatives; a version matching any alternative matches.
/// - Within an alternative, comparators separated by commas or whitespace must
///   all hold.
/// - A bare version is an exact match (`1.0.0` is `=1.0.0`); bare wildcards
///   such as `1.2.x` or `*` match any version in that range.
/// - `a - b` is the inclusive range `>=a, <=b`.
/// - Operators are `=`, `!=`, `>`, `>=` (or `=>`), `<`, `<=` (or `=<`), `~`
///   (or `~>`) and `^`, optionally followed by whitespace.
/// - Versions may carry a leading `v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemverConstraint {
    raw: String,
    alternatives: Vec<Conjunction>,
}

/// Comparators that must all hold.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Conjunction {
    require: VersionReq,
    exclude: Vec<VersionReq>,
}

impl Conjunction {
    fn parse(group: &str) -> Result<Self, semver::Error> {
        let mut required = Vec::new();
        let mut excluded = Vec::new();
        for term in comparators(group) {
            if let Some(version) = term.strip_prefix("!=") {
                excluded.push(VersionReq::parse(&comparator("", version))?);
                continue;
            }
            required.push(term);
        }

        let require = if required.is_empty() && excluded.is_empty() {
            // Reports the empty alternative.
            VersionReq::parse(group.trim())?
        } else if required.is_empty() {
            VersionReq::STAR
        } else {
            VersionReq::parse(&required.join(", "))?
        };
        Ok(Self {
            require,
            exclude: excluded,
        })
    }

    fn matches(&self, version: &Version) -> bool {
        self.require.matches(version) && !self.exclude.iter().any(|req| req.matches(version))
    }
}

impl SemverConstraint {
    pub fn parse(input: &str) -> Result<Self, CheckoutError> {
        let alternatives = input
            .split("||")
            .map(Conjunction::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| CheckoutError::InvalidConstraint {
                constraint: input.to_string(),
                source,
            })?;

        Ok(Self {
            raw: input.to_string(),
            alternatives,
        })
    }

    /// The expression as given by the caller.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|group| group.matches(version))
    }
}

const OPERATOR_CHARS: &[char] = &['=', '!', '<', '>', '~', '^'];

/// Split one alternative into comparators in `semver` crate syntax.
///
/// Malformed input is passed through unchanged so that `VersionReq::parse`
/// reports it.
fn comparators(group: &str) -> Vec<String> {
    let tokens: Vec<&str> = group
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect();

    let mut terms = Vec::new();
    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index];

        if tokens.get(index + 1) == Some(&"-")
            && let Some(upper) = tokens.get(index + 2)
        {
            terms.push(format!(">={}", strip_v(token)));
            terms.push(format!("<={}", strip_v(upper)));
            index += 3;
            continue;
        }

        // An operator separated from its version by whitespace.
        if token.chars().all(|c| OPERATOR_CHARS.contains(&c))
            && let Some(version) = tokens.get(index + 1)
        {
            terms.push(comparator(token, version));
            index += 2;
            continue;
        }

        let split = token
            .find(|c: char| !OPERATOR_CHARS.contains(&c))
            .unwrap_or(token.len());
        let (op, version) = token.split_at(split);
        terms.push(comparator(op, version));
        index += 1;
    }
    terms
}

fn comparator(op: &str, version: &str) -> String {
    let version = strip_v(version);
    let op = match op {
        "=>" => ">=",
        "=<" => "<=",
        "~>" => "~",
        "" if has_wildcard(version) => "",
        "" => "=",
        other => other,
    };
    format!("{}{}", op, version)
}

fn strip_v(version: &str) -> &str {
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version)
}

fn has_wildcard(version: &str) -> bool {
    let core = version.split(['-', '+']).next().unwrap_or_default();
    core.split('.').any(|part| matches!(part, "x" | "X" | "*"))
}

impl FromStr for SemverConstraint {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemverConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse a tag name as a semantic version.
///
/// One leading `v` is allowed and missing minor or patch numbers count as
/// zero, so `v2` is `2.0.0` and `1.2-rc.1` is `1.2.0-rc.1`.
pub fn parse_tag_version(name: &str) -> Option<Version> {
    let candidate = name.strip_prefix('v').unwrap_or(name);
    let core_end = candidate.find(['-', '+']).unwrap_or(candidate.len());
    let (core, suffix) = candidate.split_at(core_end);

    let mut numbers = [0u64; 3];
    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > numbers.len() {
        return None;
    }
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }

    let (pre, build) = match suffix.split_once('+') {
        Some((pre, build)) => (pre, build),
        None => (suffix, ""),
    };
    let pre = match pre.strip_prefix('-') {
        Some(pre) => Prerelease::new(pre).ok()?,
        None if pre.is_empty() => Prerelease::EMPTY,
        None => return None,
    };
    if suffix.contains('+') && build.is_empty() {
        return None;
    }
    let build = BuildMetadata::new(build).ok()?;

    Some(Version {
        major: numbers[0],
        minor: numbers[1],
        patch: numbers[2],
        pre,
        build,
    })
}

/// Compare by semantic version precedence.
///
/// Build metadata does not take part, so `1.0.0+a` and `1.0.0+b` are equal.
pub fn compare_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// Pick the catalog entry with the highest version satisfying `constraint`.
///
/// Tags that are not semantic versions are skipped. Versions of equal
/// precedence are ordered by commit timestamp, the latest winning.
pub fn select_latest<'a>(
    catalog: &'a TagCatalog,
    constraint: &SemverConstraint,
) -> Option<&'a TagEntry> {
    let mut matched: Vec<(Version, &TagEntry)> = catalog
        .iter()
        .filter_map(|entry| parse_tag_version(&entry.name).map(|version| (version, entry)))
        .filter(|(version, _)| constraint.matches(version))
        .collect();

    matched.sort_by(|(left, left_entry), (right, right_entry)| {
        compare_precedence(left, right)
            .then_with(|| left_entry.committed_at.cmp(&right_entry.committed_at))
    });
    matched.pop().map(|(_, entry)| entry)
}
