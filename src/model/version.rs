//! Package versions and version ranges
//!
//! Versions follow the NuGet shape `major.minor.patch[.revision][-prerelease]`.
//! Precedence is delegated to `semver` for everything but the fourth
//! (revision) component, which semver does not model.

use crate::error::{LockscopeError, LockscopeResult};
use semver::{BuildMetadata, Version};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A resolved package version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageVersion {
    inner: Version,
    revision: u64,
}

impl PackageVersion {
    /// Create a release version from its numeric parts
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            inner: Version::new(major, minor, patch),
            revision: 0,
        }
    }

    /// The `0.0.0` placeholder used when nothing better is known
    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Parse a version, accepting one to four numeric components
    pub fn parse(value: &str) -> LockscopeResult<Self> {
        let invalid = |reason: &str| LockscopeError::VersionInvalid {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty version"));
        }

        // Build metadata never participates in identity
        let without_build = trimmed.split('+').next().unwrap_or(trimmed);
        let (core, pre) = match without_build.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (without_build, None),
        };

        let parts: Vec<u64> = core
            .split('.')
            .map(|p| p.parse::<u64>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid("components must be numeric"))?;

        if parts.is_empty() || parts.len() > 4 {
            return Err(invalid("expected 1 to 4 numeric components"));
        }

        let part = |i: usize| parts.get(i).copied().unwrap_or(0);
        let mut text = format!("{}.{}.{}", part(0), part(1), part(2));
        if let Some(pre) = pre {
            text.push('-');
            text.push_str(pre);
        }

        let mut inner = Version::parse(&text).map_err(|e| invalid(&e.to_string()))?;
        inner.build = BuildMetadata::EMPTY;

        Ok(Self {
            inner,
            revision: part(3),
        })
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether this version carries a prerelease label
    pub fn is_prerelease(&self) -> bool {
        !self.inner.pre.is_empty()
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.inner.major, self.inner.minor, self.inner.patch, self.revision)
            .cmp(&(
                other.inner.major,
                other.inner.minor,
                other.inner.patch,
                other.revision,
            ))
            .then_with(|| self.inner.pre.cmp(&other.inner.pre))
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.inner.major, self.inner.minor, self.inner.patch
        )?;
        if self.revision > 0 {
            write!(f, ".{}", self.revision)?;
        }
        if self.is_prerelease() {
            write!(f, "-{}", self.inner.pre)?;
        }
        Ok(())
    }
}

impl FromStr for PackageVersion {
    type Err = LockscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PackageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A declared version constraint in NuGet interval notation
///
/// | Notation | Meaning |
/// |----------|---------|
/// | `1.0` | `>= 1.0` |
/// | `[1.0]` | `== 1.0` |
/// | `[1.0,2.0)` | `>= 1.0, < 2.0` |
/// | `(,2.0]` | `<= 2.0` |
/// | `1.*` | floating, lowest `1.0` |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    min: Option<PackageVersion>,
    min_inclusive: bool,
    max: Option<PackageVersion>,
    max_inclusive: bool,
    float: Option<String>,
}

impl VersionRange {
    /// `>= version`
    pub fn at_least(version: PackageVersion) -> Self {
        Self {
            min: Some(version),
            min_inclusive: true,
            max: None,
            max_inclusive: false,
            float: None,
        }
    }

    /// `[version]`
    pub fn exact(version: PackageVersion) -> Self {
        Self {
            min: Some(version.clone()),
            min_inclusive: true,
            max: Some(version),
            max_inclusive: true,
            float: None,
        }
    }

    /// Parse a range in NuGet notation
    pub fn parse(value: &str) -> LockscopeResult<Self> {
        let invalid = |reason: &str| LockscopeError::VersionRangeInvalid {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty range"));
        }

        if trimmed.contains('*') {
            return Self::parse_floating(trimmed).map_err(|e| invalid(&e.to_string()));
        }

        let first = trimmed.chars().next();
        if !matches!(first, Some('[') | Some('(')) {
            return Ok(Self::at_least(PackageVersion::parse(trimmed)?));
        }

        let min_inclusive = first == Some('[');
        let max_inclusive = match trimmed.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(invalid("unterminated interval")),
        };
        let body = &trimmed[1..trimmed.len() - 1];

        let Some((left, right)) = body.split_once(',') else {
            // `[1.0]` is the only single-version interval form
            if !(min_inclusive && max_inclusive) {
                return Err(invalid("single version must use []"));
            }
            return Ok(Self::exact(PackageVersion::parse(body)?));
        };

        let bound = |s: &str| -> LockscopeResult<Option<PackageVersion>> {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                PackageVersion::parse(s).map(Some)
            }
        };
        let min = bound(left)?;
        let max = bound(right)?;

        if min.is_none() && max.is_none() {
            return Err(invalid("at least one bound is required"));
        }
        if let (Some(lo), Some(hi)) = (&min, &max) {
            if lo > hi || (lo == hi && !(min_inclusive && max_inclusive)) {
                return Err(invalid("empty interval"));
            }
        }

        Ok(Self {
            min,
            min_inclusive,
            max,
            max_inclusive,
            float: None,
        })
    }

    fn parse_floating(value: &str) -> LockscopeResult<Self> {
        let prefix = value
            .split('*')
            .next()
            .unwrap_or_default()
            .trim_end_matches(['.', '-']);
        let min = if prefix.is_empty() {
            PackageVersion::zero()
        } else {
            PackageVersion::parse(prefix)?
        };

        Ok(Self {
            min: Some(min),
            min_inclusive: true,
            max: None,
            max_inclusive: false,
            float: Some(value.to_string()),
        })
    }

    /// True for `[v]` style pins
    pub fn is_exact(&self) -> bool {
        self.float.is_none()
            && self.min_inclusive
            && self.max_inclusive
            && self.min.is_some()
            && self.min == self.max
    }

    /// The pinned version, if the range is exact
    pub fn exact_version(&self) -> Option<&PackageVersion> {
        if self.is_exact() {
            self.min.as_ref()
        } else {
            None
        }
    }

    /// Lower bound, if any
    pub fn min_version(&self) -> Option<&PackageVersion> {
        self.min.as_ref()
    }

    pub fn is_floating(&self) -> bool {
        self.float.is_some()
    }

    /// Whether `version` lies within the range
    pub fn satisfies(&self, version: &PackageVersion) -> bool {
        let above = match &self.min {
            Some(min) if self.min_inclusive => version >= min,
            Some(min) => version > min,
            None => true,
        };
        let below = match &self.max {
            Some(max) if self.max_inclusive => version <= max,
            Some(max) => version < max,
            None => true,
        };
        above && below
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(float) = &self.float {
            return write!(f, "{}", float);
        }
        if let Some(exact) = self.exact_version() {
            return write!(f, "[{}]", exact);
        }

        let open = if self.min_inclusive { '[' } else { '(' };
        let close = if self.max_inclusive { ']' } else { ')' };
        write!(f, "{}", open)?;
        if let Some(min) = &self.min {
            write!(f, "{}", min)?;
        }
        write!(f, ", ")?;
        if let Some(max) = &self.max {
            write!(f, "{}", max)?;
        }
        write!(f, "{}", close)
    }
}

impl FromStr for VersionRange {
    type Err = LockscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> PackageVersion {
        PackageVersion::parse(s).unwrap()
    }

    #[test]
    fn short_versions_are_padded() {
        assert_eq!(v("1"), PackageVersion::new(1, 0, 0));
        assert_eq!(v("1.2"), PackageVersion::new(1, 2, 0));
        assert_eq!(v("1.2").to_string(), "1.2.0");
    }

    #[test]
    fn revision_is_kept_and_ordered() {
        let four = v("1.0.0.5");
        assert_eq!(four.revision(), 5);
        assert_eq!(four.to_string(), "1.0.0.5");
        assert!(four > v("1.0.0"));
        assert!(four < v("1.0.1"));
    }

    #[test]
    fn prerelease_sorts_before_release() {
        assert!(v("2.0.0-beta.1") < v("2.0.0"));
        assert!(v("2.0.0-alpha") < v("2.0.0-beta"));
        assert_eq!(v("2.0.0-beta.1").to_string(), "2.0.0-beta.1");
    }

    #[test]
    fn build_metadata_is_ignored() {
        assert_eq!(v("1.0.0+abc"), v("1.0.0"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(PackageVersion::parse("").is_err());
        assert!(PackageVersion::parse("one.two").is_err());
        assert!(PackageVersion::parse("1.2.3.4.5").is_err());
    }

    #[test]
    fn bare_range_is_minimum() {
        let range = VersionRange::parse("1.0.0").unwrap();
        assert!(!range.is_exact());
        assert_eq!(range.min_version(), Some(&v("1.0.0")));
        assert!(range.satisfies(&v("9.0.0")));
        assert_eq!(range.to_string(), "[1.0.0, )");
    }

    #[test]
    fn bracketed_single_version_is_exact() {
        let range = VersionRange::parse("[1.2.3]").unwrap();
        assert!(range.is_exact());
        assert_eq!(range.exact_version(), Some(&v("1.2.3")));
        assert_eq!(range.to_string(), "[1.2.3]");
    }

    #[test]
    fn interval_bounds() {
        let range = VersionRange::parse("[1.0, 2.0)").unwrap();
        assert!(range.satisfies(&v("1.0.0")));
        assert!(range.satisfies(&v("1.9.9")));
        assert!(!range.satisfies(&v("2.0.0")));

        let upper = VersionRange::parse("(,2.0]").unwrap();
        assert!(upper.min_version().is_none());
        assert!(upper.satisfies(&v("2.0.0")));
    }

    #[test]
    fn floating_range() {
        let range = VersionRange::parse("1.*").unwrap();
        assert!(range.is_floating());
        assert!(!range.is_exact());
        assert_eq!(range.min_version(), Some(&v("1.0.0")));
        assert_eq!(range.to_string(), "1.*");

        let any = VersionRange::parse("*").unwrap();
        assert_eq!(any.min_version(), Some(&PackageVersion::zero()));
    }

    #[test]
    fn invalid_ranges() {
        assert!(VersionRange::parse("[1.0").is_err());
        assert!(VersionRange::parse("(1.0)").is_err());
        assert!(VersionRange::parse("[,]").is_err());
        assert!(VersionRange::parse("[2.0,1.0]").is_err());
    }
}
