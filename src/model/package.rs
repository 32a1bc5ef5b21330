//! Package identities and the records a project keeps about them

use super::framework::TargetFramework;
use super::version::{PackageVersion, VersionRange};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Package identifier
///
/// Package ids are case-insensitive; the casing first seen is kept for display.
#[derive(Debug, Clone)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn folded(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.bytes().map(|b| b.to_ascii_lowercase())
    }
}

impl PartialEq for PackageId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for PackageId {}

impl Hash for PackageId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.folded() {
            state.write_u8(byte);
        }
        state.write_u8(0xff);
    }
}

impl Ord for PackageId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl PartialOrd for PackageId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for PackageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A package id paired with a concrete version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageIdentity {
    pub id: PackageId,
    pub version: PackageVersion,
}

impl PackageIdentity {
    pub fn new(id: PackageId, version: PackageVersion) -> Self {
        Self { id, version }
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

/// Last known installed identity of a package within a project
///
/// Survives across resolution cycles so a re-resolution can tell a version
/// change apart from a brand new package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectInstalledPackage {
    /// Range the package was requested with
    pub range: VersionRange,

    /// Identity that range resolved to
    pub identity: PackageIdentity,
}

impl ProjectInstalledPackage {
    pub fn new(range: VersionRange, identity: PackageIdentity) -> Self {
        Self { range, identity }
    }

    pub fn version(&self) -> &PackageVersion {
        &self.identity.version
    }
}

/// Installed-package records keyed by package id
pub type PackageMap = HashMap<PackageId, ProjectInstalledPackage>;

/// A package identity as seen from one target framework
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageReference {
    pub identity: PackageIdentity,
    pub framework: TargetFramework,
}

impl PackageReference {
    pub fn new(identity: PackageIdentity, framework: TargetFramework) -> Self {
        Self {
            identity,
            framework,
        }
    }

    pub fn id(&self) -> &PackageId {
        &self.identity.id
    }

    pub fn version(&self) -> &PackageVersion {
        &self.identity.version
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identity, self.framework)
    }
}
