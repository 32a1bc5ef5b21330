//! Point-in-time view of a project's packages for change detection

use crate::model::{PackageMap, TargetFramework};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Framework plus the package records known for it
///
/// Two snapshots are equal when their frameworks are equal (or both absent)
/// and their package maps hold exactly the same entries, keys and values,
/// regardless of insertion order.
#[derive(Debug, Clone, Default)]
pub struct ProjectSnapshot {
    framework: Option<TargetFramework>,
    packages: Option<PackageMap>,
}

impl ProjectSnapshot {
    pub fn new(framework: Option<TargetFramework>, packages: Option<PackageMap>) -> Self {
        Self {
            framework,
            packages,
        }
    }

    pub fn framework(&self) -> Option<&TargetFramework> {
        self.framework.as_ref()
    }

    pub fn packages(&self) -> Option<&PackageMap> {
        self.packages.as_ref()
    }

    fn same_packages(&self, other: &Self) -> bool {
        match (&self.packages, &other.packages) {
            (None, None) => true,
            (Some(ours), Some(theirs)) => {
                ours.len() == theirs.len()
                    && ours
                        .iter()
                        .all(|(id, package)| theirs.get(id) == Some(package))
            }
            _ => false,
        }
    }
}

impl PartialEq for ProjectSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.framework == other.framework && self.same_packages(other)
    }
}

impl Eq for ProjectSnapshot {}

impl Hash for ProjectSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.framework.hash(state);
        match &self.packages {
            None => state.write_u8(0),
            Some(packages) => {
                // Entry order must not influence the hash
                let combined = packages.iter().fold(0u64, |acc, entry| {
                    let mut hasher = DefaultHasher::new();
                    entry.hash(&mut hasher);
                    acc.wrapping_add(hasher.finish())
                });
                state.write_u8(1);
                state.write_usize(packages.len());
                state.write_u64(combined);
            }
        }
    }
}
