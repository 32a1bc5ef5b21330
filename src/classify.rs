//! Direct and transitive package classification
//!
//! Given the declared dependencies of a project and (optionally) a freshly
//! resolved graph, computes the packages a project installs directly and the
//! packages it only pulls in transitively. Both passes update the project's
//! persisted [`PackageMap`]s so the next cycle can compare against them.

use crate::model::{
    GraphTarget, LibraryDependency, PackageId, PackageIdentity, PackageMap, PackageReference,
    PackageVersion, ProjectInstalledPackage, TargetFramework, VersionRange,
};
use std::collections::HashSet;
use tracing::debug;

/// Package references for the declared (direct) dependencies
///
/// Only `Package` dependencies are considered. Each yields one reference,
/// so a dependency declared twice is reported twice. `installed` is updated
/// with the resolved identity of every declared package. A record is only
/// dropped once its id is neither declared nor present in the graph; without
/// a graph nothing is dropped.
pub fn installed_references(
    dependencies: &[LibraryDependency],
    framework: &TargetFramework,
    installed: &mut PackageMap,
    targets: Option<&[GraphTarget]>,
) -> Vec<PackageReference> {
    let mut references = Vec::new();

    for dependency in dependencies.iter().filter(|d| d.is_package()) {
        let version = resolved_version(dependency, framework, installed, targets);
        let identity = PackageIdentity::new(dependency.name.clone(), version);

        let unchanged = installed
            .get(&dependency.name)
            .is_some_and(|c| c.identity == identity && c.range == dependency.range);
        if !unchanged {
            installed.insert(
                dependency.name.clone(),
                ProjectInstalledPackage::new(dependency.range.clone(), identity.clone()),
            );
        }

        references.push(PackageReference::new(identity, framework.clone()));
    }

    if let Some(targets) = targets {
        let declared = declared_ids(dependencies);
        installed.retain(|id, _| declared.contains(id) || in_graph(id, framework, targets));
    }
    references
}

/// Ids of the declared `Package` dependencies
pub fn declared_ids(dependencies: &[LibraryDependency]) -> HashSet<PackageId> {
    dependencies
        .iter()
        .filter(|d| d.is_package())
        .map(|d| d.name.clone())
        .collect()
}

/// Package references pulled in by the graph but not declared directly
///
/// Without a graph nothing new is known: the previously recorded
/// `transitive` map is projected as-is and left untouched. With a graph the
/// set is recomputed from every package library of the framework's targets,
/// skipping ids present in `installed`, which must hold only the packages
/// declared this cycle. Prior records are kept where the version did not
/// move; ids missing from the graph are dropped.
pub fn transitive_references(
    framework: &TargetFramework,
    installed: &PackageMap,
    transitive: &mut PackageMap,
    targets: Option<&[GraphTarget]>,
) -> Vec<PackageReference> {
    let Some(targets) = targets else {
        let mut known: Vec<&ProjectInstalledPackage> = transitive.values().collect();
        known.sort_by(|a, b| a.identity.id.cmp(&b.identity.id));
        return known
            .into_iter()
            .map(|p| PackageReference::new(p.identity.clone(), framework.clone()))
            .collect();
    };

    let mut next = PackageMap::new();
    let mut references = Vec::new();

    let libraries = targets
        .iter()
        .filter(|t| &t.framework == framework)
        .flat_map(|t| t.libraries.iter())
        .filter(|lib| lib.is_package());

    for library in libraries {
        if installed.contains_key(&library.name) || next.contains_key(&library.name) {
            continue;
        }

        let record = match transitive.get(&library.name) {
            Some(prior) if prior.version() == &library.version => prior.clone(),
            _ => ProjectInstalledPackage::new(
                VersionRange::at_least(library.version.clone()),
                PackageIdentity::new(library.name.clone(), library.version.clone()),
            ),
        };

        references.push(PackageReference::new(
            record.identity.clone(),
            framework.clone(),
        ));
        next.insert(library.name.clone(), record);
    }

    let dropped = transitive.keys().filter(|id| !next.contains_key(*id)).count();
    if dropped > 0 {
        debug!("Dropped {} stale transitive packages for {}", dropped, framework);
    }

    *transitive = next;
    references
}

/// Effective version of a declared dependency
///
/// Order: the graph's resolved version, an exact pin, the last known
/// installed version, the range's lower bound, `0.0.0`.
fn resolved_version(
    dependency: &LibraryDependency,
    framework: &TargetFramework,
    installed: &PackageMap,
    targets: Option<&[GraphTarget]>,
) -> PackageVersion {
    if let Some(version) = targets.and_then(|t| graph_version(&dependency.name, framework, t)) {
        return version.clone();
    }
    if let Some(version) = dependency.range.exact_version() {
        return version.clone();
    }
    if let Some(known) = installed.get(&dependency.name) {
        return known.version().clone();
    }
    dependency
        .range
        .min_version()
        .cloned()
        .unwrap_or_else(PackageVersion::zero)
}

fn in_graph(id: &PackageId, framework: &TargetFramework, targets: &[GraphTarget]) -> bool {
    targets
        .iter()
        .filter(|t| &t.framework == framework)
        .any(|t| t.find_library(id).is_some())
}

/// Version of `id` in the framework's targets, runtime-agnostic target first
fn graph_version<'a>(
    id: &PackageId,
    framework: &TargetFramework,
    targets: &'a [GraphTarget],
) -> Option<&'a PackageVersion> {
    let for_framework = || targets.iter().filter(move |t| &t.framework == framework);

    for_framework()
        .filter(|t| t.runtime_identifier.is_none())
        .chain(for_framework().filter(|t| t.runtime_identifier.is_some()))
        .find_map(|t| t.find_library(id))
        .map(|lib| &lib.version)
}
