//! Package reference projects
//!
//! A project owns one [`RestoreGraphCache`] for its assets file plus the
//! installed and transitive package records of each target framework, which
//! persist from one resolution cycle to the next.

pub mod snapshot;

pub use snapshot::ProjectSnapshot;

use crate::cache::{RestoreGraphCache, Retention};
use crate::classify;
use crate::config::schema::AssetsConfig;
use crate::error::LockscopeResult;
use crate::model::{
    AssetsFileReader, FrameworkDependencies, LockFileReader, PackageId, PackageMap,
    PackageReference, TargetFramework,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Host-supplied identification of a project
///
/// Opaque to this crate; only used when reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectIdentity {
    pub name: String,
    pub unique_name: String,
    pub full_path: PathBuf,
}

impl ProjectIdentity {
    /// Identity derived from a project directory
    pub fn from_directory(dir: &Path) -> Self {
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string();
        Self {
            unique_name: dir.display().to_string(),
            name,
            full_path: dir.to_path_buf(),
        }
    }
}

/// Installed and transitive references of one framework
#[derive(Debug, Clone, Serialize)]
pub struct FrameworkPackages {
    pub framework: TargetFramework,
    pub installed: Vec<PackageReference>,
    pub transitive: Vec<PackageReference>,
    /// Whether either package set differs from the previous cycle
    pub changed: bool,
}

/// Result of one resolution cycle
#[derive(Debug, Clone, Serialize)]
pub struct ProjectPackages {
    pub frameworks: Vec<FrameworkPackages>,
    /// An assets file was available for this cycle
    pub restored: bool,
    /// The graph was served from cache
    pub from_cache: bool,
}

impl ProjectPackages {
    pub fn framework(&self, framework: &TargetFramework) -> Option<&FrameworkPackages> {
        self.frameworks.iter().find(|f| &f.framework == framework)
    }
}

#[derive(Debug, Default)]
struct FrameworkState {
    /// Every installed record, including ones no longer declared but still resolved
    installed: PackageMap,
    /// Records of the packages declared in the latest cycle
    direct: PackageMap,
    transitive: PackageMap,
    /// Transitive set was computed from a graph at least once
    classified: bool,
}

impl FrameworkState {
    fn snapshots(&self, framework: &TargetFramework) -> (ProjectSnapshot, ProjectSnapshot) {
        (
            ProjectSnapshot::new(Some(framework.clone()), Some(self.direct.clone())),
            ProjectSnapshot::new(Some(framework.clone()), Some(self.transitive.clone())),
        )
    }

    /// Narrow `installed` to the ids declared this cycle
    fn refresh_direct(&mut self, declared: &HashSet<PackageId>) {
        self.direct = self
            .installed
            .iter()
            .filter(|(id, _)| declared.contains(*id))
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect();
    }
}

/// A project whose packages are described by a restore assets file
pub struct PackageReferenceProject {
    identity: ProjectIdentity,
    assets_path: PathBuf,
    cache: RestoreGraphCache,
    state: Mutex<HashMap<TargetFramework, FrameworkState>>,
}

impl PackageReferenceProject {
    pub fn new(identity: ProjectIdentity, assets_path: PathBuf, retention: Retention) -> Self {
        Self::with_reader(identity, assets_path, retention, Arc::new(AssetsFileReader))
    }

    /// Use a custom reader for the assets file
    pub fn with_reader(
        identity: ProjectIdentity,
        assets_path: PathBuf,
        retention: Retention,
        reader: Arc<dyn LockFileReader>,
    ) -> Self {
        Self {
            identity,
            assets_path,
            cache: RestoreGraphCache::new(reader, retention),
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Project rooted at `dir`, with its assets file at `<dir>/<obj_dir>/<file_name>`
    pub fn from_directory(dir: &Path, assets: &AssetsConfig, retention: Retention) -> Self {
        let assets_path = dir.join(&assets.obj_dir).join(&assets.file_name);
        Self::new(ProjectIdentity::from_directory(dir), assets_path, retention)
    }

    pub fn identity(&self) -> &ProjectIdentity {
        &self.identity
    }

    pub fn assets_path(&self) -> &Path {
        &self.assets_path
    }

    pub fn cache(&self) -> &RestoreGraphCache {
        &self.cache
    }

    /// Run one resolution cycle
    ///
    /// `declared` overrides the dependencies recorded in the assets file's
    /// project section. With neither a graph nor declared dependencies, the
    /// records kept from earlier cycles are reported unchanged.
    pub async fn installed_and_transitive_packages(
        &self,
        declared: Option<&[FrameworkDependencies]>,
        cancel: &CancellationToken,
    ) -> LockscopeResult<ProjectPackages> {
        let lookup = self.cache.get_graph(&self.assets_path, cancel).await?;
        let graph = lookup.graph.as_deref();
        let targets = graph.map(|g| g.targets.as_slice());

        let mut state = self.state.lock().await;

        let declared: Option<Vec<FrameworkDependencies>> = match (declared, graph) {
            (Some(declared), _) => Some(declared.to_vec()),
            (None, Some(graph)) => Some(graph.project_frameworks.clone()),
            (None, None) => None,
        };

        let Some(declared) = declared else {
            debug!(
                "No assets file for {}, reporting last known packages",
                self.identity.unique_name
            );
            return Ok(ProjectPackages {
                frameworks: project_known(&state),
                restored: false,
                from_cache: false,
            });
        };

        if targets.is_some() {
            state.retain(|framework, _| declared.iter().any(|d| &d.framework == framework));
        }

        let mut frameworks = Vec::with_capacity(declared.len());
        for entry in &declared {
            let framework = &entry.framework;
            let fw_state = state.entry(framework.clone()).or_default();
            let (installed_before, transitive_before) = fw_state.snapshots(framework);

            let installed = classify::installed_references(
                &entry.dependencies,
                framework,
                &mut fw_state.installed,
                targets,
            );
            fw_state.refresh_direct(&classify::declared_ids(&entry.dependencies));

            // A cached graph carries no new information unless the direct set moved
            let installed_moved = installed_before != fw_state.snapshots(framework).0;
            let transitive_targets =
                if lookup.from_cache && fw_state.classified && !installed_moved {
                    None
                } else {
                    targets
                };

            if targets.is_none() {
                // Packages declared since the last graph are no longer transitive
                let FrameworkState {
                    direct, transitive, ..
                } = &mut *fw_state;
                transitive.retain(|id, _| !direct.contains_key(id));
            }

            let transitive = classify::transitive_references(
                framework,
                &fw_state.direct,
                &mut fw_state.transitive,
                transitive_targets,
            );
            if transitive_targets.is_some() {
                fw_state.classified = true;
            }

            let changed = installed_moved || transitive_before != fw_state.snapshots(framework).1;
            debug!(
                "{} [{}]: {} installed, {} transitive{}",
                self.identity.name,
                framework,
                installed.len(),
                transitive.len(),
                if changed { " (changed)" } else { "" }
            );

            frameworks.push(FrameworkPackages {
                framework: framework.clone(),
                installed,
                transitive,
                changed,
            });
        }

        Ok(ProjectPackages {
            frameworks,
            restored: graph.is_some(),
            from_cache: lookup.from_cache,
        })
    }

    /// Snapshots of the installed packages of every known framework
    pub async fn snapshots(&self) -> Vec<ProjectSnapshot> {
        let state = self.state.lock().await;
        let mut snapshots: Vec<ProjectSnapshot> = state
            .iter()
            .map(|(framework, fw_state)| fw_state.snapshots(framework).0)
            .collect();
        snapshots.sort_by(|a, b| a.framework().cmp(&b.framework()));
        snapshots
    }
}

fn project_known(state: &HashMap<TargetFramework, FrameworkState>) -> Vec<FrameworkPackages> {
    let mut frameworks: Vec<FrameworkPackages> = state
        .iter()
        .map(|(framework, fw_state)| {
            let mut installed: Vec<PackageReference> = fw_state
                .direct
                .values()
                .map(|p| PackageReference::new(p.identity.clone(), framework.clone()))
                .collect();
            installed.sort_by(|a, b| a.id().cmp(b.id()));

            let mut transitive = fw_state.transitive.clone();
            FrameworkPackages {
                framework: framework.clone(),
                installed,
                transitive: classify::transitive_references(
                    framework,
                    &fw_state.direct,
                    &mut transitive,
                    None,
                ),
                changed: false,
            }
        })
        .collect();
    frameworks.sort_by(|a, b| a.framework.cmp(&b.framework));
    frameworks
}
