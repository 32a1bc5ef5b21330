//! Restore graph model and the assets file reader
//!
//! The assets file (`obj/project.assets.json`) is produced by restore and
//! records, per target framework, every resolved library together with its
//! dependency edges. Only the parts needed for package classification are
//! read; everything else in the file is ignored.

use super::framework::TargetFramework;
use super::package::PackageId;
use super::version::{PackageVersion, VersionRange};
use crate::error::{LockscopeError, LockscopeResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// What kind of library a declared dependency points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTarget {
    Package,
    Project,
    Reference,
    Other,
}

impl DependencyTarget {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "package" => Self::Package,
            "project" | "externalproject" => Self::Project,
            "reference" | "assembly" => Self::Reference,
            _ => Self::Other,
        }
    }
}

/// A declared dependency edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDependency {
    pub name: PackageId,
    pub range: VersionRange,
    pub target: DependencyTarget,
}

impl LibraryDependency {
    pub fn package(name: &str, range: VersionRange) -> Self {
        Self {
            name: PackageId::new(name),
            range,
            target: DependencyTarget::Package,
        }
    }

    pub fn is_package(&self) -> bool {
        self.target == DependencyTarget::Package
    }
}

/// Library kind as recorded in a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryType {
    Package,
    Project,
    Other(String),
}

impl LibraryType {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(t) if t.eq_ignore_ascii_case("package") => Self::Package,
            Some(t) if t.eq_ignore_ascii_case("project") => Self::Project,
            Some(t) => Self::Other(t.to_string()),
            None => Self::Other(String::new()),
        }
    }
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package => f.write_str("package"),
            Self::Project => f.write_str("project"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// One resolved library within a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLibrary {
    pub name: PackageId,
    pub version: PackageVersion,
    pub library_type: LibraryType,
    pub dependencies: Vec<LibraryDependency>,
}

impl ResolvedLibrary {
    pub fn is_package(&self) -> bool {
        self.library_type == LibraryType::Package
    }
}

/// The resolved dependency closure for one framework (optionally one runtime)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphTarget {
    pub framework: TargetFramework,
    pub runtime_identifier: Option<String>,
    pub libraries: Vec<ResolvedLibrary>,
}

impl GraphTarget {
    pub fn find_library(&self, name: &PackageId) -> Option<&ResolvedLibrary> {
        self.libraries.iter().find(|lib| &lib.name == name)
    }
}

/// Declared dependencies of the project for one framework
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkDependencies {
    pub framework: TargetFramework,
    pub dependencies: Vec<LibraryDependency>,
}

/// Parsed assets file
///
/// Immutable once built; a refresh produces a new graph rather than
/// mutating an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGraph {
    pub version: u32,
    pub targets: Vec<GraphTarget>,
    pub project_frameworks: Vec<FrameworkDependencies>,
}

impl ResolvedGraph {
    /// Parse the JSON text of an assets file
    pub fn from_json_str(content: &str) -> LockscopeResult<Self> {
        let raw: RawAssetsFile = serde_json::from_str(content)?;
        raw.into_graph()
    }

    /// All targets restored for `framework`, runtime-specific ones included
    pub fn targets_for<'a>(
        &'a self,
        framework: &'a TargetFramework,
    ) -> impl Iterator<Item = &'a GraphTarget> + 'a {
        self.targets.iter().filter(move |t| &t.framework == framework)
    }

    /// Distinct frameworks, in target order
    pub fn frameworks(&self) -> Vec<TargetFramework> {
        let mut frameworks: Vec<TargetFramework> = Vec::new();
        for target in &self.targets {
            if !frameworks.contains(&target.framework) {
                frameworks.push(target.framework.clone());
            }
        }
        frameworks
    }

    /// Dependencies the project itself declared for `framework`
    pub fn declared_dependencies(&self, framework: &TargetFramework) -> Option<&[LibraryDependency]> {
        self.project_frameworks
            .iter()
            .find(|f| &f.framework == framework)
            .map(|f| f.dependencies.as_slice())
    }

    pub fn library_count(&self) -> usize {
        self.targets.iter().map(|t| t.libraries.len()).sum()
    }
}

/// Produces a [`ResolvedGraph`] from a file on disk
///
/// Implementations are pure functions of the file contents and run on a
/// blocking worker, never on the async executor.
pub trait LockFileReader: Send + Sync + 'static {
    fn read(&self, path: &Path) -> LockscopeResult<ResolvedGraph>;
}

/// Reader for `project.assets.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetsFileReader;

impl LockFileReader for AssetsFileReader {
    fn read(&self, path: &Path) -> LockscopeResult<ResolvedGraph> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LockscopeError::io(format!("reading assets file {}", path.display()), e))?;

        ResolvedGraph::from_json_str(&content)
            .map_err(|e| LockscopeError::assets_parse(path, e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct RawAssetsFile {
    #[serde(default)]
    version: u32,

    #[serde(default)]
    targets: BTreeMap<String, BTreeMap<String, RawTargetLibrary>>,

    #[serde(default)]
    project: Option<RawProject>,
}

#[derive(Debug, Deserialize)]
struct RawTargetLibrary {
    #[serde(rename = "type")]
    library_type: Option<String>,

    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProject {
    #[serde(default)]
    frameworks: BTreeMap<String, RawProjectFramework>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProjectFramework {
    #[serde(default)]
    dependencies: BTreeMap<String, RawDependency>,
}

/// `"Pkg": "1.0.0"` or `"Pkg": { "target": "Package", "version": "[1.0.0, )" }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDependency {
    Range(String),
    Detailed {
        target: Option<String>,
        version: Option<String>,
    },
}

impl RawAssetsFile {
    fn into_graph(self) -> LockscopeResult<ResolvedGraph> {
        let mut targets = Vec::with_capacity(self.targets.len());
        for (key, libraries) in self.targets {
            targets.push(parse_target(&key, libraries)?);
        }

        let mut project_frameworks = Vec::new();
        for (moniker, framework) in self.project.unwrap_or_default().frameworks {
            let dependencies = framework
                .dependencies
                .into_iter()
                .map(|(name, dep)| parse_declared(&name, dep))
                .collect::<LockscopeResult<Vec<_>>>()?;
            project_frameworks.push(FrameworkDependencies {
                framework: TargetFramework::new(&moniker),
                dependencies,
            });
        }

        Ok(ResolvedGraph {
            version: self.version,
            targets,
            project_frameworks,
        })
    }
}

/// Target keys are `<framework>` or `<framework>/<runtime>`
fn parse_target(
    key: &str,
    libraries: BTreeMap<String, RawTargetLibrary>,
) -> LockscopeResult<GraphTarget> {
    let (framework, runtime) = match key.split_once('/') {
        Some((framework, rid)) if !rid.is_empty() => (framework, Some(rid.to_string())),
        _ => (key, None),
    };

    let mut resolved = Vec::with_capacity(libraries.len());
    for (library_key, library) in libraries {
        let (name, version) = library_key.rsplit_once('/').ok_or_else(|| {
            LockscopeError::User(format!(
                "library key '{}' in target '{}' is not <id>/<version>",
                library_key, key
            ))
        })?;

        let dependencies = library
            .dependencies
            .iter()
            .map(|(dep, range)| {
                Ok(LibraryDependency::package(dep, VersionRange::parse(range)?))
            })
            .collect::<LockscopeResult<Vec<_>>>()?;

        resolved.push(ResolvedLibrary {
            name: PackageId::new(name),
            version: PackageVersion::parse(version)?,
            library_type: LibraryType::parse(library.library_type.as_deref()),
            dependencies,
        });
    }

    Ok(GraphTarget {
        framework: TargetFramework::new(framework),
        runtime_identifier: runtime,
        libraries: resolved,
    })
}

fn parse_declared(name: &str, dep: RawDependency) -> LockscopeResult<LibraryDependency> {
    let (target, range) = match dep {
        RawDependency::Range(range) => (DependencyTarget::Package, VersionRange::parse(&range)?),
        RawDependency::Detailed { target, version } => {
            let target = target
                .as_deref()
                .map(DependencyTarget::parse)
                .unwrap_or(DependencyTarget::Package);
            let range = match version {
                Some(v) => VersionRange::parse(&v)?,
                None => VersionRange::at_least(PackageVersion::zero()),
            };
            (target, range)
        }
    };

    Ok(LibraryDependency {
        name: PackageId::new(name),
        range,
        target,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::NET8_ASSETS;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_targets_and_libraries() {
        let graph = ResolvedGraph::from_json_str(NET8_ASSETS).unwrap();
        assert_eq!(graph.version, 3);
        assert_eq!(graph.targets.len(), 1);

        let target = &graph.targets[0];
        assert_eq!(target.framework, TargetFramework::new("net8.0"));
        assert!(target.runtime_identifier.is_none());
        assert_eq!(target.libraries.len(), 3);

        let pkg1 = target.find_library(&PackageId::new("pkg1")).unwrap();
        assert!(pkg1.is_package());
        assert_eq!(pkg1.version, PackageVersion::new(1, 0, 0));
        assert_eq!(pkg1.dependencies.len(), 1);
        assert_eq!(pkg1.dependencies[0].name, PackageId::new("Pkg2"));

        let project = target.find_library(&PackageId::new("Lib.Core")).unwrap();
        assert_eq!(project.library_type, LibraryType::Project);
    }

    #[test]
    fn parses_declared_dependencies() {
        let graph = ResolvedGraph::from_json_str(NET8_ASSETS).unwrap();
        let declared = graph
            .declared_dependencies(&TargetFramework::new("net8.0"))
            .unwrap();
        assert_eq!(declared.len(), 1);
        assert!(declared[0].is_package());
        assert_eq!(declared[0].range.min_version(), Some(&PackageVersion::new(1, 0, 0)));
    }

    #[test]
    fn runtime_targets_share_framework() {
        let json = r#"{
          "version": 3,
          "targets": {
            ".NETCoreApp,Version=v8.0": { "A/1.0.0": { "type": "package" } },
            ".NETCoreApp,Version=v8.0/win-x64": { "A/1.0.0": { "type": "package" } }
          }
        }"#;
        let graph = ResolvedGraph::from_json_str(json).unwrap();
        let net8 = TargetFramework::new("net8.0");
        assert_eq!(graph.targets_for(&net8).count(), 2);
        assert_eq!(graph.frameworks(), vec![net8]);
        assert!(graph
            .targets
            .iter()
            .any(|t| t.runtime_identifier.as_deref() == Some("win-x64")));
    }

    #[test]
    fn bare_string_dependency_is_package() {
        let json = r#"{
          "project": { "frameworks": { "net8.0": { "dependencies": { "A": "1.0.0" } } } }
        }"#;
        let graph = ResolvedGraph::from_json_str(json).unwrap();
        let declared = &graph.project_frameworks[0].dependencies;
        assert_eq!(declared[0].target, DependencyTarget::Package);
        assert!(graph.targets.is_empty());
    }

    #[test]
    fn project_dependency_target() {
        let json = r#"{
          "project": { "frameworks": { "net8.0": { "dependencies": {
            "Other": { "target": "Project", "version": "[1.0.0, )" }
          } } } }
        }"#;
        let graph = ResolvedGraph::from_json_str(json).unwrap();
        assert_eq!(
            graph.project_frameworks[0].dependencies[0].target,
            DependencyTarget::Project
        );
    }

    #[test]
    fn malformed_library_key_fails() {
        let json = r#"{ "targets": { "net8.0": { "NoVersion": { "type": "package" } } } }"#;
        assert!(ResolvedGraph::from_json_str(json).is_err());
    }

    #[test]
    fn reader_reports_parse_errors_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.assets.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AssetsFileReader.read(&path).unwrap_err();
        assert!(matches!(err, LockscopeError::AssetsParse { .. }));
        assert!(err.to_string().contains("project.assets.json"));
    }
}
