//! Package and restore-graph data model

pub mod framework;
pub mod lockfile;
pub mod package;
pub mod version;

pub use framework::TargetFramework;
pub use lockfile::{
    AssetsFileReader, DependencyTarget, FrameworkDependencies, GraphTarget, LibraryDependency,
    LibraryType, LockFileReader, ResolvedGraph, ResolvedLibrary,
};
pub use package::{
    PackageId, PackageIdentity, PackageMap, PackageReference, ProjectInstalledPackage,
};
pub use version::{PackageVersion, VersionRange};
