//! Graph command - summarize the restore graph of an assets file

use super::{cancel_on_ctrl_c, missing_graph_error, resolve_assets_path};
use crate::cache::RestoreGraphCache;
use crate::cli::args::{GraphArgs, OutputFormat};
use crate::config::Config;
use crate::error::LockscopeResult;
use crate::model::{AssetsFileReader, GraphTarget, LibraryType, ResolvedGraph};
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct TargetSummary {
    framework: String,
    runtime: Option<String>,
    libraries: usize,
    packages: usize,
    projects: usize,
}

impl TargetSummary {
    fn from_target(target: &GraphTarget) -> Self {
        let count = |kind: LibraryType| {
            target
                .libraries
                .iter()
                .filter(|l| l.library_type == kind)
                .count()
        };
        Self {
            framework: target.framework.to_string(),
            runtime: target.runtime_identifier.clone(),
            libraries: target.libraries.len(),
            packages: count(LibraryType::Package),
            projects: count(LibraryType::Project),
        }
    }
}

#[derive(Debug, Serialize)]
struct GraphReport<'a> {
    assets_file: String,
    version: u32,
    from_cache: bool,
    targets: &'a [TargetSummary],
}

/// Execute the graph command
pub async fn execute(args: GraphArgs, config: &Config) -> LockscopeResult<()> {
    let path = resolve_assets_path(&args.path, config);
    let cache = RestoreGraphCache::new(Arc::new(AssetsFileReader), config.cache.retention);

    let lookup = cache.get_graph(&path, &cancel_on_ctrl_c()).await?;
    let graph = lookup
        .graph
        .clone()
        .ok_or_else(|| missing_graph_error(&path))?;

    let summaries: Vec<TargetSummary> = graph
        .targets
        .iter()
        .map(TargetSummary::from_target)
        .collect();

    match args.format {
        OutputFormat::Table => print_table(
            &path.display().to_string(),
            &graph,
            lookup.from_cache,
            &summaries,
        ),
        OutputFormat::Json => {
            let report = GraphReport {
                assets_file: path.display().to_string(),
                version: graph.version,
                from_cache: lookup.from_cache,
                targets: &summaries,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            for summary in &summaries {
                match &summary.runtime {
                    Some(rid) => println!("{}/{}", summary.framework, rid),
                    None => println!("{}", summary.framework),
                }
            }
        }
    }

    Ok(())
}

fn print_table(
    source: &str,
    graph: &ResolvedGraph,
    from_cache: bool,
    summaries: &[TargetSummary],
) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Restore graph");
    ui::key_value(&ctx, "Assets file", source);
    ui::key_value(&ctx, "Format version", &graph.version.to_string());
    ui::key_value(&ctx, "Source", if from_cache { "cache" } else { "parsed" });
    println!();

    println!(
        "{:<24} {:<16} {:>10} {:>10} {:>10}",
        style("TARGET").bold(),
        style("RUNTIME").bold(),
        style("LIBRARIES").bold(),
        style("PACKAGES").bold(),
        style("PROJECTS").bold()
    );
    println!("{}", "-".repeat(74));

    for summary in summaries {
        println!(
            "{:<24} {:<16} {:>10} {:>10} {:>10}",
            summary.framework,
            summary.runtime.as_deref().unwrap_or("-"),
            summary.libraries,
            summary.packages,
            summary.projects
        );
    }

    println!();
    println!(
        "{} target(s), {} framework(s)",
        summaries.len(),
        graph.frameworks().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PackageId, PackageVersion, ResolvedLibrary, TargetFramework};

    fn library(name: &str, library_type: LibraryType) -> ResolvedLibrary {
        ResolvedLibrary {
            name: PackageId::new(name),
            version: PackageVersion::new(1, 0, 0),
            library_type,
            dependencies: vec![],
        }
    }

    #[test]
    fn summary_counts_each_library_kind() {
        let target = GraphTarget {
            framework: TargetFramework::new("net8.0"),
            runtime_identifier: None,
            libraries: vec![
                library("Pkg1", LibraryType::Package),
                library("Lib.Core", LibraryType::Project),
                library("Legacy", LibraryType::Other("reference".to_string())),
            ],
        };

        let summary = TargetSummary::from_target(&target);
        assert_eq!(summary.libraries, 3);
        assert_eq!(summary.packages, 1);
        assert_eq!(summary.projects, 1);
    }
}
