//! Packages command - list installed and transitive packages per framework

use super::{cancel_on_ctrl_c, missing_graph_error, resolve_assets_path};
use crate::cli::args::{OutputFormat, PackagesArgs};
use crate::config::Config;
use crate::error::{LockscopeError, LockscopeResult};
use crate::model::{PackageReference, TargetFramework};
use crate::project::{FrameworkPackages, PackageReferenceProject, ProjectIdentity};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the packages command
pub async fn execute(args: PackagesArgs, config: &Config) -> LockscopeResult<()> {
    let path = resolve_assets_path(&args.path, config);
    let identity = ProjectIdentity::from_directory(args.path.as_path());
    let project = PackageReferenceProject::new(identity, path.clone(), config.cache.retention);

    let packages = project
        .installed_and_transitive_packages(None, &cancel_on_ctrl_c())
        .await?;
    if !packages.restored {
        return Err(missing_graph_error(&path));
    }

    let mut frameworks = packages.frameworks;
    if let Some(wanted) = args.framework.as_deref() {
        let wanted = TargetFramework::new(wanted);
        frameworks.retain(|f| f.framework == wanted);
        if frameworks.is_empty() {
            return Err(LockscopeError::User(format!(
                "Framework {} is not restored in {}",
                wanted,
                path.display()
            )));
        }
    }
    if args.direct_only {
        for framework in &mut frameworks {
            framework.transitive.clear();
        }
    }

    match args.format {
        OutputFormat::Table => print_table(&frameworks),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&frameworks)?),
        OutputFormat::Plain => print_plain(&frameworks),
    }

    Ok(())
}

fn print_table(frameworks: &[FrameworkPackages]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Packages");

    if frameworks.is_empty() {
        ui::step_info(&ctx, "No frameworks declared in the assets file");
        return;
    }

    for framework in frameworks {
        ui::section(&ctx, framework.framework.as_str());
        println!(
            "  {:<12} {:<48} {:<20}",
            style("KIND").bold(),
            style("PACKAGE").bold(),
            style("VERSION").bold()
        );
        print_rows("direct", &framework.installed);
        print_rows("transitive", &framework.transitive);
        println!(
            "  {} direct, {} transitive",
            framework.installed.len(),
            framework.transitive.len()
        );
    }
}

fn print_rows(kind: &str, references: &[PackageReference]) {
    for reference in references {
        let kind = if kind == "direct" {
            style(kind).green()
        } else {
            style(kind).dim()
        };
        println!(
            "  {:<12} {:<48} {:<20}",
            kind,
            reference.id().as_str(),
            reference.version().to_string()
        );
    }
}

fn print_plain(frameworks: &[FrameworkPackages]) {
    for framework in frameworks {
        for reference in &framework.installed {
            println!("{} direct {} {}", framework.framework, reference.id(), reference.version());
        }
        for reference in &framework.transitive {
            println!(
                "{} transitive {} {}",
                framework.framework,
                reference.id(),
                reference.version()
            );
        }
    }
}
