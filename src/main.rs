//! lockscope - restore graph inspector
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use lockscope::cli::{commands, Cli, Commands};
use lockscope::config::{Config, ConfigManager};
use lockscope::error::LockscopeResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        // Interrupted by the user, nothing to report
        Err(e) if e.is_cancellation() => ExitCode::from(130),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> LockscopeResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config file {}", config_manager.path().display());

    match cli.command {
        Commands::Graph(args) => commands::graph(args, &config).await,
        Commands::Packages(args) => commands::packages(args, &config).await,
        Commands::Endpoints(args) => commands::endpoints(args, &config).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("lockscope=warn"),
        1 => EnvFilter::new("lockscope=info"),
        _ => EnvFilter::new("lockscope=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
