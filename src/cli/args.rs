//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// lockscope - restore graph inspector
///
/// Reads the assets file produced by restore and reports the packages a
/// project installs directly and the ones it pulls in transitively.
#[derive(Parser, Debug)]
#[command(name = "lockscope")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LOCKSCOPE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the restore graph of an assets file
    Graph(GraphArgs),

    /// List installed and transitive packages per framework
    Packages(PackagesArgs),

    /// Look up endpoints in a saved service index
    Endpoints(EndpointsArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the graph command
#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Assets file, or a project directory containing obj/project.assets.json
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the packages command
#[derive(Parser, Debug)]
pub struct PackagesArgs {
    /// Assets file, or a project directory containing obj/project.assets.json
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Only report this target framework (e.g. net8.0)
    #[arg(long)]
    pub framework: Option<String>,

    /// Hide transitive packages
    #[arg(long)]
    pub direct_only: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the endpoints command
#[derive(Parser, Debug)]
pub struct EndpointsArgs {
    /// Saved service index JSON document
    pub index: PathBuf,

    /// Service types in order of preference; the first with endpoints wins
    #[arg(required = true)]
    pub types: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "plain")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.retention)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_packages() {
        let cli = Cli::parse_from([
            "lockscope",
            "packages",
            "obj/project.assets.json",
            "--framework",
            "net8.0",
            "--format",
            "json",
        ]);
        match cli.command {
            Commands::Packages(args) => {
                assert_eq!(args.path, PathBuf::from("obj/project.assets.json"));
                assert_eq!(args.framework.as_deref(), Some("net8.0"));
                assert_eq!(args.format, OutputFormat::Json);
                assert!(!args.direct_only);
            }
            _ => panic!("expected Packages command"),
        }
    }

    #[test]
    fn cli_graph_defaults_to_current_dir() {
        let cli = Cli::parse_from(["lockscope", "graph"]);
        match cli.command {
            Commands::Graph(args) => {
                assert_eq!(args.path, PathBuf::from("."));
                assert_eq!(args.format, OutputFormat::Table);
            }
            _ => panic!("expected Graph command"),
        }
    }

    #[test]
    fn cli_endpoints_requires_a_type() {
        assert!(Cli::try_parse_from(["lockscope", "endpoints", "index.json"]).is_err());

        let cli = Cli::parse_from([
            "lockscope",
            "endpoints",
            "index.json",
            "SearchQueryService/3.5.0",
            "SearchQueryService",
        ]);
        match cli.command {
            Commands::Endpoints(args) => assert_eq!(args.types.len(), 2),
            _ => panic!("expected Endpoints command"),
        }
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["lockscope", "config", "set", "cache.retention", "pinned"]);
        match cli.command {
            Commands::Config(ConfigArgs {
                action: Some(ConfigAction::Set { key, value }),
            }) => {
                assert_eq!(key, "cache.retention");
                assert_eq!(value, "pinned");
            }
            _ => panic!("expected Config set"),
        }
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["lockscope", "graph"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["lockscope", "-v", "graph"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["lockscope", "-vv", "graph"]);
        assert_eq!(cli.verbose, 2);
    }
}
