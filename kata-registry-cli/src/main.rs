//! kata-registry - build, inspect and serve the component registry
//!
//! Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod build_cli;
mod category_cli;
mod index_cli;
mod project;
mod serve_cli;

use project::Project;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "kata-registry",
    about = "Build, inspect and serve the Kata component registry",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Emit structured JSON logs with targets, files and line numbers
    #[clap(long, global = true)]
    trace: bool,

    /// Set log level
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Project root
    #[clap(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Project config file (defaults to <root>/kata-registry.yaml)
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the registry index and write all artifacts
    Build(build_cli::BuildArgs),

    /// Serve the registry over HTTP behind the access gate
    Serve(serve_cli::ServeArgs),

    /// Search components by name, description, category or tag
    Search {
        /// Search query (lists everything when omitted)
        query: Option<String>,

        /// Only components of this category
        #[clap(long)]
        category: Option<String>,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show one component's index entry
    Show {
        /// Component name
        name: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show the peer graph of one component, or of the whole registry
    Graph {
        /// Component name
        name: Option<String>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Check the manifest and sources without building
    Lint {
        /// Output findings as JSON
        #[clap(long)]
        json: bool,

        /// Exit with an error when there are findings
        #[clap(long)]
        strict: bool,
    },

    /// Generate the category collapse map from the manifest
    BootstrapCategories {
        /// Overwrite an existing map
        #[clap(long)]
        force: bool,
    },
}

fn initialize_tracing(log_level: &LogLevel, trace: bool) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    if trace {
        // JSON output for structured tracing - MUST go to stderr
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init();

        tracing::info!("Structured tracing enabled");
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.trace);

    let project = Project::load(&cli.root, cli.config.as_deref())?;

    match cli.command {
        Command::Build(args) => build_cli::execute(&project, args).await,
        Command::Serve(args) => serve_cli::execute(&project, args).await,
        Command::Search {
            query,
            category,
            json,
        } => index_cli::execute_search(&project, query.as_deref(), category.as_deref(), json).await,
        Command::Show { name, json } => index_cli::execute_show(&project, &name, json).await,
        Command::Graph { name, json } => {
            index_cli::execute_graph(&project, name.as_deref(), json).await
        }
        Command::Lint { json, strict } => index_cli::execute_lint(&project, json, strict),
        Command::BootstrapCategories { force } => category_cli::execute(&project, force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kata-registry",
            "search",
            "hero",
            "--json",
            "--root",
            "/tmp/project",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.root, PathBuf::from("/tmp/project"));
        assert!(matches!(cli.log_level, LogLevel::Debug));
        match cli.command {
            Command::Search { query, json, .. } => {
                assert_eq!(query.as_deref(), Some("hero"));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["kata-registry", "serve"]).unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.bind.to_string(), "127.0.0.1:3000");
                assert!(args.token.is_none());
                assert!(args.rebuild_interval.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        assert!(Cli::try_parse_from(["kata-registry", "--log-level", "loud", "build"]).is_err());
    }
}
