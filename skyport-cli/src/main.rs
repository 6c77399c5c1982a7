//! Skyport CLI - keep a local bundle directory in sync with a remote
//! artifact catalog.

mod commands;
mod error;
mod logging;
mod progress;

use clap::{Parser, Subcommand};

use crate::commands::config::ConfigCommands;
use crate::commands::download::DownloadArgs;
use crate::commands::list::ListArgs;
use crate::commands::manifest::ManifestArgs;
use crate::commands::status::StatusArgs;
use crate::commands::sync::SyncArgs;
use crate::commands::upload::UploadArgs;

/// Command-line interface definition.
#[derive(Debug, Parser)]
#[command(
    name = "skyport",
    version,
    about = "Sync versioned artifact bundles from a remote catalog"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all log output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Synchronize the local bundle directory with the remote catalog
    Sync(SyncArgs),

    /// List bundles available in the remote catalog
    List(ListArgs),

    /// Show which installed bundles have updates available
    Status(StatusArgs),

    /// Download a single bundle to a local file
    Download(DownloadArgs),

    /// Upload a bundle artifact to the catalog
    Upload(UploadArgs),

    /// Inspect the local install manifest
    Manifest(ManifestArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    tracing::debug!(version = skyport::VERSION, "skyport starting");

    let result = match cli.command {
        Commands::Sync(args) => commands::sync::run(args).await,
        Commands::List(args) => commands::list::run(args).await,
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Download(args) => commands::download::run(args).await,
        Commands::Upload(args) => commands::upload::run(args).await,
        Commands::Manifest(args) => commands::manifest::run(args).await,
        Commands::Config(command) => commands::config::run(command),
    };

    if let Err(error) = result {
        eprintln!("{} {}", console::style("error:").red().bold(), error);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sync_flags_parse() {
        let cli = Cli::parse_from([
            "skyport",
            "sync",
            "--endpoint",
            "https://bundles.example.com",
            "--include",
            "app*",
            "--exclude",
            "app-beta",
            "--dry-run",
            "--concurrency",
            "4",
        ]);
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.endpoint.as_deref(), Some("https://bundles.example.com"));
                assert_eq!(args.include, vec!["app*".to_string()]);
                assert_eq!(args.exclude, vec!["app-beta".to_string()]);
                assert!(args.dry_run);
                assert_eq!(args.concurrency, Some(4));
            }
            other => panic!("expected sync, got {:?}", other),
        }
    }
}
