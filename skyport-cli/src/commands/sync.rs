//! Sync command - mirror the filtered catalog into the local directory.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use skyport::integrity::IntegrityPolicy;
use skyport::progress::ProgressTracker;
use skyport::sync::{SyncError, SyncOptions, Synchronizer};

use super::common;
use crate::error::CliError;
use crate::progress::BarFactory;

/// Arguments for the sync command.
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Catalog server base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Release channel to sync from
    #[arg(long)]
    pub channel: Option<String>,

    /// Only sync bundles matching this pattern (repeatable; prefix with
    /// `re:` for regex matching)
    #[arg(long = "include", value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Skip bundles matching this pattern (repeatable; `re:` for regex)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Destination directory for bundles and the manifest
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Run the full sync without writing anything to disk
    #[arg(long)]
    pub dry_run: bool,

    /// Remove the destination directory before syncing
    #[arg(long)]
    pub clean: bool,

    /// Maximum parallel downloads (default: CPU count, capped at 8)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Disable per-bundle progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Fail bundles that come without integrity metadata
    #[arg(long)]
    pub strict_integrity: bool,
}

/// Run the sync command.
pub async fn run(args: SyncArgs) -> Result<(), CliError> {
    let config = common::load_config();
    let endpoint = common::require_endpoint(args.endpoint, &config)?;
    let channel = common::resolve_channel(args.channel, &config);
    let dir = common::resolve_dir(args.dir, &config);

    let tracker = if args.no_progress {
        Arc::new(ProgressTracker::disabled())
    } else {
        Arc::new(ProgressTracker::new(Box::new(BarFactory::new())))
    };

    let catalog = {
        let tracker = Arc::clone(&tracker);
        common::catalog_builder(&endpoint)
            .on_progress(move |downloaded, total, endpoint| {
                tracker.on_endpoint_progress(endpoint, downloaded, total);
            })
            .build()?
    };

    let mut options = if args.dry_run {
        SyncOptions::dry_run()
    } else {
        SyncOptions::new(&dir)
    };
    options = options
        .include(common::parse_rules(&args.include)?)
        .exclude(common::parse_rules(&args.exclude)?)
        .channel(channel)
        .clean(args.clean || config.sync.clean);
    if args.strict_integrity {
        options = options.integrity(IntegrityPolicy::Strict);
    }
    if let Some(concurrency) = args.concurrency.or(config.sync.concurrency) {
        options = options.concurrency(concurrency);
    }

    let synchronizer = Synchronizer::new(Arc::new(catalog), options).with_tracker(tracker);

    match synchronizer.sync().await {
        Ok(manifest) => {
            if args.dry_run {
                println!(
                    "{} {} bundle(s) eligible (dry run, nothing written)",
                    style("✓").green(),
                    manifest.len()
                );
            } else {
                println!(
                    "{} Synced {} bundle(s) to {}",
                    style("✓").green(),
                    manifest.len(),
                    dir.display()
                );
            }
            for (name, entry) in &manifest.entries {
                println!("  {:<24} {}", name, entry.current_version);
            }
            Ok(())
        }
        Err(SyncError::PartialFailure { failures }) => {
            // Report every broken bundle before the aggregate failure.
            for (name, error) in &failures {
                eprintln!("  {} {}: {}", style("✗").red(), name, error);
            }
            Err(SyncError::PartialFailure { failures }.into())
        }
        Err(other) => Err(other.into()),
    }
}
