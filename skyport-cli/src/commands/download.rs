//! Download command - fetch a single bundle to a local file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use skyport::catalog::Catalog;
use skyport::integrity::{self, IntegrityPolicy};
use skyport::progress::ProgressTracker;
use skyport::sync::BUNDLE_EXTENSION;

use super::common;
use crate::error::CliError;
use crate::progress::BarFactory;

/// Arguments for the download command.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Name of the bundle to download
    pub name: String,

    /// Catalog server base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Release channel to download from
    #[arg(long)]
    pub channel: Option<String>,

    /// Output file (default: <name>_<version>.bundle)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Run the download command.
pub async fn run(args: DownloadArgs) -> Result<(), CliError> {
    let config = common::load_config();
    let endpoint = common::require_endpoint(args.endpoint, &config)?;
    let channel = common::resolve_channel(args.channel, &config);

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

    let result = catalog.fetch(&args.name, channel.as_deref()).await;
    tracker.on_done(&args.name);
    let (metadata, payload) = result?;

    integrity::verify(
        IntegrityPolicy::IfPresent,
        metadata.integrity.as_deref(),
        &payload,
    )?;

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "{}_{}.{}",
            metadata.name, metadata.version, BUNDLE_EXTENSION
        ))
    });
    tokio::fs::write(&output, &payload).await?;

    println!(
        "{} Downloaded {} {} ({} bytes) to {}",
        style("✓").green(),
        metadata.name,
        metadata.version,
        payload.len(),
        output.display()
    );

    Ok(())
}
