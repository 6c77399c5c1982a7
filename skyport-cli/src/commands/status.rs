//! Status command - compare the local manifest against the catalog.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use skyport::manifest::{Manifest, MANIFEST_FILENAME};
use skyport::sync::{SyncOptions, Synchronizer};

use super::common;
use crate::error::CliError;

/// Arguments for the status command.
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Catalog server base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Release channel to compare against
    #[arg(long)]
    pub channel: Option<String>,

    /// Directory holding the local manifest
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Run the status command.
pub async fn run(args: StatusArgs) -> Result<(), CliError> {
    let config = common::load_config();
    let endpoint = common::require_endpoint(args.endpoint, &config)?;
    let channel = common::resolve_channel(args.channel, &config);
    let dir = common::resolve_dir(args.dir, &config);

    let manifest_path = dir.join(MANIFEST_FILENAME);
    if !manifest_path.exists() {
        println!(
            "No manifest at {}. Run 'skyport sync' first.",
            manifest_path.display()
        );
        return Ok(());
    }
    let manifest = Manifest::load(&manifest_path).await?;

    let catalog = common::catalog_builder(&endpoint).build()?;
    let options = SyncOptions::dry_run().channel(channel);
    let statuses = Synchronizer::new(Arc::new(catalog), options)
        .check(&manifest)
        .await?;

    println!(
        "{:<24} {:<12} {:<12}",
        style("NAME").bold(),
        style("LOCAL").bold(),
        style("REMOTE").bold()
    );
    let mut updates = 0;
    for status in &statuses {
        let local = status.local_version.as_deref().unwrap_or("-");
        let marker = if status.update_available {
            updates += 1;
            style("update available").yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{:<24} {:<12} {:<12} {}",
            status.name, local, status.remote_version, marker
        );
    }
    println!();
    if updates == 0 {
        println!("{} Everything is up to date.", style("✓").green());
    } else {
        println!("{} bundle(s) can be updated.", updates);
    }

    Ok(())
}
