//! List command - show what the catalog offers.

use clap::Args;
use console::style;
use skyport::catalog::Catalog;

use super::common;
use crate::error::CliError;

/// Arguments for the list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Catalog server base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Release channel to list
    #[arg(long)]
    pub channel: Option<String>,
}

/// Run the list command.
pub async fn run(args: ListArgs) -> Result<(), CliError> {
    let config = common::load_config();
    let endpoint = common::require_endpoint(args.endpoint, &config)?;
    let channel = common::resolve_channel(args.channel, &config);

    let catalog = common::catalog_builder(&endpoint).build()?;
    let entries = catalog.list(channel.as_deref()).await?;

    if entries.is_empty() {
        println!("The catalog is empty.");
        return Ok(());
    }

    println!(
        "{:<24} {}",
        style("NAME").bold(),
        style("VERSION").bold()
    );
    for entry in &entries {
        println!("{:<24} {}", entry.name, entry.version);
    }
    println!();
    println!("{} bundle(s) available", entries.len());

    Ok(())
}
