//! Upload command - publish a bundle artifact to the catalog.

use std::path::PathBuf;

use clap::Args;
use console::style;
use skyport::catalog::Catalog;

use super::common;
use crate::error::CliError;

/// Arguments for the upload command.
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Name to publish the bundle under
    pub name: String,

    /// Bundle file to upload
    pub file: PathBuf,

    /// Catalog server base URL
    #[arg(long)]
    pub endpoint: Option<String>,
}

/// Run the upload command.
pub async fn run(args: UploadArgs) -> Result<(), CliError> {
    let config = common::load_config();
    let endpoint = common::require_endpoint(args.endpoint, &config)?;

    let payload = tokio::fs::read(&args.file).await?;
    let catalog = common::catalog_builder(&endpoint).build()?;
    let metadata = catalog.publish(&args.name, payload).await?;

    println!(
        "{} Published {} {}",
        style("✓").green(),
        metadata.name,
        metadata.version
    );

    Ok(())
}
