//! Manifest command - inspect the local install manifest.

use std::path::PathBuf;

use clap::Args;
use console::style;
use skyport::manifest::{Manifest, MANIFEST_FILENAME};

use super::common;
use crate::error::CliError;

/// Arguments for the manifest command.
#[derive(Debug, Args)]
pub struct ManifestArgs {
    /// Directory holding the manifest
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Run the manifest command.
pub async fn run(args: ManifestArgs) -> Result<(), CliError> {
    let config = common::load_config();
    let dir = common::resolve_dir(args.dir, &config);

    let path = dir.join(MANIFEST_FILENAME);
    if !path.exists() {
        println!("No manifest at {}.", path.display());
        return Ok(());
    }
    let manifest = Manifest::load(&path).await?;

    if manifest.is_empty() {
        println!("The manifest is empty.");
        return Ok(());
    }

    println!(
        "{:<24} {:<12} {}",
        style("NAME").bold(),
        style("VERSION").bold(),
        style("CURRENT").bold()
    );
    for (name, entry) in &manifest.entries {
        for version in entry.versions.keys() {
            let current = if *version == entry.current_version {
                "*"
            } else {
                ""
            };
            println!("{:<24} {:<12} {}", name, version, current);
        }
    }

    Ok(())
}
