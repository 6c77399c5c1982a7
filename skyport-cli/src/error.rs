//! CLI-level error type.

use skyport::catalog::CatalogError;
use skyport::config::ConfigError;
use skyport::integrity::IntegrityError;
use skyport::manifest::ManifestError;
use skyport::sync::SyncError;
use thiserror::Error;

/// Errors surfaced to the user; every variant maps to exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// Missing or contradictory settings.
    #[error("{0}")]
    Config(String),

    /// The config file could not be read or written.
    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    /// A catalog request failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The sync run failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The local manifest could not be read.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A downloaded payload failed verification.
    #[error("integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
