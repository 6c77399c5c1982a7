//! Sync outcome and error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::{BundleMetadata, CatalogError};
use crate::integrity::IntegrityError;
use crate::manifest::{ManifestError, VersionMetadata};

/// Why a single bundle download failed.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The catalog transfer failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The payload failed integrity verification.
    #[error("integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),

    /// Writing the bundle to the destination directory failed.
    #[error("failed to write bundle: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one attempted bundle download.
///
/// One outcome exists per task, created when the task finishes and never
/// mutated afterwards; the aggregation step consumes them positionally.
#[derive(Debug)]
pub struct DownloadOutcome {
    /// Bundle name the task was dispatched for.
    pub name: String,
    /// Download result: metadata on success, the captured error otherwise.
    pub result: Result<BundleMetadata, TaskError>,
}

impl DownloadOutcome {
    /// Whether this bundle downloaded (and verified) successfully.
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run-level sync failures.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The include/exclude filters selected nothing from the catalog.
    #[error("no bundles in the catalog match the configured filters")]
    NoEligibleBundles,

    /// One or more bundle downloads failed; nothing was committed.
    #[error("{} bundle(s) failed to download", failures.len())]
    PartialFailure {
        /// Every failed bundle with its underlying error.
        failures: Vec<(String, TaskError)>,
    },

    /// The destination already holds a manifest and `clean` was not
    /// requested.
    #[error("destination {path} already contains a manifest; pass clean to replace it")]
    AlreadyPopulated {
        /// The offending destination directory.
        path: PathBuf,
    },

    /// Writing to disk was requested without a destination directory.
    #[error("a destination directory is required when writing to disk")]
    MissingDestination,

    /// Listing the catalog failed before any download began.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Preparing the destination directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisting the manifest failed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

impl From<&BundleMetadata> for VersionMetadata {
    fn from(metadata: &BundleMetadata) -> Self {
        Self {
            etag: metadata.etag.clone(),
            integrity: metadata.integrity.clone(),
            signature: metadata.signature.clone(),
            last_modified: metadata.last_modified.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_failure_counts_in_message() {
        let err = SyncError::PartialFailure {
            failures: vec![
                ("app".to_string(), TaskError::Catalog(CatalogError::NotFound)),
                (
                    "docs".to_string(),
                    TaskError::Catalog(CatalogError::Forbidden),
                ),
            ],
        };
        assert!(format!("{}", err).contains("2 bundle(s)"));
    }

    #[test]
    fn test_version_metadata_from_bundle_metadata() {
        let metadata = BundleMetadata {
            name: "app".to_string(),
            version: "1.0.0".to_string(),
            etag: Some("\"abc\"".to_string()),
            integrity: Some("sha256:ffff".to_string()),
            signature: None,
            last_modified: None,
        };
        let version: VersionMetadata = (&metadata).into();
        assert_eq!(version.etag.as_deref(), Some("\"abc\""));
        assert_eq!(version.integrity.as_deref(), Some("sha256:ffff"));
        assert!(version.signature.is_none());
    }
}
