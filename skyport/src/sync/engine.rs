//! The synchronizer: list, filter, download, aggregate, commit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{BundleMetadata, Catalog};
use crate::filter;
use crate::integrity::{self, IntegrityPolicy};
use crate::manifest::{Manifest, VersionMetadata, MANIFEST_FILENAME};
use crate::progress::ProgressTracker;

use super::options::SyncOptions;
use super::pool::run_limited;
use super::types::{DownloadOutcome, SyncError, TaskError};

/// File extension for persisted bundle payloads.
pub const BUNDLE_EXTENSION: &str = "bundle";

/// Remote-versus-local version comparison for one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatus {
    /// Bundle name.
    pub name: String,
    /// Version currently offered by the catalog.
    pub remote_version: String,
    /// Version recorded in the local manifest, if installed.
    pub local_version: Option<String>,
    /// Whether the catalog offers something the manifest does not have.
    pub update_available: bool,
}

/// Reconciles a local bundle directory with the remote catalog.
pub struct Synchronizer {
    catalog: Arc<dyn Catalog>,
    tracker: Arc<ProgressTracker>,
    options: SyncOptions,
}

impl Synchronizer {
    /// Create a synchronizer with progress reporting disabled.
    pub fn new(catalog: Arc<dyn Catalog>, options: SyncOptions) -> Self {
        Self {
            catalog,
            tracker: Arc::new(ProgressTracker::disabled()),
            options,
        }
    }

    /// Attach a progress tracker for this run.
    #[must_use]
    pub fn with_tracker(mut self, tracker: Arc<ProgressTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    /// Run one synchronization pass.
    ///
    /// Lists the catalog, applies the include/exclude rules, downloads the
    /// install set under the configured concurrency bound, and commits the
    /// manifest. The manifest is all-or-nothing: if any download fails the
    /// run returns [`SyncError::PartialFailure`] naming every broken
    /// bundle, and no manifest is written.
    pub async fn sync(&self) -> Result<Manifest, SyncError> {
        let write_dir = self.prepare_destination().await?;

        let channel = self.options.channel.as_deref();
        let entries = self.catalog.list(channel).await?;
        tracing::info!(
            count = entries.len(),
            channel = channel.unwrap_or("default"),
            "Listed remote catalog"
        );

        let mut selected = Vec::with_capacity(entries.len());
        for entry in entries {
            if filter::is_selected(&entry, &self.options.include, &self.options.exclude).await {
                selected.push(entry);
            }
        }
        if selected.is_empty() {
            return Err(SyncError::NoEligibleBundles);
        }
        tracing::info!(count = selected.len(), "Resolved install set");

        let limit = self.options.effective_concurrency();
        let policy = self.options.integrity;
        let tasks: Vec<_> = selected
            .into_iter()
            .map(|entry| {
                let catalog = Arc::clone(&self.catalog);
                let tracker = Arc::clone(&self.tracker);
                let channel = self.options.channel.clone();
                let write_dir = write_dir.clone();
                async move {
                    let name = entry.name;
                    let result = download_one(
                        catalog,
                        &name,
                        channel.as_deref(),
                        write_dir.as_deref(),
                        policy,
                    )
                    .await;
                    tracker.on_done(&name);
                    DownloadOutcome { name, result }
                }
            })
            .collect();

        let outcomes = run_limited(tasks, limit).await;

        // The manifest is assembled here, after every network leg has
        // returned; download tasks never touch it.
        let mut manifest = Manifest::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(metadata) => {
                    manifest.insert(
                        &metadata.name,
                        &metadata.version,
                        VersionMetadata::from(&metadata),
                    );
                }
                Err(error) => {
                    tracing::warn!(bundle = %outcome.name, error = %error, "Bundle download failed");
                    failures.push((outcome.name, error));
                }
            }
        }
        if !failures.is_empty() {
            return Err(SyncError::PartialFailure { failures });
        }

        if let Some(dir) = &write_dir {
            let path = manifest.save(dir).await?;
            tracing::info!(
                count = manifest.len(),
                path = %path.display(),
                "Wrote install manifest"
            );
        }
        Ok(manifest)
    }

    /// Compare the remote catalog against a local manifest without
    /// touching any local state.
    pub async fn check(&self, manifest: &Manifest) -> Result<Vec<UpdateStatus>, SyncError> {
        let entries = self.catalog.list(self.options.channel.as_deref()).await?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let local_version = manifest.current_version(&entry.name).map(str::to_string);
                let update_available = local_version.as_deref() != Some(entry.version.as_str());
                UpdateStatus {
                    name: entry.name,
                    remote_version: entry.version,
                    local_version,
                    update_available,
                }
            })
            .collect())
    }

    /// Validate and prepare the destination, returning the directory to
    /// write into (`None` on dry runs).
    async fn prepare_destination(&self) -> Result<Option<PathBuf>, SyncError> {
        if !self.options.write_to_disk {
            return Ok(None);
        }
        let dir = self
            .options
            .dest_dir
            .clone()
            .ok_or(SyncError::MissingDestination)?;
        if tokio::fs::try_exists(&dir).await? {
            if self.options.clean {
                tracing::debug!(path = %dir.display(), "Removing destination before sync");
                tokio::fs::remove_dir_all(&dir).await?;
            } else if tokio::fs::try_exists(dir.join(MANIFEST_FILENAME)).await? {
                return Err(SyncError::AlreadyPopulated { path: dir });
            }
        }
        Ok(Some(dir))
    }
}

/// Download one bundle, verify it, and (when a directory is given) write
/// its payload under `<dir>/<name>/<name>_<version>.bundle`.
async fn download_one(
    catalog: Arc<dyn Catalog>,
    name: &str,
    channel: Option<&str>,
    write_dir: Option<&Path>,
    policy: IntegrityPolicy,
) -> Result<BundleMetadata, TaskError> {
    let (metadata, payload) = catalog.fetch(name, channel).await?;
    integrity::verify(policy, metadata.integrity.as_deref(), &payload)?;
    if let Some(dir) = write_dir {
        let bundle_dir = dir.join(&metadata.name);
        tokio::fs::create_dir_all(&bundle_dir).await?;
        let filename = format!("{}_{}.{}", metadata.name, metadata.version, BUNDLE_EXTENSION);
        tokio::fs::write(bundle_dir.join(filename), &payload).await?;
        tracing::debug!(
            bundle = %metadata.name,
            version = %metadata.version,
            bytes = payload.len(),
            "Wrote bundle payload"
        );
    }
    Ok(metadata)
}
