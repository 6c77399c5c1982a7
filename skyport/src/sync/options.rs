//! Sync run configuration.

use std::path::PathBuf;

use crate::filter::MatchRule;
use crate::integrity::IntegrityPolicy;

/// Lowest concurrency the default derivation will pick.
const MIN_DEFAULT_CONCURRENCY: usize = 1;
/// Highest concurrency the default derivation will pick.
const MAX_DEFAULT_CONCURRENCY: usize = 8;

/// Parallel download bound derived from the host.
///
/// Available parallelism clamped to `[1, 8]`; downloads are network-bound,
/// so more in-flight transfers than that stop paying off.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
        .clamp(MIN_DEFAULT_CONCURRENCY, MAX_DEFAULT_CONCURRENCY)
}

/// Configuration for one sync run.
#[derive(Debug, Default)]
pub struct SyncOptions {
    /// Rules selecting bundles to install; empty selects everything.
    pub include: Vec<MatchRule>,
    /// Rules removing bundles from the install set; empty removes nothing.
    pub exclude: Vec<MatchRule>,
    /// Release channel to list and download from.
    pub channel: Option<String>,
    /// Parallel download bound; derived from the host when unset.
    pub concurrency: Option<usize>,
    /// Directory receiving bundle files and the manifest.
    pub dest_dir: Option<PathBuf>,
    /// When false, run everything except filesystem writes (dry run).
    pub write_to_disk: bool,
    /// Remove the destination directory before downloading.
    pub clean: bool,
    /// How to treat bundles without integrity metadata.
    pub integrity: IntegrityPolicy,
}

impl SyncOptions {
    /// Options that write to `dest_dir` with default filtering and
    /// concurrency.
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: Some(dest_dir.into()),
            write_to_disk: true,
            ..Self::default()
        }
    }

    /// Options for a dry run: full network and filter work, no disk
    /// mutation.
    pub fn dry_run() -> Self {
        Self::default()
    }

    /// Set the include rules.
    #[must_use]
    pub fn include(mut self, rules: Vec<MatchRule>) -> Self {
        self.include = rules;
        self
    }

    /// Set the exclude rules.
    #[must_use]
    pub fn exclude(mut self, rules: Vec<MatchRule>) -> Self {
        self.exclude = rules;
        self
    }

    /// Set the release channel.
    #[must_use]
    pub fn channel(mut self, channel: Option<String>) -> Self {
        self.channel = channel;
        self
    }

    /// Set an explicit parallel download bound.
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Set whether the destination is removed before downloading.
    #[must_use]
    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Set the integrity policy.
    #[must_use]
    pub fn integrity(mut self, policy: IntegrityPolicy) -> Self {
        self.integrity = policy;
        self
    }

    /// The parallel download bound for this run, never below one.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency
            .unwrap_or_else(default_concurrency)
            .max(1)
    }
}
