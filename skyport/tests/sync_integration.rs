//! Integration tests for the sync engine.
//!
//! These tests drive the complete flow through the public API:
//! - catalog listing → filtering → bounded downloads → manifest commit
//! - partial failure aggregation and the all-or-nothing manifest rule
//! - progress tracker wiring over the transport side channel
//!
//! Run with: `cargo test --test sync_integration`

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use skyport::catalog::{BoxFuture, BundleMetadata, Catalog, CatalogEntry, CatalogError};
use skyport::filter::MatchRule;
use skyport::manifest::{Manifest, MANIFEST_FILENAME};
use skyport::sync::{SyncError, SyncOptions, Synchronizer, BUNDLE_EXTENSION};

// ============================================================================
// Helper Catalog
// ============================================================================

/// Catalog fake that serves a fixed listing, optionally failing some
/// bundles, and records the highest number of fetches in flight at once.
struct FakeCatalog {
    entries: Vec<CatalogEntry>,
    fail: HashSet<String>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeCatalog {
    fn new(names: &[&str]) -> Self {
        Self {
            entries: names
                .iter()
                .map(|name| CatalogEntry::new(*name, "1.0.0"))
                .collect(),
            fail: HashSet::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing(mut self, name: &str) -> Self {
        self.fail.insert(name.to_string());
        self
    }

    fn payload(name: &str) -> Vec<u8> {
        format!("bytes-of-{}", name).into_bytes()
    }
}

impl Catalog for FakeCatalog {
    fn list<'a>(
        &'a self,
        _channel: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<CatalogEntry>, CatalogError>> {
        Box::pin(async move { Ok(self.entries.clone()) })
    }

    fn head<'a>(
        &'a self,
        name: &'a str,
        _channel: Option<&'a str>,
    ) -> BoxFuture<'a, Result<BundleMetadata, CatalogError>> {
        Box::pin(async move {
            self.entries
                .iter()
                .find(|e| e.name == name)
                .map(|e| BundleMetadata {
                    name: e.name.clone(),
                    version: e.version.clone(),
                    ..BundleMetadata::default()
                })
                .ok_or(CatalogError::NotFound)
        })
    }

    fn fetch<'a>(
        &'a self,
        name: &'a str,
        channel: Option<&'a str>,
    ) -> BoxFuture<'a, Result<(BundleMetadata, Vec<u8>), CatalogError>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail.contains(name) {
                return Err(CatalogError::NotFound);
            }
            let metadata = self.head(name, channel).await?;
            Ok((metadata, Self::payload(name)))
        })
    }

    fn publish<'a>(
        &'a self,
        _name: &'a str,
        _payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<BundleMetadata, CatalogError>> {
        Box::pin(async move { Err(CatalogError::Forbidden) })
    }
}

fn bundle_file(dest: &Path, name: &str) -> std::path::PathBuf {
    dest.join(name)
        .join(format!("{}_1.0.0.{}", name, BUNDLE_EXTENSION))
}

// ============================================================================
// Integration Tests
// ============================================================================

/// A full successful run lands every payload and a loadable manifest.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn full_sync_writes_payloads_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("bundles");
    let names = ["app", "docs", "assets", "fonts"];
    let catalog = FakeCatalog::new(&names);

    let manifest = Synchronizer::new(Arc::new(catalog), SyncOptions::new(&dest))
        .sync()
        .await
        .unwrap();

    assert_eq!(manifest.len(), names.len());
    for name in names {
        assert_eq!(
            tokio::fs::read(bundle_file(&dest, name)).await.unwrap(),
            FakeCatalog::payload(name)
        );
    }

    let on_disk = Manifest::load(&dest.join(MANIFEST_FILENAME)).await.unwrap();
    assert_eq!(on_disk, manifest);
}

/// The concurrency bound holds across a real multi-threaded run.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_bound_is_respected_end_to_end() {
    let catalog = FakeCatalog::new(&["a", "b", "c", "d", "e", "f", "g", "h"]);
    let max_in_flight = Arc::clone(&catalog.max_in_flight);

    let options = SyncOptions::dry_run().concurrency(2);
    Synchronizer::new(Arc::new(catalog), options)
        .sync()
        .await
        .unwrap();

    assert!(max_in_flight.load(Ordering::SeqCst) <= 2);
}

/// One broken bundle fails the run, names exactly the broken bundle, and
/// leaves no manifest behind.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn partial_failure_leaves_no_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("bundles");
    let catalog = FakeCatalog::new(&["app", "docs", "assets"]).failing("docs");

    let err = Synchronizer::new(Arc::new(catalog), SyncOptions::new(&dest))
        .sync()
        .await
        .unwrap_err();

    match err {
        SyncError::PartialFailure { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, "docs");
        }
        other => panic!("expected PartialFailure, got {:?}", other),
    }
    assert!(!dest.join(MANIFEST_FILENAME).exists());
}

/// Include and exclude rules compose across rule shapes.
#[tokio::test]
async fn mixed_rule_shapes_select_the_install_set() {
    let catalog = FakeCatalog::new(&["app", "app-beta", "docs", "legacy-docs"]);

    let options = SyncOptions::dry_run()
        .include(vec![
            MatchRule::name("app*"),
            MatchRule::regex(regex::Regex::new("docs$").unwrap()),
        ])
        .exclude(vec![MatchRule::any(vec![
            MatchRule::name("*-beta"),
            MatchRule::predicate_fn(|entry| entry.name.starts_with("legacy")),
        ])]);

    let manifest = Synchronizer::new(Arc::new(catalog), options)
        .sync()
        .await
        .unwrap();

    let installed: Vec<_> = manifest.entries.keys().cloned().collect();
    assert_eq!(installed, vec!["app", "docs"]);
}
