//! The collaborator contract the sync engine consumes.
//!
//! The trait uses `Pin<Box<dyn Future>>` return types so it stays
//! dyn-compatible: the engine holds an `Arc<dyn Catalog>` and tests swap in
//! mock implementations without touching the network.

use std::future::Future;
use std::pin::Pin;

use super::types::{BundleMetadata, CatalogEntry, CatalogError};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote bundle catalog operations.
///
/// All implementations must be `Send + Sync` so the sync engine can share
/// one client across concurrently running download tasks.
pub trait Catalog: Send + Sync {
    /// List the bundles available on the catalog, optionally scoped to a
    /// release channel.
    fn list<'a>(
        &'a self,
        channel: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<CatalogEntry>, CatalogError>>;

    /// Fetch the current metadata for one bundle without downloading it.
    fn head<'a>(
        &'a self,
        name: &'a str,
        channel: Option<&'a str>,
    ) -> BoxFuture<'a, Result<BundleMetadata, CatalogError>>;

    /// Download one bundle, returning its metadata and raw payload bytes.
    ///
    /// Implementations report transfer progress through whatever side
    /// channel they were configured with; the payload is only returned
    /// once the transfer is complete.
    fn fetch<'a>(
        &'a self,
        name: &'a str,
        channel: Option<&'a str>,
    ) -> BoxFuture<'a, Result<(BundleMetadata, Vec<u8>), CatalogError>>;

    /// Upload one bundle artifact to the catalog.
    fn publish<'a>(
        &'a self,
        name: &'a str,
        payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<BundleMetadata, CatalogError>>;
}
