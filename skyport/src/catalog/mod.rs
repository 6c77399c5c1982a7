//! Remote bundle catalog access.
//!
//! This module defines the narrow contract the sync engine consumes
//! ([`Catalog`]) and the production HTTP implementation ([`HttpCatalog`]).
//! The trait exists so command handlers and the sync engine can be tested
//! against hand-written mock catalogs without network access.
//!
//! # Wire Contract
//!
//! The catalog server exposes a small REST surface:
//!
//! ```text
//! GET  /bundles[?channel=...]        -> JSON [{name, version}, ...]
//! HEAD /bundles/:name[?channel=...]  -> metadata in response headers
//! GET  /bundles/:name[?channel=...]  -> bundle bytes, metadata in headers
//! POST /bundles/:name                -> upload, metadata in headers
//! ```
//!
//! Bundle metadata travels in the `bundle-name`, `bundle-version`,
//! `bundle-integrity`, `bundle-signature`, `etag` and `last-modified`
//! response headers.

mod http;
mod traits;
mod types;

pub use http::{HttpCatalog, HttpCatalogBuilder, ProgressFn};
pub use traits::{BoxFuture, Catalog};
pub use types::{BundleMetadata, CatalogEntry, CatalogError};
