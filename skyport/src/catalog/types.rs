//! Catalog data types and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One bundle as listed by the catalog server.
///
/// Entries are immutable snapshots scoped to a single catalog listing; the
/// server may publish a newer version at any time after the list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Bundle name, unique within the catalog.
    pub name: String,
    /// Current version of the bundle on the listed channel.
    pub version: String,
}

impl CatalogEntry {
    /// Creates a catalog entry.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Metadata the catalog server reports for a single bundle version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// Bundle name.
    pub name: String,
    /// Bundle version.
    pub version: String,
    /// ETag from the server, usable for change detection.
    pub etag: Option<String>,
    /// Integrity digest of the payload, `<algorithm>:<hex>`.
    pub integrity: Option<String>,
    /// Detached signature over the integrity digest.
    pub signature: Option<String>,
    /// Last-modified timestamp reported by the server.
    pub last_modified: Option<String>,
}

/// Error body the catalog server returns for failed requests.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The HTTP request itself failed (connection, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured endpoint is empty or not a valid URL.
    #[error("invalid catalog endpoint: {0}")]
    InvalidEndpoint(String),

    /// The requested bundle does not exist on the server.
    #[error("bundle not found in the catalog")]
    NotFound,

    /// The server refused access to the catalog.
    #[error("access to the catalog was denied")]
    Forbidden,

    /// Any other non-success HTTP status.
    #[error("catalog returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A required metadata header was absent from the response.
    #[error("catalog response is missing the \"{0}\" header")]
    MissingHeader(&'static str),
}
