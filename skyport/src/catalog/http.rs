//! HTTP catalog client backed by reqwest.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{self, HeaderMap};
use reqwest::{StatusCode, Url};

use super::traits::{BoxFuture, Catalog};
use super::types::{BundleMetadata, CatalogEntry, CatalogError, ErrorBody};

/// Header carrying the bundle name on metadata-bearing responses.
const HEADER_NAME: &str = "bundle-name";
/// Header carrying the bundle version.
const HEADER_VERSION: &str = "bundle-version";
/// Header carrying the payload integrity digest.
const HEADER_INTEGRITY: &str = "bundle-integrity";
/// Header carrying the detached signature.
const HEADER_SIGNATURE: &str = "bundle-signature";

/// Transfer progress callback: `(downloaded_bytes, total_bytes, endpoint)`.
pub type ProgressFn = dyn Fn(u64, u64, &str) + Send + Sync + 'static;

/// Builder for [`HttpCatalog`].
#[derive(Default)]
pub struct HttpCatalogBuilder {
    endpoint: String,
    timeout: Option<Duration>,
    on_progress: Option<Arc<ProgressFn>>,
}

impl HttpCatalogBuilder {
    /// Set the base URL of the catalog server.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set a total request timeout.
    ///
    /// No timeout is applied by default; large bundle downloads are bounded
    /// by the transfer itself rather than a wall-clock limit.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a callback invoked with `(downloaded, total, endpoint)` as
    /// download bytes arrive.
    #[must_use]
    pub fn on_progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(u64, u64, &str) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(on_progress));
        self
    }

    /// Build the client, validating the endpoint.
    pub fn build(self) -> Result<HttpCatalog, CatalogError> {
        if self.endpoint.is_empty() {
            return Err(CatalogError::InvalidEndpoint("endpoint is empty".to_string()));
        }
        Url::parse(&self.endpoint)
            .map_err(|e| CatalogError::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))?;

        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "skyport/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(HttpCatalog {
            endpoint: self.endpoint,
            client,
            on_progress: self.on_progress,
        })
    }
}

/// Production catalog client speaking the REST surface described in the
/// module docs.
#[derive(Clone)]
pub struct HttpCatalog {
    endpoint: String,
    client: reqwest::Client,
    on_progress: Option<Arc<ProgressFn>>,
}

impl std::fmt::Debug for HttpCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalog")
            .field("endpoint", &self.endpoint)
            .field("client", &self.client)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl HttpCatalog {
    /// Start building a client.
    pub fn builder() -> HttpCatalogBuilder {
        HttpCatalogBuilder::default()
    }

    /// Build a full request URL from a path under the endpoint and an
    /// optional channel query parameter.
    fn request_url(&self, path: &str, channel: Option<&str>) -> Result<Url, CatalogError> {
        let base = self.endpoint.strip_suffix('/').unwrap_or(&self.endpoint);
        let mut url = Url::parse(&format!("{}/{}", base, path.trim_matches('/')))
            .map_err(|e| CatalogError::InvalidEndpoint(e.to_string()))?;
        if let Some(channel) = channel {
            url.query_pairs_mut().append_pair("channel", channel);
        }
        Ok(url)
    }

    fn parse_metadata(headers: &HeaderMap) -> Result<BundleMetadata, CatalogError> {
        let name =
            header_value(headers, HEADER_NAME).ok_or(CatalogError::MissingHeader(HEADER_NAME))?;
        let version = header_value(headers, HEADER_VERSION)
            .ok_or(CatalogError::MissingHeader(HEADER_VERSION))?;
        Ok(BundleMetadata {
            name,
            version,
            etag: header_value(headers, header::ETAG.as_str()),
            integrity: header_value(headers, HEADER_INTEGRITY),
            signature: header_value(headers, HEADER_SIGNATURE),
            last_modified: header_value(headers, header::LAST_MODIFIED.as_str()),
        })
    }

    async fn parse_error(resp: reqwest::Response) -> CatalogError {
        match resp.status() {
            StatusCode::NOT_FOUND => CatalogError::NotFound,
            StatusCode::FORBIDDEN => CatalogError::Forbidden,
            status => {
                let message = resp
                    .json::<ErrorBody>()
                    .await
                    .ok()
                    .and_then(|body| body.message)
                    .unwrap_or_default();
                CatalogError::Http {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }

    /// Stream a response body to completion, reporting progress per chunk.
    async fn read_body(
        &self,
        resp: reqwest::Response,
        endpoint: &str,
    ) -> Result<Vec<u8>, CatalogError> {
        let total = resp.content_length().unwrap_or(0);
        let mut stream = resp.bytes_stream();
        let mut data = Vec::with_capacity(total as usize);
        let mut downloaded: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            downloaded += chunk.len() as u64;
            data.extend_from_slice(&chunk);
            if let Some(on_progress) = &self.on_progress {
                on_progress(downloaded, total, endpoint);
            }
        }
        Ok(data)
    }
}

impl Catalog for HttpCatalog {
    fn list<'a>(
        &'a self,
        channel: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<CatalogEntry>, CatalogError>> {
        Box::pin(async move {
            let url = self.request_url("bundles", channel)?;
            let resp = self.client.get(url).send().await?;
            if !resp.status().is_success() {
                return Err(Self::parse_error(resp).await);
            }
            Ok(resp.json::<Vec<CatalogEntry>>().await?)
        })
    }

    fn head<'a>(
        &'a self,
        name: &'a str,
        channel: Option<&'a str>,
    ) -> BoxFuture<'a, Result<BundleMetadata, CatalogError>> {
        Box::pin(async move {
            let url = self.request_url(&format!("bundles/{}", name), channel)?;
            let resp = self.client.head(url).send().await?;
            if !resp.status().is_success() {
                return Err(Self::parse_error(resp).await);
            }
            Self::parse_metadata(resp.headers())
        })
    }

    fn fetch<'a>(
        &'a self,
        name: &'a str,
        channel: Option<&'a str>,
    ) -> BoxFuture<'a, Result<(BundleMetadata, Vec<u8>), CatalogError>> {
        Box::pin(async move {
            let url = self.request_url(&format!("bundles/{}", name), channel)?;
            let endpoint = url.to_string();
            tracing::debug!(bundle = %name, url = %endpoint, "Downloading bundle");
            let resp = self.client.get(url).send().await?;
            if !resp.status().is_success() {
                return Err(Self::parse_error(resp).await);
            }
            let metadata = Self::parse_metadata(resp.headers())?;
            let data = self.read_body(resp, &endpoint).await?;
            tracing::debug!(
                bundle = %metadata.name,
                version = %metadata.version,
                bytes = data.len(),
                "Download complete"
            );
            Ok((metadata, data))
        })
    }

    fn publish<'a>(
        &'a self,
        name: &'a str,
        payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<BundleMetadata, CatalogError>> {
        Box::pin(async move {
            let url = self.request_url(&format!("bundles/{}", name), None)?;
            tracing::debug!(bundle = %name, bytes = payload.len(), "Uploading bundle");
            let resp = self.client.post(url).body(payload).send().await?;
            if !resp.status().is_success() {
                return Err(Self::parse_error(resp).await);
            }
            Self::parse_metadata(resp.headers())
        })
    }
}

fn header_value(headers: &HeaderMap, key: &str) -> Option<String> {
    headers
        .get(key)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).to_string())
}
