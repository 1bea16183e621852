//! Async wrapper around a [`CatalogSource`] for use in async runtimes (Tokio, etc.).
//!
//! Runs each catalog request on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], so a search and a load-more can be in
//! flight at the same time. Results come back paired with their
//! [`FetchTicket`] and are merged with
//! [`UpsellEditor::finish_fetch`](crate::UpsellEditor::finish_fetch), which
//! drops any response dispatched before the latest search.
//!
//! # Example
//!
//! ```no_run
//! use upsell_picker::{AsyncCatalogClient, CatalogSource, UpsellEditor};
//! use upsell_picker::models::Product;
//!
//! struct Offline;
//! impl CatalogSource for Offline {
//!     fn search(&self, _q: &str, _p: u32) -> upsell_picker::Result<Vec<Product>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let client = AsyncCatalogClient::builder().api_key("secret").build().await.unwrap();
//!     let mut editor = UpsellEditor::with_source(Offline);
//!
//!     let ticket = editor.begin_search("shoe");
//!     let (ticket, result) = client.fetch(ticket).await;
//!     editor.finish_fetch(&ticket, result);
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::FetchTicket;
use crate::client::{CatalogClient, CatalogSource};
use crate::config::{self, ClientConfig};
use crate::error::{Result, UpsellError};
use crate::models::Product;

// ---------------------------------------------------------------------------
// AsyncCatalogClientBuilder
// ---------------------------------------------------------------------------

/// Builder for an [`AsyncCatalogClient`] talking to the live endpoint.
pub struct AsyncCatalogClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Duration,
}

impl Default for AsyncCatalogClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: config::DEFAULT_TIMEOUT,
        }
    }
}

impl AsyncCatalogClientBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    ///
    /// The blocking HTTP client is created on the blocking thread pool, since
    /// it cannot be constructed from inside the async event loop.
    pub async fn build(self) -> Result<AsyncCatalogClient> {
        let config = ClientConfig::resolve(self.base_url, self.api_key, self.timeout)?;
        let client = tokio::task::spawn_blocking(move || CatalogClient::new(config))
            .await
            .map_err(|e| UpsellError::InvalidArgument(format!("Task join error: {e}")))??;
        Ok(AsyncCatalogClient::new(client))
    }
}

// ---------------------------------------------------------------------------
// AsyncCatalogClient
// ---------------------------------------------------------------------------

/// Async front for any [`CatalogSource`].
pub struct AsyncCatalogClient<S = CatalogClient> {
    inner: Arc<S>,
}

impl<S> Clone for AsyncCatalogClient<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl AsyncCatalogClient<CatalogClient> {
    /// Create a new builder for the live-endpoint client.
    pub fn builder() -> AsyncCatalogClientBuilder {
        AsyncCatalogClientBuilder::default()
    }
}

impl<S> AsyncCatalogClient<S>
where
    S: CatalogSource + Send + Sync + 'static,
{
    pub fn new(source: S) -> Self {
        Self {
            inner: Arc::new(source),
        }
    }

    /// Fetch one page on the blocking pool.
    pub async fn search(&self, query: &str, page: u32) -> Result<Vec<Product>> {
        let source = self.inner.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || source.search(&query, page))
            .await
            .map_err(|e| UpsellError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Run the request described by `ticket`, handing the ticket back with the result.
    pub async fn fetch(&self, ticket: FetchTicket) -> (FetchTicket, Result<Vec<Product>>) {
        let result = self.search(&ticket.query, ticket.page).await;
        (ticket, result)
    }

    /// Release the client.
    ///
    /// The last reference is dropped on the blocking pool, where tearing down
    /// a blocking HTTP client is allowed.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || drop(self))
            .await
            .map_err(|e| UpsellError::InvalidArgument(format!("Task join error: {e}")))
    }
}
