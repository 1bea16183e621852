//! HTTP client for the remote catalog search endpoint.
//!
//! `GET {base_url}?search=…&page=…&limit=10` with an `x-api-key` header.
//! The endpoint answers with a JSON array of products; anything else is read
//! as an empty page. Non-2xx responses are errors.

use crate::config::{ClientConfig, PAGE_SIZE};
use crate::error::{Result, UpsellError};
use crate::models::Product;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

/// Anything that can answer a paginated catalog search.
///
/// Implemented by [`CatalogClient`] for the live endpoint; tests and offline
/// hosts plug in their own.
pub trait CatalogSource {
    fn search(&self, query: &str, page: u32) -> Result<Vec<Product>>;
}

/// Decode a search response body into one page of products.
///
/// A non-array body degrades to an empty page.
pub fn parse_page(body: Value) -> Result<Vec<Product>> {
    if body.is_array() {
        return Ok(serde_json::from_value(body)?);
    }
    let kind = match body {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        _ => "object",
    };
    tracing::warn!(kind, "catalog response is not an array; treating as empty page");
    Ok(Vec::new())
}

// ---------------------------------------------------------------------------
// CatalogClient
// ---------------------------------------------------------------------------

/// Blocking client for the catalog search endpoint.
pub struct CatalogClient {
    config: ClientConfig,
    client: Client,
}

impl CatalogClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch one page of search results.
    pub fn fetch_page(&self, query: &str, page: u32) -> Result<Vec<Product>> {
        if page == 0 {
            return Err(UpsellError::InvalidArgument(
                "catalog pages are numbered from 1".to_string(),
            ));
        }
        tracing::debug!(url = %self.config.base_url, query, page, "GET catalog page");

        let resp = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("search", query.to_string()),
                ("page", page.to_string()),
                ("limit", PAGE_SIZE.to_string()),
            ])
            .header(CONTENT_TYPE, "application/json")
            .header("x-api-key", &self.config.api_key)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpsellError::Status(status.as_u16()));
        }

        let body: Value = resp.json()?;
        parse_page(body)
    }
}

impl CatalogSource for CatalogClient {
    fn search(&self, query: &str, page: u32) -> Result<Vec<Product>> {
        self.fetch_page(query, page)
    }
}
