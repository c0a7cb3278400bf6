//! HTTP repository
//!
//! Fetches the catalog as a JSON array from a single `GET` endpoint.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{FetchError, ItemRepository};
use crate::item::Item;

/// Catalog source reached over HTTP
#[derive(Clone, Debug)]
pub struct HttpRepository {
    url: String,
    http_client: reqwest::Client,
}

impl HttpRepository {
    /// Create a repository for `url`, with a client-side request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            url: url.into(),
            http_client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ItemRepository for HttpRepository {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> Result<Vec<Item>, FetchError> {
        tracing::debug!(url = %self.url, "Fetching catalog");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(FetchError::MalformedResponse(format!(
                "catalog returned {status}"
            )));
        }

        // Read the body first so transport errors and decode errors stay distinct
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::ConnectionFailed(e.to_string()))?;

        let items = decode_catalog(&body)?;
        tracing::debug!(count = items.len(), "Catalog fetched");
        Ok(items)
    }
}

/// Decode and validate a catalog body
pub(crate) fn decode_catalog(body: &[u8]) -> Result<Vec<Item>, FetchError> {
    let items: Vec<Item> = serde_json::from_slice(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    if let Some(bad) = items
        .iter()
        .find(|item| !item.price.is_finite() || item.price < 0.0)
    {
        return Err(FetchError::MalformedResponse(format!(
            "item {} has invalid price {}",
            bad.id, bad.price
        )));
    }

    Ok(items)
}
