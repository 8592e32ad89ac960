use std::sync::Arc;

use discovery_common::{DiscoveryError, Result};
use tracing::warn;

use crate::pool::SearchEnginePool;
use crate::provider::{transport_error, SearchProvider};
use crate::types::{GoogleSearchResponse, SearchResultItem};

const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Google Custom Search JSON API client, credential-pooled. On a 429 it marks the credential exhausted
/// and retries with the next one; it never retries on any other error.
pub struct GoogleSearchProvider {
    http: reqwest::Client,
    pool: Arc<SearchEnginePool>,
    endpoint: String,
}

impl GoogleSearchProvider {
    pub fn new(pool: Arc<SearchEnginePool>) -> Self {
        Self {
            http: reqwest::Client::new(),
            pool,
            endpoint: ENDPOINT.to_string(),
        }
    }

    /// Point at a different endpoint (used in tests against a mock server).
    pub fn with_endpoint(pool: Arc<SearchEnginePool>, endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            pool,
            endpoint,
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for GoogleSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>> {
        loop {
            let credential = self
                .pool
                .get_available_credential()
                .ok_or(DiscoveryError::QuotaExhausted)?;

            let response = self
                .http
                .get(&self.endpoint)
                .query(&[
                    ("key", credential.api_key.as_str()),
                    ("cx", credential.engine_id.as_str()),
                    ("q", query),
                    ("num", "10"),
                ])
                .send()
                .await
                .map_err(|_| transport_error(0))?;

            let status = response.status();
            if status.as_u16() == 429 {
                warn!(credential = credential.id, "search credential rate limited, rotating");
                self.pool.mark_exhausted(&credential.id);
                continue;
            }
            if !status.is_success() {
                return Err(transport_error(status.as_u16()));
            }

            self.pool.record_usage(&credential.id);

            let parsed: GoogleSearchResponse = response.json().await.map_err(|_| transport_error(status.as_u16()))?;
            let items = parsed
                .items
                .into_iter()
                .take(10)
                .enumerate()
                .map(|(i, item)| SearchResultItem {
                    position: (i + 1) as u32,
                    title: item.title,
                    url: item.link,
                    snippet: item.snippet,
                })
                .collect();
            return Ok(items);
        }
    }
}
