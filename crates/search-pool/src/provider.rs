use async_trait::async_trait;
use discovery_common::{DiscoveryError, Result};

use crate::types::SearchResultItem;

/// A web search backend used by the discovery orchestrator to run one
/// query. Implementations own their own retry/credential-rotation
/// behavior; callers just get back up to 10 results or an error.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>>;
}

pub(crate) fn transport_error(status: u16) -> DiscoveryError {
    DiscoveryError::SearchTransport { status }
}
