pub mod google;
pub mod pool;
pub mod provider;
pub mod types;

pub use google::GoogleSearchProvider;
pub use pool::{Credential, CredentialUsage, PoolStats, SearchEnginePool};
pub use provider::SearchProvider;
pub use types::SearchResultItem;
