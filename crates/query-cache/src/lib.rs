pub mod cache;
pub mod normalize;

pub use cache::{CacheStats, InMemoryQueryCache, QueryCache, QueryCacheEntry};
pub use normalize::{normalize, query_hash};
