use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::normalize::{normalize, query_hash};

const NO_RESULT_TTL_DAYS: i64 = 7;
const HAS_RESULT_TTL_HOURS: i64 = 24;

/// A single cache record.
#[derive(Debug, Clone)]
pub struct QueryCacheEntry {
    pub query_hash: String,
    pub normalized_query: String,
    pub original_query: String,
    pub executed_at: DateTime<Utc>,
    pub results_count: u32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub total_cached: u64,
    pub skipped_today: u64,
}

/// Deduplicating cache of recently executed search queries. All methods
/// are best-effort: a cache failure is a miss, never a propagated error.
#[async_trait]
pub trait QueryCache: Send + Sync {
    async fn should_skip_query(&self, query: &str) -> bool;
    async fn record_query(&self, query: &str, results_count: u32);
    async fn get_stats(&self) -> CacheStats;
    async fn reset_skipped_counter(&self);
    async fn cleanup_expired(&self) -> u64;
    async fn get_all(&self) -> Vec<QueryCacheEntry>;
    async fn clear_all(&self);
    /// Test helper: insert an entry as if `record_query` had run `age_hours` ago.
    async fn add_entry(&self, query: &str, results_count: u32, age_hours: i64);
}

/// In-memory implementation, keyed by normalized-query hash.
pub struct InMemoryQueryCache {
    entries: RwLock<HashMap<String, QueryCacheEntry>>,
    skipped_today: AtomicU64,
}

impl InMemoryQueryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            skipped_today: AtomicU64::new(0),
        }
    }

    fn ttl_for(results_count: u32) -> Duration {
        if results_count >= 1 {
            Duration::hours(HAS_RESULT_TTL_HOURS)
        } else {
            Duration::days(NO_RESULT_TTL_DAYS)
        }
    }
}

impl Default for InMemoryQueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryCache for InMemoryQueryCache {
    async fn should_skip_query(&self, query: &str) -> bool {
        let hash = query_hash(query);
        let now = Utc::now();
        let hit = self
            .entries
            .read()
            .expect("query cache lock poisoned")
            .get(&hash)
            .map(|e| now < e.expires_at)
            .unwrap_or(false);
        if hit {
            self.skipped_today.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    async fn record_query(&self, query: &str, results_count: u32) {
        let hash = query_hash(query);
        let now = Utc::now();
        let entry = QueryCacheEntry {
            query_hash: hash.clone(),
            normalized_query: normalize(query),
            original_query: query.to_string(),
            executed_at: now,
            results_count,
            expires_at: now + Self::ttl_for(results_count),
        };
        self.entries
            .write()
            .expect("query cache lock poisoned")
            .insert(hash, entry);
    }

    async fn get_stats(&self) -> CacheStats {
        CacheStats {
            total_cached: self.entries.read().expect("query cache lock poisoned").len() as u64,
            skipped_today: self.skipped_today.load(Ordering::Relaxed),
        }
    }

    async fn reset_skipped_counter(&self) {
        self.skipped_today.store(0, Ordering::Relaxed);
    }

    async fn cleanup_expired(&self) -> u64 {
        let now = Utc::now();
        let mut entries = self.entries.write().expect("query cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, e| now < e.expires_at);
        (before - entries.len()) as u64
    }

    async fn get_all(&self) -> Vec<QueryCacheEntry> {
        self.entries
            .read()
            .expect("query cache lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    async fn clear_all(&self) {
        self.entries.write().expect("query cache lock poisoned").clear();
    }

    async fn add_entry(&self, query: &str, results_count: u32, age_hours: i64) {
        let hash = query_hash(query);
        let executed_at = Utc::now() - Duration::hours(age_hours);
        let entry = QueryCacheEntry {
            query_hash: hash.clone(),
            normalized_query: normalize(query),
            original_query: query.to_string(),
            executed_at,
            results_count,
            expires_at: executed_at + Self::ttl_for(results_count),
        };
        self.entries
            .write()
            .expect("query cache lock poisoned")
            .insert(hash, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_and_skips() {
        let cache = InMemoryQueryCache::new();
        assert!(!cache.should_skip_query("planted berlin").await);
        cache.record_query("planted berlin", 5).await;
        assert!(cache.should_skip_query("PLANTED   berlin").await);
    }

    #[tokio::test]
    async fn ttl_split_by_result_count() {
        let cache = InMemoryQueryCache::new();
        cache.add_entry("q1", 0, 24 * 7 - 1).await;
        assert!(cache.should_skip_query("q1").await);
        cache.clear_all().await;
        cache.add_entry("q1", 0, 24 * 7 + 1).await;
        assert!(!cache.should_skip_query("q1").await);

        cache.clear_all().await;
        cache.add_entry("q2", 3, 23).await;
        assert!(cache.should_skip_query("q2").await);
        cache.clear_all().await;
        cache.add_entry("q2", 3, 25).await;
        assert!(!cache.should_skip_query("q2").await);
    }

    #[tokio::test]
    async fn cleanup_expired_removes_only_stale_entries() {
        let cache = InMemoryQueryCache::new();
        cache.add_entry("fresh", 1, 1).await;
        cache.add_entry("stale", 0, 24 * 7 + 1).await;
        let deleted = cache.cleanup_expired().await;
        assert_eq!(deleted, 1);
        assert_eq!(cache.get_all().await.len(), 1);
    }

    #[tokio::test]
    async fn skipped_counter_tracks_hits_and_resets() {
        let cache = InMemoryQueryCache::new();
        cache.record_query("q", 1).await;
        cache.should_skip_query("q").await;
        cache.should_skip_query("q").await;
        assert_eq!(cache.get_stats().await.skipped_today, 2);
        cache.reset_skipped_counter().await;
        assert_eq!(cache.get_stats().await.skipped_today, 0);
    }
}
