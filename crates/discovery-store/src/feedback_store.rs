use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use discovery_common::{FeedbackRecord, FeedbackStats, ResultType};

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Append-only.
    async fn record_search(&self, record: FeedbackRecord);
    async fn get_for_learning(&self, days: i64) -> Vec<FeedbackRecord>;
    async fn get_stats(&self) -> FeedbackStats;
}

pub struct InMemoryFeedbackStore {
    records: RwLock<Vec<FeedbackRecord>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryFeedbackStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn record_search(&self, record: FeedbackRecord) {
        self.records.write().expect("feedback store lock poisoned").push(record);
    }

    async fn get_for_learning(&self, days: i64) -> Vec<FeedbackRecord> {
        let cutoff = Utc::now() - Duration::days(days);
        self.records
            .read()
            .expect("feedback store lock poisoned")
            .iter()
            .filter(|r| r.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    async fn get_stats(&self) -> FeedbackStats {
        let records = self.records.read().expect("feedback store lock poisoned");
        let total = records.len() as u32;
        let successes = records
            .iter()
            .filter(|r| r.result_type == ResultType::TruePositive)
            .count() as u32;
        let overall_success_rate = if total == 0 { 0 } else { (100 * successes / total) as u8 };
        FeedbackStats {
            total,
            overall_success_rate,
        }
    }
}
