use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use discovery_common::{strategy_tier, Strategy, StrategyStatus, StrategyTierCounts};
use uuid::Uuid;

const MIN_USES_FOR_TIER: u32 = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct UsageOutcome {
    pub success: bool,
    pub was_false_positive: bool,
}

#[async_trait]
pub trait StrategyStore: Send + Sync {
    /// Idempotent: inserts `seed_strategies` only if the store is currently empty.
    async fn seed(&self, seed_strategies: Vec<Strategy>);
    async fn count(&self) -> usize;
    async fn get_all(&self) -> Vec<Strategy>;
    /// Active strategies for (platform, country) with `success_rate >= min_success_rate`,
    /// ordered by success rate descending.
    async fn get_active(&self, platform: &str, country: &str, min_success_rate: u8) -> Vec<Strategy>;
    async fn create(&self, strategy: Strategy) -> Strategy;
    async fn deprecate(&self, id: Uuid, reason: String);
    async fn record_usage(&self, id: Uuid, outcome: UsageOutcome);
    async fn get_strategy_tiers(&self) -> StrategyTierCounts;
}

pub struct InMemoryStrategyStore {
    strategies: RwLock<HashMap<Uuid, Strategy>>,
}

impl InMemoryStrategyStore {
    pub fn new() -> Self {
        Self {
            strategies: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStrategyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StrategyStore for InMemoryStrategyStore {
    async fn seed(&self, seed_strategies: Vec<Strategy>) {
        let mut strategies = self.strategies.write().expect("strategy store lock poisoned");
        if !strategies.is_empty() {
            return;
        }
        for s in seed_strategies {
            strategies.insert(s.id, s);
        }
    }

    async fn count(&self) -> usize {
        self.strategies.read().expect("strategy store lock poisoned").len()
    }

    async fn get_all(&self) -> Vec<Strategy> {
        self.strategies
            .read()
            .expect("strategy store lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    async fn get_active(&self, platform: &str, country: &str, min_success_rate: u8) -> Vec<Strategy> {
        let mut matching: Vec<Strategy> = self
            .strategies
            .read()
            .expect("strategy store lock poisoned")
            .values()
            .filter(|s| {
                s.status == StrategyStatus::Active
                    && s.platform == platform
                    && s.country == country
                    && s.success_rate >= min_success_rate
            })
            .cloned()
            .collect();
        matching.sort_by_key(|s| std::cmp::Reverse(s.success_rate));
        matching
    }

    async fn create(&self, strategy: Strategy) -> Strategy {
        let mut strategies = self.strategies.write().expect("strategy store lock poisoned");
        strategies.insert(strategy.id, strategy.clone());
        strategy
    }

    async fn deprecate(&self, id: Uuid, reason: String) {
        let mut strategies = self.strategies.write().expect("strategy store lock poisoned");
        if let Some(s) = strategies.get_mut(&id) {
            s.status = StrategyStatus::Deprecated;
            s.deprecated_reason = Some(reason);
            s.updated_at = Utc::now();
        }
    }

    async fn record_usage(&self, id: Uuid, outcome: UsageOutcome) {
        let mut strategies = self.strategies.write().expect("strategy store lock poisoned");
        if let Some(s) = strategies.get_mut(&id) {
            s.total_uses += 1;
            if outcome.was_false_positive {
                s.false_positives += 1;
            } else if outcome.success {
                s.successful_discoveries += 1;
            }
            s.recompute_success_rate();
            s.updated_at = Utc::now();
        }
    }

    async fn get_strategy_tiers(&self) -> StrategyTierCounts {
        let strategies = self.strategies.read().expect("strategy store lock poisoned");
        let mut counts = StrategyTierCounts::default();
        for s in strategies.values() {
            match strategy_tier(s, MIN_USES_FOR_TIER) {
                discovery_common::StrategyTier::High => counts.high += 1,
                discovery_common::StrategyTier::Medium => counts.medium += 1,
                discovery_common::StrategyTier::Low => counts.low += 1,
                discovery_common::StrategyTier::Untested => counts.untested += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discovery_common::StrategyOrigin;

    fn strategy() -> Strategy {
        Strategy::new("site:{platform} planted {city}".into(), "lieferando.de".into(), "DE".into(), StrategyOrigin::Seed)
    }

    #[tokio::test]
    async fn seeding_twice_is_a_no_op() {
        let store = InMemoryStrategyStore::new();
        store.seed(vec![strategy(), strategy()]).await;
        assert_eq!(store.count().await, 2);
        store.seed(vec![strategy()]).await;
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn record_usage_updates_success_rate() {
        let store = InMemoryStrategyStore::new();
        let s = store.create(strategy()).await;
        for _ in 0..7 {
            store.record_usage(s.id, UsageOutcome { success: true, was_false_positive: false }).await;
        }
        for _ in 0..3 {
            store.record_usage(s.id, UsageOutcome { success: false, was_false_positive: true }).await;
        }
        let all = store.get_all().await;
        let updated = all.iter().find(|x| x.id == s.id).unwrap();
        assert_eq!(updated.total_uses, 10);
        assert_eq!(updated.success_rate, 70);
    }

    #[tokio::test]
    async fn get_active_orders_by_success_rate_descending() {
        let store = InMemoryStrategyStore::new();
        let mut low = strategy();
        low.success_rate = 40;
        let mut high = strategy();
        high.success_rate = 90;
        store.create(low).await;
        store.create(high.clone()).await;

        let active = store.get_active("lieferando.de", "DE", 30).await;
        assert_eq!(active[0].id, high.id);
    }
}
