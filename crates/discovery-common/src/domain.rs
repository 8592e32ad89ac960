use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Strategy
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyOrigin {
    Seed,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyStatus {
    Active,
    Deprecated,
}

/// A reusable query template scoped to (platform, country).
///
/// Invariant: `successful_discoveries + false_positives <= total_uses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub id: Uuid,
    pub template: String,
    pub platform: String,
    pub country: String,
    pub success_rate: u8,
    pub total_uses: u32,
    pub successful_discoveries: u32,
    pub false_positives: u32,
    pub tags: Vec<String>,
    pub origin: StrategyOrigin,
    pub status: StrategyStatus,
    pub deprecated_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Strategy {
    pub fn new(template: String, platform: String, country: String, origin: StrategyOrigin) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            template,
            platform,
            country,
            success_rate: 50,
            total_uses: 0,
            successful_discoveries: 0,
            false_positives: 0,
            tags: vec!["high-precision".to_string()],
            origin,
            status: StrategyStatus::Active,
            deprecated_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute `success_rate` from the current counters, rounded to the
    /// nearest integer percentage (not truncated).
    pub fn recompute_success_rate(&mut self) {
        let total = self.total_uses.max(1);
        self.success_rate = ((100 * self.successful_discoveries + total / 2) / total) as u8;
    }
}

/// A strategy bucketed by usage confidence. Untested until `min_uses`
/// is reached, then high/medium/low by `success_rate` threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyTier {
    High,
    Medium,
    Low,
    Untested,
}

pub fn strategy_tier(strategy: &Strategy, min_uses: u32) -> StrategyTier {
    if strategy.total_uses < min_uses {
        StrategyTier::Untested
    } else if strategy.success_rate >= 70 {
        StrategyTier::High
    } else if strategy.success_rate >= 40 {
        StrategyTier::Medium
    } else {
        StrategyTier::Low
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyTierCounts {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub untested: u32,
}

// =============================================================================
// DiscoveryRun
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Explore,
    Enumerate,
    Verify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Created,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub mode: RunMode,
    pub platforms: Vec<String>,
    pub countries: Vec<String>,
    #[serde(default)]
    pub target_chains: Vec<String>,
    #[serde(default)]
    pub target_venues: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub queries_executed: u32,
    pub queries_skipped: u32,
    pub queries_successful: u32,
    pub queries_failed: u32,
    pub venues_discovered: u32,
    pub venues_verified: u32,
    pub venues_rejected: u32,
    pub chains_detected: u32,
    pub new_strategies_created: u32,
    pub dishes_extracted: u32,
    pub dish_extraction_failures: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunErrorPhase {
    Search,
    Parse,
    Extract,
    Persist,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunErrorEntry {
    pub phase: RunErrorPhase,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryRun {
    pub id: Uuid,
    pub config: RunConfig,
    pub trigger: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub stats: RunStats,
    pub strategies_used: Vec<Uuid>,
    pub errors: Vec<RunErrorEntry>,
}

impl DiscoveryRun {
    pub fn new(config: RunConfig, trigger: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            trigger,
            status: RunStatus::Created,
            started_at: Utc::now(),
            ended_at: None,
            stats: RunStats::default(),
            strategies_used: Vec::new(),
            errors: Vec::new(),
        }
    }
}

// =============================================================================
// DiscoveredVenue / DiscoveredDish
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub country: String,
    pub street: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPlatform {
    pub platform: String,
    pub url: String,
    pub active: bool,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceFactorRecord {
    pub factor: String,
    pub score: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredDish {
    pub name: String,
    pub description: String,
    pub price: Option<f64>,
    pub currency: String,
    pub planted_product: Option<String>,
    pub is_vegan: bool,
    pub confidence: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueStatus {
    Discovered,
    Verified,
    Rejected,
    Published,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredVenue {
    pub id: Uuid,
    pub discovery_run_id: Uuid,
    pub name: String,
    pub is_chain: bool,
    pub chain_confidence: u8,
    pub address: Option<Address>,
    pub delivery_platforms: Vec<DeliveryPlatform>,
    pub planted_products: Vec<String>,
    pub dishes: Vec<DiscoveredDish>,
    pub confidence_score: u8,
    pub confidence_factors: Vec<ConfidenceFactorRecord>,
    pub discovered_by_strategy_id: Option<Uuid>,
    pub discovered_by_query: String,
    pub status: VenueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// FeedbackRecord
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    TruePositive,
    FalsePositive,
    NoResults,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub query: String,
    pub platform: String,
    pub country: String,
    pub strategy_id: Option<Uuid>,
    pub result_type: ResultType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackStats {
    pub total: u32,
    pub overall_success_rate: u8,
}

/// Output of a learning cycle: one entry per applied or observed change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub pattern_type: String,
    pub description: String,
    pub confidence: u8,
    pub applied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_recomputes_from_counters() {
        let mut s = Strategy::new("q".into(), "lieferando.de".into(), "DE".into(), StrategyOrigin::Seed);
        s.total_uses = 10;
        s.successful_discoveries = 7;
        s.recompute_success_rate();
        assert_eq!(s.success_rate, 70);
    }

    #[test]
    fn success_rate_rounds_instead_of_truncating() {
        let mut s = Strategy::new("q".into(), "lieferando.de".into(), "DE".into(), StrategyOrigin::Seed);
        s.total_uses = 3;
        s.successful_discoveries = 2;
        s.recompute_success_rate();
        assert_eq!(s.success_rate, 67);
    }

    #[test]
    fn tiers_by_threshold() {
        let mut s = Strategy::new("q".into(), "p".into(), "DE".into(), StrategyOrigin::Seed);
        s.total_uses = 1;
        assert_eq!(strategy_tier(&s, 5), StrategyTier::Untested);
        s.total_uses = 10;
        s.success_rate = 75;
        assert_eq!(strategy_tier(&s, 5), StrategyTier::High);
        s.success_rate = 50;
        assert_eq!(strategy_tier(&s, 5), StrategyTier::Medium);
        s.success_rate = 10;
        assert_eq!(strategy_tier(&s, 5), StrategyTier::Low);
    }
}
