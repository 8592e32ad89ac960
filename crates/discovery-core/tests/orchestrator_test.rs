//! End-to-end orchestrator run against stub AI/search backends (no network).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use ai_client::{AiClient, ModelProvider};
use async_trait::async_trait;
use discovery_common::{RunConfig, RunMode, RunStatus, StrategyOrigin, VenueStatus};
use discovery_core::dish_extractor::{DishExtractor, PageFetcher};
use discovery_core::orchestrator::DiscoveryOrchestrator;
use discovery_core::OrchestratorConfig;
use discovery_store::{
    DiscoveredVenueStore, InMemoryFeedbackStore, InMemoryStrategyStore, InMemoryVenueStore, StrategyStore,
};
use discovery_common::Strategy;
use query_cache::InMemoryQueryCache;
use search_pool::{SearchProvider, SearchResultItem};

struct StubProvider;

#[async_trait]
impl ModelProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, system: &str, user: &str) -> anyhow::Result<String> {
        let _ = system;
        if user.contains("Extract venues that genuinely serve") {
            return Ok(r#"{
                "venues": [{
                    "name": "Birdie Birdie",
                    "delivery_platforms": [{"platform": "lieferando.de", "url": "https://lieferando.de/birdie"}],
                    "city": "Berlin",
                    "country": "DE",
                    "planted_mentions": ["serves planted.chicken_burger"]
                }],
                "chains_detected": [{"name": "Birdie Birdie", "should_enumerate": true}],
                "quality_assessment": "good"
            }"#
            .to_string());
        }
        if user.contains("Score how confident you are") {
            return Ok(r#"{"overall_score": 82, "factors": [{"factor": "brand_mention", "score": 90, "reason": "explicit planted mention"}], "recommendation": "publish"}"#.to_string());
        }
        if user.contains("Extract every dish") {
            return Ok(r#"{"dishes": [{"name": "Planted Burger", "description": "crispy", "price": 12.5, "currency": "EUR", "planted_product": "planted.chicken_burger", "is_vegan": true, "confidence": 70}]}"#.to_string());
        }
        Ok("{}".to_string())
    }
}

struct FakeSearch {
    calls: AtomicU32,
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, _query: &str) -> discovery_common::Result<Vec<SearchResultItem>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(vec![SearchResultItem {
            position: 1,
            title: "Birdie Birdie on Lieferando".to_string(),
            url: "https://lieferando.de/birdie".to_string(),
            snippet: "Order planted.chicken_burger delivery".to_string(),
        }])
    }
}

struct FakePageFetcher;

#[async_trait]
impl PageFetcher for FakePageFetcher {
    async fn fetch(&self, _url: &str) -> anyhow::Result<String> {
        Ok("Planted Burger - crispy planted.chicken_burger, 12.50 EUR".to_string())
    }
}

fn client() -> Arc<AiClient> {
    Arc::new(AiClient::new(Arc::new(StubProvider), Arc::new(StubProvider)))
}

#[tokio::test]
async fn explore_run_discovers_a_venue_with_boosted_chain_confidence() {
    let strategies = Arc::new(InMemoryStrategyStore::new());
    let seeded = Strategy::new(
        "site:{platform} planted.chicken {city}".to_string(),
        "lieferando.de".to_string(),
        "DE".to_string(),
        StrategyOrigin::Seed,
    );
    let mut active = seeded;
    active.success_rate = 80;
    let strategy_id = strategies.create(active).await.id;

    let venues = Arc::new(InMemoryVenueStore::new());
    let feedback = Arc::new(InMemoryFeedbackStore::new());
    let cache = Arc::new(InMemoryQueryCache::new());
    let search = Arc::new(FakeSearch { calls: AtomicU32::new(0) });
    let ai = client();
    let dish_extractor = DishExtractor::new(ai.clone(), Arc::new(FakePageFetcher), 50);

    let config = OrchestratorConfig {
        rate_limit_ms: 0,
        cities_per_country: 1,
        top_strategies: 1,
        batch_city_size: 1,
        ..Default::default()
    };

    let orchestrator = DiscoveryOrchestrator::new(
        config,
        strategies.clone(),
        venues.clone(),
        feedback,
        cache,
        search.clone(),
        ai,
        dish_extractor,
    );
    orchestrator.initialize().await;

    let run = orchestrator
        .run(RunConfig {
            mode: RunMode::Explore,
            platforms: vec!["lieferando.de".to_string()],
            countries: vec!["DE".to_string()],
            target_chains: vec![],
            target_venues: vec![],
        })
        .await;

    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.stats.venues_discovered, 1);
    assert!(run.stats.chains_detected >= 1);
    assert!(search.calls.load(Ordering::Relaxed) >= 1);

    let discovered = venues.get_by_status(VenueStatus::Discovered).await;
    assert_eq!(discovered.len(), 1);
    let venue = &discovered[0];
    assert_eq!(venue.name, "Birdie Birdie");
    assert!(venue.is_chain, "Birdie Birdie must match the verified-chain table");
    assert_eq!(venue.confidence_score, 90, "verified chains always persist at fixed confidence 90");
    assert!(venue.planted_products.contains(&"planted.chicken_burger".to_string()));
    assert!(venue.dishes[0].confidence >= 70, "chain dishes get the +20/cap-95 confidence boost");

    let updated = strategies.get_all().await.into_iter().find(|s| s.id == strategy_id).unwrap();
    assert_eq!(updated.total_uses, 1);
    assert_eq!(updated.successful_discoveries, 1);
}

#[tokio::test]
async fn verify_run_flips_verified_flag_on_reachable_platforms() {
    let strategies = Arc::new(InMemoryStrategyStore::new());
    let venues = Arc::new(InMemoryVenueStore::new());
    let feedback = Arc::new(InMemoryFeedbackStore::new());
    let cache = Arc::new(InMemoryQueryCache::new());
    let search = Arc::new(FakeSearch { calls: AtomicU32::new(0) });
    let ai = client();
    let dish_extractor = DishExtractor::new(ai.clone(), Arc::new(FakePageFetcher), 50);

    let venue = discovery_common::DiscoveredVenue {
        id: uuid::Uuid::new_v4(),
        discovery_run_id: uuid::Uuid::new_v4(),
        name: "Birdie Birdie".to_string(),
        is_chain: true,
        chain_confidence: 95,
        address: None,
        delivery_platforms: vec![discovery_common::DeliveryPlatform {
            platform: "lieferando.de".to_string(),
            url: "https://lieferando.de/birdie".to_string(),
            active: true,
            verified: false,
        }],
        planted_products: vec!["planted.chicken_burger".to_string()],
        dishes: vec![],
        confidence_score: 90,
        confidence_factors: vec![],
        discovered_by_strategy_id: None,
        discovered_by_query: "q".to_string(),
        status: VenueStatus::Discovered,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };
    let venue_id = venue.id;
    venues.create_venue(venue).await;

    let orchestrator = DiscoveryOrchestrator::new(
        OrchestratorConfig::default(),
        strategies,
        venues.clone(),
        feedback,
        cache,
        search,
        ai,
        dish_extractor,
    );

    let run = orchestrator
        .run(RunConfig {
            mode: RunMode::Verify,
            platforms: vec![],
            countries: vec![],
            target_chains: vec![],
            target_venues: vec![venue_id],
        })
        .await;

    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.stats.venues_verified, 1);
    let verified = venues.get_by_status(VenueStatus::Verified).await;
    assert_eq!(verified.len(), 1);
    assert!(verified[0].delivery_platforms[0].verified);
}
