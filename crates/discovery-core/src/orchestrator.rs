use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ai_client::{AiClient, ChainSignal, ConfidenceScore, ParsedVenue, QueryGenerationContext};
use chrono::Utc;
use discovery_common::{
    Address, ConfidenceFactorRecord, DeliveryPlatform, DiscoveredVenue, DiscoveryRun, FeedbackRecord, LearnedPattern,
    ResultType, RunConfig, RunErrorEntry, RunErrorPhase, RunMode, RunStatus, VenueStatus,
};
use discovery_store::{DiscoveredVenueStore, FeedbackStore, StrategyStore};
use query_cache::QueryCache;
use search_pool::SearchProvider;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chains::{BrandMisuseBlockList, VerifiedChainTable};
use crate::config::OrchestratorConfig;
use crate::dish_extractor::{DishExtractionContext, DishExtractor};
use crate::learner::{usage_outcome_for, Learner};
use crate::product_extraction::extract_products;
use crate::seed;

const VERIFIED_CHAIN_CONFIDENCE: u8 = 90;

pub struct DiscoveryOrchestrator {
    config: OrchestratorConfig,
    strategies: Arc<dyn StrategyStore>,
    venues: Arc<dyn DiscoveredVenueStore>,
    feedback: Arc<dyn FeedbackStore>,
    cache: Arc<dyn QueryCache>,
    search: Arc<dyn SearchProvider>,
    ai: Arc<AiClient>,
    dish_extractor: DishExtractor,
    verified_chains: VerifiedChainTable,
    block_list: BrandMisuseBlockList,
    cancelled: Arc<AtomicBool>,
}

#[allow(clippy::too_many_arguments)]
impl DiscoveryOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        strategies: Arc<dyn StrategyStore>,
        venues: Arc<dyn DiscoveredVenueStore>,
        feedback: Arc<dyn FeedbackStore>,
        cache: Arc<dyn QueryCache>,
        search: Arc<dyn SearchProvider>,
        ai: Arc<AiClient>,
        dish_extractor: DishExtractor,
    ) -> Self {
        Self {
            config,
            strategies,
            venues,
            feedback,
            cache,
            search,
            ai,
            dish_extractor,
            verified_chains: VerifiedChainTable::default_table(),
            block_list: BrandMisuseBlockList::default_list(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_chain_tables(mut self, verified_chains: VerifiedChainTable, block_list: BrandMisuseBlockList) -> Self {
        self.verified_chains = verified_chains;
        self.block_list = block_list;
        self
    }

    /// Signal external cancellation. Checked before each query.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub async fn initialize(&self) {
        self.strategies.seed(seed::seed_strategies()).await;
    }

    pub async fn learn(&self) -> Vec<LearnedPattern> {
        let learner = Learner::new(self.ai.clone(), self.strategies.clone(), self.feedback.clone());
        learner.learn().await
    }

    pub async fn run(&self, config: RunConfig) -> DiscoveryRun {
        let mut run = DiscoveryRun::new(config.clone(), "manual".to_string());
        run.status = RunStatus::Running;

        let result = match config.mode {
            RunMode::Explore => self.run_explore(&config, &mut run).await,
            RunMode::Enumerate => self.run_enumerate(&config, &mut run).await,
            RunMode::Verify => self.run_verify(&config, &mut run).await,
        };

        run.ended_at = Some(Utc::now());
        run.status = match result {
            Ok(()) => RunStatus::Completed,
            Err(reason) => {
                run.errors.push(RunErrorEntry {
                    phase: RunErrorPhase::Persist,
                    message: reason,
                    at: Utc::now(),
                });
                RunStatus::Failed
            }
        };
        run
    }

    async fn run_explore(&self, config: &RunConfig, run: &mut DiscoveryRun) -> Result<(), String> {
        'outer: for country in &config.countries {
            for platform in &config.platforms {
                let active = self
                    .strategies
                    .get_active(platform, country, self.config.min_strategy_success_rate)
                    .await;

                if active.is_empty() {
                    let context = QueryGenerationContext {
                        platform: platform.clone(),
                        country: country.clone(),
                        cities: seed::default_cities(country),
                    };
                    let generated = self.ai.generate_queries(&context).await;
                    for gq in generated {
                        if self.budget_exhausted(run) || self.cancelled.load(Ordering::Relaxed) {
                            break 'outer;
                        }
                        self.execute_query(&gq.query, platform, country, None, run).await;
                        self.pace().await;
                    }
                    continue;
                }

                let cities = seed::default_cities(country);
                let cities: Vec<String> = cities.into_iter().take(self.config.cities_per_country).collect();
                let batches: Vec<String> = cities
                    .chunks(self.config.batch_city_size)
                    .map(batch_expr)
                    .collect();

                for strategy in active.iter().take(self.config.top_strategies) {
                    for batch in &batches {
                        if self.budget_exhausted(run) || self.cancelled.load(Ordering::Relaxed) {
                            break 'outer;
                        }
                        let query = substitute_query(&strategy.template, batch, platform);
                        run.strategies_used.push(strategy.id);
                        self.execute_query(&query, platform, country, Some(strategy.id), run).await;
                        self.pace().await;
                    }
                }
            }
        }
        Ok(())
    }

    async fn run_enumerate(&self, config: &RunConfig, run: &mut DiscoveryRun) -> Result<(), String> {
        if config.target_chains.is_empty() {
            return Err("enumerate mode requires a non-empty target_chains list".to_string());
        }
        'outer: for chain in &config.target_chains {
            for platform in &config.platforms {
                for country in &config.countries {
                    if self.budget_exhausted(run) || self.cancelled.load(Ordering::Relaxed) {
                        break 'outer;
                    }
                    let query = format!("site:{platform} \"{chain}\" {country}");
                    self.execute_query(&query, platform, country, None, run).await;
                    self.pace().await;
                }
            }
        }
        Ok(())
    }

    async fn run_verify(&self, config: &RunConfig, run: &mut DiscoveryRun) -> Result<(), String> {
        let candidates = if !config.target_venues.is_empty() {
            self.venues.get_by_ids(&config.target_venues).await
        } else {
            self.venues.get_by_status(VenueStatus::Discovered).await
        };

        for mut venue in candidates {
            if self.cancelled.load(Ordering::Relaxed) {
                break;
            }
            let mut any_verified = false;
            for platform_link in &mut venue.delivery_platforms {
                match self.fetch_probe(&platform_link.url).await {
                    true => {
                        platform_link.verified = true;
                        any_verified = true;
                    }
                    false => platform_link.active = false,
                }
            }
            if any_verified {
                venue.status = VenueStatus::Verified;
                run.stats.venues_verified += 1;
            }
            venue.updated_at = Utc::now();
            self.venues.update_venue(venue).await;
        }
        Ok(())
    }

    async fn fetch_probe(&self, url: &str) -> bool {
        self.dish_extractor.probe(url).await
    }

    fn budget_exhausted(&self, run: &DiscoveryRun) -> bool {
        run.stats.queries_executed >= self.config.budget_limit
            || run.stats.queries_executed >= self.config.max_queries_per_run
    }

    async fn pace(&self) {
        if self.config.rate_limit_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.rate_limit_ms)).await;
        }
    }

    /// Query execution contract (budget, cache, search, parse, feedback).
    async fn execute_query(
        &self,
        query: &str,
        platform: &str,
        country: &str,
        strategy_id: Option<Uuid>,
        run: &mut DiscoveryRun,
    ) {
        if self.config.enable_query_cache && self.cache.should_skip_query(query).await {
            run.stats.queries_skipped += 1;
            return;
        }

        run.stats.queries_executed += 1;

        let results = match self.search.search(query).await {
            Ok(results) => results,
            Err(e) => {
                run.stats.queries_failed += 1;
                self.record_feedback(query, platform, country, strategy_id, ResultType::Error, run).await;
                run.errors.push(RunErrorEntry {
                    phase: RunErrorPhase::Search,
                    message: e.to_string(),
                    at: Utc::now(),
                });
                return;
            }
        };

        self.cache.record_query(query, results.len() as u32).await;

        if results.is_empty() {
            self.record_feedback(query, platform, country, strategy_id, ResultType::NoResults, run).await;
            return;
        }

        let ai_results: Vec<ai_client::SearchResultItem> = results
            .iter()
            .map(|r| ai_client::SearchResultItem {
                title: r.title.clone(),
                url: r.url.clone(),
                snippet: r.snippet.clone(),
                position: r.position,
            })
            .collect();

        let parsed = self.ai.parse_search_results(query, platform, &ai_results).await;

        for chain in &parsed.chains_detected {
            self.count_chain_signal(chain, run);
        }

        let mut created_any = false;
        for venue in &parsed.venues {
            let strategy_rate = match strategy_id {
                Some(id) => self
                    .strategies
                    .get_all()
                    .await
                    .into_iter()
                    .find(|s| s.id == id)
                    .map(|s| s.success_rate)
                    .unwrap_or(50),
                None => 50,
            };
            if self
                .process_venue(venue, query, platform, country, strategy_id, strategy_rate, run)
                .await
            {
                created_any = true;
            }
        }

        run.stats.queries_successful += 1;
        if created_any {
            self.record_feedback(query, platform, country, strategy_id, ResultType::TruePositive, run).await;
        }
    }

    fn count_chain_signal(&self, chain: &ChainSignal, run: &mut DiscoveryRun) {
        if chain.should_enumerate {
            run.stats.chains_detected += 1;
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_venue(
        &self,
        venue: &ParsedVenue,
        query: &str,
        platform: &str,
        country: &str,
        strategy_id: Option<Uuid>,
        strategy_rate: u8,
        run: &mut DiscoveryRun,
    ) -> bool {
        let Some(primary) = venue.delivery_platforms.first() else {
            return false;
        };

        if self.venues.find_by_delivery_url(&primary.url).await.is_some() {
            return false;
        }

        if self.block_list.is_blocked(&venue.name) {
            warn!(venue = venue.name, filter = "brand_misuse_block_list", "venue rejected by filter");
            run.stats.venues_rejected += 1;
            return false;
        }

        let chain_match = self.verified_chains.lookup(&venue.name);
        let is_chain = chain_match.is_some();
        let chain_confidence = if is_chain { 95 } else { 0 };

        let description = format!("{} ({}, {})", venue.name, platform, country);
        let score: ConfidenceScore = self.ai.score_confidence(&description, query, strategy_rate).await;

        let mut products: Vec<String> = if let Some(skus) = chain_match {
            skus.to_vec()
        } else {
            venue
                .planted_mentions
                .iter()
                .flat_map(|m| extract_products(m))
                .collect()
        };

        let mut dishes = Vec::new();
        if self.config.extract_dishes_inline {
            match self
                .dish_extractor
                .extract_dishes(
                    &primary.url,
                    DishExtractionContext {
                        platform,
                        country,
                        venue_name: &venue.name,
                    },
                )
                .await
            {
                Ok(found) => {
                    run.stats.dishes_extracted += found.len() as u32;
                    dishes = found;
                }
                Err(e) => {
                    warn!(venue = venue.name, error = %e, "dish extraction fetch failed");
                    run.stats.dish_extraction_failures += 1;
                }
            }
            if is_chain {
                for d in &mut dishes {
                    d.confidence = (d.confidence + 20).min(95);
                }
            }
            if products.is_empty() {
                products = dishes.iter().filter_map(|d| d.planted_product.clone()).collect();
            }
        }
        products.sort();
        products.dedup();
        let dishes_len = dishes.len();

        let final_confidence = if is_chain { VERIFIED_CHAIN_CONFIDENCE } else { score.overall_score };

        let record = DiscoveredVenue {
            id: Uuid::new_v4(),
            discovery_run_id: run.id,
            name: venue.name.clone(),
            is_chain,
            chain_confidence,
            address: venue.city.clone().map(|city| Address {
                city,
                country: venue.country.clone().unwrap_or_else(|| country.to_string()),
                street: None,
                postal_code: None,
            }),
            delivery_platforms: venue
                .delivery_platforms
                .iter()
                .map(|p| DeliveryPlatform {
                    platform: p.platform.clone(),
                    url: p.url.clone(),
                    active: true,
                    verified: false,
                })
                .collect(),
            planted_products: products,
            dishes,
            confidence_score: final_confidence,
            confidence_factors: score
                .factors
                .into_iter()
                .map(|f| ConfidenceFactorRecord {
                    factor: f.factor,
                    score: f.score,
                    reason: f.reason,
                })
                .collect(),
            discovered_by_strategy_id: strategy_id,
            discovered_by_query: query.to_string(),
            status: VenueStatus::Discovered,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.venues.create_venue(record).await;
        run.stats.venues_discovered += 1;
        info!(venue = venue.name, dishes = dishes_len, confidence = final_confidence, "venue discovered");
        true
    }

    async fn record_feedback(
        &self,
        query: &str,
        platform: &str,
        country: &str,
        strategy_id: Option<Uuid>,
        result_type: ResultType,
        run: &mut DiscoveryRun,
    ) {
        if self.config.dry_run {
            return;
        }
        self.feedback
            .record_search(FeedbackRecord {
                query: query.to_string(),
                platform: platform.to_string(),
                country: country.to_string(),
                strategy_id,
                result_type,
                timestamp: Utc::now(),
            })
            .await;
        if let Some(id) = strategy_id {
            self.strategies.record_usage(id, usage_outcome_for(result_type)).await;
        }
        let _ = run;
    }
}

fn substitute_query(template: &str, city_expr: &str, platform: &str) -> String {
    template.replace("{city}", city_expr).replace("{platform}", platform)
}

/// `["Berlin"] -> "Berlin"`; `["Berlin", "München"] -> "(Berlin OR München)"`.
fn batch_expr(cities: &[String]) -> String {
    if cities.len() == 1 {
        cities[0].clone()
    } else {
        format!("({})", cities.join(" OR "))
    }
}
