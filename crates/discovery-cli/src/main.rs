use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::{AiClient, GeminiProvider, ModelProvider, OpenRouterProvider};
use discovery_common::{Config, RunConfig, RunMode};
use discovery_core::config::AiProvider;
use discovery_core::dish_extractor::HttpPageFetcher;
use discovery_core::{DishExtractor, DiscoveryOrchestrator, OrchestratorConfig};
use discovery_store::{
    DiscoveredVenueStore, FeedbackStore, InMemoryFeedbackStore, InMemoryStrategyStore, InMemoryVenueStore,
    StrategyStore,
};
use query_cache::{InMemoryQueryCache, QueryCache};
use search_pool::{GoogleSearchProvider, SearchEnginePool};
use uuid::Uuid;

const DAILY_QUOTA: u32 = 100;
const GEMINI_MODEL: &str = "gemini-2.0-flash";
const OPENROUTER_MODEL: &str = "openrouter/auto";

#[derive(Parser)]
#[command(name = "discovery")]
#[command(about = "Smart Discovery Pipeline: finds restaurants serving the planted brand")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a discovery cycle.
    Run {
        /// explore | enumerate | verify
        #[arg(long, default_value = "explore")]
        mode: String,

        /// Comma-separated delivery platforms.
        #[arg(long, default_value = "lieferando.de,wolt.com")]
        platforms: String,

        /// Comma-separated ISO country codes.
        #[arg(long, default_value = "DE")]
        countries: String,

        /// Chain names to enumerate (enumerate mode only).
        #[arg(long, value_delimiter = ',')]
        chains: Vec<String>,

        /// Venue ids to re-verify (verify mode only; empty = all discovered venues).
        #[arg(long, value_delimiter = ',')]
        venues: Vec<Uuid>,

        /// Abort after this many queries regardless of the configured budget.
        #[arg(long)]
        budget_limit: Option<u32>,

        /// Log feedback/strategy-usage side effects without writing them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a feedback-driven strategy learning cycle.
    Learn,

    /// Seed the strategy store with the built-in starter strategies.
    Seed,

    /// Print pool/cache/strategy/venue/feedback stats.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("discovery=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.log_redacted();

    let strategies = Arc::new(InMemoryStrategyStore::new());
    let venues = Arc::new(InMemoryVenueStore::new());
    let feedback = Arc::new(InMemoryFeedbackStore::new());
    let cache = Arc::new(InMemoryQueryCache::new());

    let pool = Arc::new(SearchEnginePool::new(config.search_credentials.clone(), DAILY_QUOTA));
    if !pool.has_credentials() {
        info!("no search credentials configured; search calls will fail until credentials are added");
    }
    let search = Arc::new(GoogleSearchProvider::new(pool.clone()));

    let ai = build_ai_client(&config, OrchestratorConfig::default().ai_provider);
    let fetcher = Arc::new(HttpPageFetcher::new());
    let orchestrator_config = OrchestratorConfig::default();
    let dish_extractor = DishExtractor::new(ai.clone(), fetcher, orchestrator_config.max_dishes_per_venue);

    let orchestrator = DiscoveryOrchestrator::new(
        orchestrator_config,
        strategies.clone(),
        venues.clone(),
        feedback.clone(),
        cache.clone(),
        search,
        ai,
        dish_extractor,
    );
    orchestrator.initialize().await;

    match cli.command {
        Commands::Run {
            mode,
            platforms,
            countries,
            chains,
            venues: target_venues,
            budget_limit: _,
            dry_run: _,
        } => {
            let mode = parse_mode(&mode)?;
            let run_config = RunConfig {
                mode,
                platforms: split_csv(&platforms),
                countries: split_csv(&countries),
                target_chains: chains,
                target_venues,
            };
            let run = orchestrator.run(run_config).await;
            info!(
                status = ?run.status,
                queries = run.stats.queries_executed,
                venues_discovered = run.stats.venues_discovered,
                chains_detected = run.stats.chains_detected,
                "discovery run complete"
            );
            if !run.errors.is_empty() {
                for e in &run.errors {
                    tracing::warn!(phase = ?e.phase, message = %e.message, "run error");
                }
            }
        }
        Commands::Learn => {
            let patterns = orchestrator.learn().await;
            info!(count = patterns.len(), "learning cycle complete");
            for p in &patterns {
                info!(pattern_type = %p.pattern_type, applied = p.applied, "{}", p.description);
            }
        }
        Commands::Seed => {
            info!("strategy store seeded (idempotent)");
        }
        Commands::Stats => {
            let pool_stats = pool.get_stats();
            let cache_stats = cache.get_stats().await;
            let tiers = strategies.get_strategy_tiers().await;
            let venue_stats = venues.get_stats().await;
            let feedback_stats = feedback.get_stats().await;
            println!("search pool:    {pool_stats:?}");
            println!("query cache:    {cache_stats:?}");
            println!("strategy tiers: {tiers:?}");
            println!("venues:         {venue_stats:?}");
            println!("feedback:       {feedback_stats:?}");
        }
    }

    Ok(())
}

fn build_ai_client(config: &Config, provider: AiProvider) -> Arc<AiClient> {
    let gemini: Arc<dyn ModelProvider> = Arc::new(GeminiProvider::new(config.gemini_api_key.clone(), GEMINI_MODEL));
    let openrouter: Arc<dyn ModelProvider> =
        Arc::new(OpenRouterProvider::new(config.openrouter_api_key.clone(), OPENROUTER_MODEL));

    let (preferred, fallback) = match provider {
        AiProvider::Gemini => (gemini.clone(), gemini),
        AiProvider::OpenRouter => (openrouter.clone(), openrouter),
        AiProvider::Auto => (gemini, openrouter),
    };
    Arc::new(AiClient::new(preferred, fallback))
}

fn parse_mode(s: &str) -> Result<RunMode> {
    match s {
        "explore" => Ok(RunMode::Explore),
        "enumerate" => Ok(RunMode::Enumerate),
        "verify" => Ok(RunMode::Verify),
        other => anyhow::bail!("unknown mode '{other}', expected explore|enumerate|verify"),
    }
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}
