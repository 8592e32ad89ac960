/// Which LLM backend to prefer; `Auto` lets the orchestrator's wiring decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiProvider {
    #[default]
    Auto,
    Gemini,
    OpenRouter,
}

/// Exhaustive orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub max_queries_per_run: u32,
    pub rate_limit_ms: u64,
    pub dry_run: bool,
    pub verbose: bool,
    pub ai_provider: AiProvider,
    pub extract_dishes_inline: bool,
    pub enable_query_cache: bool,
    pub budget_limit: u32,
    pub batch_city_size: usize,
    pub max_dishes_per_venue: usize,
    /// Cities considered per country in `explore` mode (default 5).
    pub cities_per_country: usize,
    /// Top strategies tried per (platform, country) in `explore` mode.
    pub top_strategies: usize,
    /// `success_rate` floor for a strategy to be considered active in `explore` mode.
    pub min_strategy_success_rate: u8,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_queries_per_run: 50,
            rate_limit_ms: 2000,
            dry_run: false,
            verbose: false,
            ai_provider: AiProvider::Auto,
            extract_dishes_inline: true,
            enable_query_cache: true,
            budget_limit: 2000,
            batch_city_size: 3,
            max_dishes_per_venue: 50,
            cities_per_country: 5,
            top_strategies: 3,
            min_strategy_success_rate: 30,
        }
    }
}
