use serde::{Deserialize, Serialize};

// =============================================================================
// Shared inputs
// =============================================================================

/// A single organic result as consumed from the search layer: `items[].title`
/// / `.link` / `.snippet`, 1-based `position`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub position: u32,
}

// =============================================================================
// generate_queries
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct QueryGenerationContext {
    pub platform: String,
    pub country: String,
    pub cities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuery {
    pub query: String,
    pub reasoning: String,
    pub expected_results: String,
    pub confidence: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedQueries {
    #[serde(default)]
    pub queries: Vec<GeneratedQuery>,
}

// =============================================================================
// parse_search_results
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedDeliveryPlatform {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedVenue {
    pub name: String,
    pub delivery_platforms: Vec<ParsedDeliveryPlatform>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// Raw text snippets the model judged to mention the brand, used by the
    /// product-extraction rule. Empty when nothing qualified.
    #[serde(default)]
    pub planted_mentions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainSignal {
    pub name: String,
    pub should_enumerate: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParsedSearchResults {
    #[serde(default)]
    pub venues: Vec<ParsedVenue>,
    #[serde(default)]
    pub chains_detected: Vec<ChainSignal>,
    #[serde(default)]
    pub quality_assessment: String,
}

// =============================================================================
// analyze_venue / dish extraction
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzedDish {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub planted_product: Option<String>,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default = "default_confidence")]
    pub confidence: u8,
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_confidence() -> u8 {
    50
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenueAnalysis {
    #[serde(default)]
    pub dishes: Vec<AnalyzedDish>,
}

// =============================================================================
// detect_chain
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChainDetection {
    pub is_chain: bool,
    pub confidence: u8,
    pub reasoning: String,
}

impl Default for ChainDetection {
    fn default() -> Self {
        Self {
            is_chain: false,
            confidence: 0,
            reasoning: "no signal".to_string(),
        }
    }
}

// =============================================================================
// learn_from_feedback
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackSummaryItem {
    pub query: String,
    pub platform: String,
    pub country: String,
    pub strategy_id: Option<String>,
    pub result_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategySummaryItem {
    pub id: String,
    pub template: String,
    pub platform: String,
    pub country: String,
    pub success_rate: u8,
    pub total_uses: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyAction {
    Deprecate,
    Boost,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyUpdate {
    pub strategy_id: String,
    pub action: StrategyAction,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStrategySuggestion {
    pub template: String,
    pub platform: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LearnFromFeedback {
    #[serde(default)]
    pub strategy_updates: Vec<StrategyUpdate>,
    #[serde(default)]
    pub new_strategies: Vec<NewStrategySuggestion>,
    #[serde(default)]
    pub insights: Vec<String>,
}

// =============================================================================
// score_confidence
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceFactor {
    pub factor: String,
    pub score: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceScore {
    pub overall_score: u8,
    #[serde(default)]
    pub factors: Vec<ConfidenceFactor>,
    #[serde(default = "default_recommendation")]
    pub recommendation: String,
}

fn default_recommendation() -> String {
    "review".to_string()
}

impl Default for ConfidenceScore {
    /// The conservative default on parse failure: a 50-point "review"
    /// recommendation, no factors.
    fn default() -> Self {
        Self {
            overall_score: 50,
            factors: Vec::new(),
            recommendation: default_recommendation(),
        }
    }
}
