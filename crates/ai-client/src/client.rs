use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::prompts;
use crate::provider::ModelProvider;
use crate::types::*;
use crate::util::{strip_code_blocks, truncate_to_char_boundary};

/// Provider-agnostic AI client.
///
/// Wraps a preferred and a fallback [`ModelProvider`]. If the preferred
/// provider errors, the client switches to the fallback for this call AND
/// all subsequent calls in the process — the switch is sticky, not retried
/// per-call.
pub struct AiClient {
    preferred: Arc<dyn ModelProvider>,
    fallback: Arc<dyn ModelProvider>,
    using_fallback: AtomicBool,
}

impl AiClient {
    pub fn new(preferred: Arc<dyn ModelProvider>, fallback: Arc<dyn ModelProvider>) -> Self {
        Self {
            preferred,
            fallback,
            using_fallback: AtomicBool::new(false),
        }
    }

    /// True once the client has permanently switched to the fallback
    /// provider for the rest of the process.
    pub fn is_using_fallback(&self) -> bool {
        self.using_fallback.load(Ordering::Relaxed)
    }

    async fn complete(&self, system: &str, user: &str) -> anyhow::Result<String> {
        if !self.using_fallback.load(Ordering::Relaxed) {
            match self.preferred.complete(system, user).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(
                        provider = self.preferred.name(),
                        error = %e,
                        "preferred model errored, switching to fallback for remainder of process"
                    );
                    self.using_fallback.store(true, Ordering::Relaxed);
                }
            }
        }

        self.fallback.complete(system, user).await
    }

    /// Call the model and parse its response as `T`. Never errors: a
    /// transport failure or a response that doesn't match the schema both
    /// resolve to `T::default()`, logged as a warning. This is the contract
    /// every one of the five operations below relies on.
    async fn extract_json<T: DeserializeOwned + Default>(&self, system: &str, user: &str) -> T {
        match self.complete(system, user).await {
            Ok(raw) => {
                let cleaned = strip_code_blocks(&raw);
                match serde_json::from_str::<T>(cleaned) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(error = %e, raw = cleaned, "LLM response did not match expected schema, using default");
                        T::default()
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "LLM call failed on both providers, using default");
                T::default()
            }
        }
    }

    pub async fn generate_queries(&self, context: &QueryGenerationContext) -> Vec<GeneratedQuery> {
        let cities = context.cities.join(", ");
        let user = prompts::fill(
            prompts::GENERATE_QUERIES_TEMPLATE,
            &[
                ("platform", &context.platform),
                ("country", &context.country),
                ("cities", &cities),
            ],
        );
        let result: GeneratedQueries = self.extract_json(prompts::SYSTEM_PROMPT, &user).await;
        result.queries
    }

    pub async fn parse_search_results(
        &self,
        query: &str,
        platform: &str,
        results: &[SearchResultItem],
    ) -> ParsedSearchResults {
        let results_text = render_results(results);
        let user = prompts::fill(
            prompts::PARSE_SEARCH_RESULTS_TEMPLATE,
            &[
                ("query", query),
                ("platform", platform),
                ("results", &results_text),
            ],
        );
        self.extract_json(prompts::SYSTEM_PROMPT, &user).await
    }

    pub async fn analyze_venue(
        &self,
        name: &str,
        url: &str,
        platform: &str,
        page_content: &str,
    ) -> VenueAnalysis {
        let capped = truncate_to_char_boundary(page_content, prompts::MAX_PAGE_CONTENT_CHARS);
        let max_chars = prompts::MAX_PAGE_CONTENT_CHARS.to_string();
        let user = prompts::fill(
            prompts::ANALYZE_VENUE_TEMPLATE,
            &[
                ("name", name),
                ("url", url),
                ("platform", platform),
                ("max_chars", &max_chars),
                ("page_content", capped),
            ],
        );
        self.extract_json(prompts::SYSTEM_PROMPT, &user).await
    }

    pub async fn detect_chain(
        &self,
        name: &str,
        platform: &str,
        search_results: &[SearchResultItem],
    ) -> ChainDetection {
        let results_text = render_results(search_results);
        let user = prompts::fill(
            prompts::DETECT_CHAIN_TEMPLATE,
            &[("name", name), ("platform", platform), ("results", &results_text)],
        );
        self.extract_json(prompts::SYSTEM_PROMPT, &user).await
    }

    pub async fn learn_from_feedback(
        &self,
        feedback: &[FeedbackSummaryItem],
        strategies: &[StrategySummaryItem],
    ) -> LearnFromFeedback {
        let feedback_text = serde_json::to_string(feedback).unwrap_or_default();
        let strategies_text = serde_json::to_string(strategies).unwrap_or_default();
        let user = prompts::fill(
            prompts::LEARN_FROM_FEEDBACK_TEMPLATE,
            &[("feedback", &feedback_text), ("strategies", &strategies_text)],
        );
        self.extract_json(prompts::SYSTEM_PROMPT, &user).await
    }

    pub async fn score_confidence(
        &self,
        venue_description: &str,
        query: &str,
        strategy_rate: u8,
    ) -> ConfidenceScore {
        let rate_text = strategy_rate.to_string();
        let user = prompts::fill(
            prompts::SCORE_CONFIDENCE_TEMPLATE,
            &[("venue", venue_description), ("query", query), ("strategy_rate", &rate_text)],
        );
        self.extract_json(prompts::SYSTEM_PROMPT, &user).await
    }
}

fn render_results(results: &[SearchResultItem]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "[{}] {} — {}\n{}",
                r.position, r.title, r.url, r.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubProvider {
        responses: Mutex<Vec<anyhow::Result<String>>>,
        name: &'static str,
    }

    impl StubProvider {
        fn new(name: &'static str, responses: Vec<anyhow::Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                name,
            }
        }
    }

    #[async_trait]
    impl ModelProvider for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn complete(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                anyhow::bail!("stub exhausted");
            }
            responses.remove(0)
        }
    }

    #[tokio::test]
    async fn falls_back_and_stays_sticky() {
        let preferred = Arc::new(StubProvider::new(
            "preferred",
            vec![Err(anyhow::anyhow!("down")), Ok("{}".to_string())],
        ));
        let fallback = Arc::new(StubProvider::new(
            "fallback",
            vec![Ok(r#"{"overall_score": 80, "factors": [], "recommendation": "good"}"#.to_string())],
        ));
        let client = AiClient::new(preferred, fallback);

        let score = client.score_confidence("Birdie Birdie", "q", 50).await;
        assert_eq!(score.overall_score, 80);
        assert!(client.is_using_fallback());
    }

    #[tokio::test]
    async fn parse_failure_yields_conservative_default() {
        let preferred = Arc::new(StubProvider::new("preferred", vec![Ok("not json".to_string())]));
        let fallback = Arc::new(StubProvider::new("fallback", vec![]));
        let client = AiClient::new(preferred, fallback);

        let score = client.score_confidence("x", "y", 10).await;
        assert_eq!(score.overall_score, 50);
        assert_eq!(score.recommendation, "review");
    }

    #[tokio::test]
    async fn strips_code_fences_before_parsing() {
        let preferred = Arc::new(StubProvider::new(
            "preferred",
            vec![Ok("```json\n{\"queries\": []}\n```".to_string())],
        ));
        let fallback = Arc::new(StubProvider::new("fallback", vec![]));
        let client = AiClient::new(preferred, fallback);

        let context = QueryGenerationContext {
            platform: "lieferando.de".to_string(),
            country: "DE".to_string(),
            cities: vec!["Berlin".to_string()],
        };
        let queries = client.generate_queries(&context).await;
        assert!(queries.is_empty());
    }
}
