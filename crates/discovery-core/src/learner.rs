use std::sync::Arc;

use ai_client::{AiClient, FeedbackSummaryItem, StrategyAction, StrategySummaryItem};
use discovery_common::{LearnedPattern, ResultType, Strategy, StrategyOrigin};
use discovery_store::{FeedbackStore, StrategyStore, UsageOutcome};
use tracing::info;
use uuid::Uuid;

const MIN_FEEDBACK_RECORDS: usize = 10;
const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Periodic, manually-triggered strategy-evolution cycle.
pub struct Learner {
    ai: Arc<AiClient>,
    strategies: Arc<dyn StrategyStore>,
    feedback: Arc<dyn FeedbackStore>,
}

impl Learner {
    pub fn new(ai: Arc<AiClient>, strategies: Arc<dyn StrategyStore>, feedback: Arc<dyn FeedbackStore>) -> Self {
        Self {
            ai,
            strategies,
            feedback,
        }
    }

    pub async fn learn(&self) -> Vec<LearnedPattern> {
        let records = self.feedback.get_for_learning(DEFAULT_LOOKBACK_DAYS).await;
        if records.len() < MIN_FEEDBACK_RECORDS {
            info!(count = records.len(), "not enough feedback to learn from, skipping");
            return Vec::new();
        }

        let all_strategies = self.strategies.get_all().await;
        let strategy_by_id: std::collections::HashMap<Uuid, &Strategy> =
            all_strategies.iter().map(|s| (s.id, s)).collect();

        let feedback_items: Vec<FeedbackSummaryItem> = records
            .iter()
            .map(|r| FeedbackSummaryItem {
                query: r.query.clone(),
                platform: r.platform.clone(),
                country: r.country.clone(),
                strategy_id: r.strategy_id.map(|id| id.to_string()),
                result_type: result_type_label(r.result_type).to_string(),
            })
            .collect();

        let strategy_items: Vec<StrategySummaryItem> = all_strategies
            .iter()
            .map(|s| StrategySummaryItem {
                id: s.id.to_string(),
                template: s.template.clone(),
                platform: s.platform.clone(),
                country: s.country.clone(),
                success_rate: s.success_rate,
                total_uses: s.total_uses,
            })
            .collect();

        let response = self.ai.learn_from_feedback(&feedback_items, &strategy_items).await;
        let mut patterns = Vec::new();

        for update in &response.strategy_updates {
            let Ok(id) = Uuid::parse_str(&update.strategy_id) else {
                continue;
            };
            match update.action {
                StrategyAction::Deprecate => {
                    if strategy_by_id.contains_key(&id) {
                        self.strategies.deprecate(id, update.reason.clone()).await;
                        patterns.push(LearnedPattern {
                            pattern_type: "deprecate".to_string(),
                            description: format!("deprecated strategy {id}: {}", update.reason),
                            confidence: 80,
                            applied: true,
                        });
                    }
                }
                StrategyAction::Boost => {
                    patterns.push(LearnedPattern {
                        pattern_type: "boost".to_string(),
                        description: format!("strategy {id} boosted (no-op, success rate already reflects it)"),
                        confidence: 60,
                        applied: false,
                    });
                }
            }
        }

        for suggestion in &response.new_strategies {
            let mut strategy = Strategy::new(
                suggestion.template.clone(),
                suggestion.platform.clone(),
                suggestion.country.clone(),
                StrategyOrigin::Agent,
            );
            strategy.success_rate = 50;
            let created = self.strategies.create(strategy).await;
            patterns.push(LearnedPattern {
                pattern_type: "new_strategy".to_string(),
                description: format!("created strategy {} for {}/{}", created.id, created.platform, created.country),
                confidence: 50,
                applied: true,
            });
        }

        for insight in &response.insights {
            patterns.push(LearnedPattern {
                pattern_type: "insight".to_string(),
                description: insight.clone(),
                confidence: 50,
                applied: false,
            });
        }

        patterns
    }
}

fn result_type_label(result_type: ResultType) -> &'static str {
    match result_type {
        ResultType::TruePositive => "true_positive",
        ResultType::FalsePositive => "false_positive",
        ResultType::NoResults => "no_results",
        ResultType::Error => "error",
    }
}

/// Apply a usage outcome derived from a `result_type` (used by the
/// orchestrator after recording search feedback with an associated strategy).
pub fn usage_outcome_for(result_type: ResultType) -> UsageOutcome {
    UsageOutcome {
        success: matches!(result_type, ResultType::TruePositive),
        was_false_positive: matches!(result_type, ResultType::FalsePositive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::{GeminiProvider, OpenRouterProvider};
    use chrono::Utc;
    use discovery_common::FeedbackRecord;
    use discovery_store::{InMemoryFeedbackStore, InMemoryStrategyStore};

    fn client() -> Arc<AiClient> {
        Arc::new(AiClient::new(
            Arc::new(GeminiProvider::new("unused".to_string(), "gemini-2.0-flash".to_string())),
            Arc::new(OpenRouterProvider::new("unused".to_string(), "openrouter/auto".to_string())),
        ))
    }

    #[tokio::test]
    async fn skips_when_fewer_than_minimum_records() {
        let feedback = Arc::new(InMemoryFeedbackStore::new());
        let strategies = Arc::new(InMemoryStrategyStore::new());
        feedback
            .record_search(FeedbackRecord {
                query: "q".into(),
                platform: "lieferando.de".into(),
                country: "DE".into(),
                strategy_id: None,
                result_type: ResultType::TruePositive,
                timestamp: Utc::now(),
            })
            .await;
        let learner = Learner::new(client(), strategies, feedback);
        let patterns = learner.learn().await;
        assert!(patterns.is_empty());
    }
}
