use std::sync::Arc;
use std::time::Duration;

use ai_client::AiClient;
use async_trait::async_trait;
use discovery_common::DiscoveredDish;
use tracing::warn;

const RETRY_DELAY: Duration = Duration::from_secs(2);

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<String>;
}

/// Plain HTTP fetch with tag-stripping, good enough to feed an LLM prompt.
/// No headless rendering: dish listings on delivery-platform pages are
/// server-rendered.
pub struct HttpPageFetcher {
    http: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    fn strip_tags(html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut in_tag = false;
        for c in html.chars() {
            match c {
                '<' => in_tag = true,
                '>' => in_tag = false,
                _ if !in_tag => out.push(c),
                _ => {}
            }
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        let html = self.http.get(url).send().await?.text().await?;
        Ok(Self::strip_tags(&html))
    }
}

pub struct DishExtractionContext<'a> {
    pub platform: &'a str,
    pub country: &'a str,
    pub venue_name: &'a str,
}

pub struct DishExtractor {
    ai: Arc<AiClient>,
    fetcher: Arc<dyn PageFetcher>,
    max_dishes_per_venue: usize,
}

impl DishExtractor {
    pub fn new(ai: Arc<AiClient>, fetcher: Arc<dyn PageFetcher>, max_dishes_per_venue: usize) -> Self {
        Self {
            ai,
            fetcher,
            max_dishes_per_venue,
        }
    }

    /// Fetch the venue page and ask the LLM to extract dishes. One retry on
    /// fetch failure with a 2s delay. Returns `Err` only when both fetch
    /// attempts fail; a successful fetch with zero dishes found is `Ok(vec![])`,
    /// distinct from a fetch failure.
    pub async fn extract_dishes(
        &self,
        url: &str,
        ctx: DishExtractionContext<'_>,
    ) -> anyhow::Result<Vec<DiscoveredDish>> {
        let content = self.fetch_with_retry(url).await?;

        let analysis = self
            .ai
            .analyze_venue(ctx.venue_name, url, ctx.platform, &content)
            .await;

        let _ = ctx.country;
        Ok(analysis
            .dishes
            .into_iter()
            .take(self.max_dishes_per_venue)
            .map(|d| DiscoveredDish {
                name: d.name,
                description: d.description,
                price: d.price,
                currency: d.currency,
                planted_product: d.planted_product,
                is_vegan: d.is_vegan,
                confidence: d.confidence,
            })
            .collect())
    }

    /// Used by `verify` mode: a delivery-platform link is still live if it fetches at all.
    pub async fn probe(&self, url: &str) -> bool {
        self.fetcher.fetch(url).await.is_ok()
    }

    async fn fetch_with_retry(&self, url: &str) -> anyhow::Result<String> {
        match self.fetcher.fetch(url).await {
            Ok(content) => Ok(content),
            Err(e) => {
                warn!(url, error = %e, "dish extraction fetch failed, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
                self.fetcher.fetch(url).await.inspect_err(|e| {
                    warn!(url, error = %e, "dish extraction fetch failed on retry, giving up");
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::{GeminiProvider, OpenRouterProvider};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyFetcher {
        attempts: AtomicU32,
        fail_times: u32,
        content: String,
    }

    #[async_trait]
    impl PageFetcher for FlakyFetcher {
        async fn fetch(&self, _url: &str) -> anyhow::Result<String> {
            let n = self.attempts.fetch_add(1, Ordering::Relaxed);
            if n < self.fail_times {
                anyhow::bail!("transient fetch failure");
            }
            Ok(self.content.clone())
        }
    }

    fn test_client() -> Arc<AiClient> {
        Arc::new(AiClient::new(
            Arc::new(GeminiProvider::new("unused".to_string(), "gemini-2.0-flash".to_string())),
            Arc::new(OpenRouterProvider::new("unused".to_string(), "openrouter/auto".to_string())),
        ))
    }

    #[tokio::test]
    async fn gives_up_and_returns_empty_after_two_failures() {
        let fetcher = Arc::new(FlakyFetcher {
            attempts: AtomicU32::new(0),
            fail_times: 5,
            content: String::new(),
        });
        let extractor = DishExtractor::new(test_client(), fetcher.clone(), 50);
        let result = extractor
            .extract_dishes(
                "https://example.com/venue",
                DishExtractionContext {
                    platform: "lieferando.de",
                    country: "DE",
                    venue_name: "Birdie Birdie",
                },
            )
            .await;
        assert!(result.is_err(), "two fetch failures must surface as an error, not an empty list");
        assert_eq!(fetcher.attempts.load(Ordering::Relaxed), 2);
    }
}
