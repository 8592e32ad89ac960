use async_trait::async_trait;

/// A single LLM backend. Implementations own their own HTTP wiring and
/// authentication; the client layer only needs text in, text out.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Human-readable identifier, used in logs and the sticky-fallback
    /// decision.
    fn name(&self) -> &str;

    /// Send a single system+user turn and return the raw response text.
    /// Implementations must NOT attempt to parse the response as JSON —
    /// that's the client's job, after code-fence stripping.
    async fn complete(&self, system: &str, user: &str) -> anyhow::Result<String>;
}
