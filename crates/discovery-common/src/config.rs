use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

/// A single search-engine credential, as loaded from the environment.
///
/// Mirrors the `{apiKey, searchEngineId, name?}` shape of
/// `GOOGLE_SEARCH_CREDENTIALS` so a single parse path covers all three
/// env-var conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCredentialConfig {
    pub name: String,
    pub api_key: String,
    pub engine_id: String,
}

/// Environment-sourced configuration. Loaded once at process start.
///
/// `.env` is loaded
/// first (if present), required variables panic with a clear message,
/// optional ones fall back to sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    /// Fallback provider credential. Falls back to `gemini_api_key` again
    /// (same model, no real redundancy) when unset, so a single-key
    /// deployment still starts.
    pub openrouter_api_key: String,
    pub search_credentials: Vec<SearchCredentialConfig>,
    pub serpapi_key: Option<String>,
}

impl Config {
    /// Load from the process environment, calling `dotenvy::dotenv()` first.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let gemini_api_key = env::var("GOOGLE_AI_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .map_err(|_| {
                DiscoveryError::Configuration(
                    "GOOGLE_AI_API_KEY or GEMINI_API_KEY must be set".to_string(),
                )
            })?;

        let openrouter_api_key = env::var("OPENROUTER_API_KEY").unwrap_or_else(|_| gemini_api_key.clone());

        let search_credentials = load_search_credentials();
        let serpapi_key = env::var("SERPAPI_KEY").ok();

        if search_credentials.is_empty() && serpapi_key.is_none() {
            return Err(DiscoveryError::Configuration(
                "no search credentials configured (GOOGLE_SEARCH_API_KEY[_N], \
                 GOOGLE_SEARCH_CREDENTIALS, or SERPAPI_KEY)"
                    .to_string(),
            ));
        }

        Ok(Self {
            gemini_api_key,
            openrouter_api_key,
            search_credentials,
            serpapi_key,
        })
    }

    /// Log which credentials are set without leaking their values.
    pub fn log_redacted(&self) {
        tracing::info!("GOOGLE_AI_API_KEY = ({} chars)", self.gemini_api_key.len());
        tracing::info!("OPENROUTER_API_KEY = ({} chars)", self.openrouter_api_key.len());
        tracing::info!(count = self.search_credentials.len(), "search credentials loaded");
        match &self.serpapi_key {
            Some(k) => tracing::info!("SERPAPI_KEY = ({} chars)", k.len()),
            None => tracing::info!("SERPAPI_KEY = (unset)"),
        }
    }
}

/// Parse search credentials from whichever of the three env-var
/// conventions is present, preferring the explicit JSON array, falling
/// back to the single-credential pair, then to numbered variants.
fn load_search_credentials() -> Vec<SearchCredentialConfig> {
    if let Ok(json) = env::var("GOOGLE_SEARCH_CREDENTIALS") {
        match serde_json::from_str::<Vec<RawCredential>>(&json) {
            Ok(raw) => {
                return raw
                    .into_iter()
                    .enumerate()
                    .map(|(i, r)| SearchCredentialConfig {
                        name: r.name.unwrap_or_else(|| format!("cred-{i}")),
                        api_key: r.api_key,
                        engine_id: r.search_engine_id,
                    })
                    .collect();
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse GOOGLE_SEARCH_CREDENTIALS");
            }
        }
    }

    if let (Ok(api_key), Ok(engine_id)) = (
        env::var("GOOGLE_SEARCH_API_KEY"),
        env::var("GOOGLE_SEARCH_ENGINE_ID"),
    ) {
        return vec![SearchCredentialConfig {
            name: "default".to_string(),
            api_key,
            engine_id,
        }];
    }

    let mut numbered = Vec::new();
    for n in 1..=20 {
        let key_var = format!("GOOGLE_SEARCH_API_KEY_{n}");
        let engine_var = format!("GOOGLE_SEARCH_ENGINE_ID_{n}");
        match (env::var(&key_var), env::var(&engine_var)) {
            (Ok(api_key), Ok(engine_id)) => numbered.push(SearchCredentialConfig {
                name: format!("cred-{n}"),
                api_key,
                engine_id,
            }),
            _ => continue,
        }
    }
    numbered
}

#[derive(Debug, Deserialize)]
struct RawCredential {
    #[serde(rename = "apiKey")]
    api_key: String,
    #[serde(rename = "searchEngineId")]
    search_engine_id: String,
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbered_credentials() {
        env::set_var("GOOGLE_SEARCH_API_KEY_1", "k1");
        env::set_var("GOOGLE_SEARCH_ENGINE_ID_1", "e1");
        env::set_var("GOOGLE_SEARCH_API_KEY_2", "k2");
        env::set_var("GOOGLE_SEARCH_ENGINE_ID_2", "e2");
        env::remove_var("GOOGLE_SEARCH_CREDENTIALS");
        env::remove_var("GOOGLE_SEARCH_API_KEY");
        env::remove_var("GOOGLE_SEARCH_ENGINE_ID");

        let creds = load_search_credentials();
        assert_eq!(creds.len(), 2);
        assert_eq!(creds[0].api_key, "k1");
        assert_eq!(creds[1].engine_id, "e2");

        env::remove_var("GOOGLE_SEARCH_API_KEY_1");
        env::remove_var("GOOGLE_SEARCH_ENGINE_ID_1");
        env::remove_var("GOOGLE_SEARCH_API_KEY_2");
        env::remove_var("GOOGLE_SEARCH_ENGINE_ID_2");
    }

    #[test]
    fn parses_json_credentials() {
        env::set_var(
            "GOOGLE_SEARCH_CREDENTIALS",
            r#"[{"apiKey":"k1","searchEngineId":"e1","name":"primary"}]"#,
        );
        let creds = load_search_credentials();
        assert_eq!(creds.len(), 1);
        assert_eq!(creds[0].name, "primary");
        env::remove_var("GOOGLE_SEARCH_CREDENTIALS");
    }
}
