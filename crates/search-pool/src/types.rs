use serde::Deserialize;

/// A single organic result from a search provider, 1-indexed by position
/// within the result page.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResultItem {
    pub position: u32,
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleSearchResponse {
    #[serde(default)]
    pub items: Vec<GoogleSearchItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleSearchItem {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}
