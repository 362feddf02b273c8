pub mod mentions;
pub mod relevance;
pub mod scheduler;
pub mod serpapi;

pub use mentions::MentionsAggregator;
pub use scheduler::RateLimitedScheduler;
pub use serpapi::SerpApiClient;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("search api key is not configured")]
    MissingCredential,

    #[error("search request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("search api returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected search response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub position: Option<u32>,
}

/// One page of results from a web search engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub organic_results: Vec<OrganicResult>,
    pub total_results: u64,
}

/// Keyed web search collaborator.
pub trait SearchProvider: Send + Sync {
    fn search(&self, query: &str) -> Result<SearchResponse, SearchError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl Source {
    pub fn from_result(result: &OrganicResult, platform: Option<&str>) -> Self {
        Self {
            title: result.title.clone(),
            url: result.link.clone(),
            snippet: result.snippet.clone(),
            platform: platform.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MentionsResult {
    pub total_results: u64,
    pub sources: Vec<Source>,
    pub estimated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCount {
    pub platform: String,
    pub count: u64,
    pub raw_total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SocialMediaResult {
    pub total: u64,
    pub platforms: Vec<PlatformCount>,
    pub sources: Vec<Source>,
    pub estimated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BacklinksResult {
    pub total_backlinks: u64,
    pub sources: Vec<Source>,
    pub estimated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRanking {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub estimated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Strips scheme, `www.` and trailing slashes for loose URL comparison.
pub fn bare_url(url: &str) -> String {
    let lower = url.trim().to_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    without_www.trim_end_matches('/').to_string()
}

/// True when either URL contains the other after [`bare_url`].
pub fn urls_match(a: &str, b: &str) -> bool {
    let (a, b) = (bare_url(a), bare_url(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

pub fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_url() {
        assert_eq!(bare_url("https://www.Example.com/fonts/"), "example.com/fonts");
        assert_eq!(bare_url("http://example.com"), "example.com");
        assert_eq!(bare_url("example.com///"), "example.com");
    }

    #[test]
    fn test_urls_match_either_direction() {
        assert!(urls_match("https://example.com/fonts/heebo", "http://example.com/fonts/heebo/"));
        assert!(urls_match("https://example.com/fonts/heebo?ref=x", "example.com/fonts/heebo"));
        assert!(urls_match("example.com/fonts", "https://www.example.com/fonts/heebo"));
        assert!(!urls_match("https://other.com/heebo", "https://example.com/heebo"));
        assert!(!urls_match("", "https://example.com"));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://www.Behance.net/x").as_deref(), Some("behance.net"));
        assert_eq!(host_of("not a url"), None);
    }
}
