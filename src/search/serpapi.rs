use std::time::Duration;

use serde::Deserialize;

use super::{OrganicResult, SearchError, SearchProvider, SearchResponse};
use crate::config::SearchConfig;

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    search_information: Option<SearchInformation>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchInformation {
    #[serde(default)]
    total_results: Option<u64>,
}

/// Google results through serpapi.com.
pub struct SerpApiClient {
    api_key: String,
    endpoint: String,
    language: String,
    country: String,
    results_per_query: u32,
    timeout: Duration,
}

impl SerpApiClient {
    pub fn new(api_key: &str, config: &SearchConfig) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            country: config.country.clone(),
            results_per_query: config.results_per_query,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn parse(body: &str) -> Result<SearchResponse, SearchError> {
        let resp: SerpApiResponse =
            serde_json::from_str(body).map_err(|err| SearchError::Malformed(err.to_string()))?;

        // serpapi reports "no results" as an error string on a 200 response
        if let Some(error) = resp.error {
            if resp.organic_results.is_empty() && !error.contains("hasn't returned any results") {
                return Err(SearchError::Malformed(error));
            }
        }

        let mut organic_results = resp.organic_results;
        for (idx, result) in organic_results.iter_mut().enumerate() {
            if result.position.is_none() {
                result.position = Some(idx as u32 + 1);
            }
        }

        let total_results = resp
            .search_information
            .and_then(|info| info.total_results)
            .unwrap_or(organic_results.len() as u64);

        Ok(SearchResponse {
            organic_results,
            total_results,
        })
    }
}

impl SearchProvider for SerpApiClient {
    fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        log::debug!("serpapi: {query}");

        let num = self.results_per_query.to_string();
        let resp = client
            .get(format!("{}/search.json", self.endpoint))
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("hl", self.language.as_str()),
                ("gl", self.country.as_str()),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Self::parse(&resp.text()?)
    }

    fn name(&self) -> &'static str {
        "SerpApi"
    }
}
