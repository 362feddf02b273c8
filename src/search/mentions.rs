use std::sync::Arc;

use super::{
    host_of, relevance::RelevanceFilter, urls_match, BacklinksResult, GoogleRanking,
    MentionsResult, PlatformCount, RateLimitedScheduler, SearchError, SearchProvider,
    SocialMediaResult, Source,
};
use crate::analysis::lexicon::SocialPlatform;

const MAX_SOURCES: usize = 10;

/// Issues search queries about a font and turns the answers into counts.
///
/// Every operation degrades to an `estimated` zero result instead of
/// failing: a missing provider or a failed query never aborts the analysis.
pub struct MentionsAggregator {
    provider: Option<Arc<dyn SearchProvider>>,
    filter: RelevanceFilter,
    platforms: Vec<SocialPlatform>,
    scheduler: RateLimitedScheduler,
}

impl MentionsAggregator {
    pub fn new(
        provider: Option<Arc<dyn SearchProvider>>,
        filter: RelevanceFilter,
        platforms: Vec<SocialPlatform>,
        scheduler: RateLimitedScheduler,
    ) -> Self {
        Self {
            provider,
            filter,
            platforms,
            scheduler,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn SearchProvider>, SearchError> {
        self.provider.as_ref().ok_or(SearchError::MissingCredential)
    }

    /// Position of `page_url` in Google results for the font name.
    pub fn ranking(&self, font_name: &str, page_url: &str) -> GoogleRanking {
        let provider = match self.provider() {
            Ok(p) => p,
            Err(err) => {
                return GoogleRanking {
                    estimated: true,
                    error: Some(err.to_string()),
                    ..Default::default()
                }
            }
        };

        let queries = [
            format!("\"font {font_name}\""),
            format!("\"{font_name} font\""),
            format!("\"פונט {font_name}\""),
            format!("\"{font_name} פונט\""),
        ];

        let mut last_error = None;
        let mut any_success = false;

        for query in queries {
            let resp = match provider.search(&query) {
                Ok(resp) => resp,
                Err(err) => {
                    log::warn!("ranking query {query:?} failed: {err}");
                    last_error = Some(err.to_string());
                    continue;
                }
            };
            any_success = true;

            let hit = resp
                .organic_results
                .iter()
                .enumerate()
                .find(|(_, r)| urls_match(&r.link, page_url));

            if let Some((idx, result)) = hit {
                let position = result.position.unwrap_or(idx as u32 + 1).max(1);
                log::info!("{page_url} ranks #{position} for {query}");
                return GoogleRanking {
                    found: true,
                    position: Some(position),
                    page: Some(position.div_ceil(10)),
                    query: Some(query),
                    estimated: false,
                    error: None,
                };
            }
        }

        GoogleRanking {
            found: false,
            estimated: !any_success,
            error: if any_success { None } else { last_error },
            ..Default::default()
        }
    }

    /// Pages quoting the subject URL, minus the subject itself.
    pub fn backlinks(&self, page_url: &str) -> BacklinksResult {
        let query = format!("\"{page_url}\"");
        let resp = match self.provider().and_then(|p| p.search(&query)) {
            Ok(resp) => resp,
            Err(err) => {
                log::warn!("backlinks query failed: {err}");
                return BacklinksResult {
                    estimated: true,
                    error: Some(err.to_string()),
                    ..Default::default()
                };
            }
        };

        let subject_host = host_of(page_url);
        let sources = resp
            .organic_results
            .iter()
            .filter(|r| subject_host.is_none() || host_of(&r.link) != subject_host)
            .take(MAX_SOURCES)
            .map(|r| Source::from_result(r, None))
            .collect();

        BacklinksResult {
            total_backlinks: resp.total_results.saturating_sub(1),
            sources,
            estimated: false,
            error: None,
        }
    }

    /// General web mentions of the font name.
    pub fn mentions(&self, font_name: &str, subject_domain: Option<&str>) -> MentionsResult {
        let query = format!("\"{font_name}\" font");
        let resp = match self.provider().and_then(|p| p.search(&query)) {
            Ok(resp) => resp,
            Err(err) => {
                log::warn!("mentions query failed: {err}");
                return MentionsResult {
                    estimated: true,
                    error: Some(err.to_string()),
                    ..Default::default()
                };
            }
        };

        let matcher = self.filter.for_font(font_name);
        let sources = resp
            .organic_results
            .iter()
            .filter(|r| matcher.is_relevant(r, subject_domain))
            .take(MAX_SOURCES)
            .map(|r| Source::from_result(r, None))
            .collect();

        MentionsResult {
            total_results: resp.total_results,
            sources,
            estimated: false,
            error: None,
        }
    }

    /// One site-scoped query per social platform, spaced by the scheduler.
    pub fn social(&self, font_name: &str, subject_domain: Option<&str>) -> SocialMediaResult {
        let provider = match self.provider() {
            Ok(p) => p,
            Err(err) => {
                return SocialMediaResult {
                    estimated: true,
                    error: Some(err.to_string()),
                    platforms: self
                        .platforms
                        .iter()
                        .map(|p| PlatformCount {
                            platform: p.name.clone(),
                            ..Default::default()
                        })
                        .collect(),
                    ..Default::default()
                };
            }
        };

        log::debug!(
            "querying {} social platforms, {:?} apart",
            self.platforms.len(),
            self.scheduler.delay()
        );
        let matcher = self.filter.for_font(font_name);
        let per_platform = self.scheduler.run(&self.platforms, |platform| {
            let query = format!("site:{} \"{font_name}\"", platform.domain);
            match provider.search(&query) {
                Ok(resp) => {
                    let sources: Vec<Source> = resp
                        .organic_results
                        .iter()
                        .filter(|r| matcher.is_relevant(r, subject_domain))
                        .map(|r| Source::from_result(r, Some(&platform.name)))
                        .collect();
                    let count = PlatformCount {
                        platform: platform.name.clone(),
                        count: sources.len() as u64,
                        raw_total: resp.total_results,
                        error: None,
                    };
                    (count, sources)
                }
                Err(err) => {
                    log::warn!("social query for {} failed: {err}", platform.name);
                    let count = PlatformCount {
                        platform: platform.name.clone(),
                        error: Some(err.to_string()),
                        ..Default::default()
                    };
                    (count, Vec::new())
                }
            }
        });

        let mut result = SocialMediaResult::default();
        for (count, sources) in per_platform {
            result.total += count.count;
            result.platforms.push(count);
            result.sources.extend(sources);
        }
        result.estimated = !result.platforms.is_empty()
            && result.platforms.iter().all(|p| p.error.is_some());

        result
    }
}
