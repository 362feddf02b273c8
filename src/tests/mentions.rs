use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::analysis::lexicon::Lexicon;
use crate::search::{relevance::RelevanceFilter, MentionsAggregator, RateLimitedScheduler};

fn aggregator(provider: Option<Arc<dyn SearchProvider>>) -> MentionsAggregator {
    aggregator_with(provider, Lexicon::default())
}

fn aggregator_with(provider: Option<Arc<dyn SearchProvider>>, lexicon: Lexicon) -> MentionsAggregator {
    MentionsAggregator::new(
        provider,
        RelevanceFilter::new(&lexicon).unwrap(),
        lexicon.social_platforms.clone(),
        RateLimitedScheduler::new(Duration::ZERO),
    )
}

fn api_error() -> SearchError {
    SearchError::Api {
        status: 429,
        message: "rate limited".into(),
    }
}

fn heebo_post(link: &str) -> OrganicResult {
    result(
        "Heebo font in use",
        link,
        "Poster set in the Heebo font, clean type design",
        None,
    )
}

#[test]
pub fn test_no_provider_degrades_to_estimates() {
    let agg = aggregator(None);
    assert!(!agg.is_enabled());

    let ranking = agg.ranking("Heebo", "https://example.com/heebo");
    assert!(ranking.estimated);
    assert!(!ranking.found);
    assert!(ranking.error.is_some());

    let mentions = agg.mentions("Heebo", None);
    assert!(mentions.estimated);
    assert_eq!(mentions.total_results, 0);

    let backlinks = agg.backlinks("https://example.com/heebo");
    assert!(backlinks.estimated);
    assert_eq!(backlinks.total_backlinks, 0);

    let social = agg.social("Heebo", None);
    assert!(social.estimated);
    assert_eq!(social.total, 0);
    assert_eq!(social.platforms.len(), 6);
    assert!(social.platforms.iter().all(|p| p.count == 0));
}

#[test]
pub fn test_one_failing_platform_does_not_sink_the_rest() {
    let search = ScriptedSearch::new(|query: &str| {
        if query.starts_with("site:instagram.com") {
            return Err(api_error());
        }
        Ok(response(10, vec![heebo_post("https://social.example.org/p/1")]))
    });
    let agg = aggregator(Some(search as Arc<dyn SearchProvider>));

    let social = agg.social("Heebo", None);

    assert!(!social.estimated);
    assert_eq!(social.total, 5);
    let instagram = social
        .platforms
        .iter()
        .find(|p| p.platform == "instagram")
        .unwrap();
    assert_eq!(instagram.count, 0);
    assert!(instagram.error.as_deref().unwrap().contains("429"));
    assert_eq!(
        social.platforms.iter().filter(|p| p.error.is_none()).count(),
        5
    );
    assert!(social
        .sources
        .iter()
        .all(|s| s.platform.as_deref() != Some("instagram")));
}

#[test]
pub fn test_all_platforms_failing_is_estimated() {
    let search = ScriptedSearch::new(|_: &str| Err(api_error()));
    let agg = aggregator(Some(search as Arc<dyn SearchProvider>));

    let social = agg.social("Heebo", None);
    assert!(social.estimated);
    assert_eq!(social.total, 0);

    let ranking = agg.ranking("Heebo", "https://example.com/heebo");
    assert!(ranking.estimated);
    assert!(ranking.error.is_some());
}

#[test]
pub fn test_ranking_tries_every_phrasing() {
    let search = ScriptedSearch::new(|query: &str| {
        if query == "\"פונט Heebo\"" {
            return Ok(response(
                30,
                vec![
                    result("a", "https://a.example.org", "", Some(1)),
                    result("Heebo", "http://www.example.com/heebo", "", Some(14)),
                ],
            ));
        }
        Ok(response(0, vec![]))
    });
    let agg = aggregator(Some(search.clone() as Arc<dyn SearchProvider>));

    let ranking = agg.ranking("Heebo", "https://example.com/heebo/");

    assert!(ranking.found);
    assert_eq!(ranking.position, Some(14));
    assert_eq!(ranking.page, Some(2));
    assert_eq!(ranking.query.as_deref(), Some("\"פונט Heebo\""));
    assert_eq!(search.queries().len(), 3);
}

#[test]
pub fn test_not_ranked_is_not_estimated() {
    let search = ScriptedSearch::new(|_: &str| Ok(response(0, vec![])));
    let agg = aggregator(Some(search.clone() as Arc<dyn SearchProvider>));

    let ranking = agg.ranking("Heebo", "https://example.com/heebo");

    assert!(!ranking.found);
    assert!(!ranking.estimated);
    assert_eq!(ranking.position, None);
    assert_eq!(search.queries().len(), 4);
}

#[test]
pub fn test_backlinks_exclude_the_subject_site() {
    let search = ScriptedSearch::new(|_: &str| {
        Ok(response(
            3,
            vec![
                result("self", "https://www.example.com/heebo", "", None),
                result("blog", "https://blog.example.org/heebo", "", None),
            ],
        ))
    });
    let agg = aggregator(Some(search as Arc<dyn SearchProvider>));

    let backlinks = agg.backlinks("https://example.com/heebo");
    assert!(!backlinks.estimated);
    assert_eq!(backlinks.total_backlinks, 2);
    assert_eq!(backlinks.sources.len(), 1);
    assert_eq!(backlinks.sources[0].url, "https://blog.example.org/heebo");
}

#[test]
pub fn test_mentions_drop_self_promotion() {
    let search = ScriptedSearch::new(|_: &str| {
        Ok(response(
            3,
            vec![
                heebo_post("https://shop.myfoundry.example/heebo"),
                heebo_post("https://instagram.com/myfoundry/p/1"),
                heebo_post("https://typeblog.example.org/heebo"),
            ],
        ))
    });
    let mut lexicon = Lexicon::default();
    lexicon.excluded_accounts = vec!["instagram.com/myfoundry".into()];
    let agg = aggregator_with(Some(search as Arc<dyn SearchProvider>), lexicon);

    let mentions = agg.mentions("Heebo", Some("myfoundry.example"));

    assert_eq!(mentions.total_results, 3);
    assert_eq!(mentions.sources.len(), 1);
    assert_eq!(mentions.sources[0].url, "https://typeblog.example.org/heebo");
}
