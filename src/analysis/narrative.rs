use regex::Regex;

use super::lexicon::Lexicon;
use super::types::{
    ContentAnalysis, FeatureSet, FontIdentity, HeadingCount, PageSnapshot, Priority, Recommendation,
    ScoreSet, SeoAnalysis, Sentiment, SentimentAnalysis, Summary, WeightProfile,
};
use crate::search::{BacklinksResult, GoogleRanking, SocialMediaResult, Source};

/// Signals the narrative is written from.
pub struct NarrativeInput<'a> {
    pub page: Option<&'a PageSnapshot>,
    pub identity: &'a FontIdentity,
    pub features: &'a FeatureSet,
    pub weights: &'a WeightProfile,
    pub scores: &'a ScoreSet,
    pub seo: Option<&'a SeoAnalysis>,
    pub ranking: Option<&'a GoogleRanking>,
    pub backlinks: Option<&'a BacklinksResult>,
    pub social: Option<&'a SocialMediaResult>,
}

/// Template-based writer for strengths, sentiment and recommendations.
pub struct NarrativeGenerator {
    positive: Option<Regex>,
    negative: Option<Regex>,
}

fn word_set(words: &[String]) -> Result<Option<Regex>, regex::Error> {
    if words.is_empty() {
        return Ok(None);
    }
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    super::features::compile(&format!(r"\b(?:{alternation})\b")).map(Some)
}

fn recommendation(
    priority: Priority,
    title: &str,
    action: &str,
    rationale: &str,
    impact: &str,
    time_estimate: &str,
) -> Recommendation {
    Recommendation {
        priority,
        title: title.to_string(),
        action: action.to_string(),
        rationale: rationale.to_string(),
        impact: impact.to_string(),
        time_estimate: time_estimate.to_string(),
    }
}

pub fn level(score: f64) -> &'static str {
    match score {
        s if s >= 80.0 => "excellent",
        s if s >= 60.0 => "good",
        s if s >= 40.0 => "moderate",
        _ => "low",
    }
}

impl NarrativeGenerator {
    pub fn new(lexicon: &Lexicon) -> Result<Self, regex::Error> {
        Ok(Self {
            positive: word_set(&lexicon.positive_words)?,
            negative: word_set(&lexicon.negative_words)?,
        })
    }

    pub fn content_analysis(&self, input: &NarrativeInput) -> ContentAnalysis {
        let mut strengths = Vec::new();
        let mut improvements = Vec::new();

        let weights = input.weights;
        if weights.detected.len() >= 6 {
            strengths.push(format!("Broad weight range ({} weights)", weights.detected.len()));
        } else if weights.detected.len() >= 3 {
            strengths.push(format!("Solid weight range ({} weights)", weights.detected.len()));
        } else {
            improvements.push("List every available weight on the page".to_string());
        }

        if weights.has_italic {
            strengths.push("Italic styles available".to_string());
        }

        let features = input.features;
        if features.variable {
            strengths.push("Variable font technology".to_string());
        }
        if features.opentype {
            strengths.push("OpenType features".to_string());
        } else {
            improvements.push("Describe the OpenType features the font supports".to_string());
        }
        if features.hebrew && features.latin {
            strengths.push("Hebrew and Latin script support".to_string());
        } else if features.hebrew {
            strengths.push("Hebrew script support".to_string());
        }
        if !features.webfont {
            improvements.push("Mention webfont formats (WOFF/WOFF2) and licensing".to_string());
        }

        if input.identity.platform.boost > 0 {
            strengths.push(format!("Listed on {}", input.identity.platform.name));
        }

        let mut word_count = 0;
        let mut heading_count = HeadingCount::default();
        let mut links = Vec::new();
        if let Some(page) = input.page {
            word_count = page.body_text.split_whitespace().count();
            heading_count = page.heading_count;
            links = page.links.clone();

            if page.description.trim().is_empty() {
                improvements.push("Add a meta description".to_string());
            }
            if heading_count.h2 == 0 {
                improvements.push("Split the page into sections with h2 subheadings".to_string());
            }
            if word_count < 150 {
                improvements.push("Expand the page copy with usage examples".to_string());
            } else if word_count > 600 {
                strengths.push("Rich descriptive content".to_string());
            }
        }

        ContentAnalysis {
            word_count,
            heading_count,
            links,
            strengths,
            improvements,
        }
    }

    fn classify(&self, text: &str) -> Sentiment {
        let count = |re: &Option<Regex>| re.as_ref().map_or(0, |re| re.find_iter(text).count());
        let positive = count(&self.positive);
        let negative = count(&self.negative);

        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }

    pub fn sentiment<'a>(&self, sources: impl IntoIterator<Item = &'a Source>) -> SentimentAnalysis {
        let (mut positive, mut neutral, mut negative) = (0, 0, 0);

        for source in sources {
            let text = format!("{} {}", source.title, source.snippet);
            match self.classify(&text) {
                Sentiment::Positive => positive += 1,
                Sentiment::Neutral => neutral += 1,
                Sentiment::Negative => negative += 1,
            }
        }

        let overall = if positive > negative && positive >= neutral {
            Sentiment::Positive
        } else if negative > positive && negative >= neutral {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };

        SentimentAnalysis {
            positive,
            neutral,
            negative,
            total: positive + neutral + negative,
            overall,
        }
    }

    /// Threshold-triggered recommendations, most urgent first.
    pub fn recommendations(&self, input: &NarrativeInput) -> Vec<Recommendation> {
        let mut recs = Vec::new();

        if let Some(seo) = input.seo {
            if seo.score < 50 {
                recs.push(recommendation(
                    Priority::Critical,
                    "Fix core SEO issues",
                    "Add a 30-60 character title, a 120-160 character description and an H1",
                    "Search engines cannot understand the page without basic metadata",
                    "high",
                    "1-2 hours",
                ));
            }
        }

        if let Some(page) = input.page {
            if !page.has_https {
                recs.push(recommendation(
                    Priority::Critical,
                    "Serve the page over HTTPS",
                    "Install a TLS certificate and redirect HTTP to HTTPS",
                    "Browsers flag insecure pages and search engines rank them lower",
                    "high",
                    "1 hour",
                ));
            }
        }

        if let Some(backlinks) = input.backlinks {
            if !backlinks.estimated && backlinks.total_backlinks < 10 {
                recs.push(recommendation(
                    Priority::LinkBuilding,
                    "Build backlinks",
                    "Submit the font to type directories and pitch design blogs",
                    "Few external pages reference the font page",
                    "high",
                    "2-4 weeks",
                ));
            }
        }

        if let Some(ranking) = input.ranking {
            let outside_first_page = ranking.position.map_or(true, |p| p > 10);
            if !ranking.estimated && outside_first_page {
                recs.push(recommendation(
                    Priority::LinkBuilding,
                    "Reach the first results page",
                    &format!(
                        "Target the phrase \"{} font\" in headings and earn links using it",
                        input.identity.font_name
                    ),
                    "The page is not in the top 10 results for the font name",
                    "medium",
                    "1-3 months",
                ));
            }
        }

        if let Some(social) = input.social {
            if !social.estimated && social.total < 5 {
                recs.push(recommendation(
                    Priority::Other,
                    "Grow social presence",
                    "Share specimens on Instagram, Behance and Dribbble",
                    "The font is rarely mentioned on social platforms",
                    "medium",
                    "ongoing",
                ));
            }
        }

        if let Some(page) = input.page {
            if !page.has_structured_data {
                recs.push(recommendation(
                    Priority::Other,
                    "Add structured data",
                    "Describe the font with schema.org JSON-LD",
                    "Structured data enables rich results",
                    "medium",
                    "1 hour",
                ));
            }
            if !page.has_open_graph {
                recs.push(recommendation(
                    Priority::Other,
                    "Add Open Graph tags",
                    "Set og:title, og:description and og:image with a specimen",
                    "Shared links render without a preview",
                    "low",
                    "30 minutes",
                ));
            }
            if !page.has_mobile_viewport {
                recs.push(recommendation(
                    Priority::Other,
                    "Declare a mobile viewport",
                    "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
                    "Pages without a viewport render poorly on phones",
                    "medium",
                    "10 minutes",
                ));
            }
        }

        if input.weights.detected.len() < 4 {
            recs.push(recommendation(
                Priority::Other,
                "Showcase the weight range",
                "List each weight with a live sample on the page",
                "Designers pick families with a visible range of weights",
                "low",
                "2 hours",
            ));
        }

        recs.sort_by_key(|r| r.priority);
        recs
    }

    pub fn summary(
        &self,
        input: &NarrativeInput,
        content: &ContentAnalysis,
        recommendations: &[Recommendation],
    ) -> Summary {
        let score = input.scores.final_score;
        let level = level(score);
        let name = &input.identity.font_name;

        let headline = format!("{name}: {level} exposure ({score:.0}/100)");

        let mut text = format!(
            "{name} scores {score:.0}/100 on {}.",
            input.identity.platform.name
        );
        if let Some(ranking) = input.ranking {
            match ranking.position {
                Some(position) => text.push_str(&format!(
                    " The page ranks #{position} on Google (page {}).",
                    ranking.page.unwrap_or(1)
                )),
                None if !ranking.estimated => {
                    text.push_str(" The page was not found in Google results for its name.")
                }
                None => {}
            }
        }
        if let Some(social) = input.social {
            if !social.estimated {
                text.push_str(&format!(
                    " Found {} relevant social media mentions.",
                    social.total
                ));
            }
        }
        text.push_str(&format!(" Detected {} weight(s).", input.weights.count));

        Summary {
            headline,
            level: level.to_string(),
            text,
            highlights: content.strengths.iter().take(3).cloned().collect(),
            next_steps: recommendations.iter().take(3).map(|r| r.title.clone()).collect(),
            generated_by: "rules".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::Platform;

    fn generator() -> NarrativeGenerator {
        NarrativeGenerator::new(&Lexicon::default()).unwrap()
    }

    fn source(title: &str, snippet: &str) -> Source {
        Source {
            title: title.into(),
            url: "https://example.com".into(),
            snippet: snippet.into(),
            platform: None,
        }
    }

    fn identity() -> FontIdentity {
        FontIdentity {
            font_name: "Heebo".into(),
            domain: "example.org".into(),
            platform: Platform {
                name: "independent site".into(),
                boost: 0,
            },
        }
    }

    #[test]
    fn test_sentiment_buckets() {
        let sources = vec![
            source("Beautiful Heebo font", "I love it"),
            source("Heebo font is ugly", "bad kerning"),
            source("Heebo font", "released today"),
            source("מדהים", "פונט"),
        ];

        let sentiment = generator().sentiment(&sources);
        assert_eq!(sentiment.positive, 2);
        assert_eq!(sentiment.negative, 1);
        assert_eq!(sentiment.neutral, 1);
        assert_eq!(sentiment.total, 4);
        assert_eq!(sentiment.overall, Sentiment::Positive);
    }

    #[test]
    fn test_sentiment_empty_is_neutral() {
        let sentiment = generator().sentiment(Vec::<Source>::new().iter());
        assert_eq!(sentiment.total, 0);
        assert_eq!(sentiment.overall, Sentiment::Neutral);
    }

    #[test]
    fn test_recommendations_sorted_by_priority() {
        let page = PageSnapshot::default();
        let identity = identity();
        let features = FeatureSet::default();
        let weights = WeightProfile::new([400], false);
        let scores = ScoreSet::default();
        let seo = crate::analysis::seo::analyze_seo(&page);
        let backlinks = BacklinksResult {
            total_backlinks: 2,
            ..Default::default()
        };
        let social = SocialMediaResult::default();

        let input = NarrativeInput {
            page: Some(&page),
            identity: &identity,
            features: &features,
            weights: &weights,
            scores: &scores,
            seo: Some(&seo),
            ranking: None,
            backlinks: Some(&backlinks),
            social: Some(&social),
        };

        let recs = generator().recommendations(&input);
        assert_eq!(recs[0].priority, Priority::Critical);
        assert_eq!(recs[0].title, "Fix core SEO issues");
        assert_eq!(recs[1].title, "Serve the page over HTTPS");
        assert_eq!(recs[2].priority, Priority::LinkBuilding);
        assert!(recs.windows(2).all(|w| w[0].priority <= w[1].priority));
        assert!(recs.iter().any(|r| r.title == "Showcase the weight range"));
    }

    #[test]
    fn test_content_analysis_reports_page_structure() {
        let page = PageSnapshot {
            body_text: "Heebo comes in nine weights".into(),
            heading_count: HeadingCount { h1: 1, h2: 0 },
            links: vec!["https://example.org/download".into()],
            ..Default::default()
        };
        let identity = identity();
        let features = FeatureSet::default();
        let weights = WeightProfile::new([400], false);
        let scores = ScoreSet::default();

        let input = NarrativeInput {
            page: Some(&page),
            identity: &identity,
            features: &features,
            weights: &weights,
            scores: &scores,
            seo: None,
            ranking: None,
            backlinks: None,
            social: None,
        };

        let content = generator().content_analysis(&input);
        assert_eq!(content.word_count, 5);
        assert_eq!(content.heading_count, HeadingCount { h1: 1, h2: 0 });
        assert_eq!(content.links, vec!["https://example.org/download"]);
        assert!(content.improvements.iter().any(|i| i.contains("h2")));

        let input = NarrativeInput { page: None, ..input };
        let content = generator().content_analysis(&input);
        assert_eq!(content.heading_count, HeadingCount::default());
        assert!(content.links.is_empty());
    }

    #[test]
    fn test_estimated_results_do_not_trigger_search_recommendations() {
        let identity = identity();
        let features = FeatureSet::default();
        let weights = WeightProfile::new([100, 200, 300, 400], false);
        let scores = ScoreSet::default();
        let estimated = BacklinksResult {
            estimated: true,
            ..Default::default()
        };
        let social = SocialMediaResult {
            estimated: true,
            ..Default::default()
        };

        let input = NarrativeInput {
            page: None,
            identity: &identity,
            features: &features,
            weights: &weights,
            scores: &scores,
            seo: None,
            ranking: None,
            backlinks: Some(&estimated),
            social: Some(&social),
        };

        assert!(generator().recommendations(&input).is_empty());
    }

    #[test]
    fn test_summary_is_deterministic() {
        let identity = identity();
        let features = FeatureSet {
            variable: true,
            ..Default::default()
        };
        let weights = WeightProfile::new([300, 400, 700], true);
        let scores = ScoreSet {
            final_score: 64.4,
            ..Default::default()
        };
        let input = NarrativeInput {
            page: None,
            identity: &identity,
            features: &features,
            weights: &weights,
            scores: &scores,
            seo: None,
            ranking: None,
            backlinks: None,
            social: None,
        };

        let g = generator();
        let content = g.content_analysis(&input);
        let recs = g.recommendations(&input);
        let first = g.summary(&input, &content, &recs);
        let second = g.summary(&input, &content, &recs);

        assert_eq!(first, second);
        assert_eq!(first.level, "good");
        assert_eq!(first.headline, "Heebo: good exposure (64/100)");
        assert_eq!(first.generated_by, "rules");
        assert!(first.highlights.contains(&"Italic styles available".to_string()));
    }

    #[test]
    fn test_levels() {
        assert_eq!(level(95.0), "excellent");
        assert_eq!(level(60.0), "good");
        assert_eq!(level(40.0), "moderate");
        assert_eq!(level(0.0), "low");
    }
}
