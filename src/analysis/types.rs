use serde::{Deserialize, Serialize};

use crate::fontfile::ParsedFont;
use crate::search::{BacklinksResult, GoogleRanking, MentionsResult, SocialMediaResult};

/// Structured signals of one rendered page.
///
/// Produced once per request by a [`crate::scrape::PageRenderer`] and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub h1: String,
    pub description: String,
    /// Visible body text, whitespace collapsed and capped.
    pub body_text: String,
    pub has_https: bool,
    pub has_open_graph: bool,
    pub has_structured_data: bool,
    pub has_canonical: bool,
    pub has_mobile_viewport: bool,
    pub heading_count: HeadingCount,
    /// First absolute http(s) link targets, in document order.
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeadingCount {
    pub h1: usize,
    pub h2: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub name: String,
    pub boost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FontIdentity {
    pub font_name: String,
    pub domain: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub hebrew: bool,
    pub opentype: bool,
    pub webfont: bool,
    pub variable: bool,
    pub ligatures: bool,
    pub alternates: bool,
    pub latin: bool,
}

impl FeatureSet {
    pub fn count(&self) -> u32 {
        [
            self.hebrew,
            self.opentype,
            self.webfont,
            self.variable,
            self.ligatures,
            self.alternates,
            self.latin,
        ]
        .into_iter()
        .filter(|flag| *flag)
        .count() as u32
    }
}

/// Detected weight classes.
///
/// `detected` is ascending, deduplicated and only holds multiples of 100 in
/// 100..=900. `count` never drops below 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeightProfile {
    pub detected: Vec<u16>,
    pub count: u32,
    pub has_italic: bool,
}

impl WeightProfile {
    pub fn new(detected: impl IntoIterator<Item = u16>, has_italic: bool) -> Self {
        let detected: std::collections::BTreeSet<u16> = detected
            .into_iter()
            .filter(|w| (100..=900).contains(w) && w % 100 == 0)
            .collect();
        let detected: Vec<u16> = detected.into_iter().collect();
        let count = (detected.len() as u32).max(1);

        Self {
            detected,
            count,
            has_italic,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSet {
    pub content_quality: f64,
    pub weights_score: f64,
    pub technical_score: f64,
    pub optimization_score: f64,
    pub seo_score: f64,
    pub ranking_score: f64,
    pub mentions_score: f64,
    pub social_score: f64,
    #[serde(rename = "final")]
    pub final_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeoCheck {
    pub name: String,
    pub passed: bool,
    pub points: u32,
    pub max_points: u32,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeoAnalysis {
    pub score: u32,
    pub title_length: usize,
    pub description_length: usize,
    pub content_length: usize,
    pub checks: Vec<SeoCheck>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub word_count: usize,
    pub heading_count: HeadingCount,
    pub links: Vec<String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentimentAnalysis {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
    pub total: u32,
    pub overall: Sentiment,
}

/// Ordering of recommendations: lower sorts first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Critical,
    LinkBuilding,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub title: String,
    pub action: String,
    pub rationale: String,
    pub impact: String,
    pub time_estimate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub headline: String,
    pub level: String,
    pub text: String,
    pub highlights: Vec<String>,
    pub next_steps: Vec<String>,
    pub generated_by: String,
}

/// Everything `/api/analyze` returns for one URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub url: String,
    #[serde(flatten)]
    pub identity: FontIdentity,
    pub features: FeatureSet,
    pub weights: WeightProfile,
    pub scores: ScoreSet,
    pub seo: SeoAnalysis,
    pub google_ranking: GoogleRanking,
    pub mentions: MentionsResult,
    pub social_media: SocialMediaResult,
    pub backlinks: BacklinksResult,
    pub content_analysis: ContentAnalysis,
    pub sentiment_analysis: SentimentAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub ai_summary: Summary,
    pub analyzed_at: chrono::DateTime<chrono::Utc>,
}

/// Result of `/api/analyze-file`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFileReport {
    pub file_name: String,
    #[serde(flatten)]
    pub identity: FontIdentity,
    pub font_info: ParsedFont,
    pub features: FeatureSet,
    pub weights: WeightProfile,
    pub scores: ScoreSet,
    pub content_analysis: ContentAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub ai_summary: Summary,
    pub analyzed_at: chrono::DateTime<chrono::Utc>,
}

/// Result of `/api/search-font`: search signals only, no page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSearchReport {
    pub font_name: String,
    pub mentions: MentionsResult,
    pub social_media: SocialMediaResult,
    pub sentiment_analysis: SentimentAnalysis,
    pub mentions_score: f64,
    pub social_score: f64,
    pub searched_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_profile_defaults_count_to_one() {
        let profile = WeightProfile::new([], false);
        assert!(profile.detected.is_empty());
        assert_eq!(profile.count, 1);
    }

    #[test]
    fn test_weight_profile_sorts_and_dedups() {
        let profile = WeightProfile::new([700, 300, 700, 400, 450, 1000], true);
        assert_eq!(profile.detected, vec![300, 400, 700]);
        assert_eq!(profile.count, 3);
        assert!(profile.has_italic);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical < Priority::LinkBuilding);
        assert!(Priority::LinkBuilding < Priority::Other);
    }

    #[test]
    fn test_final_score_serialized_as_final() {
        let json = serde_json::to_value(ScoreSet::default()).unwrap();
        assert!(json.get("final").is_some());
        assert!(json.get("contentQuality").is_some());
    }
}
