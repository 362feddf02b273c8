use serde::{Deserialize, Serialize};

use super::types::{FeatureSet, ScoreSet, WeightProfile};

/// A sub-score that can take part in the final formula.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    ContentQuality,
    Weights,
    Technical,
    Optimization,
    Seo,
    Ranking,
    Mentions,
    MentionsLog,
    Social,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FormulaTerm {
    pub component: ScoreComponent,
    pub weight: f64,
}

/// Weighted linear combination of sub-scores.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoreFormula {
    pub terms: Vec<FormulaTerm>,
}

fn terms(pairs: &[(ScoreComponent, f64)]) -> ScoreFormula {
    ScoreFormula {
        terms: pairs
            .iter()
            .map(|(component, weight)| FormulaTerm {
                component: *component,
                weight: *weight,
            })
            .collect(),
    }
}

impl ScoreFormula {
    /// Page-content formula, no search signal.
    pub fn classic() -> Self {
        use ScoreComponent::*;
        terms(&[
            (ContentQuality, 0.30),
            (Weights, 0.35),
            (Technical, 0.20),
            (Optimization, 0.15),
        ])
    }

    /// Classic formula blended with a logarithmic mentions score.
    pub fn classic_blended() -> Self {
        use ScoreComponent::*;
        terms(&[
            (ContentQuality, 0.24),
            (Weights, 0.28),
            (Technical, 0.16),
            (Optimization, 0.12),
            (MentionsLog, 0.20),
        ])
    }

    /// SEO, ranking, mentions and social reach.
    pub fn full() -> Self {
        use ScoreComponent::*;
        terms(&[(Seo, 0.25), (Ranking, 0.30), (Mentions, 0.20), (Social, 0.25)])
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::classic()),
            "classic_blended" => Some(Self::classic_blended()),
            "full" => Some(Self::full()),
            _ => None,
        }
    }

    pub fn weight_sum(&self) -> f64 {
        self.terms.iter().map(|t| t.weight).sum()
    }
}

impl Default for ScoreFormula {
    fn default() -> Self {
        Self::full()
    }
}

/// Everything the composer needs; no fetching happens past this point.
#[derive(Clone, Debug, Default)]
pub struct ScoreInputs {
    pub has_title: bool,
    pub has_description: bool,
    pub has_h1: bool,
    pub body_length: usize,
    pub features: FeatureSet,
    pub weight_count: u32,
    pub has_italic: bool,
    pub platform_boost: u32,
    pub seo_score: u32,
    /// `None` when the page was not found in the results
    pub ranking_position: Option<u32>,
    pub mentions: u64,
    pub social: u64,
    /// Replaces the SEO-derived optimization score when set
    pub optimization_base: Option<f64>,
}

impl ScoreInputs {
    pub fn with_weights(mut self, weights: &WeightProfile) -> Self {
        self.weight_count = weights.count;
        self.has_italic = weights.has_italic;
        self
    }
}

pub fn clamp(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

fn flag(on: bool, points: f64) -> f64 {
    if on {
        points
    } else {
        0.0
    }
}

pub fn content_quality_score(inputs: &ScoreInputs) -> f64 {
    clamp(
        20.0 + flag(inputs.has_title, 10.0)
            + flag(inputs.has_description, 10.0)
            + flag(inputs.has_h1, 10.0)
            + (inputs.body_length as f64 / 200.0).min(20.0)
            + 4.0 * inputs.features.count() as f64
            + inputs.platform_boost as f64,
    )
}

pub fn weights_score(weight_count: u32, has_italic: bool) -> f64 {
    clamp(10.0 + 10.0 * weight_count as f64 + flag(has_italic, 10.0))
}

pub fn technical_score(features: &FeatureSet) -> f64 {
    clamp(
        flag(features.opentype, 20.0)
            + flag(features.webfont, 20.0)
            + flag(features.variable, 20.0)
            + flag(features.ligatures, 15.0)
            + flag(features.alternates, 10.0)
            + flag(features.hebrew, 10.0)
            + flag(features.latin, 5.0),
    )
}

pub fn optimization_score(seo_score: u32, platform_boost: u32) -> f64 {
    clamp(0.7 * seo_score as f64 + platform_boost as f64)
}

/// Piecewise-linear, non-increasing in `position`.
pub fn ranking_score(position: Option<u32>) -> f64 {
    let score = match position {
        Some(p @ 1..=10) => 100.0 - (p - 1) as f64,
        Some(p @ 11..=20) => 78.0 - 2.0 * (p - 11) as f64,
        Some(p @ 21..=30) => 58.0 - 16.0 * (p - 21) as f64 / 9.0,
        _ => 10.0,
    };
    clamp(score)
}

pub fn mentions_score(count: u64) -> f64 {
    match count {
        10_000.. => 100.0,
        1_000.. => 75.0,
        100.. => 40.0,
        10.. => 20.0,
        1.. => 10.0,
        0 => 0.0,
    }
}

pub fn mentions_log_score(count: u64) -> f64 {
    clamp(25.0 * ((count as f64) + 1.0).log10())
}

pub fn social_score(count: u64) -> f64 {
    match count {
        50.. => 100.0,
        20.. => 75.0,
        10.. => 55.0,
        5.. => 35.0,
        1.. => 20.0,
        0 => 0.0,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Computes every sub-score and combines them with `formula`.
///
/// The final score is divided by the formula's weight sum and clamped, so a
/// formula whose weights do not add up to 1 still lands in 0..=100.
pub fn compose(inputs: &ScoreInputs, formula: &ScoreFormula) -> ScoreSet {
    let mut scores = ScoreSet {
        content_quality: content_quality_score(inputs),
        weights_score: weights_score(inputs.weight_count.max(1), inputs.has_italic),
        technical_score: technical_score(&inputs.features),
        optimization_score: match inputs.optimization_base {
            Some(base) => clamp(base),
            None => optimization_score(inputs.seo_score, inputs.platform_boost),
        },
        seo_score: clamp(inputs.seo_score as f64),
        ranking_score: ranking_score(inputs.ranking_position),
        mentions_score: mentions_score(inputs.mentions),
        social_score: social_score(inputs.social),
        final_score: 0.0,
    };
    let mentions_log = mentions_log_score(inputs.mentions);

    let weighted: f64 = formula
        .terms
        .iter()
        .map(|term| {
            let value = match term.component {
                ScoreComponent::ContentQuality => scores.content_quality,
                ScoreComponent::Weights => scores.weights_score,
                ScoreComponent::Technical => scores.technical_score,
                ScoreComponent::Optimization => scores.optimization_score,
                ScoreComponent::Seo => scores.seo_score,
                ScoreComponent::Ranking => scores.ranking_score,
                ScoreComponent::Mentions => scores.mentions_score,
                ScoreComponent::MentionsLog => mentions_log,
                ScoreComponent::Social => scores.social_score,
            };
            term.weight * value
        })
        .sum();

    let weight_sum = formula.weight_sum();
    scores.final_score = if weight_sum > 0.0 {
        round1(clamp(weighted / weight_sum))
    } else {
        0.0
    };

    scores.content_quality = round1(scores.content_quality);
    scores.optimization_score = round1(scores.optimization_score);
    scores.ranking_score = round1(scores.ranking_score);

    scores
}
