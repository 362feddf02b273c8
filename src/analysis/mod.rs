pub mod features;
pub mod identity;
pub mod lexicon;
pub mod narrative;
pub mod platform;
pub mod scoring;
pub mod seo;
pub mod types;

use std::{sync::Arc, time::Duration};

use crate::{
    config::{Config, RendererKind, ScrapeConfig},
    errors::AppError,
    fontfile,
    scrape::{parse_target, PageRenderer, PlainRenderer},
    search::{
        relevance::RelevanceFilter, MentionsAggregator, RateLimitedScheduler, SearchProvider,
        SerpApiClient,
    },
};
use features::FeatureDetector;
use identity::{NameResolver, UNKNOWN_FONT};
use narrative::{NarrativeGenerator, NarrativeInput};
use platform::PlatformClassifier;
use scoring::{ScoreFormula, ScoreInputs};
use types::{AnalysisReport, FontFileReport, FontIdentity, FontSearchReport, Platform};

const UPLOADED_FILE: &str = "uploaded file";
const FONT_FILE_OPTIMIZATION_BASE: f64 = 50.0;

/// Runs the whole exposure pipeline for one request at a time.
///
/// Holds only immutable state, so one instance is shared by all requests.
pub struct Analyzer {
    renderer: Arc<dyn PageRenderer>,
    search: MentionsAggregator,
    formula: ScoreFormula,
    detector: FeatureDetector,
    resolver: NameResolver,
    classifier: PlatformClassifier,
    narrative: NarrativeGenerator,
}

fn renderer_for(config: &ScrapeConfig) -> Arc<dyn PageRenderer> {
    match config.renderer {
        #[cfg(feature = "headless")]
        RendererKind::Headless => {
            use crate::scrape::{headless::ChromeLauncher, SessionRenderer};

            let launcher = ChromeLauncher::new(
                config.chrome_path.clone(),
                Duration::from_millis(config.settle_millis),
            );
            Arc::new(SessionRenderer::new(
                launcher,
                Duration::from_secs(config.page_timeout_secs),
                config.body_text_limit,
            ))
        }
        #[cfg(not(feature = "headless"))]
        RendererKind::Headless => {
            log::warn!("built without headless support, falling back to plain fetch");
            Arc::new(PlainRenderer::new(config))
        }
        RendererKind::Plain => Arc::new(PlainRenderer::new(config)),
    }
}

impl Analyzer {
    /// Picks collaborators from `config`: the configured renderer and, when a
    /// key is present, the SerpApi client.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let provider: Option<Arc<dyn SearchProvider>> = match &config.search.api_key {
            Some(key) => Some(Arc::new(SerpApiClient::new(key, &config.search))),
            None => {
                log::warn!("SERPAPI_KEY is not set, search signals will be estimated");
                None
            }
        };

        Self::new(config, renderer_for(&config.scrape), provider)
    }

    pub fn new(
        config: &Config,
        renderer: Arc<dyn PageRenderer>,
        provider: Option<Arc<dyn SearchProvider>>,
    ) -> Result<Self, AppError> {
        let lexicon = &config.lexicon;
        if let Some(provider) = &provider {
            log::info!("search signals from {}", provider.name());
        }

        let search = MentionsAggregator::new(
            provider,
            RelevanceFilter::new(lexicon)?,
            lexicon.social_platforms.clone(),
            RateLimitedScheduler::new(Duration::from_millis(config.search.social_delay_millis)),
        );

        Ok(Self {
            renderer,
            search,
            formula: config.scoring.resolve()?,
            detector: FeatureDetector::new(lexicon)?,
            resolver: NameResolver::new(&lexicon.font_words),
            classifier: PlatformClassifier::new(&lexicon.platforms),
            narrative: NarrativeGenerator::new(lexicon)?,
        })
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    pub fn search_enabled(&self) -> bool {
        self.search.is_enabled()
    }

    /// Scrapes `target` and scores the font page behind it.
    pub fn analyze_url(&self, target: &str) -> Result<AnalysisReport, AppError> {
        if target.trim().is_empty() {
            return Err(AppError::MissingField("url"));
        }
        let url = parse_target(target)?;

        log::info!("analyzing {url} with {} renderer", self.renderer.name());
        let page = self.renderer.render(&url)?;

        let domain = url.host_str().unwrap_or_default().to_lowercase();
        let identity = FontIdentity {
            font_name: self.resolver.resolve(&page, &url),
            platform: self.classifier.identify(&domain),
            domain,
        };
        log::info!(
            "{}: font '{}' on {}",
            identity.domain,
            identity.font_name,
            identity.platform.name
        );

        let text = format!("{} {}", page.body_text, page.description);
        let features = self.detector.features(&text);
        let weights = self.detector.weights(&text);
        let seo = seo::analyze_seo(&page);

        let font_name = identity.font_name.as_str();
        let subject_domain = Some(identity.domain.as_str());
        let google_ranking = self.search.ranking(font_name, url.as_str());
        let backlinks = self.search.backlinks(url.as_str());
        let mentions = self.search.mentions(font_name, subject_domain);
        let social_media = self.search.social(font_name, subject_domain);

        let inputs = ScoreInputs {
            has_title: !page.title.trim().is_empty(),
            has_description: !page.description.trim().is_empty(),
            has_h1: !page.h1.trim().is_empty(),
            body_length: page.body_text.chars().count(),
            features,
            platform_boost: identity.platform.boost,
            seo_score: seo.score,
            ranking_position: google_ranking.position,
            mentions: mentions.total_results,
            social: social_media.total,
            ..Default::default()
        }
        .with_weights(&weights);
        let scores = scoring::compose(&inputs, &self.formula);

        let input = NarrativeInput {
            page: Some(&page),
            identity: &identity,
            features: &features,
            weights: &weights,
            scores: &scores,
            seo: Some(&seo),
            ranking: Some(&google_ranking),
            backlinks: Some(&backlinks),
            social: Some(&social_media),
        };
        let content_analysis = self.narrative.content_analysis(&input);
        let recommendations = self.narrative.recommendations(&input);
        let ai_summary = self
            .narrative
            .summary(&input, &content_analysis, &recommendations);
        let sentiment_analysis = self
            .narrative
            .sentiment(mentions.sources.iter().chain(social_media.sources.iter()));

        log::info!("{}: final score {}", identity.font_name, scores.final_score);

        Ok(AnalysisReport {
            url: url.to_string(),
            identity,
            features,
            weights,
            scores,
            seo,
            google_ranking,
            mentions,
            social_media,
            backlinks,
            content_analysis,
            sentiment_analysis,
            recommendations,
            ai_summary,
            analyzed_at: chrono::Utc::now(),
        })
    }

    /// Mentions and social reach of a font name, no page involved.
    pub fn search_font(&self, font_name: &str) -> Result<FontSearchReport, AppError> {
        let raw = font_name.trim();
        if raw.is_empty() {
            return Err(AppError::MissingField("fontName"));
        }
        let font_name = self
            .resolver
            .normalize(raw)
            .unwrap_or_else(|| raw.to_string());

        log::info!("searching mentions of '{font_name}'");
        let mentions = self.search.mentions(&font_name, None);
        let social_media = self.search.social(&font_name, None);
        let sentiment_analysis = self
            .narrative
            .sentiment(mentions.sources.iter().chain(social_media.sources.iter()));

        Ok(FontSearchReport {
            mentions_score: scoring::mentions_score(mentions.total_results),
            social_score: scoring::social_score(social_media.total),
            font_name,
            mentions,
            social_media,
            sentiment_analysis,
            searched_at: chrono::Utc::now(),
        })
    }

    /// Scores an uploaded TTF/OTF binary from its own tables.
    pub fn analyze_font_file(
        &self,
        data: &[u8],
        file_name: &str,
    ) -> Result<FontFileReport, AppError> {
        let font = fontfile::parse_font(data)?;
        log::info!(
            "{file_name}: family {:?}, {} glyphs",
            font.family_name,
            font.glyph_count
        );

        let stem = std::path::Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.replace(&['-', '_'][..], " "));
        let font_name = font
            .family_name
            .as_deref()
            .and_then(|name| self.resolver.normalize(name))
            .or_else(|| stem.as_deref().and_then(|s| self.resolver.normalize(s)))
            .unwrap_or_else(|| UNKNOWN_FONT.to_string());

        let identity = FontIdentity {
            font_name,
            domain: String::new(),
            platform: Platform {
                name: UPLOADED_FILE.to_string(),
                boost: 0,
            },
        };

        let features = fontfile::features_of(&font);
        let weights = fontfile::weights_of(&font);

        let inputs = ScoreInputs {
            has_title: font.family_name.is_some(),
            features,
            optimization_base: Some(FONT_FILE_OPTIMIZATION_BASE),
            ..Default::default()
        }
        .with_weights(&weights);
        let scores = scoring::compose(&inputs, &ScoreFormula::classic());

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
        let content_analysis = self.narrative.content_analysis(&input);
        let recommendations = self.narrative.recommendations(&input);
        let ai_summary = self
            .narrative
            .summary(&input, &content_analysis, &recommendations);

        Ok(FontFileReport {
            file_name: file_name.to_string(),
            identity,
            font_info: font,
            features,
            weights,
            scores,
            content_analysis,
            recommendations,
            ai_summary,
            analyzed_at: chrono::Utc::now(),
        })
    }
}
