use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::{features::FeatureDetector, lexicon::Lexicon, scoring::ScoreFormula};

const DEFAULT_PORT: u16 = 10000;
const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SETTLE_MILLIS: u64 = 2000;
const DEFAULT_BODY_TEXT_LIMIT: usize = 5000;
const DEFAULT_SEARCH_ENDPOINT: &str = "https://serpapi.com";
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RESULTS_PER_QUERY: u32 = 10;
const DEFAULT_SOCIAL_DELAY_MILLIS: u64 = 200;
const DEFAULT_FORMULA: &str = "full";
/// Upload limit for `/api/analyze-file`
pub const MAX_FONT_FILE_BYTES: usize = 10 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid pattern in lexicon: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    Headless,
    Plain,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScrapeConfig {
    #[serde(default = "default_renderer")]
    pub renderer: RendererKind,

    /// Chromium binary, `CHROME_PATH` overrides
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Pause after navigation for client-side rendering
    #[serde(default = "default_settle_millis")]
    pub settle_millis: u64,

    /// Characters of body text kept in the snapshot
    #[serde(default = "default_body_text_limit")]
    pub body_text_limit: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            renderer: default_renderer(),
            chrome_path: None,
            page_timeout_secs: DEFAULT_PAGE_TIMEOUT_SECS,
            settle_millis: DEFAULT_SETTLE_MILLIS,
            body_text_limit: DEFAULT_BODY_TEXT_LIMIT,
        }
    }
}

fn default_renderer() -> RendererKind {
    if cfg!(feature = "headless") {
        RendererKind::Headless
    } else {
        RendererKind::Plain
    }
}

fn default_page_timeout_secs() -> u64 {
    DEFAULT_PAGE_TIMEOUT_SECS
}

fn default_settle_millis() -> u64 {
    DEFAULT_SETTLE_MILLIS
}

fn default_body_text_limit() -> usize {
    DEFAULT_BODY_TEXT_LIMIT
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_results_per_query")]
    pub results_per_query: u32,

    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between the per-platform social queries
    #[serde(default = "default_social_delay_millis")]
    pub social_delay_millis: u64,

    /// Read from `SERPAPI_KEY`, never from the file
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .field("country", &self.country)
            .field("results_per_query", &self.results_per_query)
            .field("timeout_secs", &self.timeout_secs)
            .field("social_delay_millis", &self.social_delay_millis)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            language: default_language(),
            country: default_country(),
            results_per_query: DEFAULT_RESULTS_PER_QUERY,
            timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
            social_delay_millis: DEFAULT_SOCIAL_DELAY_MILLIS,
            api_key: None,
        }
    }
}

fn default_search_endpoint() -> String {
    DEFAULT_SEARCH_ENDPOINT.to_string()
}

fn default_language() -> String {
    "he".to_string()
}

fn default_country() -> String {
    "il".to_string()
}

fn default_results_per_query() -> u32 {
    DEFAULT_RESULTS_PER_QUERY
}

fn default_search_timeout_secs() -> u64 {
    DEFAULT_SEARCH_TIMEOUT_SECS
}

fn default_social_delay_millis() -> u64 {
    DEFAULT_SOCIAL_DELAY_MILLIS
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Preset name: `full`, `classic` or `classic_blended`
    #[serde(default = "default_formula")]
    pub formula: String,

    /// Explicit weights; takes precedence over `formula`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<ScoreFormula>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            formula: default_formula(),
            custom: None,
        }
    }
}

fn default_formula() -> String {
    DEFAULT_FORMULA.to_string()
}

impl ScoringConfig {
    pub fn resolve(&self) -> Result<ScoreFormula, ConfigError> {
        let formula = match &self.custom {
            Some(custom) => custom.clone(),
            None => ScoreFormula::by_name(&self.formula).ok_or_else(|| {
                ConfigError::Invalid(format!("unknown scoring formula '{}'", self.formula))
            })?,
        };

        if formula.terms.is_empty() {
            return Err(ConfigError::Invalid("scoring formula has no terms".into()));
        }
        if formula.terms.iter().any(|t| t.weight < 0.0) || formula.weight_sum() <= 0.0 {
            return Err(ConfigError::Invalid(
                "scoring weights must be non-negative with a positive sum".into(),
            ));
        }

        Ok(formula)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// `PORT` overrides
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub lexicon: Lexicon,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            scrape: ScrapeConfig::default(),
            search: SearchConfig::default(),
            scoring: ScoringConfig::default(),
            lexicon: Lexicon::default(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.scrape.page_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "scrape.page_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.scrape.body_text_limit == 0 {
            return Err(ConfigError::Invalid(
                "scrape.body_text_limit must be greater than 0".into(),
            ));
        }

        if self.search.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "search.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.search.results_per_query == 0 || self.search.results_per_query > 100 {
            return Err(ConfigError::Invalid(format!(
                "search.results_per_query must be between 1 and 100, got {}",
                self.search.results_per_query
            )));
        }

        for weight in &self.lexicon.weights {
            if !(100..=900).contains(&weight.weight) || weight.weight % 100 != 0 {
                return Err(ConfigError::Invalid(format!(
                    "lexicon weight {} for '{}' is not one of 100..900",
                    weight.weight, weight.pattern
                )));
            }
        }

        self.scoring.resolve()?;
        FeatureDetector::new(&self.lexicon)?;

        Ok(())
    }

    /// Reads `path` (YAML) if given, then applies environment overrides.
    pub fn load_with(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let config_str =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    })?;
                serde_yml::from_str::<Self>(&config_str)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        if let Some(port) = non_empty("PORT").and_then(|p| p.trim().parse().ok()) {
            self.port = port;
        }

        if let Some(key) = non_empty("SERPAPI_KEY").or_else(|| non_empty("SERPAPI_API_KEY")) {
            self.search.api_key = Some(key.trim().to_string());
        }

        if let Some(path) = non_empty("CHROME_PATH") {
            self.scrape.chrome_path = Some(PathBuf::from(path));
        }
    }
}
