use crate::{config::ConfigError, fontfile::FontFileError, scrape::ScrapeError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid upload: {0}")]
    Upload(String),

    #[error("scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("font file error: {0}")]
    FontFile(#[from] FontFileError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl AppError {
    /// Missing or unusable request input. A malformed URL is not one of
    /// these: it fails the analysis like an unreachable page does.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::MissingField(_) | AppError::Upload(_))
    }
}
