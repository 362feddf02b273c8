use regex::Regex;

use super::{host_of, OrganicResult};
use crate::analysis::lexicon::Lexicon;

fn alternation(words: &[String]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

/// Decides whether a search result is a third-party, font-related mention.
pub struct RelevanceFilter {
    irrelevant: Option<Regex>,
    context_words: Vec<String>,
    font_words: String,
    excluded_accounts: Vec<String>,
}

/// Why a result was rejected; used for debug logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OffTopic,
    NoFontContext,
    NotAdjacent,
    SelfPromotion,
}

impl RelevanceFilter {
    pub fn new(lexicon: &Lexicon) -> Result<Self, regex::Error> {
        let irrelevant = if lexicon.irrelevant_words.is_empty() {
            None
        } else {
            // plain English plurals ("dogs", "coupons") match too
            Some(crate::analysis::features::compile(&format!(
                r"\b(?:{})(?:s|es)?\b",
                alternation(&lexicon.irrelevant_words)
            ))?)
        };

        Ok(Self {
            irrelevant,
            context_words: lexicon.context_words.iter().map(|w| w.to_lowercase()).collect(),
            font_words: alternation(&lexicon.font_words),
            excluded_accounts: lexicon
                .excluded_accounts
                .iter()
                .map(|a| a.to_lowercase())
                .collect(),
        })
    }

    /// Prepares the per-font patterns once for a batch of results.
    pub fn for_font(&self, font_name: &str) -> FontMatcher<'_> {
        let name = font_name.trim().to_lowercase();
        let escaped = regex::escape(&name);
        let words = &self.font_words;
        let pattern = format!(r"(?:{words})\s+{escaped}|{escaped}\s+(?:{words})");

        let adjacency = match crate::analysis::features::compile(&pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                log::warn!("adjacency pattern for {font_name:?} failed to compile: {err}");
                None
            }
        };

        FontMatcher {
            filter: self,
            name,
            adjacency,
        }
    }
}

/// A [`RelevanceFilter`] bound to one font name.
pub struct FontMatcher<'a> {
    filter: &'a RelevanceFilter,
    name: String,
    /// "font X", "X font", "פונט X" and friends.
    adjacency: Option<Regex>,
}

impl FontMatcher<'_> {
    /// `Ok(())` when the result counts as a mention of the font.
    pub fn check(&self, result: &OrganicResult, subject_domain: Option<&str>) -> Result<(), Rejection> {
        let filter = self.filter;
        let text = format!("{} {}", result.title, result.snippet);
        let lower = text.to_lowercase();

        if filter.irrelevant.as_ref().is_some_and(|re| re.is_match(&text)) {
            return Err(Rejection::OffTopic);
        }

        if self.name.is_empty()
            || !lower.contains(&self.name)
            || !filter.context_words.iter().any(|w| lower.contains(w.as_str()))
        {
            return Err(Rejection::NoFontContext);
        }

        if !self.adjacency.as_ref().is_some_and(|re| re.is_match(&text)) {
            return Err(Rejection::NotAdjacent);
        }

        let url = result.link.to_lowercase();
        if let (Some(domain), Some(host)) = (subject_domain, host_of(&result.link)) {
            let domain = domain.trim_start_matches("www.").to_lowercase();
            if host == domain || host.ends_with(&format!(".{domain}")) {
                return Err(Rejection::SelfPromotion);
            }
        }
        if filter.excluded_accounts.iter().any(|a| url.contains(a.as_str())) {
            return Err(Rejection::SelfPromotion);
        }

        Ok(())
    }

    pub fn is_relevant(&self, result: &OrganicResult, subject_domain: Option<&str>) -> bool {
        match self.check(result, subject_domain) {
            Ok(()) => true,
            Err(reason) => {
                log::debug!("dropping {} ({reason:?})", result.link);
                false
            }
        }
    }
}
