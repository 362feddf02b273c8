use url::Url;

use super::types::PageSnapshot;

pub const UNKNOWN_FONT: &str = "Unknown Font";

const SEPARATORS: [char; 4] = ['|', '-', '–', ':'];

fn is_hebrew_mark(c: char) -> bool {
    ('\u{0591}'..='\u{05C7}').contains(&c)
}

/// Derives font names from headings and URLs.
pub struct NameResolver {
    font_words: Vec<String>,
}

impl NameResolver {
    pub fn new(font_words: &[String]) -> Self {
        Self {
            font_words: font_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    fn is_font_word(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.font_words.iter().any(|w| *w == token)
    }

    /// Cleans a raw heading into a font name.
    ///
    /// Returns `None` when fewer than two characters survive. Applying it to
    /// its own output yields the same string.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        // split before stripping, so marketing text after a separator is dropped
        let head = raw.split(&SEPARATORS[..]).next().unwrap_or_default();

        let cleaned: String = head
            .chars()
            .filter(|c| !is_hebrew_mark(*c))
            .map(|c| if c == '+' { ' ' } else { c })
            .collect();

        let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();

        while tokens.first().is_some_and(|t| self.is_font_word(t)) {
            tokens.remove(0);
        }
        while tokens.last().is_some_and(|t| self.is_font_word(t)) {
            tokens.pop();
        }

        let name = tokens.join(" ");
        if name.chars().count() < 2 {
            return None;
        }

        Some(name)
    }

    /// Font name for a page: h1, then title, then the URL path.
    pub fn resolve(&self, snapshot: &PageSnapshot, url: &Url) -> String {
        let heading = if snapshot.h1.trim().is_empty() {
            snapshot.title.as_str()
        } else {
            snapshot.h1.as_str()
        };

        if let Some(name) = self.normalize(heading) {
            return name;
        }

        log::debug!("no usable heading on {url}, falling back to path");
        name_from_path(url).unwrap_or_else(|| UNKNOWN_FONT.to_string())
    }
}

/// Last non-empty path segment, decoded, with `-`, `_` and `+` as spaces.
pub fn name_from_path(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;

    let decoded = percent_decode(segment);
    let name = decoded
        .replace(&['-', '_', '+'][..], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn percent_decode(segment: &str) -> String {
    url::form_urlencoded::parse(format!("s={}", segment.replace('+', "%2B")).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| segment.to_string())
}
