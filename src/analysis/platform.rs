use super::lexicon::PlatformRule;
use super::types::Platform;

pub const INDEPENDENT_SITE: &str = "independent site";

/// Maps a hostname to a known font marketplace.
pub struct PlatformClassifier {
    rules: Vec<PlatformRule>,
}

impl PlatformClassifier {
    pub fn new(rules: &[PlatformRule]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|rule| PlatformRule {
                    matches: rule.matches.iter().map(|m| m.to_lowercase()).collect(),
                    ..rule.clone()
                })
                .collect(),
        }
    }

    /// First rule with a matching substring wins; table order is precedence.
    pub fn identify(&self, host: &str) -> Platform {
        let host = host.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matches.iter().any(|m| host.contains(m.as_str())))
            .map(|rule| Platform {
                name: rule.name.clone(),
                boost: rule.boost,
            })
            .unwrap_or_else(|| Platform {
                name: INDEPENDENT_SITE.to_string(),
                boost: 0,
            })
    }
}
