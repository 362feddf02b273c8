use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use super::lexicon::Lexicon;
use super::types::{FeatureSet, WeightProfile};

static NUMERIC_WEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([1-9]00)\b").expect("numeric weight regex"));

pub(crate) fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Regex tables for typographic features and weight names.
pub struct FeatureDetector {
    hebrew: Regex,
    opentype: Regex,
    webfont: Regex,
    variable: Regex,
    ligatures: Regex,
    alternates: Regex,
    latin: Regex,
    weights: Vec<(Regex, u16)>,
    italic: Regex,
}

impl FeatureDetector {
    pub fn new(lexicon: &Lexicon) -> Result<Self, regex::Error> {
        let f = &lexicon.features;

        let weights = lexicon
            .weights
            .iter()
            .map(|w| compile(&w.pattern).map(|re| (re, w.weight)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            hebrew: compile(&f.hebrew)?,
            opentype: compile(&f.opentype)?,
            webfont: compile(&f.webfont)?,
            variable: compile(&f.variable)?,
            ligatures: compile(&f.ligatures)?,
            alternates: compile(&f.alternates)?,
            latin: compile(&f.latin)?,
            weights,
            italic: compile(&lexicon.italic)?,
        })
    }

    pub fn features(&self, text: &str) -> FeatureSet {
        FeatureSet {
            hebrew: self.hebrew.is_match(text),
            opentype: self.opentype.is_match(text),
            webfont: self.webfont.is_match(text),
            variable: self.variable.is_match(text),
            ligatures: self.ligatures.is_match(text),
            alternates: self.alternates.is_match(text),
            latin: self.latin.is_match(text),
        }
    }

    pub fn weights(&self, text: &str) -> WeightProfile {
        let named = self
            .weights
            .iter()
            .filter(|(re, _)| re.is_match(text))
            .map(|(_, weight)| *weight);

        let numeric = NUMERIC_WEIGHT
            .captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u16>().ok());

        WeightProfile::new(named.chain(numeric), self.italic.is_match(text))
    }
}
