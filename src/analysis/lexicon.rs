use serde::{Deserialize, Serialize};

/// Keyword and pattern tables driving every text heuristic.
///
/// All patterns are regular expressions compiled case-insensitively once at
/// startup. Overriding a table in `config.yaml` replaces it entirely.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lexicon {
    /// Words stripped from the edges of a font name ("font", "גופן", ...)
    #[serde(default = "default_font_words")]
    pub font_words: Vec<String>,

    /// Known font marketplaces, in precedence order
    #[serde(default = "default_platforms")]
    pub platforms: Vec<PlatformRule>,

    #[serde(default = "default_feature_patterns")]
    pub features: FeaturePatterns,

    /// Weight name patterns, each tested independently
    #[serde(default = "default_weight_patterns")]
    pub weights: Vec<WeightPattern>,

    #[serde(default = "default_italic_pattern")]
    pub italic: String,

    /// Words that mark a search result as font/design related
    #[serde(default = "default_context_words")]
    pub context_words: Vec<String>,

    /// Words that mark a search result as off-topic
    #[serde(default = "default_irrelevant_words")]
    pub irrelevant_words: Vec<String>,

    /// URL substrings of accounts owned by the subject (self-promotion)
    #[serde(default)]
    pub excluded_accounts: Vec<String>,

    #[serde(default = "default_social_platforms")]
    pub social_platforms: Vec<SocialPlatform>,

    #[serde(default = "default_positive_words")]
    pub positive_words: Vec<String>,

    #[serde(default = "default_negative_words")]
    pub negative_words: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlatformRule {
    pub name: String,
    pub boost: u32,
    /// Substrings matched against the lowercased host (and path)
    pub matches: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeaturePatterns {
    pub hebrew: String,
    pub opentype: String,
    pub webfont: String,
    pub variable: String,
    pub ligatures: String,
    pub alternates: String,
    pub latin: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightPattern {
    pub pattern: String,
    pub weight: u16,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SocialPlatform {
    pub name: String,
    pub domain: String,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            font_words: default_font_words(),
            platforms: default_platforms(),
            features: default_feature_patterns(),
            weights: default_weight_patterns(),
            italic: default_italic_pattern(),
            context_words: default_context_words(),
            irrelevant_words: default_irrelevant_words(),
            excluded_accounts: Vec::new(),
            social_platforms: default_social_platforms(),
            positive_words: default_positive_words(),
            negative_words: default_negative_words(),
        }
    }
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn default_font_words() -> Vec<String> {
    strings(&["font", "fonts", "typeface", "פונט", "פונטים", "גופן", "הגופן", "הפונט"])
}

fn platform(name: &str, boost: u32, matches: &[&str]) -> PlatformRule {
    PlatformRule {
        name: name.to_string(),
        boost,
        matches: strings(matches),
    }
}

fn default_platforms() -> Vec<PlatformRule> {
    vec![
        platform("Google Fonts", 35, &["fonts.google", "googlefonts"]),
        platform("Adobe Fonts", 32, &["fonts.adobe", "typekit"]),
        platform("MyFonts", 28, &["myfonts"]),
        platform("Fontspring", 25, &["fontspring"]),
        platform("FontShop", 26, &["fontshop"]),
        platform("Hoefler&Co", 30, &["typography.com", "hoeflerco"]),
        platform("Creative Market", 22, &["creativemarket"]),
    ]
}

fn default_feature_patterns() -> FeaturePatterns {
    FeaturePatterns {
        hebrew: r"hebrew|עברית|עברי".to_string(),
        opentype: r"open\s?type|\botf\b|אופן\s?טייפ".to_string(),
        webfont: r"web\s?fonts?|\bwoff2?\b|@font-face|פונט(?:י)? רשת".to_string(),
        variable: r"variable|וריאבל|משתנה".to_string(),
        ligatures: r"ligature|ליגטור".to_string(),
        alternates: r"alternates?\b|stylistic\s+sets?|חלופות|חלופי".to_string(),
        latin: r"latin|english|לטינית|אנגלית".to_string(),
    }
}

fn weight(pattern: &str, weight: u16) -> WeightPattern {
    WeightPattern {
        pattern: pattern.to_string(),
        weight,
    }
}

fn default_weight_patterns() -> Vec<WeightPattern> {
    vec![
        weight(r"\b(?:thin|hairline)\b|\bדק\b", 100),
        weight(r"\b(?:extra|ultra)[\s-]?light\b|אקסטרה\s?לייט", 200),
        weight(r"\blight\b|לייט", 300),
        weight(r"\b(?:regular|normal|book)\b|רגיל", 400),
        weight(r"\bmedium\b|מדיום|בינוני", 500),
        weight(r"\b(?:semi|demi)[\s-]?bold\b|סמי\s?בולד|חצי\s?בולד", 600),
        weight(r"\bbold\b|בולד|מודגש", 700),
        weight(r"\b(?:extra|ultra)[\s-]?bold\b|אקסטרה\s?בולד", 800),
        weight(r"\b(?:black|heavy)\b|שחור|כבד", 900),
    ]
}

fn default_italic_pattern() -> String {
    r"italic|oblique|איטליק|נטוי".to_string()
}

fn default_context_words() -> Vec<String> {
    strings(&[
        "font",
        "fonts",
        "typeface",
        "typography",
        "type design",
        "lettering",
        "design",
        "פונט",
        "גופן",
        "טיפוגרפיה",
        "עיצוב",
    ])
}

fn default_irrelevant_words() -> Vec<String> {
    strings(&[
        "dog", "puppy", "puppies", "cat", "kitten", "pet", "vet", "buy now", "shop now",
        "discount", "coupon", "free shipping", "hotel", "flight", "vacation", "travel", "כלב",
        "כלבים", "חתול", "חתולים", "מבצע", "קופון", "משלוח", "מלון", "מלונות", "טיסה", "טיסות",
        "חופשה",
    ])
}

fn social(name: &str, domain: &str) -> SocialPlatform {
    SocialPlatform {
        name: name.to_string(),
        domain: domain.to_string(),
    }
}

fn default_social_platforms() -> Vec<SocialPlatform> {
    vec![
        social("twitter", "twitter.com"),
        social("instagram", "instagram.com"),
        social("facebook", "facebook.com"),
        social("behance", "behance.net"),
        social("dribbble", "dribbble.com"),
        social("reddit", "reddit.com"),
    ]
}

fn default_positive_words() -> Vec<String> {
    strings(&[
        "beautiful", "elegant", "love", "great", "amazing", "clean", "excellent", "favorite",
        "stunning", "gorgeous", "perfect", "יפה", "מדהים", "אהבתי", "מעולה", "אלגנטי", "מושלם",
    ])
}

fn default_negative_words() -> Vec<String> {
    strings(&[
        "ugly", "hate", "bad", "poor", "terrible", "broken", "unreadable", "awful", "מכוער",
        "גרוע", "נורא", "שבור",
    ])
}
