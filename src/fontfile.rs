use serde::Serialize;
use ttf_parser::{name_id, opentype_layout::LayoutTable, Face, Tag};

use crate::analysis::types::{FeatureSet, WeightProfile};

const LIGATURE_TAGS: &[&str] = &["liga", "dlig", "rlig", "clig"];
const ALTERNATE_TAGS: &[&str] = &["salt", "calt", "aalt", "swsh"];

#[derive(thiserror::Error, Debug)]
pub enum FontFileError {
    #[error("font file is empty")]
    Empty,

    #[error("{0} containers are not supported, upload a TTF or OTF file")]
    UnsupportedContainer(&'static str),

    #[error("failed to parse font: {0}")]
    Parse(String),
}

/// `wght` axis range of a variable font.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightAxis {
    pub min: f32,
    pub default: f32,
    pub max: f32,
}

/// What a font binary says about itself.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFont {
    pub family_name: Option<String>,
    pub subfamily: Option<String>,
    pub weight_class: u16,
    pub weight_axis: Option<WeightAxis>,
    pub italic: bool,
    /// GSUB and GPOS feature tags, sorted and deduplicated
    pub feature_tags: Vec<String>,
    pub has_layout_tables: bool,
    pub glyph_count: u16,
    pub has_hebrew: bool,
    pub has_latin: bool,
}

fn container(data: &[u8]) -> Option<&'static str> {
    match data.get(..4)? {
        b"wOFF" => Some("WOFF"),
        b"wOF2" => Some("WOFF2"),
        _ => None,
    }
}

fn name(face: &Face, ids: &[u16]) -> Option<String> {
    ids.iter().find_map(|id| {
        face.names()
            .into_iter()
            .filter(|n| n.name_id == *id)
            .find_map(|n| n.to_string())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn layout_tags(table: Option<&LayoutTable>, tags: &mut Vec<String>) {
    let Some(table) = table else {
        return;
    };

    for i in 0..table.features.len() {
        if let Some(feature) = table.features.get(i) {
            tags.push(String::from_utf8_lossy(&feature.tag.to_bytes()).trim().to_string());
        }
    }
}

pub fn parse_font(data: &[u8]) -> Result<ParsedFont, FontFileError> {
    if data.is_empty() {
        return Err(FontFileError::Empty);
    }
    if let Some(kind) = container(data) {
        return Err(FontFileError::UnsupportedContainer(kind));
    }

    let face = Face::parse(data, 0).map_err(|err| FontFileError::Parse(err.to_string()))?;

    let weight_tag = Tag::from_bytes(b"wght");
    let weight_axis = face
        .variation_axes()
        .into_iter()
        .find(|axis| axis.tag == weight_tag)
        .map(|axis| WeightAxis {
            min: axis.min_value,
            default: axis.def_value,
            max: axis.max_value,
        });

    let tables = face.tables();
    let mut feature_tags = Vec::new();
    layout_tags(tables.gsub.as_ref(), &mut feature_tags);
    layout_tags(tables.gpos.as_ref(), &mut feature_tags);
    feature_tags.sort();
    feature_tags.dedup();

    Ok(ParsedFont {
        family_name: name(&face, &[name_id::TYPOGRAPHIC_FAMILY, name_id::FAMILY]),
        subfamily: name(&face, &[name_id::TYPOGRAPHIC_SUBFAMILY, name_id::SUBFAMILY]),
        weight_class: face.weight().to_number(),
        weight_axis,
        italic: face.is_italic() || face.is_oblique(),
        feature_tags,
        has_layout_tables: tables.gsub.is_some() || tables.gpos.is_some(),
        glyph_count: face.number_of_glyphs(),
        has_hebrew: face.glyph_index('א').is_some(),
        has_latin: face.glyph_index('A').is_some(),
    })
}

fn round_to_grid(weight: f32) -> u16 {
    let rounded = ((weight / 100.0).round() * 100.0) as i32;
    rounded.clamp(100, 900) as u16
}

/// Grid weights a font can render.
pub fn weights_of(font: &ParsedFont) -> WeightProfile {
    let detected: Vec<u16> = match font.weight_axis {
        Some(axis) => {
            let on_grid: Vec<u16> = (1..=9)
                .map(|step| step * 100)
                .filter(|w| (axis.min..=axis.max).contains(&(*w as f32)))
                .collect();
            if on_grid.is_empty() {
                vec![round_to_grid(axis.default)]
            } else {
                on_grid
            }
        }
        None => vec![round_to_grid(font.weight_class as f32)],
    };

    WeightProfile::new(detected, font.italic)
}

fn is_stylistic_set(tag: &str) -> bool {
    tag.strip_prefix("ss")
        .and_then(|n| n.parse::<u8>().ok())
        .is_some_and(|n| (1..=20).contains(&n))
}

pub fn features_of(font: &ParsedFont) -> FeatureSet {
    let has = |tags: &[&str]| font.feature_tags.iter().any(|t| tags.contains(&t.as_str()));

    FeatureSet {
        hebrew: font.has_hebrew,
        opentype: font.has_layout_tables,
        // a bare sfnt says nothing about web delivery
        webfont: false,
        variable: font.weight_axis.is_some(),
        ligatures: has(LIGATURE_TAGS),
        alternates: has(ALTERNATE_TAGS) || font.feature_tags.iter().any(|t| is_stylistic_set(t)),
        latin: font.has_latin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font() -> ParsedFont {
        ParsedFont {
            family_name: Some("Heebo".into()),
            subfamily: Some("Regular".into()),
            weight_class: 400,
            weight_axis: None,
            italic: false,
            feature_tags: vec![],
            has_layout_tables: false,
            glyph_count: 300,
            has_hebrew: true,
            has_latin: true,
        }
    }

    #[test]
    fn test_parse_variable_font() {
        let font = parse_font(crate::tests::EXPOSURE_SANS_TTF).unwrap();

        // typographic family wins over the legacy family name
        assert_eq!(font.family_name.as_deref(), Some("Exposure Sans"));
        assert_eq!(font.subfamily.as_deref(), Some("Regular"));
        assert_eq!(font.weight_class, 400);
        assert_eq!(
            font.weight_axis,
            Some(WeightAxis {
                min: 100.0,
                default: 400.0,
                max: 900.0,
            })
        );
        assert!(!font.italic);
        assert_eq!(font.feature_tags, vec!["kern", "liga", "ss01"]);
        assert!(font.has_layout_tables);
        assert_eq!(font.glyph_count, 54);
        assert!(font.has_hebrew);
        assert!(font.has_latin);

        let weights = weights_of(&font);
        assert_eq!(weights.detected, vec![100, 200, 300, 400, 500, 600, 700, 800, 900]);
        assert!(!weights.has_italic);

        let features = features_of(&font);
        assert!(features.variable);
        assert!(features.opentype);
        assert!(features.ligatures);
        assert!(features.alternates);
        assert!(features.hebrew && features.latin);
        assert!(!features.webfont);
    }

    #[test]
    fn test_truncated_font_is_rejected() {
        let data = &crate::tests::EXPOSURE_SANS_TTF[..40];
        assert!(matches!(parse_font(data), Err(FontFileError::Parse(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(parse_font(b""), Err(FontFileError::Empty)));
        assert!(matches!(
            parse_font(b"definitely not a font file"),
            Err(FontFileError::Parse(_))
        ));
        assert!(matches!(
            parse_font(b"wOF2\x00\x01\x00\x00"),
            Err(FontFileError::UnsupportedContainer("WOFF2"))
        ));
    }

    #[test]
    fn test_static_weight_rounds_to_grid() {
        let mut f = font();
        f.weight_class = 350;
        assert_eq!(weights_of(&f).detected, vec![400]);

        f.weight_class = 1000;
        assert_eq!(weights_of(&f).detected, vec![900]);

        f.weight_class = 0;
        assert_eq!(weights_of(&f).detected, vec![100]);
    }

    #[test]
    fn test_axis_weights_cover_range() {
        let mut f = font();
        f.weight_axis = Some(WeightAxis {
            min: 100.0,
            default: 400.0,
            max: 900.0,
        });
        f.italic = true;

        let weights = weights_of(&f);
        assert_eq!(weights.detected, vec![100, 200, 300, 400, 500, 600, 700, 800, 900]);
        assert_eq!(weights.count, 9);
        assert!(weights.has_italic);
        assert!(features_of(&f).variable);
    }

    #[test]
    fn test_narrow_axis_falls_back_to_default() {
        let mut f = font();
        f.weight_axis = Some(WeightAxis {
            min: 420.0,
            default: 450.0,
            max: 480.0,
        });
        assert_eq!(weights_of(&f).detected, vec![500]);
    }

    #[test]
    fn test_feature_tags() {
        let mut f = font();
        f.has_layout_tables = true;
        f.feature_tags = vec!["kern".into(), "liga".into(), "ss03".into()];

        let features = features_of(&f);
        assert!(features.opentype);
        assert!(features.ligatures);
        assert!(features.alternates);
        assert!(features.hebrew && features.latin);
        assert!(!features.webfont);

        f.feature_tags = vec!["ss21".into(), "kern".into()];
        let features = features_of(&f);
        assert!(!features.ligatures);
        assert!(!features.alternates);
    }
}
