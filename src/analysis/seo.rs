use super::types::{PageSnapshot, SeoAnalysis, SeoCheck};

const TITLE_BAND: std::ops::RangeInclusive<usize> = 30..=60;
const DESCRIPTION_BAND: std::ops::RangeInclusive<usize> = 120..=160;
const LONG_CONTENT: usize = 1000;

fn check(name: &str, points: u32, max_points: u32, message: impl Into<String>) -> SeoCheck {
    SeoCheck {
        name: name.to_string(),
        passed: points == max_points,
        points,
        max_points,
        message: message.into(),
    }
}

fn flag(name: &str, present: bool, max_points: u32, ok: &str, missing: &str) -> SeoCheck {
    if present {
        check(name, max_points, max_points, ok)
    } else {
        check(name, 0, max_points, missing)
    }
}

/// Scores structural page quality. Pure and deterministic.
pub fn analyze_seo(page: &PageSnapshot) -> SeoAnalysis {
    let title_length = page.title.trim().chars().count();
    let description_length = page.description.trim().chars().count();
    let content_length = page.body_text.chars().count();

    let title = if TITLE_BAND.contains(&title_length) {
        check("title", 15, 15, format!("title length {title_length} is optimal"))
    } else if title_length > 0 {
        check("title", 8, 15, format!("title length {title_length} is outside 30-60"))
    } else {
        check("title", 0, 15, "page has no title")
    };

    let description = if DESCRIPTION_BAND.contains(&description_length) {
        check(
            "description",
            15,
            15,
            format!("description length {description_length} is optimal"),
        )
    } else if description_length > 0 {
        check(
            "description",
            8,
            15,
            format!("description length {description_length} is outside 120-160"),
        )
    } else {
        check("description", 0, 15, "page has no meta description")
    };

    let checks = vec![
        title,
        description,
        flag("h1", !page.h1.trim().is_empty(), 10, "page has an H1", "page has no H1"),
        flag("https", page.has_https, 15, "served over HTTPS", "not served over HTTPS"),
        flag(
            "openGraph",
            page.has_open_graph,
            10,
            "Open Graph tags present",
            "no Open Graph tags",
        ),
        flag(
            "structuredData",
            page.has_structured_data,
            15,
            "structured data present",
            "no structured data",
        ),
        flag(
            "canonical",
            page.has_canonical,
            5,
            "canonical URL declared",
            "no canonical URL",
        ),
        flag(
            "mobileViewport",
            page.has_mobile_viewport,
            10,
            "mobile viewport declared",
            "no mobile viewport meta tag",
        ),
        flag(
            "contentLength",
            content_length > LONG_CONTENT,
            5,
            "page has substantial content",
            "page content is short",
        ),
    ];

    let score = checks.iter().map(|c| c.points).sum::<u32>().min(100);

    SeoAnalysis {
        score,
        title_length,
        description_length,
        content_length,
        checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_page() -> PageSnapshot {
        PageSnapshot {
            url: "https://example.org/font".into(),
            title: "Heebo: a modern Hebrew and Latin typeface".into(),
            h1: "Heebo".into(),
            description: "d".repeat(140),
            body_text: "x".repeat(5000),
            has_https: true,
            has_open_graph: true,
            has_structured_data: true,
            has_canonical: true,
            has_mobile_viewport: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_page_scores_zero() {
        let seo = analyze_seo(&PageSnapshot::default());
        assert_eq!(seo.score, 0);
        assert!(seo.checks.iter().all(|c| !c.passed));
    }

    #[test]
    fn test_full_page_is_capped_at_100() {
        let seo = analyze_seo(&full_page());
        assert_eq!(seo.score, 100);
        assert!(seo.checks.iter().all(|c| c.passed));
    }

    #[test]
    fn test_length_bands() {
        let mut page = PageSnapshot {
            title: "short".into(),
            description: "short".into(),
            ..Default::default()
        };
        assert_eq!(analyze_seo(&page).score, 16);

        page.title = "t".repeat(30);
        page.description = "d".repeat(160);
        assert_eq!(analyze_seo(&page).score, 30);

        page.title = "t".repeat(61);
        page.description = "d".repeat(119);
        assert_eq!(analyze_seo(&page).score, 16);
    }

    #[test]
    fn test_monotonic_in_each_flag() {
        let base = PageSnapshot {
            title: "t".repeat(40),
            ..Default::default()
        };
        let base_score = analyze_seo(&base).score;

        let toggles: Vec<fn(&mut PageSnapshot)> = vec![
            |p| p.h1 = "Heading".into(),
            |p| p.has_https = true,
            |p| p.has_open_graph = true,
            |p| p.has_structured_data = true,
            |p| p.has_canonical = true,
            |p| p.has_mobile_viewport = true,
            |p| p.body_text = "x".repeat(1001),
            |p| p.description = "d".repeat(130),
        ];

        for toggle in toggles {
            let mut page = base.clone();
            toggle(&mut page);
            let score = analyze_seo(&page).score;
            assert!(score > base_score);
            assert!(score <= 100);
        }
    }

    #[test]
    fn test_content_length_threshold_is_exclusive() {
        let page = PageSnapshot {
            body_text: "x".repeat(1000),
            ..Default::default()
        };
        assert_eq!(analyze_seo(&page).score, 0);
    }
}
