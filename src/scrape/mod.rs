#[cfg(feature = "headless")]
pub mod headless;
pub mod session;

use std::{error::Error, time::Duration};

use scraper::{node::Node, ElementRef, Html, Selector};
use url::Url;

use crate::analysis::types::{HeadingCount, PageSnapshot};
use crate::config::ScrapeConfig;

pub use session::{PageSession, SessionLauncher, SessionRenderer};

const MAX_LINKS: usize = 20;
const USER_AGENT_DEFAULT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";

#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("request failed: {0}")]
    Request(String),
}

/// Turns a URL into a [`PageSnapshot`].
pub trait PageRenderer: Send + Sync {
    fn render(&self, url: &Url) -> Result<PageSnapshot, ScrapeError>;

    fn name(&self) -> &'static str;
}

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

/// Plain HTTP fetch, no JavaScript.
pub struct PlainRenderer {
    timeout: Duration,
    body_text_limit: usize,
}

impl PlainRenderer {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.page_timeout_secs),
            body_text_limit: config.body_text_limit,
        }
    }
}

impl PageRenderer for PlainRenderer {
    fn render(&self, url: &Url) -> Result<PageSnapshot, ScrapeError> {
        let host = url.host_str().unwrap_or_default();

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT_DEFAULT)
            .timeout(self.timeout)
            .build()
            .map_err(|err| ScrapeError::Request(get_error(&err)))?;

        log::debug!("{host}: requesting");

        let resp = client.get(url.as_str()).send().map_err(|err| {
            log::error!("{host}: {err}: {:#?}", get_error(&err));
            ScrapeError::Navigation {
                url: url.to_string(),
                message: get_error(&err),
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // redirects may have moved us to https
        let final_url = resp.url().clone();
        let html = resp
            .text()
            .map_err(|err| ScrapeError::Request(get_error(&err)))?;

        Ok(snapshot_from_html(&html, &final_url, self.body_text_limit))
    }

    fn name(&self) -> &'static str {
        "plain"
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef) -> String {
    collapse(&element.text().collect::<String>())
}

/// Visible text of `body`: skips script, style and noscript contents.
fn visible_text(body: ElementRef) -> String {
    let mut parts = Vec::new();

    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript" | "template"));

        if !hidden {
            parts.push(&**text);
        }
    }

    collapse(&parts.join(" "))
}

fn truncate_chars(text: String, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}

/// Extracts page signals from rendered HTML.
pub fn snapshot_from_html(html: &str, url: &Url, body_text_limit: usize) -> PageSnapshot {
    let document = Html::parse_document(html);

    let title = document
        .select(&selector("title"))
        .next()
        .map(element_text)
        .unwrap_or_default();

    let h1 = document
        .select(&selector("h1"))
        .map(element_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    let mut description = String::new();
    let mut og_description = String::new();
    let mut has_open_graph = false;
    let mut has_mobile_viewport = false;

    for element in document.select(&selector("meta")) {
        let meta_prop = element.attr("property").unwrap_or_default().to_lowercase();
        let meta_name = element.attr("name").unwrap_or_default().to_lowercase();
        let content = element.attr("content").unwrap_or_default().trim();

        if meta_prop.starts_with("og:") {
            has_open_graph = true;
        }

        if description.is_empty() && meta_name == "description" {
            description = content.to_string();
        }

        if og_description.is_empty() && meta_prop == "og:description" {
            og_description = content.to_string();
        }

        if meta_name == "viewport" && content.contains("width") {
            has_mobile_viewport = true;
        }
    }

    if description.is_empty() {
        description = og_description;
    }

    let has_canonical = document
        .select(&selector("link[rel]"))
        .any(|link| {
            link.attr("rel")
                .unwrap_or_default()
                .split_whitespace()
                .any(|rel| rel.eq_ignore_ascii_case("canonical"))
                && link.attr("href").is_some_and(|href| !href.trim().is_empty())
        });

    let has_structured_data = document
        .select(&selector(r#"script[type="application/ld+json"], [itemscope]"#))
        .next()
        .is_some();

    let heading_count = HeadingCount {
        h1: document.select(&selector("h1")).count(),
        h2: document.select(&selector("h2")).count(),
    };

    let links = document
        .select(&selector("a[href]"))
        .filter_map(|a| url.join(a.attr("href")?.trim()).ok())
        .filter(|link| matches!(link.scheme(), "http" | "https"))
        .map(String::from)
        .take(MAX_LINKS)
        .collect();

    let body_text = document
        .select(&selector("body"))
        .next()
        .map(visible_text)
        .unwrap_or_default();

    PageSnapshot {
        url: url.to_string(),
        title,
        h1,
        description,
        body_text: truncate_chars(body_text, body_text_limit),
        has_https: url.scheme() == "https",
        has_open_graph,
        has_structured_data,
        has_canonical,
        has_mobile_viewport,
        heading_count,
        links,
    }
}

/// Parses user input into an http(s) URL, defaulting the scheme to https.
pub fn parse_target(input: &str) -> Result<Url, ScrapeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ScrapeError::InvalidUrl("empty url".into()));
    }

    let candidate = if input.starts_with("//") {
        format!("https:{input}")
    } else if !input.contains("://") {
        format!("https://{input}")
    } else {
        input.to_string()
    };

    let url = Url::parse(&candidate).map_err(|err| ScrapeError::InvalidUrl(format!("{input}: {err}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ScrapeError::InvalidUrl(input.to_string()));
    }

    Ok(url)
}
