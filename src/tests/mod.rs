mod mentions;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use url::Url;

use crate::analysis::{types::PageSnapshot, Analyzer};
use crate::config::Config;
use crate::scrape::{snapshot_from_html, PageRenderer, PageSession, ScrapeError, SessionLauncher};
use crate::search::{OrganicResult, SearchError, SearchProvider, SearchResponse};

/// Variable wght 100..900, GSUB liga/ss01, GPOS kern, Latin A-Z and Hebrew alef-tav.
pub const EXPOSURE_SANS_TTF: &[u8] = include_bytes!("fonts/ExposureSans-VF.ttf");

pub const ROBOTO_URL: &str = "https://fonts.google.com/specimen/Roboto";

pub const ROBOTO_PAGE: &str = r#"<!doctype html>
<html>
<head>
  <title>Roboto Font | Google Fonts</title>
  <meta name="description" content="Roboto has a dual nature. It has a mechanical skeleton and the forms are largely geometric, with friendly and open curves.">
  <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body>
  <h1>Roboto</h1>
  <p>Bold, Regular, Light, Italic</p>
</body>
</html>"#;

/// Serves fixed HTML for every url, or fails like an unreachable host.
pub struct StaticRenderer {
    html: Option<String>,
    pub calls: AtomicUsize,
}

impl StaticRenderer {
    pub fn new(html: &str) -> Self {
        Self {
            html: Some(html.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            html: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl PageRenderer for StaticRenderer {
    fn render(&self, url: &Url) -> Result<PageSnapshot, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.html {
            Some(html) => Ok(snapshot_from_html(html, url, 5000)),
            None => Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".into(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Browser stand-in that counts how often sessions are closed.
pub struct CountingLauncher {
    pub closes: Arc<AtomicUsize>,
    html: Option<String>,
}

impl CountingLauncher {
    pub fn new(html: Option<&str>) -> (Self, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let launcher = Self {
            closes: closes.clone(),
            html: html.map(str::to_string),
        };
        (launcher, closes)
    }
}

pub struct CountingSession {
    closes: Arc<AtomicUsize>,
    html: Option<String>,
}

impl PageSession for CountingSession {
    fn load(&mut self, url: &Url, _timeout: Duration) -> Result<String, ScrapeError> {
        self.html.clone().ok_or_else(|| ScrapeError::Navigation {
            url: url.to_string(),
            message: "net::ERR_NAME_NOT_RESOLVED".into(),
        })
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

impl SessionLauncher for CountingLauncher {
    type Session = CountingSession;

    fn launch(&self) -> Result<CountingSession, ScrapeError> {
        Ok(CountingSession {
            closes: self.closes.clone(),
            html: self.html.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

type Responder = dyn Fn(&str) -> Result<SearchResponse, SearchError> + Send + Sync;

/// Search provider answering from a closure and recording every query.
pub struct ScriptedSearch {
    respond: Box<Responder>,
    pub queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub fn new(
        respond: impl Fn(&str) -> Result<SearchResponse, SearchError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl SearchProvider for ScriptedSearch {
    fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        (self.respond)(query)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn result(title: &str, link: &str, snippet: &str, position: Option<u32>) -> OrganicResult {
    OrganicResult {
        title: title.to_string(),
        link: link.to_string(),
        snippet: snippet.to_string(),
        position,
    }
}

pub fn response(total_results: u64, organic_results: Vec<OrganicResult>) -> SearchResponse {
    SearchResponse {
        organic_results,
        total_results,
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.search.social_delay_millis = 0;
    config
}

pub fn analyzer_with(
    renderer: Arc<dyn PageRenderer>,
    provider: Option<Arc<dyn SearchProvider>>,
) -> Analyzer {
    Analyzer::new(&test_config(), renderer, provider).unwrap()
}
