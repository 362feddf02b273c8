use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use std::{path::PathBuf, sync::Arc, thread::sleep, time::Duration};
use url::Url;

use super::{PageSession, ScrapeError, SessionLauncher};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36";

/// Launches a local headless Chromium per request.
pub struct ChromeLauncher {
    chrome_path: Option<PathBuf>,
    settle: Duration,
}

impl ChromeLauncher {
    pub fn new(chrome_path: Option<PathBuf>, settle: Duration) -> Self {
        Self {
            chrome_path,
            settle,
        }
    }
}

impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    fn launch(&self) -> Result<ChromeSession, ScrapeError> {
        let options = LaunchOptionsBuilder::default()
            .sandbox(false)
            .path(self.chrome_path.clone())
            .build()
            .map_err(|err| ScrapeError::Launch(err.to_string()))?;

        let browser = Browser::new(options).map_err(|err| {
            log::error!("failed to start chrome: {err}");
            ScrapeError::Launch(err.to_string())
        })?;

        Ok(ChromeSession {
            browser: Some(browser),
            tab: None,
            settle: self.settle,
        })
    }

    fn name(&self) -> &'static str {
        "headless"
    }
}

pub struct ChromeSession {
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
    settle: Duration,
}

impl ChromeSession {
    fn navigation_error(url: &Url, err: impl std::fmt::Display) -> ScrapeError {
        ScrapeError::Navigation {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

impl PageSession for ChromeSession {
    fn load(&mut self, url: &Url, timeout: Duration) -> Result<String, ScrapeError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ScrapeError::Launch("browser is closed".into()))?;
        let host = url.host_str().unwrap_or_default();

        let tab = browser
            .new_tab()
            .map_err(|err| ScrapeError::Launch(err.to_string()))?;
        self.tab = Some(tab.clone());

        tab.set_default_timeout(timeout);
        tab.set_user_agent(USER_AGENT, Some("en-US,en,he"), None)
            .map_err(|err| Self::navigation_error(url, err))?;

        tab.navigate_to(url.as_str())
            .map_err(|err| Self::navigation_error(url, err))?;
        tab.wait_until_navigated()
            .map_err(|err| Self::navigation_error(url, err))?;

        // give client-side rendering a moment
        log::debug!("{host}: waiting {:?} for the page to settle", self.settle);
        sleep(self.settle);
        let _ = tab.wait_for_element_with_custom_timeout("body", Duration::from_secs(10));

        tab.get_content()
            .map_err(|err| Self::navigation_error(url, err))
    }

    fn close(&mut self) {
        if let Some(tab) = self.tab.take() {
            if let Err(err) = tab.close(true) {
                log::debug!("failed to close tab: {err}");
            }
        }
        // dropping the browser kills the chromium process
        self.browser.take();
    }
}
