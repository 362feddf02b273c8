use std::time::Duration;

use url::Url;

use super::{snapshot_from_html, PageRenderer, ScrapeError};
use crate::analysis::types::PageSnapshot;

/// A live browser that can load pages until it is closed.
pub trait PageSession {
    /// Navigates to `url` and returns the rendered HTML.
    fn load(&mut self, url: &Url, timeout: Duration) -> Result<String, ScrapeError>;

    fn close(&mut self);
}

/// Starts browser sessions.
pub trait SessionLauncher: Send + Sync {
    type Session: PageSession;

    fn launch(&self) -> Result<Self::Session, ScrapeError>;

    fn name(&self) -> &'static str;
}

/// Owns a session and closes it exactly once, on `close` or on drop.
pub struct SessionGuard<S: PageSession> {
    session: Option<S>,
}

impl<S: PageSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn session(&mut self) -> Option<&mut S> {
        self.session.as_mut()
    }

    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }
}

impl<S: PageSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Renders pages with one fresh browser session per request.
pub struct SessionRenderer<L: SessionLauncher> {
    launcher: L,
    timeout: Duration,
    body_text_limit: usize,
}

impl<L: SessionLauncher> SessionRenderer<L> {
    pub fn new(launcher: L, timeout: Duration, body_text_limit: usize) -> Self {
        Self {
            launcher,
            timeout,
            body_text_limit,
        }
    }
}

impl<L: SessionLauncher> PageRenderer for SessionRenderer<L> {
    fn render(&self, url: &Url) -> Result<PageSnapshot, ScrapeError> {
        let mut guard = SessionGuard::new(self.launcher.launch()?);

        let html = match guard.session() {
            Some(session) => session.load(url, self.timeout),
            None => Err(ScrapeError::Launch("session already closed".into())),
        };
        guard.close();

        let html = html?;
        Ok(snapshot_from_html(&html, url, self.body_text_limit))
    }

    fn name(&self) -> &'static str {
        self.launcher.name()
    }
}
