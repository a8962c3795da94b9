//! Page fetching with bounded retries, readiness detection and session
//! recovery.
//!
//! The fetcher owns the single live rendering session. Any failure during
//! navigation, readiness waits or serialization tears the session down, waits
//! `retry_delay * attempt` (linear backoff) and retries with a fresh session.
//! Readiness timeouts are soft: the fetcher proceeds with whatever content is
//! present instead of aborting the attempt. Errors never escape past this
//! boundary except as the final [`FetchError::RetriesExhausted`].

use std::time::Duration;

use anyhow::{bail, Result};
use scraper::Html;
use thiserror::Error;
use tracing::{info, warn};

use crate::infrastructure::browser::{RenderSession, SessionFactory};
use crate::infrastructure::config::FetchConfig;

/// Terminal fetch failures. Everything transient is retried internally.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("gave up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("fetch retry count must be at least 1")]
    NoAttemptsConfigured,
}

/// A successfully rendered page: the raw markup and its parsed tree.
#[derive(Debug)]
pub struct FetchedPage {
    pub url: String,
    pub source: String,
    pub document: Html,
}

/// Owns the rendering session and the retry state machine around it.
pub struct PageFetcher {
    factory: Box<dyn SessionFactory>,
    session: Option<Box<dyn RenderSession>>,
    config: FetchConfig,
}

/// Backoff before retry attempt `failed_attempt + 1`, growing linearly with
/// the number of failures so far.
pub fn backoff_delay(retry_delay: Duration, failed_attempt: u32) -> Duration {
    retry_delay * failed_attempt
}

impl PageFetcher {
    pub fn new(factory: Box<dyn SessionFactory>, config: FetchConfig) -> Self {
        Self {
            factory,
            session: None,
            config,
        }
    }

    /// Fetch `url` and return its rendered document. `readiness_marker` is a
    /// CSS selector used only to detect that dynamic content has appeared; a
    /// marker timeout degrades to a warning, not a failed attempt.
    pub fn fetch(
        &mut self,
        url: &str,
        readiness_marker: Option<&str>,
    ) -> Result<FetchedPage, FetchError> {
        if self.config.max_retries == 0 {
            return Err(FetchError::NoAttemptsConfigured);
        }

        let mut last_error = String::new();
        for attempt in 1..=self.config.max_retries {
            match self.try_fetch(url, readiness_marker) {
                Ok(page) => return Ok(page),
                Err(e) => {
                    warn!("fetch attempt {attempt} for {url} failed: {e:#}");
                    last_error = format!("{e:#}");
                    self.teardown();
                    if attempt < self.config.max_retries {
                        std::thread::sleep(backoff_delay(self.config.retry_delay(), attempt));
                    }
                }
            }
        }

        warn!("giving up on {url} after {} attempts", self.config.max_retries);
        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.config.max_retries,
            last_error,
        })
    }

    /// Drop the live session, if any. The next fetch attempt recreates one.
    pub fn teardown(&mut self) {
        if self.session.take().is_some() {
            info!("rendering session torn down");
        }
    }

    fn try_fetch(&mut self, url: &str, readiness_marker: Option<&str>) -> Result<FetchedPage> {
        if self.session.is_none() {
            self.session = Some(self.factory.create()?);
        }
        let Some(session) = self.session.as_deref_mut() else {
            bail!("rendering session unavailable");
        };

        info!("fetching {url}");
        session.navigate(url)?;

        // Client-side rendering races that no explicit signal covers.
        std::thread::sleep(self.config.settle_delay());

        if let Some(marker) = readiness_marker {
            if let Err(e) = session.wait_for_marker(marker, self.config.marker_timeout()) {
                warn!("readiness marker {marker} timed out ({e:#}), falling back to <body>");
                if let Err(e) = session.wait_for_marker("body", self.config.body_fallback_timeout())
                {
                    warn!("<body> fallback also timed out ({e:#}), proceeding anyway");
                }
            }
        }

        if let Err(e) = session.wait_until_ready(self.config.ready_timeout()) {
            warn!("document-ready wait timed out ({e:#}), proceeding with current content");
        }

        std::thread::sleep(self.config.post_ready_delay());

        let source = session.content()?;
        if source.trim().is_empty() {
            bail!("rendered document for {url} is empty");
        }
        let document = Html::parse_document(&source);

        self.persist_debug_copy(&source);
        Ok(FetchedPage {
            url: url.to_string(),
            source,
            document,
        })
    }

    // Debug-only side channel; never allowed to fail a fetch.
    fn persist_debug_copy(&self, source: &str) {
        let Some(dir) = self.config.debug_dir.as_ref() else {
            return;
        };
        let write = std::fs::create_dir_all(dir)
            .and_then(|_| std::fs::write(dir.join("page_source.html"), source));
        match write {
            Ok(_) => info!("saved page source for debugging"),
            Err(e) => warn!("could not save debug page source: {e}"),
        }
    }
}
