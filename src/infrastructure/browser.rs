//! Rendering-engine session management.
//!
//! The scraper talks to exactly one live headless-browser session at a time,
//! behind the [`RenderSession`] trait so the retry machinery (and the tests)
//! never depend on a real Chrome process. [`ChromeSessionFactory`] is the
//! production implementation on top of `headless_chrome`.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::debug;

/// One live rendering session. Callers may not assume any state is shared
/// between two sessions; dropping the session terminates it.
pub trait RenderSession {
    /// Navigate the session to `url` and wait for the navigation to commit.
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Block until `selector` is present in the DOM, or `timeout` elapses.
    fn wait_for_marker(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Block until the document reports itself ready, or `timeout` elapses.
    fn wait_until_ready(&mut self, timeout: Duration) -> Result<()>;

    /// The serialized DOM as currently rendered.
    fn content(&mut self) -> Result<String>;
}

/// Creates rendering sessions on demand. The page fetcher recreates sessions
/// through this after every unrecoverable fetch failure.
pub trait SessionFactory {
    fn create(&self) -> Result<Box<dyn RenderSession>>;
}

const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Script run once per session so the site's bot detection does not see the
/// automation fingerprint.
const MASK_AUTOMATION_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined })";

/// A headless Chrome tab. The `Browser` handle is kept alive alongside the
/// tab; dropping the struct tears the whole process down.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    fn launch(page_timeout: Duration) -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((1920, 1080)))
            .ignore_certificate_errors(true)
            .idle_browser_timeout(Duration::from_secs(300))
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--disable-blink-features=AutomationControlled"),
            ])
            .build()
            .map_err(|e| anyhow!("invalid browser launch options: {e}"))?;

        let browser = Browser::new(options).context("failed to launch headless browser")?;
        let tab = browser.new_tab().context("failed to open browser tab")?;
        tab.set_default_timeout(page_timeout);

        if let Err(e) = tab.evaluate(MASK_AUTOMATION_SCRIPT, false) {
            debug!("could not mask automation fingerprint: {e}");
        }

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl RenderSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .with_context(|| format!("navigation to {url} failed"))?;
        self.tab
            .wait_until_navigated()
            .with_context(|| format!("navigation to {url} did not commit"))?;
        Ok(())
    }

    fn wait_for_marker(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(|e| anyhow!("marker {selector} not found: {e}"))
    }

    fn wait_until_ready(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self
                .tab
                .evaluate("document.readyState", false)
                .ok()
                .and_then(|object| object.value)
                .and_then(|value| value.as_str().map(str::to_string));

            if state.as_deref() == Some("complete") {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(anyhow!("document never reported readyState complete"));
            }
            std::thread::sleep(READY_POLL_INTERVAL);
        }
    }

    fn content(&mut self) -> Result<String> {
        self.tab
            .get_content()
            .context("failed to read rendered document")
    }
}

/// Launches real headless Chrome sessions.
pub struct ChromeSessionFactory {
    page_timeout: Duration,
}

impl ChromeSessionFactory {
    pub fn new(page_timeout: Duration) -> Self {
        Self { page_timeout }
    }
}

impl SessionFactory for ChromeSessionFactory {
    fn create(&self) -> Result<Box<dyn RenderSession>> {
        let session = ChromeSession::launch(self.page_timeout)?;
        debug!("rendering session started");
        Ok(Box::new(session))
    }
}
