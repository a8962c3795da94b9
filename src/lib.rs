//! homescout - resilient listing scraper for JavaScript-rendered new-home
//! builder sites.
//!
//! The site exposes no stable API; content arrives through a rendered DOM
//! whose markup changes between pages and over time. The pipeline pairs a
//! retrying page fetcher over a single headless-browser session with
//! fallback-chained field extraction, so a drifted selector or a failed page
//! degrades one field or one work item instead of the run.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::CrawlOrchestrator;
pub use infrastructure::{ChromeSessionFactory, ScraperConfig};
