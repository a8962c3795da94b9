//! Infrastructure layer: browser session, page fetching, extraction,
//! assembly, persistence, configuration and logging.

pub mod assembler;
pub mod browser;
pub mod config;
pub mod extractors;
pub mod logging;
pub mod page_fetcher;
pub mod storage;
pub mod structured_data;

pub use browser::{ChromeSessionFactory, RenderSession, SessionFactory};
pub use config::{FetchConfig, LoggingConfig, ScraperConfig};
pub use page_fetcher::{FetchError, FetchedPage, PageFetcher};
pub use storage::OutputStorage;
