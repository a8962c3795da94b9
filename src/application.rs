//! Application layer: the crawl orchestrator driving the traversal.

pub mod orchestrator;

pub use orchestrator::CrawlOrchestrator;
