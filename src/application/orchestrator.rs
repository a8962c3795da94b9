//! Crawl orchestration over three traversal levels:
//! locations → communities → homesites.
//!
//! Each level is a fetch + extract + assemble cycle feeding the next level's
//! worklist. Failures are recovered at the smallest scope that can absorb
//! them: a failed field yields null, a failed page is retried then skipped, a
//! failed work item is logged and never aborts the surrounding loop. Partial
//! success is the designed steady state.

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{error, info, warn};

use crate::domain::records::{CommunityRecord, CommunitySummary, Homesite, Location};
use crate::infrastructure::assembler;
use crate::infrastructure::browser::SessionFactory;
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::extractors;
use crate::infrastructure::page_fetcher::PageFetcher;
use crate::infrastructure::storage::OutputStorage;
use crate::infrastructure::structured_data;
use std::path::Path;

/// Readiness marker for the location index on the site root.
const LOCATION_MARKER: &str = ".MetroGrid_metro_areas_states___Ox83";

/// Readiness marker for community cards on a city listing page.
const CITY_MARKER: &str = ".SearchProductCard_card__htFY3";

/// Ordered marker chain for community detail pages; markup varies by
/// template and campaign, so the first marker that yields a page wins.
const COMMUNITY_MARKER_CHAIN: &[&str] = &[
    ".SearchProductCard_card__htFY3",
    ".SearchProductCard",
    ".community-details",
    ".product-card",
    "body",
];

/// A scraped community plus the raw markup it came from.
pub struct ScrapedCommunity {
    pub record: CommunityRecord,
    pub page_source: String,
}

/// Owns the result collection for a run; drives the traversal strictly
/// sequentially through the single rendering session.
pub struct CrawlOrchestrator {
    fetcher: PageFetcher,
    storage: OutputStorage,
    config: ScraperConfig,
}

impl CrawlOrchestrator {
    pub fn new(config: ScraperConfig, factory: Box<dyn SessionFactory>) -> Result<Self> {
        let storage = OutputStorage::new(&config.output_dir)?;
        let fetcher = PageFetcher::new(factory, config.fetch.clone());
        Ok(Self {
            fetcher,
            storage,
            config,
        })
    }

    /// Location index → community summaries, persisted as one batch file.
    pub fn discover(&mut self) -> Result<Vec<CommunitySummary>> {
        let page = self
            .fetcher
            .fetch(&self.config.base_url, Some(LOCATION_MARKER))
            .context("could not fetch the location index")?;
        let locations = extractors::location_index(&page.document, &self.config.base_url);
        if locations.is_empty() {
            warn!("location index yielded no cities");
            return Ok(Vec::new());
        }
        info!("found {} cities across the location index", locations.len());

        let mut summaries = Vec::new();
        let total = locations.len();
        for (index, location) in locations.iter().enumerate() {
            info!("processing city {}/{}: {}", index + 1, total, location.name);
            self.pause_between_requests();
            let found = self.discover_communities(location);
            if found.is_empty() {
                warn!("no communities found for {}", location.name);
            } else {
                info!("found {} communities in {}", found.len(), location.name);
                summaries.extend(found);
            }
        }

        if summaries.is_empty() {
            warn!("discovery finished without any community links");
        } else if let Err(e) = self.storage.save_summaries(&summaries) {
            warn!("could not persist community summaries: {e:#}");
        }
        Ok(summaries)
    }

    fn discover_communities(&mut self, location: &Location) -> Vec<CommunitySummary> {
        match self.fetcher.fetch(&location.url, Some(CITY_MARKER)) {
            Ok(page) => extractors::community_cards(&page.document, &self.config.base_url),
            Err(e) => {
                warn!("skipping city {}: {e}", location.name);
                Vec::new()
            }
        }
    }

    /// One community detail page plus the two-stage homesite scrape beneath it.
    pub fn scrape_community(&mut self, url: &str) -> Result<ScrapedCommunity> {
        let mut page = None;
        for marker in COMMUNITY_MARKER_CHAIN {
            info!("trying readiness marker {marker}");
            match self.fetcher.fetch(url, Some(marker)) {
                Ok(fetched) => {
                    page = Some(fetched);
                    break;
                }
                Err(e) => warn!("marker {marker} did not produce a page: {e}"),
            }
        }
        let page = page.with_context(|| format!("could not fetch community page {url}"))?;

        let structured = structured_data::extract(&page.document);
        let homesites = self.collect_homesites(&page.document);
        let record = assembler::assemble_community(url, &structured, &page.document, homesites);
        info!("assembled community record for {}", record.name);

        Ok(ScrapedCommunity {
            record,
            page_source: page.source,
        })
    }

    // Stage one reads the listing cards; stage two fetches each homesite's
    // own page for coordinates, overview and the richer image set.
    fn collect_homesites(&mut self, community_page: &Html) -> Vec<Homesite> {
        let cards = extractors::homesite_cards(community_page, &self.config.base_url);
        if cards.is_empty() {
            return Vec::new();
        }
        info!("found {} homesite cards", cards.len());

        let mut homesites = Vec::new();
        for card in &cards {
            self.pause_between_requests();
            let detail = match self.fetcher.fetch(&card.url, Some("body")) {
                Ok(page) => Some(page),
                Err(e) => {
                    warn!("homesite detail page unavailable for {}: {e}", card.url);
                    None
                }
            };
            let homesite = match &detail {
                Some(page) => {
                    let structured = structured_data::extract(&page.document);
                    assembler::assemble_homesite(card, Some((&structured, &page.document)))
                }
                None => assembler::assemble_homesite(card, None),
            };
            homesites.push(homesite);
        }
        homesites
    }

    /// Single-URL mode: scrape one community and persist record + markup.
    pub fn run_single(&mut self, url: &str) -> Result<()> {
        let scraped = self.scrape_community(url)?;
        self.persist(&scraped);
        Ok(())
    }

    /// Batch mode: process every entry of a previously produced summaries
    /// file. A failed entry is logged and skipped; the run always completes.
    pub fn run_batch(&mut self, input: Option<&Path>) -> Result<()> {
        let default_path = self.storage.summaries_path();
        let path = input.unwrap_or(&default_path);
        let summaries = OutputStorage::load_summaries(path)?;
        if summaries.is_empty() {
            warn!("no community links found in {}", path.display());
            return Ok(());
        }

        let total = summaries.len();
        let mut success_count = 0usize;
        for (index, summary) in summaries.iter().enumerate() {
            info!("processing community {}/{}", index + 1, total);
            match self.scrape_community(&summary.url) {
                Ok(scraped) => {
                    self.persist(&scraped);
                    info!("scraped community: {}", scraped.record.name);
                    success_count += 1;
                }
                Err(e) => error!("skipping community {}: {e:#}", summary.url),
            }
            self.pause_between_requests();
        }

        info!("batch finished: {success_count}/{total} communities scraped");
        Ok(())
    }

    // Persistence failures never abort the traversal.
    fn persist(&self, scraped: &ScrapedCommunity) {
        if let Err(e) = self.storage.save_community(&scraped.record) {
            warn!("could not save record for {}: {e:#}", scraped.record.url);
        }
        if let Err(e) = self
            .storage
            .save_page_source(&scraped.record.url, &scraped.page_source)
        {
            warn!("could not save page source for {}: {e:#}", scraped.record.url);
        }
    }

    // Politeness jitter, uniform across the configured window.
    fn pause_between_requests(&self) {
        let min = self.config.min_request_delay_ms;
        let max = self.config.max_request_delay_ms.max(min);
        let pause = fastrand::u64(min..=max);
        if pause > 0 {
            std::thread::sleep(std::time::Duration::from_millis(pause));
        }
    }
}
