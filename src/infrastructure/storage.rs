//! On-disk persistence for scrape output.
//!
//! Layout under the output root:
//! - `communities_links.json` — the discover stage's community summaries
//! - `json/<slug>.json`       — one canonical record per community
//! - `html/<slug>.html`       — mirrored raw page source per community
//!
//! Writes always overwrite: re-scraping a URL replaces its file wholesale.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

use crate::domain::records::{CommunityRecord, CommunitySummary};

pub struct OutputStorage {
    root: PathBuf,
    json_dir: PathBuf,
    html_dir: PathBuf,
}

impl OutputStorage {
    pub fn new(root: &Path) -> Result<Self> {
        let json_dir = root.join("json");
        let html_dir = root.join("html");
        for dir in [root, &json_dir, &html_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        }
        Ok(Self {
            root: root.to_path_buf(),
            json_dir,
            html_dir,
        })
    }

    /// Filename-safe identifier derived from the trailing path segment of a
    /// URL; bare hosts fall back to a fixed name.
    pub fn slug_for(url: &str) -> String {
        Url::parse(url)
            .ok()
            .and_then(|parsed| {
                parsed.path_segments().and_then(|segments| {
                    segments
                        .filter(|segment| !segment.is_empty())
                        .last()
                        .map(str::to_string)
                })
            })
            .unwrap_or_else(|| "community".to_string())
    }

    pub fn summaries_path(&self) -> PathBuf {
        self.root.join("communities_links.json")
    }

    pub fn save_summaries(&self, summaries: &[CommunitySummary]) -> Result<PathBuf> {
        let path = self.summaries_path();
        let payload = serde_json::to_string_pretty(summaries)
            .context("failed to serialize community summaries")?;
        std::fs::write(&path, payload)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("saved {} community summaries to {}", summaries.len(), path.display());
        Ok(path)
    }

    pub fn load_summaries(path: &Path) -> Result<Vec<CommunitySummary>> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summaries file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse summaries file {}", path.display()))
    }

    pub fn save_community(&self, record: &CommunityRecord) -> Result<PathBuf> {
        let path = self
            .json_dir
            .join(format!("{}.json", Self::slug_for(&record.url)));
        let payload =
            serde_json::to_string_pretty(record).context("failed to serialize community record")?;
        std::fs::write(&path, payload)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("saved community record to {}", path.display());
        Ok(path)
    }

    pub fn save_page_source(&self, url: &str, source: &str) -> Result<PathBuf> {
        let path = self.html_dir.join(format!("{}.html", Self::slug_for(url)));
        std::fs::write(&path, source)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("saved page source to {}", path.display());
        Ok(path)
    }
}
