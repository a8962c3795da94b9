//! Embedded structured-metadata (JSON-LD) extraction.
//!
//! Listing pages embed several `application/ld+json` blocks describing the
//! residence, the sales organization and the page itself. Only the entity
//! kinds we care about are accepted; accepted blocks are merged into one
//! mapping with last-write-wins on key collisions. A malformed block never
//! prevents the others from contributing.

use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::debug;

/// Entity kinds whose blocks contribute to the merged mapping.
const ACCEPTED_TYPES: &[&str] = &[
    "SingleFamilyResidence",
    "Residence",
    "House",
    "WebPage",
    "Place",
    "Organization",
];

/// Scan `document` for structured-metadata blocks and merge the accepted ones.
pub fn extract(document: &Html) -> Map<String, Value> {
    let mut merged = Map::new();
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return merged;
    };

    for script in document.select(&selector) {
        let raw: String = script.text().collect();
        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                debug!("skipping malformed structured-data block: {e}");
                continue;
            }
        };
        let Value::Object(entry) = parsed else {
            continue;
        };
        if !is_accepted_kind(entry.get("@type")) {
            continue;
        }
        merged.extend(entry);
    }

    merged
}

// `@type` is a string on most pages but an array on some templates.
fn is_accepted_kind(kind: Option<&Value>) -> bool {
    match kind {
        Some(Value::String(name)) => ACCEPTED_TYPES.contains(&name.as_str()),
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| ACCEPTED_TYPES.contains(&name)),
        _ => false,
    }
}
