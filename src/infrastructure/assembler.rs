//! Merges structured metadata and DOM-derived field values into canonical
//! records.
//!
//! Precedence per field group: structured-metadata value, then the DOM-derived
//! value, then null. The one exception is the description, where the curated
//! DOM copy is richer than the metadata blurb and wins when both exist. The
//! assembled record always carries the full shape: a failed field contributes
//! `None`/empty, never a missing key.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde_json::{Map, Value};

use crate::domain::records::{CommunityRecord, GeoAddress, GeoLocation, Homesite};
use crate::infrastructure::extractors::{self, HomesiteCard};

static URL_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\w+)$").expect("valid url tail pattern"));

/// Build the canonical community record for `url` from its detail page.
/// `homesites` were collected by the orchestrator's two-stage fetch.
pub fn assemble_community(
    url: &str,
    structured: &Map<String, Value>,
    document: &Html,
    homesites: Vec<Homesite>,
) -> CommunityRecord {
    let mut record = CommunityRecord::empty(url);

    record.name = string_field(structured, "name").unwrap_or_default();
    record.address = structured_address(structured)
        .or_else(|| extractors::street_address(document))
        .unwrap_or_default();
    record.phone = string_field(structured, "telephone")
        .or_else(|| extractors::phone(document))
        .unwrap_or_default();

    // Curated overview copy beats the metadata blurb.
    record.description = extractors::description(document)
        .or_else(|| string_field(structured, "description"))
        .unwrap_or_default();

    let price = string_field(structured, "priceRange")
        .or_else(|| {
            structured
                .get("offers")
                .and_then(|offers| offers.get("price"))
                .and_then(value_as_string)
        })
        .or_else(|| extractors::price_from(document));
    record.price_from = price.clone();

    record.location = geo_location(structured);

    record.images = structured_images(structured);
    if record.images.is_empty() {
        record.images = extractors::gallery_images(document);
    }

    record.details.price_range = price;
    record.details.sqft_range = extractors::sqft_range(document);
    record.details.bed_range = extractors::bed_range(document);
    record.details.bath_range = extractors::bath_range(document);

    record.amenities = extractors::amenities(document);
    record.homeplans = extractors::home_plans(document, url);
    record.homesites = homesites;

    record
}

/// Build a homesite record from its listing card, enriched with the detail
/// page when the secondary fetch succeeded.
pub fn assemble_homesite(
    card: &HomesiteCard,
    detail: Option<(&Map<String, Value>, &Html)>,
) -> Homesite {
    let mut homesite = Homesite::empty(&card.url);
    homesite.name = card.name.clone();
    homesite.price = card.price.clone();
    homesite.beds = card.beds_text.as_deref().and_then(extractors::parse_count);
    homesite.baths = card.baths_text.as_deref().and_then(extractors::parse_count);
    homesite.sqft = card.sqft.clone();
    homesite.status = card.status.clone();

    let mut images: Vec<String> = card.image_url.iter().cloned().collect();

    if let Some((structured, document)) = detail {
        if let Some(geo) = structured.get("geo").and_then(Value::as_object) {
            homesite.latitude = geo.get("latitude").and_then(value_as_f64);
            homesite.longitude = geo.get("longitude").and_then(value_as_f64);
        }
        homesite.overview = string_field(structured, "description");
        homesite.address = structured_address(structured);
        homesite.id = string_field(structured, "url")
            .as_deref()
            .and_then(trailing_path_segment);
        homesite.plan = extractors::first_heading(document);

        let structured_imgs = structured_images(structured);
        if !structured_imgs.is_empty() {
            images = structured_imgs;
        }
        // Sparse image set on a detail page: widen to a whole-document scan.
        if images.len() < 2 {
            extractors::extend_with_document_images(document, &mut images);
        }
    }

    homesite.image_url = images.first().cloned();
    homesite.images = images;
    homesite
}

/// The trailing path segment of a canonical URL, used as the homesite id.
pub fn trailing_path_segment(url: &str) -> Option<String> {
    URL_TAIL_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn string_field(structured: &Map<String, Value>, key: &str) -> Option<String> {
    structured.get(key).and_then(value_as_string)
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Coordinates appear both as numbers and as strings in the wild.
fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// "street, locality, region postal", empty components elided.
fn structured_address(structured: &Map<String, Value>) -> Option<String> {
    let address = structured.get("address")?.as_object()?;
    let part = |key: &str| {
        address
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    let street = part("streetAddress");
    let locality = part("addressLocality");
    let region_zip = format!("{} {}", part("addressRegion"), part("postalCode"))
        .trim()
        .to_string();

    let joined = [street, locality, region_zip]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

fn geo_location(structured: &Map<String, Value>) -> GeoLocation {
    let geo = structured.get("geo").and_then(Value::as_object);
    let address = structured.get("address").and_then(Value::as_object);
    GeoLocation {
        latitude: geo.and_then(|g| g.get("latitude")).and_then(value_as_f64),
        longitude: geo.and_then(|g| g.get("longitude")).and_then(value_as_f64),
        address: GeoAddress {
            city: address
                .and_then(|a| a.get("addressLocality"))
                .and_then(value_as_string),
            state: address
                .and_then(|a| a.get("addressRegion"))
                .and_then(value_as_string),
            market: None,
        },
    }
}

// `image` may be a single URL or a list of them.
fn structured_images(structured: &Map<String, Value>) -> Vec<String> {
    match structured.get("image") {
        Some(Value::String(src)) if !src.is_empty() => vec![src.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn dom(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    #[test]
    fn structured_name_wins_over_dom_heading() {
        let metadata = structured(json!({"name": "Avalon Estates"}));
        let document = dom("<h1>Avalon</h1>");
        let record = assemble_community(
            "https://example.com/az/avalon",
            &metadata,
            &document,
            Vec::new(),
        );
        assert_eq!(record.name, "Avalon Estates");
    }

    #[test]
    fn description_prefers_the_curated_dom_copy() {
        let metadata = structured(json!({"description": "Short metadata blurb"}));
        let document = dom(
            "<p class='CommunityOverview_overviewDescription__0bJS6'>\
             Located in an amenity-rich master-planned community.</p>",
        );
        let record =
            assemble_community("https://example.com/c", &metadata, &document, Vec::new());
        assert_eq!(
            record.description,
            "Located in an amenity-rich master-planned community."
        );
    }

    #[test]
    fn description_falls_back_to_metadata() {
        let metadata = structured(json!({"description": "Short metadata blurb"}));
        let record = assemble_community(
            "https://example.com/c",
            &metadata,
            &dom("<p>unrelated</p>"),
            Vec::new(),
        );
        assert_eq!(record.description, "Short metadata blurb");
    }

    #[test]
    fn price_falls_through_price_range_offers_then_dom() {
        let document = dom("<div>starting at $499,995</div>");

        let from_range = structured(json!({"priceRange": "$499,995+"}));
        assert_eq!(
            assemble_community("u", &from_range, &document, Vec::new()).price_from,
            Some("$499,995+".to_string())
        );

        let from_offers = structured(json!({"offers": {"price": 499995}}));
        assert_eq!(
            assemble_community("u", &from_offers, &document, Vec::new()).price_from,
            Some("499995".to_string())
        );

        let empty = Map::new();
        assert_eq!(
            assemble_community("u", &empty, &document, Vec::new()).price_from,
            Some("starting at $499,995".to_string())
        );
    }

    #[test]
    fn geo_accepts_numbers_and_strings() {
        let metadata = structured(json!({
            "geo": {"latitude": "33.4484", "longitude": -112.074},
            "address": {"addressLocality": "Goodyear", "addressRegion": "AZ"}
        }));
        let record =
            assemble_community("u", &metadata, &dom("<p></p>"), Vec::new());
        assert_eq!(record.location.latitude, Some(33.4484));
        assert_eq!(record.location.longitude, Some(-112.074));
        assert_eq!(record.location.address.city.as_deref(), Some("Goodyear"));
        assert_eq!(record.location.address.market, None);
    }

    #[test]
    fn structured_images_win_over_the_gallery() {
        let metadata = structured(json!({"image": ["https://cdn.example.com/hero.jpg"]}));
        let document = dom(
            "<div id='toScroll-gallery'><img src='https://cdn.example.com/g1.jpg'></div>",
        );
        let record = assemble_community("u", &metadata, &document, Vec::new());
        assert_eq!(record.images, vec!["https://cdn.example.com/hero.jpg".to_string()]);

        let record = assemble_community("u", &Map::new(), &document, Vec::new());
        assert_eq!(record.images, vec!["https://cdn.example.com/g1.jpg".to_string()]);
    }

    #[test]
    fn homesite_id_comes_from_the_canonical_url_tail() {
        assert_eq!(
            trailing_path_segment("https://example.com/az/avalon/lot42"),
            Some("lot42".to_string())
        );
        assert_eq!(trailing_path_segment("https://example.com/az/lot-42/"), None);
    }

    fn card() -> HomesiteCard {
        HomesiteCard {
            url: "https://example.com/az/avalon/lot42".to_string(),
            name: Some("Lot 42".to_string()),
            price: Some("$612,995".to_string()),
            beds_text: Some("4".to_string()),
            baths_text: Some("three".to_string()),
            sqft: Some("2450".to_string()),
            status: Some("Move-In Ready".to_string()),
            image_url: Some("https://cdn.example.com/card.jpg".to_string()),
        }
    }

    #[test]
    fn homesite_counts_follow_the_numeric_or_null_contract() {
        let homesite = assemble_homesite(&card(), None);
        assert_eq!(homesite.beds, Some(4));
        assert_eq!(homesite.baths, None);
        assert_eq!(homesite.image_url.as_deref(), Some("https://cdn.example.com/card.jpg"));
        assert_eq!(homesite.images.len(), 1);
        assert_eq!(homesite.latitude, None);
        assert_eq!(homesite.overview, None);
    }

    #[test]
    fn homesite_detail_page_supplies_geo_plan_and_extra_images() {
        let metadata = structured(json!({
            "geo": {"latitude": 33.45, "longitude": -112.07},
            "description": "Corner homesite with mountain views.",
            "url": "https://example.com/az/avalon/lot42",
            "address": {
                "streetAddress": "123 Vista Way",
                "addressLocality": "Goodyear",
                "addressRegion": "AZ",
                "postalCode": "85395"
            }
        }));
        let document = dom(
            "<h2>The Madison</h2>\
             <img src='https://cdn.example.com/d1.jpg'>\
             <img src='https://cdn.example.com/card.jpg'>",
        );
        let homesite = assemble_homesite(&card(), Some((&metadata, &document)));

        assert_eq!(homesite.latitude, Some(33.45));
        assert_eq!(homesite.overview.as_deref(), Some("Corner homesite with mountain views."));
        assert_eq!(homesite.id.as_deref(), Some("lot42"));
        assert_eq!(homesite.plan.as_deref(), Some("The Madison"));
        assert_eq!(homesite.address.as_deref(), Some("123 Vista Way, Goodyear, AZ 85395"));
        // Card image first, then detail-page discoveries, no duplicate.
        assert_eq!(
            homesite.images,
            vec![
                "https://cdn.example.com/card.jpg".to_string(),
                "https://cdn.example.com/d1.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn assembled_record_never_drops_keys_on_total_extraction_failure() {
        let record = assemble_community("https://example.com/c", &Map::new(), &dom(""), Vec::new());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 15);
        assert_eq!(record.name, "");
        assert_eq!(record.price_from, None);
        assert!(record.images.is_empty());
    }
}
