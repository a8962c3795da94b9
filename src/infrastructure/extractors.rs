//! Per-field extraction rules over a rendered document.
//!
//! Every extractor is an isolated pure function: it returns `Option`/empty on
//! any miss and never panics, so one drifted selector degrades one field, not
//! the whole record. Several extractors are fallback chains — structural
//! selectors first, regex scans over the rendered text as a last resort. The
//! regex-based ones (price, phone, address) are best-effort heuristics by
//! design and should be read with that confidence level in mind.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

use crate::domain::records::{Amenity, CommunitySummary, HomePlan, Location, PlanDetails};

// Listing-card and index-page markers, taken from the site's generated class
// names. These drift between deployments; callers must tolerate empty results.
const STATE_SECTION: &str = "li.MetroGrid_metro_areas_states___Ox83";
const COMMUNITY_CARD: &str = "div.SearchProductCard_cardWrap__2CFt9";
const COMMUNITY_NAME: &str = "h2.SearchProductCard_card_header__F_ORx";
const COMMUNITY_LOCATION: &str = "div.SearchProductCard_location_description__7kNyd";
const COMMUNITY_PRICE: &str = "div.ProductPrice_product_price__VbtDE div";
const COMMUNITY_DETAIL_ITEM: &str = "li.SearchProductDetail_product_detail__q9eCj";
const COMMUNITY_TYPE: &str = "span.commTypes__js";
const HOME_TYPE: &str = "span.homeTypes__js";

const HOMESITE_CARD: &str = "div.modelCardWrap__adjust.ModelCard_modelCardContainer__lXz5R";
const HOMESITE_LINK: &str = "a.ModelCard_modelCardContainer__lXz5R";
const HOMESITE_IMAGE: &str = "img.BlurBackgroundFill_modelCardImg__fpCCc";
const HOMESITE_NAME: &str = "h4.ModelCard_modelName__XzUo2";
const HOMESITE_PRICE: &str = "p.ModelCard_modelPrice__oqOXq";
const HOMESITE_BEDS: &str = "p.tracking_bedRange";
const HOMESITE_BATHS: &str = "p.tracking_bathRange";
const HOMESITE_SQFT: &str = "p.tracking_sqftRange";
const HOMESITE_STATUS: &str = "div.ModelCard_modelCardCallout__MdHUW";

const GALLERY: &str = "#toScroll-gallery";
const DESCRIPTION_CHAIN: &[&str] = &[
    "p.CommunityOverview_overviewDescription__0bJS6",
    "p[class*='overviewDescription']",
    "div[class*='overviewDescription']",
];

static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)starting at \$[\d,]+").expect("valid price pattern"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{3}-\d{3}-\d{4}").expect("valid phone pattern"));
static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z][A-Za-z .'\-]*,\s*[A-Z]{2}\s+\d{5}").expect("valid address pattern")
});
static BED_BATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s*(?:bd|ba)\b").expect("valid bed/bath pattern"));
static SQFT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3}(?:,\d{3})*)\s*sqft").expect("valid sqft pattern"));
static PLAN_SPEC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\d,]+\s*(?:bd|ba|sqft)\b").expect("valid plan spec pattern"));

/// An intermediate homesite listing card; base fields only. The detail-page
/// fetch fills in the rest.
#[derive(Debug, Clone)]
pub struct HomesiteCard {
    pub url: String,
    pub name: Option<String>,
    pub price: Option<String>,
    pub beds_text: Option<String>,
    pub baths_text: Option<String>,
    pub sqft: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
}

/// "starting at $X" price line, scanned over the full rendered text.
pub fn price_from(document: &Html) -> Option<String> {
    let text = full_text(document);
    PRICE_RE.find(&text).map(|m| m.as_str().trim().to_string())
}

/// First NNN-NNN-NNNN phone number anywhere in the rendered text.
pub fn phone(document: &Html) -> Option<String> {
    let text = full_text(document);
    PHONE_RE.find(&text).map(|m| m.as_str().to_string())
}

/// Sales-office address. Structural elements first, then a "City, ST 12345"
/// pattern scan over the full text.
pub fn street_address(document: &Html) -> Option<String> {
    for element in select(document, "address, [class*='address']") {
        let text = element_text(&element);
        if ADDRESS_RE.is_match(&text) {
            return Some(text);
        }
    }
    let text = full_text(document);
    ADDRESS_RE.find(&text).map(|m| m.as_str().to_string())
}

/// The curated community overview copy, preferred over structured metadata.
pub fn description(document: &Html) -> Option<String> {
    for css in DESCRIPTION_CHAIN {
        if let Some(element) = select(document, css).into_iter().next() {
            let text = element_text(&element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// "N bd" range over all home designs on the page, formatted `min - max`.
pub fn bed_range(document: &Html) -> Option<String> {
    range_label(spec_fragments(document, "bd"))
}

/// "N ba" range over all home designs on the page, formatted `min - max`.
pub fn bath_range(document: &Html) -> Option<String> {
    range_label(spec_fragments(document, "ba"))
}

/// Square-footage range over all home designs, thousands separators
/// normalized away before the numeric min/max comparison.
pub fn sqft_range(document: &Html) -> Option<String> {
    let mut values: Vec<u64> = Vec::new();
    for section in home_design_sections(document) {
        let text = element_text(&section);
        for capture in SQFT_RE.captures_iter(&text) {
            if let Some(value) = parse_sqft(&capture[1]) {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
    }
    let min = values.iter().min()?;
    let max = values.iter().max()?;
    Some(format!(
        "{} - {}",
        format_thousands(*min),
        format_thousands(*max)
    ))
}

/// Community amenity tiles: name, optional description, optional icon.
pub fn amenities(document: &Html) -> Vec<Amenity> {
    let Some(section) = select(document, "section")
        .into_iter()
        .find(is_amenities_section)
    else {
        return Vec::new();
    };

    let mut amenities = Vec::new();
    let items: Vec<ElementRef<'_>> = select_within(&section, "div")
        .into_iter()
        .filter(|div| {
            div.value()
                .classes()
                .any(|class| class.to_ascii_lowercase().contains("amenity"))
        })
        .collect();
    for item in items {
        let Some(name) = select_within(&item, "h3")
            .into_iter()
            .next()
            .map(|h| element_text(&h))
            .filter(|t| !t.is_empty())
        else {
            continue;
        };
        let description = select_within(&item, "p")
            .into_iter()
            .next()
            .map(|p| element_text(&p))
            .unwrap_or_default();
        let icon_url = select_within(&item, "img")
            .into_iter()
            .find_map(|img| img.value().attr("src"))
            .filter(|src| !src.starts_with("data:"))
            .unwrap_or_default()
            .to_string();
        amenities.push(Amenity {
            name,
            description,
            icon_url,
        });
    }
    amenities
}

/// Home designs offered in the community, from the detail page only.
pub fn home_plans(document: &Html, base_url: &str) -> Vec<HomePlan> {
    let mut plans = Vec::new();
    for section in home_design_sections(document) {
        let Some(name) = select_within(&section, "h3")
            .into_iter()
            .next()
            .map(|h| element_text(&h))
            .filter(|t| !t.is_empty())
        else {
            continue;
        };

        let text = element_text(&section);
        let fragments: Vec<String> = PLAN_SPEC_RE
            .find_iter(&text)
            .map(|m| m.as_str().trim().to_string())
            .collect();
        if fragments.is_empty() {
            continue;
        }

        let pick = |suffix: &str| {
            fragments
                .iter()
                .find(|f| f.ends_with(suffix))
                .cloned()
                .unwrap_or_default()
        };
        let url = select_within(&section, "a")
            .into_iter()
            .find_map(|a| a.value().attr("href"))
            .map(|href| resolve_url(base_url, href))
            .unwrap_or_default();
        let image_url = select_within(&section, "img")
            .into_iter()
            .find_map(|img| img.value().attr("src"))
            .filter(|src| !src.starts_with("data:"))
            .unwrap_or_default()
            .to_string();

        plans.push(HomePlan {
            name,
            url,
            details: PlanDetails {
                price: String::new(),
                beds: pick("bd"),
                baths: pick("ba"),
                sqft: pick("sqft"),
                status: String::new(),
                image_url,
            },
            included_features: Vec::new(),
        });
    }
    plans
}

/// Images from the bounded gallery container, inlined data URLs excluded.
pub fn gallery_images(document: &Html) -> Vec<String> {
    let Some(gallery) = select(document, GALLERY).into_iter().next() else {
        return Vec::new();
    };
    let mut images = Vec::new();
    for img in select_within(&gallery, "img") {
        if let Some(src) = img.value().attr("src") {
            if !src.starts_with("data:") && !images.iter().any(|existing| existing == src) {
                images.push(src.to_string());
            }
        }
    }
    images
}

/// Whole-document image scan used when the gallery is absent or sparse on a
/// detail page. Appends to `images` in discovery order, de-duplicating.
pub fn extend_with_document_images(document: &Html, images: &mut Vec<String>) {
    for img in select(document, "img") {
        if let Some(src) = img.value().attr("src") {
            if !src.starts_with("data:") && !images.iter().any(|existing| existing == src) {
                images.push(src.to_string());
            }
        }
    }
}

/// Quick move-in homesite cards on a community detail page.
pub fn homesite_cards(document: &Html, base_url: &str) -> Vec<HomesiteCard> {
    let cards = select(document, HOMESITE_CARD);
    debug!("found {} homesite cards", cards.len());

    let mut results = Vec::new();
    for card in cards {
        let href = select_within(&card, HOMESITE_LINK)
            .into_iter()
            .find_map(|a| a.value().attr("href").map(str::to_string))
            .or_else(|| {
                select_within(&card, "a")
                    .into_iter()
                    .find_map(|a| a.value().attr("href").map(str::to_string))
            });
        let Some(href) = href else {
            warn!("homesite card without a link, skipping");
            continue;
        };

        results.push(HomesiteCard {
            url: resolve_url(base_url, &href),
            name: text_of(&card, HOMESITE_NAME),
            price: text_of(&card, HOMESITE_PRICE),
            beds_text: text_of(&card, HOMESITE_BEDS),
            baths_text: text_of(&card, HOMESITE_BATHS),
            sqft: text_of(&card, HOMESITE_SQFT).map(|t| t.replace(',', "")),
            status: text_of(&card, HOMESITE_STATUS),
            image_url: select_within(&card, HOMESITE_IMAGE)
                .into_iter()
                .find_map(|img| img.value().attr("src").map(str::to_string)),
        });
    }
    results
}

/// Community summary cards on a city listing page.
pub fn community_cards(document: &Html, base_url: &str) -> Vec<CommunitySummary> {
    let mut summaries = Vec::new();
    for card in select(document, COMMUNITY_CARD) {
        let Some(href) = select_within(&card, "a")
            .into_iter()
            .find_map(|a| a.value().attr("href"))
        else {
            continue;
        };

        let mut detail_fields = BTreeMap::new();
        for item in select_within(&card, COMMUNITY_DETAIL_ITEM) {
            let Some(value) = text_of(&item, "span.detail") else {
                continue;
            };
            let Some(label) = select_within(&item, "img")
                .into_iter()
                .find_map(|img| img.value().attr("alt"))
            else {
                continue;
            };
            let label = label.to_lowercase().replace(" icon", "");
            detail_fields.insert(label, value);
        }

        summaries.push(CommunitySummary {
            url: resolve_url(base_url, href),
            name: text_of(&card, COMMUNITY_NAME).unwrap_or_default(),
            location_text: text_of(&card, COMMUNITY_LOCATION).unwrap_or_default(),
            price_text: text_of(&card, COMMUNITY_PRICE).unwrap_or_default(),
            detail_fields,
            community_type: text_of(&card, COMMUNITY_TYPE).unwrap_or_default(),
            home_type: text_of(&card, HOME_TYPE).unwrap_or_default(),
        });
    }
    summaries
}

/// State sections with their city links, from the site's location index.
pub fn location_index(document: &Html, base_url: &str) -> Vec<Location> {
    let mut locations = Vec::new();
    for section in select(document, STATE_SECTION) {
        let state = text_of(&section, "h3").unwrap_or_default();
        for link in select_within(&section, "a") {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            locations.push(Location {
                state: state.clone(),
                name: element_text(&link),
                url: resolve_url(base_url, href),
            });
        }
    }
    locations
}

/// First top-level heading; used as the plan name on homesite detail pages.
pub fn first_heading(document: &Html) -> Option<String> {
    select(document, "h1, h2, h3")
        .into_iter()
        .map(|h| element_text(&h))
        .find(|t| !t.is_empty())
}

/// Numeric-or-null parse for homesite bed/bath counts.
pub fn parse_count(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// `"1,250"` and `"1250"` normalize to the same integer.
pub fn parse_sqft(text: &str) -> Option<u64> {
    text.trim().replace(',', "").parse().ok()
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Resolve `href` against the site base, tolerating already-absolute links.
pub fn resolve_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|joined| joined.to_string())
        .unwrap_or_else(|_| format!("{base_url}{href}"))
}

// -- internals --------------------------------------------------------------

fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn select_within<'a>(scope: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn text_of(scope: &ElementRef<'_>, css: &str) -> Option<String> {
    select_within(scope, css)
        .into_iter()
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn full_text(document: &Html) -> String {
    element_text(&document.root_element())
}

// Home-design sections carry generated class names; match on the stable
// "home-design" fragment, case-insensitively.
fn home_design_sections(document: &Html) -> Vec<ElementRef<'_>> {
    select(document, "div")
        .into_iter()
        .filter(|div| {
            div.value()
                .classes()
                .any(|class| class.to_ascii_lowercase().contains("home-design"))
        })
        .collect()
}

fn is_amenities_section(section: &ElementRef<'_>) -> bool {
    let has_marker_class = section
        .value()
        .classes()
        .any(|class| class.to_ascii_lowercase().contains("amenit"));
    has_marker_class || element_text(section).contains("Elevate the Everyday")
}

fn spec_fragments(document: &Html, suffix: &str) -> Vec<String> {
    let mut fragments: Vec<String> = Vec::new();
    for section in home_design_sections(document) {
        let text = element_text(&section);
        for found in BED_BATH_RE.find_iter(&text) {
            let fragment = found.as_str().trim().to_string();
            if fragment.ends_with(suffix) && !fragments.contains(&fragment) {
                fragments.push(fragment);
            }
        }
    }
    fragments
}

// Order by the leading integer of each fragment so "10 bd" sorts after
// "9 bd"; the result is independent of scan order.
fn range_label(fragments: Vec<String>) -> Option<String> {
    fn sort_key(fragment: &str) -> (u64, String) {
        let numeric: String = fragment.chars().take_while(|c| c.is_ascii_digit()).collect();
        (numeric.parse().unwrap_or(0), fragment.to_string())
    }
    let min = fragments.iter().min_by_key(|f| sort_key(f))?;
    let max = fragments.iter().max_by_key(|f| sort_key(f))?;
    Some(format!("{min} - {max}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    const EMPTY: &str = "<p>nothing to see</p>";

    #[test]
    fn every_extractor_is_null_safe_on_a_bare_document() {
        let document = doc(EMPTY);
        assert_eq!(price_from(&document), None);
        assert_eq!(phone(&document), None);
        assert_eq!(street_address(&document), None);
        assert_eq!(description(&document), None);
        assert_eq!(bed_range(&document), None);
        assert_eq!(bath_range(&document), None);
        assert_eq!(sqft_range(&document), None);
        assert!(amenities(&document).is_empty());
        assert!(home_plans(&document, "https://example.com").is_empty());
        assert!(gallery_images(&document).is_empty());
        assert!(homesite_cards(&document, "https://example.com").is_empty());
        assert!(community_cards(&document, "https://example.com").is_empty());
        assert!(location_index(&document, "https://example.com").is_empty());
    }

    #[test]
    fn price_and_phone_come_from_text_scans() {
        let document = doc(
            "<div>Homes starting at $499,995</div>\
             <footer>Call 480-555-0123 today</footer>",
        );
        assert_eq!(price_from(&document).unwrap(), "starting at $499,995");
        assert_eq!(phone(&document).unwrap(), "480-555-0123");
    }

    #[test]
    fn address_prefers_structural_elements() {
        let document = doc(
            "<div class='SalesCenter_address__9dK'>18112 W Montecito Ave, Goodyear, AZ 85395</div>\
             <p>Visit us in Goodyear, AZ 85395 or online</p>",
        );
        assert_eq!(
            street_address(&document).unwrap(),
            "18112 W Montecito Ave, Goodyear, AZ 85395"
        );
    }

    #[test]
    fn address_falls_back_to_a_text_scan() {
        let document = doc("<p>Our newest community is in Goodyear, AZ 85395 near the park.</p>");
        assert_eq!(street_address(&document).unwrap(), "Goodyear, AZ 85395");
    }

    fn designs(specs: &[&str]) -> String {
        specs
            .iter()
            .map(|s| format!("<div class='Community_home-design__x1'><h3>Plan</h3><p>{s}</p></div>"))
            .collect()
    }

    #[test]
    fn bed_range_is_commutative_over_scan_order() {
        let forward = doc(&designs(&["3 bd", "5 bd", "4 bd"]));
        let reversed = doc(&designs(&["4 bd", "5 bd", "3 bd"]));
        assert_eq!(bed_range(&forward).unwrap(), "3 bd - 5 bd");
        assert_eq!(bed_range(&forward), bed_range(&reversed));
    }

    #[test]
    fn bed_and_bath_fragments_do_not_cross_contaminate() {
        let document = doc(&designs(&["3 bd 2 ba", "5 bd 4 ba"]));
        assert_eq!(bed_range(&document).unwrap(), "3 bd - 5 bd");
        assert_eq!(bath_range(&document).unwrap(), "2 ba - 4 ba");
    }

    #[test]
    fn sqft_normalization_ignores_thousands_separators() {
        assert_eq!(parse_sqft("1,250"), Some(1250));
        assert_eq!(parse_sqft("1250"), Some(1250));

        let document = doc(&designs(&["1,250 sqft", "980 sqft", "2,840 sqft"]));
        assert_eq!(sqft_range(&document).unwrap(), "980 - 2,840");
    }

    #[test]
    fn sqft_comparison_is_numeric_not_lexicographic() {
        // "980" > "2,840" as strings; numerically it is the minimum.
        let document = doc(&designs(&["980 sqft", "2,840 sqft"]));
        assert_eq!(sqft_range(&document).unwrap(), "980 - 2,840");
    }

    #[test]
    fn gallery_images_exclude_data_urls() {
        let document = doc(
            "<div id='toScroll-gallery'>\
             <img src='https://cdn.example.com/a.jpg'>\
             <img src='data:image/png;base64,xyz'>\
             <img src='https://cdn.example.com/b.jpg'>\
             </div>\
             <img src='https://cdn.example.com/elsewhere.jpg'>",
        );
        assert_eq!(
            gallery_images(&document),
            vec![
                "https://cdn.example.com/a.jpg".to_string(),
                "https://cdn.example.com/b.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn document_scan_deduplicates_preserving_discovery_order() {
        let document = doc(
            "<img src='https://cdn.example.com/b.jpg'>\
             <img src='https://cdn.example.com/c.jpg'>",
        );
        let mut images = vec![
            "https://cdn.example.com/a.jpg".to_string(),
            "https://cdn.example.com/b.jpg".to_string(),
        ];
        extend_with_document_images(&document, &mut images);
        assert_eq!(
            images,
            vec![
                "https://cdn.example.com/a.jpg".to_string(),
                "https://cdn.example.com/b.jpg".to_string(),
                "https://cdn.example.com/c.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn homesite_cards_collect_base_fields_and_resolve_links() {
        let document = doc(
            "<div class='modelCardWrap__adjust ModelCard_modelCardContainer__lXz5R'>\
               <a class='ModelCard_modelCardContainer__lXz5R' href='/luxury-homes/az/avalon/lot42'></a>\
               <img class='BlurBackgroundFill_modelCardImg__fpCCc' src='https://cdn.example.com/lot42.jpg'>\
               <h4 class='ModelCard_modelName__XzUo2'>Lot 42</h4>\
               <p class='ModelCard_modelPrice__oqOXq'>$612,995</p>\
               <p class='tracking_bedRange'>4</p>\
               <p class='tracking_bathRange'>3</p>\
               <p class='tracking_sqftRange'>2,450</p>\
               <div class='ModelCard_modelCardCallout__MdHUW'>Move-In Ready</div>\
             </div>",
        );
        let cards = homesite_cards(&document, "https://www.tollbrothers.com");
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.url, "https://www.tollbrothers.com/luxury-homes/az/avalon/lot42");
        assert_eq!(card.name.as_deref(), Some("Lot 42"));
        assert_eq!(card.sqft.as_deref(), Some("2450"));
        assert_eq!(card.status.as_deref(), Some("Move-In Ready"));
    }

    #[test]
    fn cards_without_links_are_skipped_not_fatal() {
        let document = doc(
            "<div class='modelCardWrap__adjust ModelCard_modelCardContainer__lXz5R'>\
               <h4 class='ModelCard_modelName__XzUo2'>Orphan</h4>\
             </div>",
        );
        assert!(homesite_cards(&document, "https://example.com").is_empty());
    }

    #[test]
    fn community_cards_capture_labelled_detail_fields() {
        let document = doc(
            "<div class='SearchProductCard_cardWrap__2CFt9'>\
               <a href='/luxury-homes/az/avalon'></a>\
               <h2 class='SearchProductCard_card_header__F_ORx'>Avalon Estates</h2>\
               <div class='SearchProductCard_location_description__7kNyd'>Goodyear, AZ</div>\
               <div class='ProductPrice_product_price__VbtDE'><div>From $499,995</div></div>\
               <ul><li class='SearchProductDetail_product_detail__q9eCj'>\
                 <img alt='Bed Icon'><span class='detail'>3 - 5</span>\
               </li></ul>\
               <span class='commTypes__js'>Single Family</span>\
               <span class='homeTypes__js'>Detached</span>\
             </div>",
        );
        let cards = community_cards(&document, "https://www.tollbrothers.com");
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.name, "Avalon Estates");
        assert_eq!(card.url, "https://www.tollbrothers.com/luxury-homes/az/avalon");
        assert_eq!(card.price_text, "From $499,995");
        assert_eq!(card.detail_fields.get("bed").map(String::as_str), Some("3 - 5"));
        assert_eq!(card.community_type, "Single Family");
    }

    #[test]
    fn location_index_pairs_states_with_their_cities() {
        let document = doc(
            "<ul>\
             <li class='MetroGrid_metro_areas_states___Ox83'>\
               <h3>Arizona</h3>\
               <a href='/locations/az/phoenix'>Phoenix</a>\
               <a href='/locations/az/tucson'>Tucson</a>\
             </li>\
             <li class='MetroGrid_metro_areas_states___Ox83'>\
               <h3>Texas</h3>\
               <a href='/locations/tx/austin'>Austin</a>\
             </li>\
             </ul>",
        );
        let locations = location_index(&document, "https://www.tollbrothers.com");
        assert_eq!(locations.len(), 3);
        assert_eq!(locations[0].state, "Arizona");
        assert_eq!(locations[0].name, "Phoenix");
        assert_eq!(locations[2].state, "Texas");
        assert_eq!(locations[2].url, "https://www.tollbrothers.com/locations/tx/austin");
    }

    #[test]
    fn count_parsing_is_numeric_or_null() {
        assert_eq!(parse_count("4"), Some(4));
        assert_eq!(parse_count(" 3 "), Some(3));
        assert_eq!(parse_count("3.5"), None);
        assert_eq!(parse_count("4 bd"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn thousands_formatting() {
        assert_eq!(format_thousands(980), "980");
        assert_eq!(format_thousands(2840), "2,840");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn amenities_are_scoped_to_their_section() {
        let document = doc(
            "<section class='CommunityAmenities_wrap'>\
               <h2>Elevate the Everyday</h2>\
               <div class='Amenity_tile'><h3>Resort Pool</h3><p>Heated year-round</p></div>\
               <div class='Amenity_tile'><h3>Clubhouse</h3></div>\
             </section>",
        );
        let found = amenities(&document);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Resort Pool");
        assert_eq!(found[0].description, "Heated year-round");
        assert_eq!(found[1].description, "");
    }

    #[test]
    fn home_plans_pick_one_fragment_per_spec() {
        let document = doc(
            "<div class='home-design'>\
               <h3>The Madison</h3>\
               <a href='/plans/madison'></a>\
               <p>4 bd</p><p>3 ba</p><p>2,450 sqft</p>\
             </div>",
        );
        let plans = home_plans(&document, "https://www.tollbrothers.com");
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name, "The Madison");
        assert_eq!(plans[0].url, "https://www.tollbrothers.com/plans/madison");
        assert_eq!(plans[0].details.beds, "4 bd");
        assert_eq!(plans[0].details.baths, "3 ba");
        assert_eq!(plans[0].details.sqft, "2,450 sqft");
    }
}
