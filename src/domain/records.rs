//! Canonical record types for communities, home plans and homesites.
//!
//! Every record is always emitted in its full shape: optional fields default to
//! `null` (or an empty sequence) instead of being absent, so downstream
//! consumers never have to probe for missing keys. `url` is the stable identity
//! of a community or homesite; re-scraping the same URL replaces the previous
//! record wholesale.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One city entry from the site's location index. Seeds community discovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub state: String,
    pub name: String,
    pub url: String,
}

/// One community card from a city listing page. Work item for the detail
/// scrape stage, keyed by `url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommunitySummary {
    pub url: String,
    pub name: String,
    #[serde(rename = "location")]
    pub location_text: String,
    #[serde(rename = "price")]
    pub price_text: String,
    #[serde(rename = "details", default)]
    pub detail_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub community_type: String,
    #[serde(default)]
    pub home_type: String,
}

/// The canonical output unit: one fully-shaped community record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommunityRecord {
    pub timestamp: String,
    pub name: String,
    pub url: String,
    pub status: Option<String>,
    pub price_from: Option<String>,
    pub address: String,
    pub phone: String,
    pub description: String,
    pub images: Vec<String>,
    pub location: GeoLocation,
    pub details: CommunityDetails,
    pub amenities: Vec<Amenity>,
    pub homeplans: Vec<HomePlan>,
    pub homesites: Vec<Homesite>,
    pub nearbyplaces: Vec<serde_json::Value>,
}

impl CommunityRecord {
    /// An empty record for `url` with every key present and unpopulated.
    pub fn empty(url: &str) -> Self {
        Self {
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            name: String::new(),
            url: url.to_string(),
            status: None,
            price_from: None,
            address: String::new(),
            phone: String::new(),
            description: String::new(),
            images: Vec::new(),
            location: GeoLocation::default(),
            details: CommunityDetails::default(),
            amenities: Vec::new(),
            homeplans: Vec::new(),
            homesites: Vec::new(),
            nearbyplaces: Vec::new(),
        }
    }
}

/// Geographic coordinates plus the coarse address breakdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: GeoAddress,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeoAddress {
    pub city: Option<String>,
    pub state: Option<String>,
    pub market: Option<String>,
}

/// Aggregated range fields for a community.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommunityDetails {
    pub price_range: Option<String>,
    pub sqft_range: Option<String>,
    pub bed_range: Option<String>,
    pub bath_range: Option<String>,
    pub stories_range: String,
    pub community_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amenity {
    pub name: String,
    pub description: String,
    pub icon_url: String,
}

/// A home design offered in a community, extracted from the detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomePlan {
    pub name: String,
    pub url: String,
    pub details: PlanDetails,
    #[serde(rename = "includedFeatures", default)]
    pub included_features: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanDetails {
    pub price: String,
    pub beds: String,
    pub baths: String,
    pub sqft: String,
    pub status: String,
    pub image_url: String,
}

/// A move-in-ready homesite. Base fields come from the listing card; the
/// homesite's own detail page supplies coordinates, overview and extra images.
/// `beds` and `baths` follow a numeric-or-null contract: non-numeric card text
/// yields `None`, never a parse error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Homesite {
    pub name: Option<String>,
    pub plan: Option<String>,
    pub id: Option<String>,
    pub address: Option<String>,
    pub price: Option<String>,
    pub beds: Option<i64>,
    pub baths: Option<i64>,
    pub sqft: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub overview: Option<String>,
    pub images: Vec<String>,
}

impl Homesite {
    pub fn empty(url: &str) -> Self {
        Self {
            name: None,
            plan: None,
            id: None,
            address: None,
            price: None,
            beds: None,
            baths: None,
            sqft: None,
            status: None,
            image_url: None,
            url: url.to_string(),
            latitude: None,
            longitude: None,
            overview: None,
            images: Vec::new(),
        }
    }
}
