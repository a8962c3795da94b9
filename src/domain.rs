//! Domain module - the typed records this scraper produces
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod records;

pub use records::{
    Amenity, CommunityDetails, CommunityRecord, CommunitySummary, GeoAddress, GeoLocation,
    HomePlan, Homesite, Location, PlanDetails,
};
