//! HTTP request handlers for the discovery API.
//!
//! This module re-exports handlers from focused submodules organized by domain.

// Utility submodules
pub mod pagination;

// Handler modules
pub mod discovery;
pub mod location;
pub mod photos;
pub mod preferences;
pub mod stats;

pub use discovery::{get_discovery_feed, get_region_counts};
pub use location::{get_my_region, update_location};
pub use photos::{
    PhotoSettings, access_photo, grant_photo_access, list_my_photos, revoke_photo_access,
    update_photo_visibility,
};
pub use preferences::{get_region_preference, set_region_preference};
pub use stats::health_check;
