//! Test data generation for discovery.
//!
//! This crate generates located profiles, photos with mixed visibility
//! modes, mutual matches and photo grants to support manual verification
//! of the discovery feed and photo access.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let config = SeedConfig::default();
//! let profiles = ProfileGenerator::new(config.areas.clone()).generate_batch(config.profile_count, &mut rng);
//! Seeder::new(pool).seed_profiles(&profiles).await?;
//! ```

pub mod config;
pub mod db;
pub mod generators;

// Re-export core types from the discovery crate
pub use discovery::{geo_region::GeoRegion, photo_visibility::VisibilityMode};

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{Area, BoundingBox, SeedConfig, WeightedArea};
    pub use crate::db::Seeder;
    pub use crate::generators::{
        GeneratedGrant, GeneratedMatch, GeneratedPhoto, GeneratedProfile, PhotoGenerator,
        ProfileGenerator, SocialGenerator,
    };
    pub use crate::{GeoRegion, VisibilityMode};
}
