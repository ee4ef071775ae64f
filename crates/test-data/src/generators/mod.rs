//! Entity generators for test data.
//!
//! - [`ProfileGenerator`]: profiles scattered around weighted seed areas
//! - [`PhotoGenerator`]: photos with mixed visibility modes
//! - [`SocialGenerator`]: mutual matches and photo grants

pub mod photo;
pub mod profile;
pub mod social;

pub use photo::{GeneratedPhoto, PhotoGenConfig, PhotoGenerator};
pub use profile::{GeneratedProfile, ProfileGenerator};
pub use social::{GeneratedGrant, GeneratedMatch, SocialGenConfig, SocialGenerator};
