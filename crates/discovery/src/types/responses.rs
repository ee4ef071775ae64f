//! Response types for API endpoints.

use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    geo_region::GeoRegion,
    models::{Photo, Profile},
    photo_visibility::{PhotoVariant, VisibilityMode},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct RegionResponse {
    pub region: GeoRegion,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegionPreferenceResponse {
    pub region: Option<GeoRegion>,
}

/// Signed link to the delivered photo variant.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoAccessResponse {
    pub url: String,
    pub variant: PhotoVariant,
    /// Seconds until `url` stops working.
    pub expires_in: u64,
}

/// Profile card in the discovery feed.
#[derive(Debug, Serialize, ToSchema)]
pub struct DiscoveryProfile {
    pub id: Uuid,
    pub display_name: String,
    pub region: GeoRegion,
    pub country_name: Option<String>,
}

impl DiscoveryProfile {
    /// Card for `profile`, whose region the caller has already resolved.
    pub fn new(profile: Profile, region: GeoRegion) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name,
            region,
            country_name: profile.country_name,
        }
    }
}

/// Number of discoverable profiles per region.
#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RegionCounts {
    pub chechnya: usize,
    pub russia: usize,
    pub europe: usize,
    pub other: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PhotoSummary {
    pub id: Uuid,
    pub mode: VisibilityMode,
    pub created_at: OffsetDateTime,
}

impl From<Photo> for PhotoSummary {
    fn from(photo: Photo) -> Self {
        Self {
            id: photo.id,
            mode: photo.mode(),
            created_at: photo.created_at,
        }
    }
}
