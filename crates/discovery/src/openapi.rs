//! OpenAPI document for the discovery API.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    geo_region::{GeoRegion, RegionInput},
    handlers::{discovery, location, photos, preferences, stats},
    models::PhotoGrant,
    photo_visibility::{PhotoVariant, VisibilityMode},
    types::{
        DiscoveryProfile, GrantRequest, LocationRequest, PhotoAccessRequest, PhotoAccessResponse,
        PhotoSummary, RegionCounts, RegionPreferenceRequest, RegionPreferenceResponse,
        RegionResponse, UpdateVisibilityRequest,
    },
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Discovery API", description = "Discovery regions and photo visibility"),
    paths(
        stats::health_check,
        location::update_location,
        location::get_my_region,
        preferences::get_region_preference,
        preferences::set_region_preference,
        discovery::get_discovery_feed,
        discovery::get_region_counts,
        photos::access_photo,
        photos::list_my_photos,
        photos::update_photo_visibility,
        photos::grant_photo_access,
        photos::revoke_photo_access,
    ),
    components(schemas(
        GeoRegion,
        RegionInput,
        VisibilityMode,
        PhotoVariant,
        PhotoGrant,
        LocationRequest,
        RegionResponse,
        RegionPreferenceRequest,
        RegionPreferenceResponse,
        DiscoveryProfile,
        RegionCounts,
        PhotoAccessRequest,
        PhotoAccessResponse,
        PhotoSummary,
        UpdateVisibilityRequest,
        GrantRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "location", description = "Device location and derived region"),
        (name = "preferences", description = "Discovery preferences"),
        (name = "discovery", description = "Discovery feed"),
        (name = "photos", description = "Photo visibility and signed links"),
        (name = "stats", description = "Health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
