//! Request body types for API endpoints.

use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::photo_visibility::PhotoVariant;

/// Device location report.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Free-text country name as reported by the device.
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region_code: Option<String>,
}

impl LocationRequest {
    /// Coordinates must be finite WGS-84 degrees.
    pub fn coordinate_errors(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if !(self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude)) {
            errors.push("Latitude must be between -90 and 90");
        }
        if !(self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude)) {
            errors.push("Longitude must be between -180 and 180");
        }
        errors
    }
}

/// Region preference update; `null` clears the preference.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegionPreferenceRequest {
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoAccessRequest {
    pub photo_id: Uuid,
    #[serde(default)]
    pub variant: PhotoVariant,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVisibilityRequest {
    pub mode: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantRequest {
    pub viewer_id: Uuid,
    /// Omit for a grant that never expires.
    #[validate(range(min = 1, max = 8760, message = "Grant must last between 1 and 8760 hours"))]
    pub expires_in_hours: Option<i64>,
}
