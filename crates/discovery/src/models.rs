use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    geo_region::{GeoRegion, RegionInput, resolve_geo_region},
    photo_visibility::{PhotoVariant, VisibilityMode},
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
    pub region_code: Option<String>,
    /// Raw stored preference; read through [`Profile::region_preference`].
    #[serde(skip)]
    pub region_preference: Option<String>,
    pub location_updated_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl Profile {
    pub fn new(display_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name,
            latitude: None,
            longitude: None,
            country_name: None,
            country_code: None,
            region_code: None,
            region_preference: None,
            location_updated_at: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn region_input(&self) -> RegionInput {
        RegionInput {
            country_name: self.country_name.clone(),
            country_code: self.country_code.clone(),
            region_code: self.region_code.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Region derived from the current location fields.
    pub fn region(&self) -> GeoRegion {
        resolve_geo_region(&self.region_input())
    }

    /// Stored preference, validated against the known regions. Invalid
    /// stored values read as unset.
    pub fn region_preference(&self) -> Option<GeoRegion> {
        let raw = self.region_preference.as_deref()?;
        match raw.parse() {
            Ok(region) => Some(region),
            Err(e) => {
                tracing::warn!(profile_id = %self.id, "Ignoring stored preference: {e}");
                None
            }
        }
    }
}

/// Location fields written by a location update.
#[derive(Debug, Clone)]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
    pub region_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Photo {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_path: String,
    pub blurred_path: String,
    /// Stored visibility string; read through [`Photo::mode`].
    pub visibility: String,
    pub created_at: OffsetDateTime,
}

impl Photo {
    pub fn new(owner_id: Uuid, mode: VisibilityMode) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            owner_id,
            original_path: format!("photos/{owner_id}/{id}/original"),
            blurred_path: format!("photos/{owner_id}/{id}/blur"),
            visibility: mode.as_str().to_string(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn mode(&self) -> VisibilityMode {
        VisibilityMode::from(self.visibility.as_str())
    }

    pub fn path_for(&self, variant: PhotoVariant) -> &str {
        match variant {
            PhotoVariant::Original => &self.original_path,
            PhotoVariant::Blur => &self.blurred_path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PhotoGrant {
    pub photo_id: Uuid,
    pub viewer_id: Uuid,
    pub granted_at: OffsetDateTime,
    pub expires_at: Option<OffsetDateTime>,
}

/// Canonical ordering for a match row.
pub fn match_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b { (a, b) } else { (b, a) }
}
