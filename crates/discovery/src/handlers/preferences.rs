//! Discovery region preference handlers.

use axum::{Extension, response::Json};

use crate::{
    auth::AuthUser,
    database::Database,
    errors::AppError,
    geo_region::GeoRegion,
    types::{RegionPreferenceRequest, RegionPreferenceResponse},
};

/// Get the viewer's preferred discovery region.
#[utoipa::path(
    get,
    path = "/users/me/region-preference",
    tag = "preferences",
    responses(
        (status = 200, description = "Stored preference, null when unset", body = RegionPreferenceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_region_preference(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
) -> Result<Json<RegionPreferenceResponse>, AppError> {
    let profile = db
        .get_profile(claims.sub)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(RegionPreferenceResponse {
        region: profile.region_preference(),
    }))
}

/// Set or clear the viewer's preferred discovery region.
#[utoipa::path(
    put,
    path = "/users/me/region-preference",
    tag = "preferences",
    request_body = RegionPreferenceRequest,
    responses(
        (status = 200, description = "Preference stored", body = RegionPreferenceResponse),
        (status = 400, description = "Unknown region"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_region_preference(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Json(req): Json<RegionPreferenceRequest>,
) -> Result<Json<RegionPreferenceResponse>, AppError> {
    let region = req
        .region
        .as_deref()
        .map(str::parse::<GeoRegion>)
        .transpose()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let updated = db
        .set_region_preference(claims.sub, region.map(GeoRegion::as_str))
        .await?;
    if !updated {
        return Err(AppError::NotFound);
    }

    Ok(Json(RegionPreferenceResponse { region }))
}
