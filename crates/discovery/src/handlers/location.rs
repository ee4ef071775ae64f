//! Location reporting and derived region handlers.

use axum::{Extension, response::Json};

use crate::{
    auth::AuthUser,
    database::Database,
    errors::AppError,
    models::LocationUpdate,
    types::{LocationRequest, RegionResponse},
};

/// Store the viewer's device location and return the region it resolves to.
#[utoipa::path(
    post,
    path = "/location",
    tag = "location",
    request_body = LocationRequest,
    responses(
        (status = 200, description = "Location stored", body = RegionResponse),
        (status = 400, description = "Coordinates out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_location(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Json(req): Json<LocationRequest>,
) -> Result<Json<RegionResponse>, AppError> {
    let errors = req.coordinate_errors();
    if !errors.is_empty() {
        return Err(AppError::InvalidInput(errors.join(", ")));
    }

    let update = LocationUpdate {
        latitude: req.latitude,
        longitude: req.longitude,
        country_name: non_empty(req.country),
        country_code: non_empty(req.country_code),
        region_code: non_empty(req.region_code),
    };

    let profile = db
        .update_location(claims.sub, &update)
        .await?
        .ok_or(AppError::NotFound)?;

    let region = profile.region();
    tracing::info!(profile_id = %profile.id, %region, "Location updated");

    Ok(Json(RegionResponse { region }))
}

/// Region derived from the viewer's stored location fields.
#[utoipa::path(
    get,
    path = "/users/me/region",
    tag = "location",
    responses(
        (status = 200, description = "Current region", body = RegionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_my_region(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
) -> Result<Json<RegionResponse>, AppError> {
    let profile = db
        .get_profile(claims.sub)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(RegionResponse {
        region: profile.region(),
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
