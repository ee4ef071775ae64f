//! Photo access and visibility management handlers.

use std::time::Duration;

use axum::{Extension, extract::Path, http::StatusCode, response::Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    database::Database,
    errors::{AppError, validation_error},
    models::{Photo, PhotoGrant},
    object_store_service::ObjectStoreService,
    photo_visibility::{
        PhotoAccessContext, PhotoVariant, VisibilityMode, can_access_original, select_variant,
    },
    rate_limit::{RateLimitKey, RateLimiter},
    types::{
        GrantRequest, PhotoAccessRequest, PhotoAccessResponse, PhotoSummary,
        UpdateVisibilityRequest,
    },
};

/// Settings for signed photo links.
#[derive(Debug, Clone, Copy)]
pub struct PhotoSettings {
    pub signed_url_ttl: Duration,
}

/// Choose the variant a viewer receives for a photo.
pub fn delivered_variant(
    photo: &Photo,
    viewer_id: Uuid,
    has_match: bool,
    has_whitelist: bool,
    requested: PhotoVariant,
) -> PhotoVariant {
    let ctx = PhotoAccessContext {
        mode: photo.mode(),
        is_owner: photo.owner_id == viewer_id,
        has_match,
        has_whitelist,
    };
    select_variant(requested, can_access_original(&ctx))
}

/// Issue a short-lived link to a photo variant the viewer may see.
///
/// Viewers without access to the original get the blurred variant instead
/// of an error. Requests are rate limited per viewer and photo once the photo
/// is known to exist.
#[utoipa::path(
    post,
    path = "/photos/access",
    tag = "photos",
    request_body = PhotoAccessRequest,
    responses(
        (status = 200, description = "Signed link issued", body = PhotoAccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Photo not found"),
        (status = 429, description = "Too many requests for this photo")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn access_photo(
    Extension(db): Extension<Database>,
    Extension(store): Extension<ObjectStoreService>,
    Extension(limiter): Extension<RateLimiter>,
    Extension(settings): Extension<PhotoSettings>,
    AuthUser(claims): AuthUser,
    Json(req): Json<PhotoAccessRequest>,
) -> Result<Json<PhotoAccessResponse>, AppError> {
    let viewer_id = claims.sub;

    let photo = db
        .get_photo(req.photo_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // Only existing photos take a limiter slot.
    if !limiter.check(RateLimitKey {
        subject: viewer_id,
        resource: photo.id,
    }) {
        tracing::warn!(%viewer_id, photo_id = %photo.id, "Photo access rate limited");
        return Err(AppError::RateLimited);
    }

    let (has_match, has_whitelist) = if photo.owner_id == viewer_id {
        (false, false)
    } else {
        tokio::try_join!(
            db.has_mutual_match(viewer_id, photo.owner_id),
            db.has_active_grant(photo.id, viewer_id),
        )?
    };

    let variant = delivered_variant(&photo, viewer_id, has_match, has_whitelist, req.variant);
    if variant != req.variant {
        tracing::debug!(
            %viewer_id,
            photo_id = %photo.id,
            mode = %photo.mode(),
            "Original denied, serving blur"
        );
    }

    let url = store
        .signed_get_url(photo.path_for(variant), settings.signed_url_ttl)
        .await?;

    Ok(Json(PhotoAccessResponse {
        url,
        variant,
        expires_in: settings.signed_url_ttl.as_secs(),
    }))
}

/// List the viewer's own photos.
#[utoipa::path(
    get,
    path = "/users/me/photos",
    tag = "photos",
    responses(
        (status = 200, description = "Viewer's photos", body = Vec<PhotoSummary>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_my_photos(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<PhotoSummary>>, AppError> {
    let photos = db.list_owner_photos(claims.sub).await?;
    Ok(Json(photos.into_iter().map(PhotoSummary::from).collect()))
}

/// Change a photo's visibility mode.
#[utoipa::path(
    patch,
    path = "/photos/{id}/visibility",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Photo ID")
    ),
    request_body = UpdateVisibilityRequest,
    responses(
        (status = 200, description = "Visibility updated", body = PhotoSummary),
        (status = 400, description = "Unknown visibility mode"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the photo owner"),
        (status = 404, description = "Photo not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_photo_visibility(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(photo_id): Path<Uuid>,
    Json(req): Json<UpdateVisibilityRequest>,
) -> Result<Json<PhotoSummary>, AppError> {
    let mode = req
        .mode
        .parse::<VisibilityMode>()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    require_owned_photo(&db, claims.sub, photo_id).await?;

    let photo = db
        .set_photo_visibility(photo_id, mode.as_str())
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(%photo_id, %mode, "Photo visibility changed");
    Ok(Json(photo.into()))
}

/// Grant a viewer access to a photo's original.
#[utoipa::path(
    post,
    path = "/photos/{id}/grants",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Photo ID")
    ),
    request_body = GrantRequest,
    responses(
        (status = 200, description = "Grant stored", body = PhotoGrant),
        (status = 400, description = "Invalid grant"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the photo owner"),
        (status = 404, description = "Photo or viewer not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn grant_photo_access(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(photo_id): Path<Uuid>,
    Json(req): Json<GrantRequest>,
) -> Result<Json<PhotoGrant>, AppError> {
    req.validate().map_err(validation_error)?;

    if req.viewer_id == claims.sub {
        return Err(AppError::InvalidInput(
            "Cannot grant access to yourself".to_string(),
        ));
    }

    require_owned_photo(&db, claims.sub, photo_id).await?;

    if db.get_profile(req.viewer_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let expires_at = req
        .expires_in_hours
        .map(|hours| time::OffsetDateTime::now_utc() + time::Duration::hours(hours));

    let grant = db.upsert_grant(photo_id, req.viewer_id, expires_at).await?;

    tracing::info!(%photo_id, viewer_id = %req.viewer_id, "Photo grant stored");
    Ok(Json(grant))
}

/// Revoke a viewer's grant on a photo.
#[utoipa::path(
    delete,
    path = "/photos/{id}/grants/{viewer_id}",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Photo ID"),
        ("viewer_id" = Uuid, Path, description = "Viewer whose grant is revoked")
    ),
    responses(
        (status = 204, description = "Grant revoked"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the photo owner"),
        (status = 404, description = "Photo or grant not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn revoke_photo_access(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path((photo_id, viewer_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    require_owned_photo(&db, claims.sub, photo_id).await?;

    if db.revoke_grant(photo_id, viewer_id).await? {
        tracing::info!(%photo_id, %viewer_id, "Photo grant revoked");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn require_owned_photo(
    db: &Database,
    owner_id: Uuid,
    photo_id: Uuid,
) -> Result<Photo, AppError> {
    let photo = db.get_photo(photo_id).await?.ok_or(AppError::NotFound)?;
    if photo.owner_id != owner_id {
        return Err(AppError::Forbidden);
    }
    Ok(photo)
}
