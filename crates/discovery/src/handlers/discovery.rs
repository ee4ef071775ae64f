//! Discovery feed handlers.
//!
//! Regions are recomputed from each candidate's location fields on every
//! request; the stored fields are the source of truth. Candidates are
//! streamed so only the requested page is held in memory.

use axum::{Extension, extract::Query, response::Json};
use enum_map::EnumMap;
use futures::TryStreamExt;

use crate::{
    auth::AuthUser,
    database::Database,
    errors::AppError,
    geo_region::GeoRegion,
    handlers::pagination::{PaginatedResponse, clamp_page},
    models::Profile,
    types::{DiscoveryProfile, DiscoveryQuery, RegionCounts},
};

/// List discoverable profiles, optionally filtered by region.
#[utoipa::path(
    get,
    path = "/discovery",
    tag = "discovery",
    params(DiscoveryQuery),
    responses(
        (status = 200, description = "Page of discoverable profiles", body = PaginatedResponse<DiscoveryProfile>),
        (status = 400, description = "Unknown region"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_discovery_feed(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Query(query): Query<DiscoveryQuery>,
) -> Result<Json<PaginatedResponse<DiscoveryProfile>>, AppError> {
    let requested = query
        .region
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(str::parse::<GeoRegion>)
        .transpose()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let region = match requested {
        Some(region) => Some(region),
        None => db
            .get_profile(claims.sub)
            .await?
            .and_then(|p| p.region_preference()),
    };

    let mut page = DiscoveryPage::new(region, query.limit, query.offset);
    let mut candidates = db.stream_discovery_candidates(claims.sub);
    while let Some(profile) = candidates.try_next().await? {
        page.push(profile);
    }

    tracing::debug!(
        viewer = %claims.sub,
        region = ?region,
        matches = page.matched,
        "Discovery feed"
    );

    Ok(Json(page.finish()))
}

/// Count discoverable profiles per region.
#[utoipa::path(
    get,
    path = "/discovery/regions",
    tag = "discovery",
    responses(
        (status = 200, description = "Profiles per region", body = RegionCounts),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_region_counts(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
) -> Result<Json<RegionCounts>, AppError> {
    let mut counts: EnumMap<GeoRegion, usize> = EnumMap::default();
    let mut candidates = db.stream_discovery_candidates(claims.sub);
    while let Some(profile) = candidates.try_next().await? {
        counts[profile.region()] += 1;
    }
    Ok(Json(region_counts(&counts)))
}

/// Accumulates one page of the discovery feed from a stream of candidates.
///
/// Every candidate matching the region filter is counted; only those inside
/// `[offset, offset + limit)` are kept.
#[derive(Debug)]
pub struct DiscoveryPage {
    region: Option<GeoRegion>,
    limit: i64,
    offset: i64,
    matched: i64,
    items: Vec<DiscoveryProfile>,
}

impl DiscoveryPage {
    pub fn new(region: Option<GeoRegion>, limit: i64, offset: i64) -> Self {
        let (limit, offset) = clamp_page(limit, offset);
        Self {
            region,
            limit,
            offset,
            matched: 0,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, profile: Profile) {
        let region = profile.region();
        if self.region.is_some_and(|wanted| wanted != region) {
            return;
        }

        if self.matched >= self.offset && (self.items.len() as i64) < self.limit {
            self.items.push(DiscoveryProfile::new(profile, region));
        }
        self.matched += 1;
    }

    pub fn finish(self) -> PaginatedResponse<DiscoveryProfile> {
        PaginatedResponse::new(self.items, self.matched, self.limit, self.offset)
    }
}

pub fn region_counts(counts: &EnumMap<GeoRegion, usize>) -> RegionCounts {
    RegionCounts {
        chechnya: counts[GeoRegion::Chechnya],
        russia: counts[GeoRegion::Russia],
        europe: counts[GeoRegion::Europe],
        other: counts[GeoRegion::Other],
    }
}
