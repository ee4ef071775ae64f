pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod geo_region;
pub mod handlers;
pub mod models;
pub mod object_store_service;
pub mod openapi;
pub mod photo_visibility;
pub mod rate_limit;
pub mod request_id;
pub mod types;

use std::time::Duration;

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, patch, post},
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::JwtKeys,
    config::Config,
    database::Database,
    handlers::{
        PhotoSettings, access_photo, get_discovery_feed, get_my_region, get_region_counts,
        get_region_preference, grant_photo_access, health_check, list_my_photos,
        revoke_photo_access, set_region_preference, update_location, update_photo_visibility,
    },
    object_store_service::ObjectStoreService,
    openapi::ApiDoc,
    rate_limit::RateLimiter,
    request_id::request_id_middleware,
};

pub fn create_router(
    pool: PgPool,
    store: ObjectStoreService,
    limiter: RateLimiter,
    config: &Config,
) -> Router {
    let db = Database::new(pool);
    let keys = JwtKeys::new(config.jwt_secret.as_bytes());
    let photo_settings = PhotoSettings {
        signed_url_ttl: config.signed_url_ttl,
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_check))
        // Location routes
        .route("/location", post(update_location))
        .route("/users/me/region", get(get_my_region))
        .route(
            "/users/me/region-preference",
            get(get_region_preference).put(set_region_preference),
        )
        // Discovery routes
        .route("/discovery", get(get_discovery_feed))
        .route("/discovery/regions", get(get_region_counts))
        // Photo routes
        .route("/photos/access", post(access_photo))
        .route("/users/me/photos", get(list_my_photos))
        .route("/photos/{id}/visibility", patch(update_photo_visibility))
        .route("/photos/{id}/grants", post(grant_photo_access))
        .route(
            "/photos/{id}/grants/{viewer_id}",
            delete(revoke_photo_access),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(Extension(db))
        .layer(Extension(store))
        .layer(Extension(limiter))
        .layer(Extension(keys))
        .layer(Extension(photo_settings))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
}

/// Build the storage backend described by the config.
pub fn object_store_from_config(config: &Config) -> anyhow::Result<ObjectStoreService> {
    match &config.object_store_bucket {
        Some(bucket) => {
            tracing::info!("Signing photo links for bucket {bucket}");
            ObjectStoreService::new_s3(bucket)
        }
        None => {
            tracing::warn!(
                "OBJECT_STORE_BUCKET not set, issuing unsigned development links under {}",
                config.public_base_url
            );
            ObjectStoreService::new_local(&config.public_base_url)
        }
    }
}

pub async fn run_server(pool: PgPool, config: Config) -> anyhow::Result<()> {
    let store = object_store_from_config(&config)?;
    let limiter = RateLimiter::new(config.photo_rate_limit, config.photo_rate_window);

    let sweeper = limiter.clone();
    let sweep_every = config.photo_rate_window.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            sweeper.sweep_expired();
        }
    });

    let app = create_router(pool, store, limiter, &config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!("Server running on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
