//! Integration tests for location updates, discovery and photo access.
//!
//! These tests verify end-to-end functionality including:
//! - Location updates returning the derived region
//! - Discovery filtering by explicit region and stored preference
//! - Photo access across visibility modes, matches and expiring grants
//!
//! To run these tests, you need a PostgreSQL database and the
//! DATABASE_URL environment variable set. Migrations are applied by the
//! tests themselves.
//!
//! Run with: `DATABASE_URL=postgres://... cargo nextest run -p discovery photo_access`
//!
//! Note: These tests create and clean up their own data using unique IDs,
//! so they can safely run against a development database.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use discovery::{
    auth::JwtKeys,
    config::Config,
    create_router,
    database::Database,
    models::{Photo, Profile},
    object_store_service::ObjectStoreService,
    photo_visibility::VisibilityMode,
    rate_limit::RateLimiter,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "integration-test-secret";

/// Get database pool, skipping tests if DATABASE_URL is not set.
async fn get_test_pool() -> Option<PgPool> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: Failed to connect to database: {e}");
            return None;
        }
    };

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

fn app(pool: PgPool) -> Router {
    app_with_limiter(pool, RateLimiter::new(100, Duration::from_secs(60)))
}

fn app_with_limiter(pool: PgPool, limiter: RateLimiter) -> Router {
    let config = Config {
        jwt_secret: SECRET.to_string(),
        ..Config::default()
    };
    let store = ObjectStoreService::new_local(&config.public_base_url).unwrap();
    create_router(pool, store, limiter, &config)
}

fn bearer(profile_id: Uuid) -> String {
    let token = JwtKeys::new(SECRET.as_bytes())
        .create_token(profile_id, time::Duration::hours(1))
        .unwrap();
    format!("Bearer {token}")
}

async fn create_profile(db: &Database, name: &str) -> Profile {
    let profile = Profile::new(format!("{name} {}", Uuid::new_v4()));
    db.create_profile(&profile)
        .await
        .expect("Failed to create profile");
    profile
}

async fn create_photo(db: &Database, owner: Uuid, mode: VisibilityMode) -> Photo {
    let photo = Photo::new(owner, mode);
    db.create_photo(&photo).await.expect("Failed to create photo");
    photo
}

/// Cleanup helper to remove test data. Matches, photos and grants cascade.
async fn cleanup(pool: &PgPool, ids: &[Uuid]) {
    for id in ids {
        let _ = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await;
    }
}

async fn send(app: Router, method: &str, uri: &str, viewer: Uuid, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, bearer(viewer))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn access(app: Router, viewer: Uuid, photo: Uuid, variant: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/photos/access",
        viewer,
        json!({"photoId": photo, "variant": variant}),
    )
    .await
}

#[tokio::test]
async fn location_update_returns_region() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let viewer = create_profile(&db, "Viewer").await;

    let (status, body) = send(
        app(pool.clone()),
        "POST",
        "/location",
        viewer.id,
        json!({"latitude": 43.32, "longitude": 45.69, "country": "United States", "countryCode": "US"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["region"], "chechnya");

    let (status, body) = send(
        app(pool.clone()),
        "POST",
        "/location",
        viewer.id,
        json!({"latitude": 52.52, "longitude": 13.40, "country": "Germany", "countryCode": "DE"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["region"], "europe");

    let stored = db.get_profile(viewer.id).await.unwrap().unwrap();
    assert_eq!(stored.country_code.as_deref(), Some("DE"));
    assert!(stored.location_updated_at.is_some());

    cleanup(&pool, &[viewer.id]).await;
}

#[tokio::test]
async fn discovery_uses_stored_preference() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let viewer = create_profile(&db, "Viewer").await;

    let mut berliner = Profile::new(format!("Berliner {}", Uuid::new_v4()));
    berliner.country_code = Some("DE".to_string());
    db.create_profile(&berliner).await.unwrap();

    let (status, body) = send(
        app(pool.clone()),
        "PUT",
        "/users/me/region-preference",
        viewer.id,
        json!({"region": "Europe"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["region"], "europe");

    let (status, body) = send(app(pool.clone()), "GET", "/discovery?limit=200", viewer.id, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert!(items.iter().all(|p| p["region"] == "europe"));
    assert!(items.iter().any(|p| p["id"] == berliner.id.to_string()));
    assert!(items.iter().all(|p| p["id"] != viewer.id.to_string()));

    let (_, body) = send(
        app(pool.clone()),
        "PUT",
        "/users/me/region-preference",
        viewer.id,
        json!({"region": null}),
    )
    .await;
    assert!(body["region"].is_null());

    cleanup(&pool, &[viewer.id, berliner.id]).await;
}

#[tokio::test]
async fn match_only_photo_requires_match() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let owner = create_profile(&db, "Owner").await;
    let viewer = create_profile(&db, "Viewer").await;
    let photo = create_photo(&db, owner.id, VisibilityMode::MatchOnly).await;

    let (status, body) = access(app(pool.clone()), viewer.id, photo.id, "original").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["variant"], "blur");
    assert_eq!(body["expiresIn"], 120);
    assert!(body["url"].as_str().unwrap().contains("/blur"));

    db.create_match(owner.id, viewer.id).await.unwrap();

    let (_, body) = access(app(pool.clone()), viewer.id, photo.id, "original").await;
    assert_eq!(body["variant"], "original");

    let (_, body) = access(app(pool.clone()), viewer.id, photo.id, "blur").await;
    assert_eq!(body["variant"], "blur");

    cleanup(&pool, &[owner.id, viewer.id]).await;
}

#[tokio::test]
async fn whitelist_photo_honors_grant_expiry() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let owner = create_profile(&db, "Owner").await;
    let viewer = create_profile(&db, "Viewer").await;
    let photo = create_photo(&db, owner.id, VisibilityMode::Whitelist).await;

    // A match alone is not enough.
    db.create_match(owner.id, viewer.id).await.unwrap();
    let (_, body) = access(app(pool.clone()), viewer.id, photo.id, "original").await;
    assert_eq!(body["variant"], "blur");

    let (status, _) = send(
        app(pool.clone()),
        "POST",
        &format!("/photos/{}/grants", photo.id),
        owner.id,
        json!({"viewerId": viewer.id, "expiresInHours": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = access(app(pool.clone()), viewer.id, photo.id, "original").await;
    assert_eq!(body["variant"], "original");

    // Expired grants no longer count.
    db.upsert_grant(
        photo.id,
        viewer.id,
        Some(time::OffsetDateTime::now_utc() - time::Duration::minutes(5)),
    )
    .await
    .unwrap();
    let (_, body) = access(app(pool.clone()), viewer.id, photo.id, "original").await;
    assert_eq!(body["variant"], "blur");

    let (status, _) = send(
        app(pool.clone()),
        "DELETE",
        &format!("/photos/{}/grants/{}", photo.id, viewer.id),
        owner.id,
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    cleanup(&pool, &[owner.id, viewer.id]).await;
}

#[tokio::test]
async fn only_owner_manages_photo() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let owner = create_profile(&db, "Owner").await;
    let stranger = create_profile(&db, "Stranger").await;
    let photo = create_photo(&db, owner.id, VisibilityMode::Public).await;

    let (status, _) = send(
        app(pool.clone()),
        "PATCH",
        &format!("/photos/{}/visibility", photo.id),
        stranger.id,
        json!({"mode": "match_only"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app(pool.clone()),
        "PATCH",
        &format!("/photos/{}/visibility", photo.id),
        owner.id,
        json!({"mode": "blurred_until_match"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "blurred_until_match");

    // Owner still gets the original after tightening the mode.
    let (_, body) = access(app(pool.clone()), owner.id, photo.id, "original").await;
    assert_eq!(body["variant"], "original");

    let (_, body) = access(app(pool.clone()), stranger.id, photo.id, "original").await;
    assert_eq!(body["variant"], "blur");

    let (status, _) = access(app(pool.clone()), stranger.id, Uuid::new_v4(), "original").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup(&pool, &[owner.id, stranger.id]).await;
}

#[tokio::test]
async fn rate_limit_applies_only_to_existing_photos() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let owner = create_profile(&db, "Owner").await;
    let viewer = create_profile(&db, "Viewer").await;
    let photo = create_photo(&db, owner.id, VisibilityMode::Public).await;

    // The router shares this limiter's map.
    let limiter = RateLimiter::with_capacity(1, Duration::from_secs(60), 4);

    for _ in 0..10 {
        let (status, _) = access(
            app_with_limiter(pool.clone(), limiter.clone()),
            viewer.id,
            Uuid::new_v4(),
            "original",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    assert!(limiter.is_empty());

    let (status, _) = access(
        app_with_limiter(pool.clone(), limiter.clone()),
        viewer.id,
        photo.id,
        "original",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = access(
        app_with_limiter(pool.clone(), limiter.clone()),
        viewer.id,
        photo.id,
        "original",
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests");
    assert_eq!(limiter.len(), 1);

    cleanup(&pool, &[owner.id, viewer.id]).await;
}

#[tokio::test]
async fn discovery_pages_are_bounded_and_counted() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let db = Database::new(pool.clone());
    let viewer = create_profile(&db, "Viewer").await;

    let mut ids = vec![viewer.id];
    for _ in 0..5 {
        let mut berliner = Profile::new(format!("Berliner {}", Uuid::new_v4()));
        berliner.country_code = Some("DE".to_string());
        db.create_profile(&berliner).await.unwrap();
        ids.push(berliner.id);
    }

    let (status, body) = send(
        app(pool.clone()),
        "GET",
        "/discovery?region=europe&limit=2&offset=1",
        viewer.id,
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert!(body["total_count"].as_i64().unwrap() >= 5);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["offset"], 1);

    let (status, body) = send(app(pool.clone()), "GET", "/discovery/regions", viewer.id, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["europe"].as_u64().unwrap() >= 5);

    cleanup(&pool, &ids).await;
}
