//! Runtime configuration loaded from the environment.

use std::{env, str::FromStr, time::Duration};

/// Default lifetime of a signed photo URL.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    /// S3 bucket for photos. When unset, links point at `public_base_url`.
    pub object_store_bucket: Option<String>,
    /// Base URL that local signed links are rooted at.
    pub public_base_url: String,
    pub signed_url_ttl: Duration,
    pub photo_rate_limit: u32,
    pub photo_rate_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://docker:pg@0.0.0.0".to_string(),
            port: 3001,
            jwt_secret: "discovery-dev-secret-change-in-production".to_string(),
            object_store_bucket: None,
            public_base_url: "http://localhost:3001/media/".to_string(),
            signed_url_ttl: Duration::from_secs(DEFAULT_SIGNED_URL_TTL_SECS),
            photo_rate_limit: 30,
            photo_rate_window: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            port: parse_var("PORT", defaults.port),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            object_store_bucket: env::var("OBJECT_STORE_BUCKET")
                .ok()
                .filter(|b| !b.is_empty()),
            public_base_url: env::var("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            signed_url_ttl: Duration::from_secs(parse_var(
                "SIGNED_URL_TTL_SECS",
                DEFAULT_SIGNED_URL_TTL_SECS,
            )),
            photo_rate_limit: parse_var("PHOTO_RATE_LIMIT", defaults.photo_rate_limit),
            photo_rate_window: Duration::from_secs(parse_var(
                "PHOTO_RATE_WINDOW_SECS",
                defaults.photo_rate_window.as_secs(),
            )),
        }
    }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value {raw:?} for {name}, using {default}");
            default
        }),
        Err(_) => default,
    }
}
