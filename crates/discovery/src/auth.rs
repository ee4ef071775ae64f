//! Bearer-token viewer identity.
//!
//! Tokens are minted by the external auth platform with a shared HS256
//! secret. The `sub` claim is the viewer's profile id.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // profile id
    pub exp: i64,
    pub iat: i64,
}

/// Signing material, installed on the router as an extension.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }

    pub fn create_token(&self, profile_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: profile_id,
            exp: (now + ttl).unix_timestamp(),
            iat: now.unix_timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            tracing::error!("Failed to sign token: {e}");
            AppError::Internal
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthorized)?;
        Ok(token_data.claims)
    }
}

// Extractor for authenticated viewer
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts.extensions.get::<JwtKeys>().ok_or_else(|| {
            tracing::error!("JwtKeys extension missing from router");
            AppError::Internal
        })?;

        let token = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let claims = keys.verify_token(token)?;
        Ok(AuthUser(claims))
    }
}
