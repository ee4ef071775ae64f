use crate::errors::AppError;
use crate::models::{LocationUpdate, Photo, PhotoGrant, Profile, match_pair};
use futures::stream::BoxStream;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

const PROFILE_COLUMNS: &str = r#"
    id, display_name, latitude, longitude, country_name, country_code,
    region_code, region_preference, location_updated_at, created_at
"#;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Profiles

    pub async fn create_profile(&self, profile: &Profile) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, display_name, latitude, longitude, country_name,
                                  country_code, region_code, region_preference,
                                  location_updated_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.display_name)
        .bind(profile.latitude)
        .bind(profile.longitude)
        .bind(&profile.country_name)
        .bind(&profile.country_code)
        .bind(&profile.region_code)
        .bind(&profile.region_preference)
        .bind(profile.location_updated_at)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Overwrite the profile's location fields. Returns the updated profile.
    pub async fn update_location(
        &self,
        profile_id: Uuid,
        location: &LocationUpdate,
    ) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as(&format!(
            r#"
            UPDATE profiles SET
                latitude = $2,
                longitude = $3,
                country_name = $4,
                country_code = $5,
                region_code = $6,
                location_updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(profile_id)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&location.country_name)
        .bind(&location.country_code)
        .bind(&location.region_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn set_region_preference(
        &self,
        profile_id: Uuid,
        region: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE profiles SET region_preference = $2 WHERE id = $1")
            .bind(profile_id)
            .bind(region)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every profile except the viewer, newest location first, streamed
    /// row by row. Region filtering happens in the caller because the region
    /// is derived.
    pub fn stream_discovery_candidates(
        &self,
        viewer_id: Uuid,
    ) -> BoxStream<'_, Result<Profile, sqlx::Error>> {
        sqlx::query_as(
            r#"
            SELECT id, display_name, latitude, longitude, country_name, country_code,
                   region_code, region_preference, location_updated_at, created_at
            FROM profiles
            WHERE id <> $1
            ORDER BY location_updated_at DESC NULLS LAST, created_at DESC
            "#,
        )
        .bind(viewer_id)
        .fetch(&self.pool)
    }

    // Matches

    pub async fn create_match(&self, a: Uuid, b: Uuid) -> Result<(), AppError> {
        let (user_a, user_b) = match_pair(a, b);
        sqlx::query(
            r#"
            INSERT INTO matches (user_a, user_b)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn has_mutual_match(&self, a: Uuid, b: Uuid) -> Result<bool, AppError> {
        let (user_a, user_b) = match_pair(a, b);
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM matches WHERE user_a = $1 AND user_b = $2)",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // Photos

    pub async fn create_photo(&self, photo: &Photo) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO photos (id, owner_id, original_path, blurred_path, visibility, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(photo.id)
        .bind(photo.owner_id)
        .bind(&photo.original_path)
        .bind(&photo.blurred_path)
        .bind(&photo.visibility)
        .bind(photo.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_photo(&self, id: Uuid) -> Result<Option<Photo>, AppError> {
        let photo = sqlx::query_as(
            r#"
            SELECT id, owner_id, original_path, blurred_path, visibility, created_at
            FROM photos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(photo)
    }

    pub async fn list_owner_photos(&self, owner_id: Uuid) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as(
            r#"
            SELECT id, owner_id, original_path, blurred_path, visibility, created_at
            FROM photos
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    pub async fn set_photo_visibility(
        &self,
        photo_id: Uuid,
        visibility: &str,
    ) -> Result<Option<Photo>, AppError> {
        let photo = sqlx::query_as(
            r#"
            UPDATE photos SET visibility = $2
            WHERE id = $1
            RETURNING id, owner_id, original_path, blurred_path, visibility, created_at
            "#,
        )
        .bind(photo_id)
        .bind(visibility)
        .fetch_optional(&self.pool)
        .await?;

        Ok(photo)
    }

    // Grants

    pub async fn upsert_grant(
        &self,
        photo_id: Uuid,
        viewer_id: Uuid,
        expires_at: Option<OffsetDateTime>,
    ) -> Result<PhotoGrant, AppError> {
        let grant = sqlx::query_as(
            r#"
            INSERT INTO photo_grants (photo_id, viewer_id, granted_at, expires_at)
            VALUES ($1, $2, NOW(), $3)
            ON CONFLICT (photo_id, viewer_id)
            DO UPDATE SET granted_at = NOW(), expires_at = EXCLUDED.expires_at
            RETURNING photo_id, viewer_id, granted_at, expires_at
            "#,
        )
        .bind(photo_id)
        .bind(viewer_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(grant)
    }

    pub async fn revoke_grant(&self, photo_id: Uuid, viewer_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM photo_grants WHERE photo_id = $1 AND viewer_id = $2")
            .bind(photo_id)
            .bind(viewer_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the viewer holds an unexpired grant for the photo.
    pub async fn has_active_grant(&self, photo_id: Uuid, viewer_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM photo_grants
                WHERE photo_id = $1 AND viewer_id = $2
                  AND (expires_at IS NULL OR expires_at > NOW())
            )
            "#,
        )
        .bind(photo_id)
        .bind(viewer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
