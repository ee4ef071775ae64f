//! Database seeding utilities.

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::generators::{GeneratedGrant, GeneratedMatch, GeneratedPhoto, GeneratedProfile};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Batch size must be positive")]
    InvalidBatchSize,
}

/// Database seeder for inserting generated test data.
pub struct Seeder {
    pool: PgPool,
    batch_size: usize,
}

impl Seeder {
    /// Creates a new seeder with the given database pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            batch_size: 50,
        }
    }

    /// Sets the batch size for bulk operations.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    fn chunk_size(&self) -> Result<usize, SeedError> {
        if self.batch_size == 0 {
            return Err(SeedError::InvalidBatchSize);
        }
        Ok(self.batch_size)
    }

    /// Seeds profiles into the database.
    pub async fn seed_profiles(&self, profiles: &[GeneratedProfile]) -> Result<(), SeedError> {
        info!("Seeding {} profiles...", profiles.len());

        for chunk in profiles.chunks(self.chunk_size()?) {
            let mut tx = self.pool.begin().await?;
            for profile in chunk {
                sqlx::query(
                    r#"
                    INSERT INTO profiles (
                        id, display_name, latitude, longitude,
                        country_name, country_code, location_updated_at, created_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6,
                            CASE WHEN $3::float8 IS NULL THEN NULL ELSE NOW() END,
                            NOW())
                    ON CONFLICT (id) DO NOTHING
                    "#,
                )
                .bind(profile.id)
                .bind(&profile.display_name)
                .bind(profile.latitude)
                .bind(profile.longitude)
                .bind(&profile.country_name)
                .bind(&profile.country_code)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
        }

        info!("Seeded {} profiles", profiles.len());
        Ok(())
    }

    /// Seeds photos into the database.
    pub async fn seed_photos(&self, photos: &[GeneratedPhoto]) -> Result<(), SeedError> {
        info!("Seeding {} photos...", photos.len());

        for chunk in photos.chunks(self.chunk_size()?) {
            let mut tx = self.pool.begin().await?;
            for photo in chunk {
                sqlx::query(
                    r#"
                    INSERT INTO photos (id, owner_id, original_path, blurred_path, visibility, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (id) DO NOTHING
                    "#,
                )
                .bind(photo.id)
                .bind(photo.owner_id)
                .bind(photo.original_path())
                .bind(photo.blurred_path())
                .bind(photo.mode.as_str())
                .bind(photo.created_at)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
        }

        info!("Seeded {} photos", photos.len());
        Ok(())
    }

    /// Seeds mutual matches into the database.
    pub async fn seed_matches(&self, matches: &[GeneratedMatch]) -> Result<(), SeedError> {
        info!("Seeding {} matches...", matches.len());

        for chunk in matches.chunks(self.chunk_size()?) {
            let mut tx = self.pool.begin().await?;
            for m in chunk {
                sqlx::query(
                    r#"
                    INSERT INTO matches (user_a, user_b, created_at)
                    VALUES ($1, $2, $3)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(m.user_a)
                .bind(m.user_b)
                .bind(m.created_at)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
        }

        info!("Seeded {} matches", matches.len());
        Ok(())
    }

    /// Seeds photo grants into the database.
    pub async fn seed_grants(&self, grants: &[GeneratedGrant]) -> Result<(), SeedError> {
        info!("Seeding {} grants...", grants.len());

        for chunk in grants.chunks(self.chunk_size()?) {
            let mut tx = self.pool.begin().await?;
            for grant in chunk {
                sqlx::query(
                    r#"
                    INSERT INTO photo_grants (photo_id, viewer_id, granted_at, expires_at)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (photo_id, viewer_id)
                    DO UPDATE SET granted_at = EXCLUDED.granted_at, expires_at = EXCLUDED.expires_at
                    "#,
                )
                .bind(grant.photo_id)
                .bind(grant.viewer_id)
                .bind(grant.granted_at)
                .bind(grant.expires_at)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
        }

        info!("Seeded {} grants", grants.len());
        Ok(())
    }
}
