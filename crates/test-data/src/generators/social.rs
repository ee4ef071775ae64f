//! Social graph generation (matches and photo grants).

use std::collections::HashSet;

use discovery::{models::match_pair, photo_visibility::VisibilityMode};
use rand::{Rng, seq::SliceRandom};
use rand_distr::{Distribution, Poisson};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::generators::GeneratedPhoto;

/// Generated mutual match, stored in canonical order.
#[derive(Debug, Clone)]
pub struct GeneratedMatch {
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub created_at: OffsetDateTime,
}

/// Generated grant on a whitelist photo.
#[derive(Debug, Clone)]
pub struct GeneratedGrant {
    pub photo_id: Uuid,
    pub viewer_id: Uuid,
    pub granted_at: OffsetDateTime,
    pub expires_at: Option<OffsetDateTime>,
}

/// Configuration for social graph generation.
#[derive(Debug, Clone)]
pub struct SocialGenConfig {
    /// Average number of matches each profile initiates.
    pub avg_matches_per_profile: f64,
    /// Average number of grants per whitelist photo.
    pub avg_grants_per_photo: f64,
    /// Probability that a grant expires.
    pub expiring_grant_probability: f64,
    /// Probability that an expiring grant has already lapsed.
    pub lapsed_grant_probability: f64,
}

impl Default for SocialGenConfig {
    fn default() -> Self {
        Self {
            avg_matches_per_profile: 3.0,
            avg_grants_per_photo: 2.0,
            expiring_grant_probability: 0.5,
            lapsed_grant_probability: 0.3,
        }
    }
}

/// Generates matches and grants.
pub struct SocialGenerator {
    config: SocialGenConfig,
}

impl SocialGenerator {
    pub fn new() -> Self {
        Self {
            config: SocialGenConfig::default(),
        }
    }

    pub fn with_config(config: SocialGenConfig) -> Self {
        Self { config }
    }

    /// Generates a set of mutual matches with no self-matches and no
    /// duplicate pairs.
    pub fn generate_matches(
        &self,
        profile_ids: &[Uuid],
        base_time: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedMatch> {
        if profile_ids.len() < 2 {
            return Vec::new();
        }
        let Ok(poisson) = Poisson::new(self.config.avg_matches_per_profile) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        for &id in profile_ids {
            let count = (poisson.sample(rng) as usize).min(profile_ids.len() - 1);
            let others: Vec<Uuid> = profile_ids.iter().copied().filter(|&o| o != id).collect();

            for &other in others.choose_multiple(rng, count) {
                let (user_a, user_b) = match_pair(id, other);
                if seen.insert((user_a, user_b)) {
                    matches.push(GeneratedMatch {
                        user_a,
                        user_b,
                        created_at: base_time - Duration::days(rng.gen_range(0..180)),
                    });
                }
            }
        }

        matches
    }

    /// Generates grants for whitelist photos. Grants never go to the owner.
    pub fn generate_grants(
        &self,
        photos: &[GeneratedPhoto],
        profile_ids: &[Uuid],
        base_time: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedGrant> {
        let Ok(poisson) = Poisson::new(self.config.avg_grants_per_photo) else {
            return Vec::new();
        };

        let mut grants = Vec::new();
        for photo in photos.iter().filter(|p| p.mode == VisibilityMode::Whitelist) {
            let viewers: Vec<Uuid> = profile_ids
                .iter()
                .copied()
                .filter(|&v| v != photo.owner_id)
                .collect();
            let count = (poisson.sample(rng) as usize).min(viewers.len());

            for &viewer_id in viewers.choose_multiple(rng, count) {
                let granted_at = base_time - Duration::days(rng.gen_range(0..30));
                let expires_at = (rng.r#gen::<f64>() < self.config.expiring_grant_probability)
                    .then(|| {
                        if rng.r#gen::<f64>() < self.config.lapsed_grant_probability {
                            base_time - Duration::hours(rng.gen_range(1..72))
                        } else {
                            base_time + Duration::hours(rng.gen_range(1..24 * 14))
                        }
                    });

                grants.push(GeneratedGrant {
                    photo_id: photo.id,
                    viewer_id,
                    granted_at,
                    expires_at,
                });
            }
        }

        grants
    }
}

impl Default for SocialGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{PhotoGenConfig, PhotoGenerator};
    use rand::{SeedableRng, rngs::StdRng};

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_matches_are_canonical_and_unique() {
        let mut rng = StdRng::seed_from_u64(42);
        let profiles = ids(30);
        let matches =
            SocialGenerator::new().generate_matches(&profiles, OffsetDateTime::now_utc(), &mut rng);

        assert!(!matches.is_empty());
        let mut seen = HashSet::new();
        for m in &matches {
            assert!(m.user_a < m.user_b);
            assert!(seen.insert((m.user_a, m.user_b)));
        }
    }

    #[test]
    fn test_single_profile_has_no_matches() {
        let mut rng = StdRng::seed_from_u64(1);
        let matches =
            SocialGenerator::new().generate_matches(&ids(1), OffsetDateTime::now_utc(), &mut rng);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_grants_only_on_whitelist_photos() {
        let mut rng = StdRng::seed_from_u64(8);
        let profiles = ids(20);
        let photos = PhotoGenerator::new().generate_all(&profiles, &mut rng);
        let grants = SocialGenerator::new().generate_grants(
            &photos,
            &profiles,
            OffsetDateTime::now_utc(),
            &mut rng,
        );

        for grant in &grants {
            let photo = photos.iter().find(|p| p.id == grant.photo_id).unwrap();
            assert_eq!(photo.mode, VisibilityMode::Whitelist);
            assert_ne!(grant.viewer_id, photo.owner_id);
        }
    }

    #[test]
    fn test_grants_mix_expiring_and_permanent() {
        let mut rng = StdRng::seed_from_u64(21);
        let profiles = ids(40);
        let photos = PhotoGenerator::with_config(PhotoGenConfig {
            per_owner: (2, 2),
            mode_weights: [0.0, 0.0, 1.0, 0.0],
        })
        .generate_all(&profiles, &mut rng);
        let grants = SocialGenerator::new().generate_grants(
            &photos,
            &profiles,
            OffsetDateTime::now_utc(),
            &mut rng,
        );

        assert!(grants.iter().any(|g| g.expires_at.is_some()));
        assert!(grants.iter().any(|g| g.expires_at.is_none()));
    }
}
