//! Photo generation with mixed visibility modes.

use discovery::photo_visibility::VisibilityMode;
use rand::Rng;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Generated photo ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedPhoto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub mode: VisibilityMode,
    pub created_at: OffsetDateTime,
}

impl GeneratedPhoto {
    pub fn original_path(&self) -> String {
        format!("photos/{}/{}/original", self.owner_id, self.id)
    }

    pub fn blurred_path(&self) -> String {
        format!("photos/{}/{}/blur", self.owner_id, self.id)
    }
}

/// Configuration for photo generation.
#[derive(Debug, Clone)]
pub struct PhotoGenConfig {
    /// Inclusive range of photos per owner.
    pub per_owner: (usize, usize),
    /// Relative weights for public, match_only, whitelist, blurred_until_match.
    pub mode_weights: [f64; 4],
}

impl Default for PhotoGenConfig {
    fn default() -> Self {
        Self {
            per_owner: (1, 4),
            mode_weights: [0.4, 0.3, 0.1, 0.2],
        }
    }
}

const MODES: [VisibilityMode; 4] = [
    VisibilityMode::Public,
    VisibilityMode::MatchOnly,
    VisibilityMode::Whitelist,
    VisibilityMode::BlurredUntilMatch,
];

pub struct PhotoGenerator {
    config: PhotoGenConfig,
}

impl PhotoGenerator {
    pub fn new() -> Self {
        Self {
            config: PhotoGenConfig::default(),
        }
    }

    pub fn with_config(config: PhotoGenConfig) -> Self {
        Self { config }
    }

    /// Generates photos for one owner.
    pub fn generate_for(&self, owner_id: Uuid, rng: &mut impl Rng) -> Vec<GeneratedPhoto> {
        let (min, max) = self.config.per_owner;
        let count = if max > min {
            rng.gen_range(min..=max)
        } else {
            min
        };

        let now = OffsetDateTime::now_utc();
        (0..count)
            .map(|_| GeneratedPhoto {
                id: Uuid::new_v4(),
                owner_id,
                mode: self.pick_mode(rng),
                created_at: now - Duration::hours(rng.gen_range(0..24 * 90)),
            })
            .collect()
    }

    /// Generates photos for every owner.
    pub fn generate_all(&self, owners: &[Uuid], rng: &mut impl Rng) -> Vec<GeneratedPhoto> {
        owners
            .iter()
            .flat_map(|owner| self.generate_for(*owner, rng))
            .collect()
    }

    fn pick_mode(&self, rng: &mut impl Rng) -> VisibilityMode {
        let weights = self.config.mode_weights.map(|w| w.max(0.0));
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return VisibilityMode::Public;
        }

        let mut roll = rng.gen_range(0.0..total);
        for (mode, weight) in MODES.iter().zip(weights) {
            if roll < weight {
                return *mode;
            }
            roll -= weight;
        }
        VisibilityMode::Public
    }
}

impl Default for PhotoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_photo_count_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = PhotoGenerator::new();
        let owner = Uuid::new_v4();

        for _ in 0..20 {
            let photos = generator.generate_for(owner, &mut rng);
            assert!((1..=4).contains(&photos.len()));
            assert!(photos.iter().all(|p| p.owner_id == owner));
        }
    }

    #[test]
    fn test_never_generates_unrecognized_mode() {
        let mut rng = StdRng::seed_from_u64(7);
        let owners: Vec<Uuid> = (0..30).map(|_| Uuid::new_v4()).collect();
        let photos = PhotoGenerator::new().generate_all(&owners, &mut rng);
        assert!(photos.iter().all(|p| p.mode != VisibilityMode::Unrecognized));
    }

    #[test]
    fn test_single_mode_weight() {
        let mut rng = StdRng::seed_from_u64(5);
        let generator = PhotoGenerator::with_config(PhotoGenConfig {
            per_owner: (3, 3),
            mode_weights: [0.0, 0.0, 1.0, 0.0],
        });
        let photos = generator.generate_for(Uuid::new_v4(), &mut rng);
        assert_eq!(photos.len(), 3);
        assert!(photos.iter().all(|p| p.mode == VisibilityMode::Whitelist));
    }

    #[test]
    fn test_paths_follow_layout() {
        let mut rng = StdRng::seed_from_u64(11);
        let photo = PhotoGenerator::new()
            .generate_for(Uuid::new_v4(), &mut rng)
            .remove(0);
        assert!(photo.original_path().ends_with(&format!("{}/original", photo.id)));
        assert!(photo.blurred_path().ends_with(&format!("{}/blur", photo.id)));
    }
}
