//! Configuration types for test data generation.

use serde::{Deserialize, Serialize};

/// Geographic bounding box defined by southwest and northeast corners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (south)
    pub min_lat: f64,
    /// Minimum longitude (west)
    pub min_lon: f64,
    /// Maximum latitude (north)
    pub max_lat: f64,
    /// Maximum longitude (east)
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Returns a random point within the bounding box.
    pub fn random_point(&self, rng: &mut impl rand::Rng) -> (f64, f64) {
        let lat = rng.gen_range(self.min_lat..self.max_lat);
        let lon = rng.gen_range(self.min_lon..self.max_lon);
        (lat, lon)
    }

    /// Returns the center of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

/// A seed area: where generated profiles are placed and what they report
/// as their country.
#[derive(Debug, Clone, Serialize)]
pub struct Area {
    pub bounds: BoundingBox,
    pub country_name: &'static str,
    pub country_code: &'static str,
}

impl Area {
    /// Central Chechnya, well inside the anchor radius.
    pub const GROZNY: Area = Area {
        bounds: BoundingBox::new(43.1, 45.4, 43.5, 46.0),
        country_name: "Russia",
        country_code: "RU",
    };

    pub const MOSCOW: Area = Area {
        bounds: BoundingBox::new(55.5, 37.3, 55.9, 37.9),
        country_name: "Russia",
        country_code: "RU",
    };

    pub const BERLIN: Area = Area {
        bounds: BoundingBox::new(52.35, 13.1, 52.65, 13.7),
        country_name: "Germany",
        country_code: "DE",
    };

    pub const PARIS: Area = Area {
        bounds: BoundingBox::new(48.8, 2.2, 48.92, 2.45),
        country_name: "France",
        country_code: "FR",
    };

    pub const NEW_YORK: Area = Area {
        bounds: BoundingBox::new(40.6, -74.05, 40.85, -73.75),
        country_name: "United States",
        country_code: "US",
    };
}

/// Area with a relative sampling weight.
#[derive(Debug, Clone, Serialize)]
pub struct WeightedArea {
    pub area: Area,
    pub weight: f64,
}

/// Configuration for seeding operations.
#[derive(Debug, Clone, Serialize)]
pub struct SeedConfig {
    /// Number of profiles to generate.
    pub profile_count: usize,

    /// Photos per profile (inclusive range).
    pub photos_per_profile: (usize, usize),

    /// Where profiles are placed.
    pub areas: Vec<WeightedArea>,

    /// Probability that a profile reports no coordinates at all.
    pub missing_location_rate: f64,

    /// Batch size for database insertions.
    pub batch_size: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            profile_count: 200,
            photos_per_profile: (1, 4),
            areas: vec![
                WeightedArea {
                    area: Area::GROZNY,
                    weight: 0.4,
                },
                WeightedArea {
                    area: Area::MOSCOW,
                    weight: 0.2,
                },
                WeightedArea {
                    area: Area::BERLIN,
                    weight: 0.15,
                },
                WeightedArea {
                    area: Area::PARIS,
                    weight: 0.15,
                },
                WeightedArea {
                    area: Area::NEW_YORK,
                    weight: 0.1,
                },
            ],
            missing_location_rate: 0.1,
            batch_size: 50,
        }
    }
}
