//! Profile generation around seed areas.

use discovery::geo_region::{GeoRegion, RegionInput, resolve_geo_region};
use fake::{Fake, faker::name::en::Name};
use rand::Rng;
use uuid::Uuid;

use crate::config::WeightedArea;

/// Generated profile ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedProfile {
    pub id: Uuid,
    pub display_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
}

impl GeneratedProfile {
    pub fn region_input(&self) -> RegionInput {
        RegionInput {
            country_name: self.country_name.clone(),
            country_code: self.country_code.clone(),
            region_code: None,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn region(&self) -> GeoRegion {
        resolve_geo_region(&self.region_input())
    }
}

/// Generates profiles placed in weighted seed areas.
pub struct ProfileGenerator {
    areas: Vec<WeightedArea>,
    missing_location_rate: f64,
}

impl ProfileGenerator {
    pub fn new(areas: Vec<WeightedArea>) -> Self {
        Self {
            areas,
            missing_location_rate: 0.0,
        }
    }

    /// Sets the probability that a profile carries only country metadata.
    pub fn with_missing_location_rate(mut self, rate: f64) -> Self {
        self.missing_location_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Generates a single profile.
    pub fn generate(&self, rng: &mut impl Rng) -> GeneratedProfile {
        let display_name: String = Name().fake_with_rng(rng);

        let Some(weighted) = self.pick_area(rng) else {
            return GeneratedProfile {
                id: Uuid::new_v4(),
                display_name,
                latitude: None,
                longitude: None,
                country_name: None,
                country_code: None,
            };
        };

        let (latitude, longitude) = if rng.r#gen::<f64>() < self.missing_location_rate {
            (None, None)
        } else {
            let (lat, lon) = weighted.area.bounds.random_point(rng);
            (Some(lat), Some(lon))
        };

        GeneratedProfile {
            id: Uuid::new_v4(),
            display_name,
            latitude,
            longitude,
            country_name: Some(weighted.area.country_name.to_string()),
            country_code: Some(weighted.area.country_code.to_string()),
        }
    }

    /// Generates multiple profiles.
    pub fn generate_batch(&self, count: usize, rng: &mut impl Rng) -> Vec<GeneratedProfile> {
        (0..count).map(|_| self.generate(rng)).collect()
    }

    fn pick_area(&self, rng: &mut impl Rng) -> Option<&WeightedArea> {
        let total: f64 = self.areas.iter().map(|a| a.weight.max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }

        let mut roll = rng.gen_range(0.0..total);
        for area in &self.areas {
            let weight = area.weight.max(0.0);
            if roll < weight {
                return Some(area);
            }
            roll -= weight;
        }
        self.areas.last()
    }
}
