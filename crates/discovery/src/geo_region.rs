//! Discovery region classification.
//!
//! Maps a profile's location fields onto one of four discovery regions. The
//! region is always derived on demand from the stored location fields and is
//! never persisted on its own.
//!
//! Resolution order (first match wins):
//!
//! | Step | Input                              | Region     |
//! |------|------------------------------------|------------|
//! | 1    | coordinates within 130 km of anchor | `chechnya` |
//! | 2    | `region_code` override token        | `chechnya` |
//! | 3    | anchor alias inside `country_name`  | `chechnya` |
//! | 4    | Russia by code or full name         | `russia`   |
//! | 5    | European code or full name          | `europe`   |
//! | 6    | anything else                       | `other`    |

use std::{fmt, str::FromStr};

use enum_map::Enum;
use geo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Mean Earth radius used for the spherical distance approximation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Reference coordinate of the anchor region (Grozny). `x` is longitude, `y` latitude.
pub const ANCHOR: Point<f64> = Point(geo::Coord {
    x: 45.6981,
    y: 43.3189,
});

/// Points at or inside this distance from [`ANCHOR`] belong to the anchor region.
pub const ANCHOR_RADIUS_KM: f64 = 130.0;

/// Override token accepted in `region_code`.
pub const ANCHOR_REGION_CODE: &str = "CHECHNYA";

/// ISO code of the country enclosing the anchor region.
pub const ENCLOSING_COUNTRY_CODE: &str = "RU";

/// Spelling variants of the anchor region. Matched as substrings of the
/// normalized country name so qualified forms like "Chechen Republic (Russia)"
/// still resolve.
const ANCHOR_ALIASES: &[&str] = &[
    "chechnya",
    "chechen republic",
    "tschetschenien",
    "чечня",
    "чеченская республика",
    "нохчийчоь",
];

/// Full names of the enclosing country, matched exactly after normalization.
const ENCLOSING_COUNTRY_NAMES: &[&str] = &[
    "russia",
    "russian federation",
    "russland",
    "россия",
    "российская федерация",
];

const EUROPE_COUNTRY_CODES: &[&str] = &[
    "AD", "AL", "AT", "BA", "BE", "BG", "BY", "CH", "CY", "CZ", "DE", "DK", "EE", "ES", "FI",
    "FR", "GB", "GR", "HR", "HU", "IE", "IS", "IT", "LI", "LT", "LU", "LV", "MC", "MD", "ME",
    "MK", "MT", "NL", "NO", "PL", "PT", "RO", "RS", "SE", "SI", "SK", "SM", "UA", "VA", "XK",
];

const EUROPE_COUNTRY_NAMES: &[&str] = &[
    "albania",
    "andorra",
    "austria",
    "belarus",
    "belgium",
    "bosnia and herzegovina",
    "bulgaria",
    "croatia",
    "cyprus",
    "czech republic",
    "czechia",
    "denmark",
    "estonia",
    "finland",
    "france",
    "germany",
    "deutschland",
    "greece",
    "hungary",
    "iceland",
    "ireland",
    "italy",
    "kosovo",
    "latvia",
    "liechtenstein",
    "lithuania",
    "luxembourg",
    "malta",
    "moldova",
    "monaco",
    "montenegro",
    "netherlands",
    "north macedonia",
    "norway",
    "poland",
    "portugal",
    "romania",
    "san marino",
    "serbia",
    "slovakia",
    "slovenia",
    "spain",
    "sweden",
    "switzerland",
    "ukraine",
    "united kingdom",
    "vatican city",
];

/// Discovery region a profile is shown under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Enum,
)]
#[serde(rename_all = "lowercase")]
pub enum GeoRegion {
    Chechnya,
    Russia,
    Europe,
    Other,
}

impl GeoRegion {
    pub const ALL: [GeoRegion; 4] = [
        GeoRegion::Chechnya,
        GeoRegion::Russia,
        GeoRegion::Europe,
        GeoRegion::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GeoRegion::Chechnya => "chechnya",
            GeoRegion::Russia => "russia",
            GeoRegion::Europe => "europe",
            GeoRegion::Other => "other",
        }
    }
}

impl fmt::Display for GeoRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown region: {0}")]
pub struct UnknownRegion(pub String);

impl FromStr for GeoRegion {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        GeoRegion::ALL
            .into_iter()
            .find(|region| region.as_str() == normalized)
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

/// Location fields read from a profile or a location update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionInput {
    pub country_name: Option<String>,
    /// ISO-3166 alpha-2, any case.
    pub country_code: Option<String>,
    pub region_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl RegionInput {
    /// The coordinate pair, if both halves are present and finite.
    pub fn point(&self) -> Option<Point<f64>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Point::new(lon, lat))
            }
            _ => None,
        }
    }
}

/// Great-circle distance in kilometres on a sphere of [`EARTH_RADIUS_KM`].
pub fn haversine_km(a: Point<f64>, b: Point<f64>) -> f64 {
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lon = (b.x() - a.x()).to_radians();
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Classify location fields into a discovery region.
///
/// Total and pure: missing or unrecognized data falls through to
/// [`GeoRegion::Other`].
pub fn resolve_geo_region(input: &RegionInput) -> GeoRegion {
    let country_name = normalize_name(input.country_name.as_deref());
    let country_code = normalize_code(input.country_code.as_deref());
    let region_code = normalize_code(input.region_code.as_deref());

    if input
        .point()
        .is_some_and(|p| haversine_km(p, ANCHOR) <= ANCHOR_RADIUS_KM)
    {
        return GeoRegion::Chechnya;
    }

    if region_code.as_deref() == Some(ANCHOR_REGION_CODE) {
        return GeoRegion::Chechnya;
    }

    if let Some(name) = country_name.as_deref() {
        if ANCHOR_ALIASES.iter().any(|alias| name.contains(alias)) {
            return GeoRegion::Chechnya;
        }
    }

    if country_code.as_deref() == Some(ENCLOSING_COUNTRY_CODE)
        || region_code.as_deref() == Some(ENCLOSING_COUNTRY_CODE)
        || country_name
            .as_deref()
            .is_some_and(|name| ENCLOSING_COUNTRY_NAMES.contains(&name))
    {
        return GeoRegion::Russia;
    }

    if country_code
        .as_deref()
        .is_some_and(|code| EUROPE_COUNTRY_CODES.contains(&code))
        || country_name
            .as_deref()
            .is_some_and(|name| EUROPE_COUNTRY_NAMES.contains(&name))
    {
        return GeoRegion::Europe;
    }

    GeoRegion::Other
}

fn normalize_name(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

fn normalize_code(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lon: f64) -> RegionInput {
        RegionInput {
            latitude: Some(lat),
            longitude: Some(lon),
            ..Default::default()
        }
    }

    fn code(c: &str) -> RegionInput {
        RegionInput {
            country_code: Some(c.to_string()),
            ..Default::default()
        }
    }

    fn name(n: &str) -> RegionInput {
        RegionInput {
            country_name: Some(n.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_anchor_distance_is_zero() {
        assert!(haversine_km(ANCHOR, ANCHOR).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Grozny to Moscow, roughly 1500 km.
        let moscow = Point::new(37.6173, 55.7558);
        let d = haversine_km(ANCHOR, moscow);
        assert!((1450.0..1550.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_coordinates_near_anchor() {
        assert_eq!(resolve_geo_region(&at(43.3189, 45.6981)), GeoRegion::Chechnya);
        // Gudermes, ~35 km east
        assert_eq!(resolve_geo_region(&at(43.3525, 46.1050)), GeoRegion::Chechnya);
    }

    #[test]
    fn test_coordinates_override_conflicting_country() {
        let input = RegionInput {
            country_code: Some("US".to_string()),
            country_name: Some("United States".to_string()),
            ..at(43.30, 45.70)
        };
        assert_eq!(resolve_geo_region(&input), GeoRegion::Chechnya);
    }

    #[test]
    fn test_coordinates_outside_radius_fall_through() {
        // Makhachkala, ~160 km away
        let input = RegionInput {
            country_code: Some("RU".to_string()),
            ..at(42.9849, 47.5047)
        };
        assert_eq!(resolve_geo_region(&input), GeoRegion::Russia);
        assert_eq!(resolve_geo_region(&at(42.9849, 47.5047)), GeoRegion::Other);
    }

    #[test]
    fn test_half_coordinates_are_ignored() {
        let input = RegionInput {
            latitude: Some(43.3189),
            ..Default::default()
        };
        assert_eq!(resolve_geo_region(&input), GeoRegion::Other);
    }

    #[test]
    fn test_non_finite_coordinates_are_ignored() {
        assert_eq!(resolve_geo_region(&at(f64::NAN, 45.6981)), GeoRegion::Other);
        assert_eq!(
            resolve_geo_region(&at(43.3189, f64::INFINITY)),
            GeoRegion::Other
        );
    }

    #[test]
    fn test_region_code_override_any_case() {
        for token in ["chechnya", "CHECHNYA", "  Chechnya "] {
            let input = RegionInput {
                region_code: Some(token.to_string()),
                ..Default::default()
            };
            assert_eq!(resolve_geo_region(&input), GeoRegion::Chechnya, "{token}");
        }
    }

    #[test]
    fn test_anchor_aliases_in_country_name() {
        assert_eq!(resolve_geo_region(&name("Chechnya")), GeoRegion::Chechnya);
        assert_eq!(
            resolve_geo_region(&name("Chechen Republic (Russia)")),
            GeoRegion::Chechnya
        );
        assert_eq!(resolve_geo_region(&name("Tschetschenien")), GeoRegion::Chechnya);
        assert_eq!(resolve_geo_region(&name("Чечня")), GeoRegion::Chechnya);
        assert_eq!(resolve_geo_region(&name("Нохчийчоь")), GeoRegion::Chechnya);
    }

    #[test]
    fn test_russia() {
        assert_eq!(resolve_geo_region(&code("RU")), GeoRegion::Russia);
        assert_eq!(resolve_geo_region(&code("ru")), GeoRegion::Russia);
        assert_eq!(resolve_geo_region(&name("Russia")), GeoRegion::Russia);
        assert_eq!(
            resolve_geo_region(&name("Russian Federation")),
            GeoRegion::Russia
        );
        assert_eq!(resolve_geo_region(&name("Россия")), GeoRegion::Russia);
        let by_region = RegionInput {
            region_code: Some("ru".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_geo_region(&by_region), GeoRegion::Russia);
    }

    #[test]
    fn test_russia_name_is_not_substring_matched() {
        assert_eq!(resolve_geo_region(&name("Belarussia")), GeoRegion::Other);
    }

    #[test]
    fn test_europe() {
        assert_eq!(resolve_geo_region(&code("DE")), GeoRegion::Europe);
        assert_eq!(resolve_geo_region(&code("fr")), GeoRegion::Europe);
        assert_eq!(resolve_geo_region(&name("Germany")), GeoRegion::Europe);
        assert_eq!(resolve_geo_region(&name("  united kingdom ")), GeoRegion::Europe);
    }

    #[test]
    fn test_other() {
        assert_eq!(resolve_geo_region(&code("US")), GeoRegion::Other);
        assert_eq!(resolve_geo_region(&RegionInput::default()), GeoRegion::Other);
        assert_eq!(resolve_geo_region(&name("")), GeoRegion::Other);
        assert_eq!(resolve_geo_region(&name("   ")), GeoRegion::Other);
        assert_eq!(resolve_geo_region(&code("")), GeoRegion::Other);
    }

    #[test]
    fn test_precedence_anchor_name_before_russia_code() {
        let input = RegionInput {
            country_code: Some("RU".to_string()),
            country_name: Some("Chechnya".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_geo_region(&input), GeoRegion::Chechnya);
    }

    #[test]
    fn test_precedence_russia_before_europe() {
        let input = RegionInput {
            country_code: Some("RU".to_string()),
            country_name: Some("Germany".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_geo_region(&input), GeoRegion::Russia);
    }

    #[test]
    fn test_parse_region() {
        assert_eq!("europe".parse::<GeoRegion>(), Ok(GeoRegion::Europe));
        assert_eq!(" CHECHNYA ".parse::<GeoRegion>(), Ok(GeoRegion::Chechnya));
        assert!("asia".parse::<GeoRegion>().is_err());
        assert!("".parse::<GeoRegion>().is_err());
    }

    #[test]
    fn test_region_serializes_lowercase() {
        let json = serde_json::to_string(&GeoRegion::Russia).unwrap();
        assert_eq!(json, "\"russia\"");
        for region in GeoRegion::ALL {
            assert_eq!(region.to_string(), region.as_str());
        }
    }

    #[test]
    fn test_region_input_reads_camel_case() {
        let input: RegionInput =
            serde_json::from_str(r#"{"countryCode":"DE","regionCode":null}"#).unwrap();
        assert_eq!(input.country_code.as_deref(), Some("DE"));
        assert_eq!(resolve_geo_region(&input), GeoRegion::Europe);
    }
}
