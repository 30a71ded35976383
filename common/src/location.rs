use std::fmt;

use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parse a profile's `"lat,lon"` string. Anything that is not exactly two
    /// in-range numbers yields `None`.
    pub fn parse(coordinates: &str) -> Option<Self> {
        let (lat, lon) = coordinates.split_once(',')?;
        let latitude: f64 = lat.trim().parse().ok()?;
        let longitude: f64 = lon.trim().parse().ok()?;
        let in_range = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        in_range.then_some(Self::new(latitude, longitude))
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_coordinates() {
        assert_eq!(
            GeoLocation::parse("7.8731, 80.7718"),
            Some(GeoLocation::new(7.8731, 80.7718))
        );
        assert_eq!(
            GeoLocation::parse("39.7456,-97.0892"),
            Some(GeoLocation::new(39.7456, -97.0892))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(GeoLocation::parse(""), None);
        assert_eq!(GeoLocation::parse("Colombo"), None);
        assert_eq!(GeoLocation::parse("1.0,abc"), None);
        assert_eq!(GeoLocation::parse("1,2,3"), None);
        assert_eq!(GeoLocation::parse("95.0,10.0"), None);
    }

    #[test]
    fn test_display_round_trips() {
        let p = GeoLocation::new(6.9271, 79.8612);
        assert_eq!(GeoLocation::parse(&p.to_string()), Some(p));
    }
}
