//! Coordinates and the session's current location

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Coordinate { lat, lon }
    }

    /// Label used when no place name could be resolved
    pub fn label(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Most recently selected point, used as implicit context for assistant replies
///
/// Overwritten by every click or search; never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentLocation {
    pub lat: f64,
    pub lon: f64,
    /// Resolved place name, None when the point is unnamed
    pub place_name: Option<String>,
}

impl CurrentLocation {
    /// Blank names are stored as None
    pub fn new(coordinates: Coordinate, place_name: Option<&str>) -> Self {
        CurrentLocation {
            lat: coordinates.lat,
            lon: coordinates.lon,
            place_name: place_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }

    pub fn coordinates(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    /// Place name, or the coordinate label for unnamed points
    pub fn display_name(&self) -> String {
        self.place_name
            .clone()
            .unwrap_or_else(|| self.coordinates().label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_uses_four_decimals() {
        let coord = Coordinate::new(14.599512, 120.984222);
        assert_eq!(coord.label(), "14.5995, 120.9842");
        assert_eq!(coord.to_string(), "14.5995, 120.9842");
    }

    #[test]
    fn test_current_location_round_trips_coordinates() {
        let loc = CurrentLocation::new(Coordinate::new(10.3157, 123.8854), Some("Cebu City"));
        assert_eq!(loc.coordinates(), Coordinate::new(10.3157, 123.8854));
        assert_eq!(loc.place_name.as_deref(), Some("Cebu City"));
        assert_eq!(loc.display_name(), "Cebu City");
    }

    #[test]
    fn test_unnamed_location_displays_label() {
        let loc = CurrentLocation::new(Coordinate::new(9.0, 118.0), Some("  "));
        assert_eq!(loc.place_name, None);
        assert_eq!(loc.display_name(), "9.0000, 118.0000");
    }
}
