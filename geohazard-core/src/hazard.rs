//! Hazard classification for a coordinate
//!
//! Global invariants enforced:
//! - Rules are evaluated in fixed order: Earthquake, Typhoon, Flooding, Tsunami, Landslide
//! - Earthquake, Typhoon and Flooding are always emitted
//! - Every emitted level is one of low, moderate, high
//! - Exactly one random draw per classification (the tsunami gate)

use crate::location::Coordinate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hazard type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    Earthquake,
    Typhoon,
    Flooding,
    Tsunami,
    Landslide,
}

impl HazardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKind::Earthquake => "Earthquake",
            HazardKind::Typhoon => "Typhoon",
            HazardKind::Flooding => "Flooding",
            HazardKind::Tsunami => "Tsunami",
            HazardKind::Landslide => "Landslide",
        }
    }
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal severity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardLevel {
    Low,
    Moderate,
    High,
}

impl HazardLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardLevel::Low => "low",
            HazardLevel::Moderate => "moderate",
            HazardLevel::High => "high",
        }
    }
}

impl fmt::Display for HazardLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a hazard assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hazard {
    pub name: HazardKind,
    pub level: HazardLevel,
}

impl Hazard {
    pub fn new(name: HazardKind, level: HazardLevel) -> Self {
        Hazard { name, level }
    }
}

/// Geographic thresholds driving the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct HazardRules {
    /// Reference latitudes of the major fault systems
    pub fault_latitudes: Vec<f64>,
    /// Distance in degrees of latitude counted as "near a fault"
    pub fault_radius_deg: f64,
    /// Open longitude interval of the typhoon belt
    pub typhoon_lon_min: f64,
    pub typhoon_lon_max: f64,
    /// Open latitude interval of the flood-prone band
    pub flood_lat_min: f64,
    pub flood_lat_max: f64,
    /// Tsunami is emitted when a uniform draw in [0, 1) exceeds this value
    pub tsunami_threshold: f64,
    /// Landslide is emitted north of this latitude
    pub landslide_lat_north: f64,
    /// ...or inside this open latitude interval
    pub landslide_lat_min: f64,
    pub landslide_lat_max: f64,
}

impl Default for HazardRules {
    fn default() -> Self {
        HazardRules {
            // Metro Manila and Cebu
            fault_latitudes: vec![14.5995, 10.3157],
            fault_radius_deg: 2.0,
            typhoon_lon_min: 120.0,
            typhoon_lon_max: 126.0,
            flood_lat_min: 10.0,
            flood_lat_max: 15.0,
            tsunami_threshold: 0.5,
            landslide_lat_north: 16.0,
            landslide_lat_min: 6.0,
            landslide_lat_max: 10.0,
        }
    }
}

fn within_open(value: f64, min: f64, max: f64) -> bool {
    value > min && value < max
}

/// Classify hazards at a coordinate with default rules
pub fn identify_hazards<R: Rng + ?Sized>(coord: Coordinate, rng: &mut R) -> Vec<Hazard> {
    identify_hazards_with_rules(coord, &HazardRules::default(), rng)
}

/// Classify hazards at a coordinate with custom rules
pub fn identify_hazards_with_rules<R: Rng + ?Sized>(
    coord: Coordinate,
    rules: &HazardRules,
    rng: &mut R,
) -> Vec<Hazard> {
    let mut hazards = Vec::with_capacity(5);

    let near_fault = rules
        .fault_latitudes
        .iter()
        .any(|fault| (coord.lat - fault).abs() < rules.fault_radius_deg);
    hazards.push(Hazard::new(
        HazardKind::Earthquake,
        if near_fault {
            HazardLevel::High
        } else {
            HazardLevel::Moderate
        },
    ));

    let in_typhoon_belt = within_open(coord.lon, rules.typhoon_lon_min, rules.typhoon_lon_max);
    hazards.push(Hazard::new(
        HazardKind::Typhoon,
        if in_typhoon_belt {
            HazardLevel::High
        } else {
            HazardLevel::Moderate
        },
    ));

    let flood_prone = within_open(coord.lat, rules.flood_lat_min, rules.flood_lat_max);
    hazards.push(Hazard::new(
        HazardKind::Flooding,
        if flood_prone {
            HazardLevel::Moderate
        } else {
            HazardLevel::Low
        },
    ));

    // Stand-in for coastal proximity data; kept random on purpose
    let draw: f64 = rng.gen();
    if draw > rules.tsunami_threshold {
        hazards.push(Hazard::new(HazardKind::Tsunami, HazardLevel::Moderate));
    }

    if coord.lat > rules.landslide_lat_north
        || within_open(coord.lat, rules.landslide_lat_min, rules.landslide_lat_max)
    {
        hazards.push(Hazard::new(HazardKind::Landslide, HazardLevel::Moderate));
    }

    tracing::trace!(lat = coord.lat, lon = coord.lon, count = hazards.len(), "classified hazards");

    hazards
}

/// Look up the level of a hazard kind in an assessment
pub fn level_of(hazards: &[Hazard], kind: HazardKind) -> Option<HazardLevel> {
    hazards.iter().find(|h| h.name == kind).map(|h| h.level)
}
