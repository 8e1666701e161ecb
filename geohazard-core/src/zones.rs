//! Static hazard-zone overlays
//!
//! Each zone is a circle overlay (center, radius, color, label) belonging to a
//! named layer that the session can toggle.

use crate::hazard::HazardLevel;
use crate::location::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Toggleable overlay layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Earthquake,
    Typhoon,
    Flooding,
    Tsunami,
    Landslide,
    Volcano,
}

impl Layer {
    pub const ALL: [Layer; 6] = [
        Layer::Earthquake,
        Layer::Typhoon,
        Layer::Flooding,
        Layer::Tsunami,
        Layer::Landslide,
        Layer::Volcano,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Earthquake => "earthquake",
            Layer::Typhoon => "typhoon",
            Layer::Flooding => "flooding",
            Layer::Tsunami => "tsunami",
            Layer::Landslide => "landslide",
            Layer::Volcano => "volcano",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Layer::ALL
            .into_iter()
            .find(|layer| layer.as_str() == lowered)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown layer '{}' (expected one of: {})",
                    s,
                    Layer::ALL.map(|l| l.as_str()).join(", ")
                )
            })
    }
}

/// Circle overlay marking a known hazard area
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HazardZone {
    pub name: &'static str,
    pub layer: Layer,
    pub center: Coordinate,
    pub radius_m: f64,
    pub color: &'static str,
    pub level: HazardLevel,
}

const fn zone(
    name: &'static str,
    layer: Layer,
    lat: f64,
    lon: f64,
    radius_m: f64,
    color: &'static str,
    level: HazardLevel,
) -> HazardZone {
    HazardZone {
        name,
        layer,
        center: Coordinate { lat, lon },
        radius_m,
        color,
        level,
    }
}

const CATALOG: &[HazardZone] = &[
    zone(
        "West Valley Fault",
        Layer::Earthquake,
        14.6091,
        121.0870,
        5_000.0,
        "#d7301f",
        HazardLevel::High,
    ),
    zone(
        "Philippine Fault Zone (Leyte)",
        Layer::Earthquake,
        11.0500,
        124.9000,
        20_000.0,
        "#fc8d59",
        HazardLevel::High,
    ),
    zone(
        "Eastern Samar typhoon corridor",
        Layer::Typhoon,
        11.6000,
        125.4000,
        60_000.0,
        "#6a51a3",
        HazardLevel::High,
    ),
    zone(
        "Bicol typhoon corridor",
        Layer::Typhoon,
        13.4000,
        123.7000,
        45_000.0,
        "#9e9ac8",
        HazardLevel::Moderate,
    ),
    zone(
        "Marikina River flood plain",
        Layer::Flooding,
        14.6507,
        121.1029,
        3_000.0,
        "#2171b5",
        HazardLevel::High,
    ),
    zone(
        "Pampanga delta",
        Layer::Flooding,
        14.8700,
        120.6500,
        12_000.0,
        "#6baed6",
        HazardLevel::Moderate,
    ),
    zone(
        "Manila Bay coastline",
        Layer::Tsunami,
        14.5300,
        120.9600,
        8_000.0,
        "#1d91c0",
        HazardLevel::Moderate,
    ),
    zone(
        "Cordillera slopes (Baguio)",
        Layer::Landslide,
        16.4023,
        120.5960,
        8_000.0,
        "#8c510a",
        HazardLevel::Moderate,
    ),
    zone(
        "Taal Volcano",
        Layer::Volcano,
        14.0113,
        120.9980,
        14_000.0,
        "#e31a1c",
        HazardLevel::High,
    ),
    zone(
        "Mayon Volcano",
        Layer::Volcano,
        13.2548,
        123.6861,
        10_000.0,
        "#e31a1c",
        HazardLevel::High,
    ),
    zone(
        "Mount Pinatubo",
        Layer::Volcano,
        15.1429,
        120.3496,
        10_000.0,
        "#fd8d3c",
        HazardLevel::Moderate,
    ),
];

/// Every known hazard zone in catalog order
pub fn all_zones() -> &'static [HazardZone] {
    CATALOG
}

/// Zones whose layer passes `is_active`, in catalog order
pub fn zones_in_layers(is_active: impl Fn(Layer) -> bool) -> Vec<HazardZone> {
    CATALOG
        .iter()
        .filter(|z| is_active(z.layer))
        .copied()
        .collect()
}

/// Render zones as a text table
pub fn render_text(zones: &[HazardZone]) -> String {
    let mut output = format!(
        "{:<32} {:<11} {:<9} {:<20} {}\n",
        "ZONE", "LAYER", "LEVEL", "CENTER", "RADIUS"
    );
    for z in zones {
        output.push_str(&format!(
            "{:<32} {:<11} {:<9} {:<20} {:.1} km\n",
            z.name,
            z.layer.as_str(),
            z.level.as_str(),
            z.center.to_string(),
            z.radius_m / 1000.0
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_layer_has_a_zone() {
        for layer in Layer::ALL {
            assert!(
                all_zones().iter().any(|z| z.layer == layer),
                "no zone for {}",
                layer
            );
        }
    }

    #[test]
    fn test_filter_by_layer() {
        let volcanoes = zones_in_layers(|l| l == Layer::Volcano);
        assert_eq!(volcanoes.len(), 3);
        assert!(volcanoes.iter().all(|z| z.layer == Layer::Volcano));
        assert_eq!(volcanoes[0].name, "Taal Volcano");
    }

    #[test]
    fn test_parse_layer() {
        assert_eq!("Volcano".parse::<Layer>().unwrap(), Layer::Volcano);
        assert_eq!(" flooding ".parse::<Layer>().unwrap(), Layer::Flooding);
        assert!("buildings".parse::<Layer>().is_err());
    }

    #[test]
    fn test_render_text_has_row_per_zone() {
        let text = render_text(all_zones());
        assert_eq!(text.lines().count(), all_zones().len() + 1);
        assert!(text.contains("Mayon Volcano"));
    }
}
