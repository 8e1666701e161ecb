//! GeoJSON rendering for map surfaces
//!
//! Circle overlays are emitted as Point features carrying `radius_m` and
//! `color`, the shape most tile-map widgets accept for circle layers.
//! GeoJSON positions are `[lon, lat]`.

use crate::location::Coordinate;
use crate::report::LocationReport;
use crate::session::Marker;
use crate::zones::HazardZone;
use serde_json::{json, Value};

fn point(coord: Coordinate) -> Value {
    json!({
        "type": "Point",
        "coordinates": [coord.lon, coord.lat],
    })
}

/// Feature for a hazard zone circle
pub fn zone_feature(zone: &HazardZone) -> Value {
    json!({
        "type": "Feature",
        "geometry": point(zone.center),
        "properties": {
            "kind": "zone",
            "label": zone.name,
            "layer": zone.layer.as_str(),
            "level": zone.level.as_str(),
            "radius_m": zone.radius_m,
            "color": zone.color,
        },
    })
}

/// Feature for a location marker
pub fn marker_feature(marker: &Marker) -> Value {
    json!({
        "type": "Feature",
        "geometry": point(marker.coordinates),
        "properties": {
            "kind": "marker",
            "label": marker.label,
        },
    })
}

/// Feature for an analyzed location, carrying the full report as properties
pub fn report_feature(report: &LocationReport) -> Value {
    let hazards: Vec<Value> = report
        .hazards
        .iter()
        .map(|h| json!({ "name": h.name.as_str(), "level": h.level.as_str() }))
        .collect();

    json!({
        "type": "Feature",
        "geometry": point(report.coordinates),
        "properties": {
            "kind": "report",
            "label": report.name,
            "population_estimate": report.population_estimate,
            "infrastructure": report.infrastructure,
            "resilience_score": report.resilience_score,
            "hazards": hazards,
        },
    })
}

/// Wrap features into a FeatureCollection
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Render a FeatureCollection for zones, markers, and an optional report
pub fn render_map(
    zones: &[HazardZone],
    markers: &[Marker],
    report: Option<&LocationReport>,
) -> String {
    let mut features: Vec<Value> = zones.iter().map(zone_feature).collect();
    features.extend(markers.iter().map(marker_feature));
    if let Some(report) = report {
        features.push(report_feature(report));
    }
    serde_json::to_string_pretty(&feature_collection(features))
        .unwrap_or_else(|_| r#"{"type":"FeatureCollection","features":[]}"#.to_string())
}
