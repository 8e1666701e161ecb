//! Population bucket lookup by place name

use rand::seq::SliceRandom;
use rand::Rng;

/// Returned when no place name is available
pub const UNKNOWN_POPULATION: &str = "Unknown";

/// Known cities, checked in order; first case-insensitive substring match wins
const KNOWN_CITIES: &[(&str, &str)] = &[
    ("manila", "~13.5M"),
    ("quezon", "~2.9M"),
    ("davao", "~1.8M"),
    ("cebu", "~964K"),
    ("baguio", "~366K"),
];

/// Fallback buckets for unmatched names, chosen uniformly
pub const FALLBACK_BUCKETS: &[&str] = &["10K-50K", "50K-100K", "100K-500K", "500K-1M"];

/// Look up a fixed bucket for a known city
pub fn known_population(place_name: &str) -> Option<&'static str> {
    let lowered = place_name.to_lowercase();
    KNOWN_CITIES
        .iter()
        .find(|(city, _)| lowered.contains(city))
        .map(|(_, bucket)| *bucket)
}

/// Estimate the population bucket of a place
///
/// Absent or blank names yield [`UNKNOWN_POPULATION`]. Unmatched names draw one
/// of [`FALLBACK_BUCKETS`] from `rng`.
pub fn estimate_population<R: Rng + ?Sized>(place_name: Option<&str>, rng: &mut R) -> String {
    let name = match place_name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => return UNKNOWN_POPULATION.to_string(),
    };

    if let Some(bucket) = known_population(name) {
        return bucket.to_string();
    }

    FALLBACK_BUCKETS
        .choose(rng)
        .copied()
        .unwrap_or(UNKNOWN_POPULATION)
        .to_string()
}
