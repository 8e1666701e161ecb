//! geohazard core library - location hazard analysis and a keyword-driven hazard assistant

#![deny(warnings)]

// Global invariants enforced in this crate:
// - All randomness flows through an injected, seedable RNG
// - No global mutable state; session state lives in `Session`
// - Network access only through the `Geocoder` trait
// - Scores and levels stay inside their documented ranges

pub mod analysis;
pub mod assistant;
pub mod config;
pub mod conversation;
pub mod geocode;
pub mod geojson;
pub mod hazard;
pub mod image;
pub mod location;
pub mod population;
pub mod report;
pub mod resilience;
pub mod rng;
pub mod session;
pub mod zones;

pub use analysis::LocationAnalyzer;
pub use assistant::AssistantResponder;
pub use config::ResolvedConfig;
pub use conversation::{ChatMessage, ConversationStore, Role};
pub use geocode::{GeocodeError, Geocoder, NominatimClient, Place};
pub use location::{Coordinate, CurrentLocation};
pub use report::{render_json, render_text, LocationReport};
pub use session::Session;

/// Resolve a display name for a coordinate when the caller has none
///
/// Lookup failures are logged and treated as "no name": the analysis still
/// runs with the coordinate label.
pub fn resolve_place_name(
    geocoder: &dyn Geocoder,
    coordinates: Coordinate,
    place_name: Option<String>,
) -> Option<String> {
    if let Some(name) = place_name.filter(|n| !n.trim().is_empty()) {
        return Some(name);
    }

    match geocoder.reverse(coordinates) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(
                error = %e,
                lat = coordinates.lat,
                lon = coordinates.lon,
                "reverse geocoding failed"
            );
            None
        }
    }
}

/// Outcome of a place search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// First candidate was selected and analyzed
    Found(Place),
    /// Service answered with no candidates
    NotFound,
}

/// Forward-geocode a query and make the best candidate the session's location
///
/// An empty result leaves the session untouched.
pub fn search_and_select<R: rand::Rng>(
    geocoder: &dyn Geocoder,
    query: &str,
    session: &mut Session,
    analyzer: &mut LocationAnalyzer<R>,
) -> Result<SearchOutcome, GeocodeError> {
    let places = geocoder.search(query)?;
    let Some(place) = places.into_iter().next() else {
        tracing::debug!(query, "no search results");
        return Ok(SearchOutcome::NotFound);
    };

    session.select_location(place.coordinates, Some(place.display_name.as_str()), analyzer);
    Ok(SearchOutcome::Found(place))
}
