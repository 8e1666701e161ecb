//! Keyword-driven hazard assistant
//!
//! Replies are selected by an ordered rule chain: each rule owns a set of
//! trigger substrings and a template. The lower-cased message is tested
//! against the rules in order and the first match wins.
//!
//! Global invariants enforced:
//! - Rule order is fixed: population, hazard, solutions, weather, volcano, earthquake
//! - No match yields the fixed capability message
//! - Location-bound topics never invent data when no location is selected

use crate::analysis::LocationAnalyzer;
use crate::location::CurrentLocation;
use crate::report::LocationReport;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Returned by location-bound topics when nothing is selected
pub const SELECT_LOCATION_PROMPT: &str = "Please select a location on the map first, either by clicking anywhere or by searching for a place, and I'll analyze it for you.";

/// Returned when no topic matches
pub const DEFAULT_REPLY: &str = "I'm your disaster resilience assistant. I can estimate the population of a selected area, assess its earthquake, typhoon, flooding, tsunami and landslide hazards, suggest resilience measures, and share background on weather, volcanoes and earthquakes in the Philippines. Select a location and ask away!";

const WEATHER_REPLY: &str = "The Philippines sees around 20 tropical cyclones a year, most of them between June and November. The southwest monsoon (habagat) brings heavy rain from June to September, while the northeast monsoon (amihan) dominates from November to February. Check PAGASA bulletins for current forecasts and typhoon signal levels.";

const VOLCANO_REPLY: &str = "The Philippines has 24 active volcanoes. Taal, Mayon, Pinatubo, Kanlaon and Bulusan are among the most closely monitored. PHIVOLCS publishes alert levels from 0 to 5; permanent danger zones around active craters should stay clear of settlements.";

const EARTHQUAKE_REPLY: &str = "The Philippines sits on the Pacific Ring of Fire. The West Valley Fault running through Metro Manila and the 1,200 km Philippine Fault Zone are the main seismic threats. Buildings should follow the National Structural Code, and households should practice Duck, Cover and Hold drills.";

const RESILIENCE_MEASURES: &str = "1. Retrofit critical buildings to current seismic standards\n\
2. Improve drainage and keep waterways clear to reduce flooding\n\
3. Set up community early warning systems for typhoons and tsunamis\n\
4. Plan and rehearse evacuation routes to higher ground\n\
5. Pre-position emergency supplies, water and medical kits";

/// Conversation topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Population,
    Hazard,
    Solutions,
    Weather,
    Volcano,
    Earthquake,
}

/// Values a template may draw from
pub struct ReplyContext<'a> {
    pub location: Option<&'a CurrentLocation>,
    pub report: Option<&'a LocationReport>,
}

struct Rule {
    topic: Topic,
    triggers: &'static [&'static str],
    needs_report: bool,
    render: fn(&ReplyContext<'_>) -> String,
}

fn population_reply(ctx: &ReplyContext<'_>) -> String {
    match ctx.report {
        Some(report) => format!(
            "Based on my analysis, {} has an estimated population of {}. Population density shapes evacuation planning, shelter capacity and the resources needed during a disaster.",
            report.name, report.population_estimate
        ),
        None => SELECT_LOCATION_PROMPT.to_string(),
    }
}

fn hazard_reply(ctx: &ReplyContext<'_>) -> String {
    let Some(report) = ctx.report else {
        return SELECT_LOCATION_PROMPT.to_string();
    };

    let mut reply = format!("Hazard assessment for {}:\n", report.name);
    for line in report.hazard_lines() {
        reply.push_str(&format!("- {}\n", line));
    }
    let outlook = if report.resilience_score >= 70 {
        "The area is relatively resilient, but preparedness still matters."
    } else if report.resilience_score >= 50 {
        "Resilience is moderate; targeted upgrades would reduce the risk noticeably."
    } else {
        "Resilience is low; preparedness and structural retrofitting should be a priority."
    };
    reply.push_str(&format!(
        "\nResilience score: {}/100. {}",
        report.resilience_score, outlook
    ));
    reply
}

fn solutions_reply(ctx: &ReplyContext<'_>) -> String {
    match ctx.location {
        Some(location) => format!(
            "To strengthen disaster resilience in {}, consider:\n{}",
            location.display_name(),
            RESILIENCE_MEASURES
        ),
        None => format!(
            "To strengthen disaster resilience, consider:\n{}",
            RESILIENCE_MEASURES
        ),
    }
}

fn weather_reply(_: &ReplyContext<'_>) -> String {
    WEATHER_REPLY.to_string()
}

fn volcano_reply(_: &ReplyContext<'_>) -> String {
    VOLCANO_REPLY.to_string()
}

fn earthquake_reply(_: &ReplyContext<'_>) -> String {
    EARTHQUAKE_REPLY.to_string()
}

fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            topic: Topic::Population,
            triggers: &["population", "people", "residents", "inhabitants", "how many"],
            needs_report: true,
            render: population_reply,
        },
        Rule {
            topic: Topic::Hazard,
            triggers: &["hazard", "risk", "danger", "threat", "safe"],
            needs_report: true,
            render: hazard_reply,
        },
        Rule {
            topic: Topic::Solutions,
            triggers: &[
                "solution",
                "help",
                "improve",
                "prepare",
                "mitigat",
                "recommend",
                "what can",
            ],
            needs_report: false,
            render: solutions_reply,
        },
        Rule {
            topic: Topic::Weather,
            triggers: &["weather", "rain", "storm", "typhoon", "climate"],
            needs_report: false,
            render: weather_reply,
        },
        Rule {
            topic: Topic::Volcano,
            triggers: &["volcano", "eruption", "lava", "taal", "mayon"],
            needs_report: false,
            render: volcano_reply,
        },
        Rule {
            topic: Topic::Earthquake,
            triggers: &["earthquake", "quake", "seismic", "fault"],
            needs_report: false,
            render: earthquake_reply,
        },
    ]
}

/// Canned-reply assistant over a fixed keyword rule chain
pub struct AssistantResponder {
    rules: Vec<Rule>,
}

impl Default for AssistantResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl AssistantResponder {
    pub fn new() -> Self {
        AssistantResponder {
            rules: default_rules(),
        }
    }

    fn matching_rule(&self, message: &str) -> Option<&Rule> {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.triggers.iter().any(|t| lowered.contains(t)))
    }

    /// Topic a message resolves to, None for the fallback
    pub fn classify(&self, message: &str) -> Option<Topic> {
        self.matching_rule(message).map(|rule| rule.topic)
    }

    /// Produce the reply for a message
    ///
    /// Location-bound topics analyze `location` through `analyzer` so the
    /// reply carries live hazard, score, and population values.
    pub fn respond<R: Rng>(
        &self,
        message: &str,
        location: Option<&CurrentLocation>,
        analyzer: &mut LocationAnalyzer<R>,
    ) -> String {
        let Some(rule) = self.matching_rule(message) else {
            tracing::debug!("no topic matched, using fallback reply");
            return DEFAULT_REPLY.to_string();
        };
        tracing::debug!(topic = ?rule.topic, "matched assistant topic");

        let report = match (rule.needs_report, location) {
            (true, Some(location)) => {
                Some(analyzer.analyze(location.coordinates(), location.place_name.as_deref()))
            }
            _ => None,
        };

        let ctx = ReplyContext {
            location,
            report: report.as_ref(),
        };
        (rule.render)(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Coordinate;
    use rand::rngs::mock::StepRng;

    fn manila() -> CurrentLocation {
        CurrentLocation::new(Coordinate::new(14.5995, 120.9842), Some("Metro Manila"))
    }

    fn analyzer() -> LocationAnalyzer<StepRng> {
        LocationAnalyzer::with_rng(StepRng::new(0, 0))
    }

    #[test]
    fn test_population_beats_hazard() {
        let responder = AssistantResponder::new();
        let message = "What is the population and hazard risk of this place?";
        assert_eq!(responder.classify(message), Some(Topic::Population));

        let location = manila();
        let reply = responder.respond(message, Some(&location), &mut analyzer());
        assert!(reply.contains("~13.5M"), "got: {}", reply);
    }

    #[test]
    fn test_topic_priority_order() {
        let responder = AssistantResponder::new();
        assert_eq!(responder.classify("Is it SAFE here?"), Some(Topic::Hazard));
        assert_eq!(responder.classify("risk of a typhoon"), Some(Topic::Hazard));
        assert_eq!(responder.classify("help with the storm"), Some(Topic::Solutions));
        assert_eq!(responder.classify("rainy weather"), Some(Topic::Weather));
        assert_eq!(responder.classify("earthquake near Taal"), Some(Topic::Volcano));
        assert_eq!(responder.classify("any seismic activity?"), Some(Topic::Earthquake));
        assert_eq!(responder.classify("hello there"), None);
    }

    #[test]
    fn test_default_reply() {
        let responder = AssistantResponder::new();
        let reply = responder.respond("good morning", Some(&manila()), &mut analyzer());
        assert_eq!(reply, DEFAULT_REPLY);
    }

    #[test]
    fn test_location_bound_topics_need_location() {
        let responder = AssistantResponder::new();
        assert_eq!(
            responder.respond("how many people live here", None, &mut analyzer()),
            SELECT_LOCATION_PROMPT
        );
        assert_eq!(
            responder.respond("hazards?", None, &mut analyzer()),
            SELECT_LOCATION_PROMPT
        );
    }

    #[test]
    fn test_hazard_reply_uses_live_values() {
        let responder = AssistantResponder::new();
        let reply = responder.respond("what hazards are there", Some(&manila()), &mut analyzer());
        assert!(reply.starts_with("Hazard assessment for Metro Manila:"));
        assert!(reply.contains("- Earthquake: high"));
        assert!(reply.contains("- Typhoon: high"));
        assert!(reply.contains("- Flooding: moderate"));
        assert!(reply.contains("Resilience score: 50/100"));
    }

    #[test]
    fn test_solutions_reply_names_place() {
        let responder = AssistantResponder::new();
        let with_location =
            responder.respond("how do we prepare", Some(&manila()), &mut analyzer());
        assert!(with_location.contains("in Metro Manila"));

        let without = responder.respond("how do we prepare", None, &mut analyzer());
        assert!(without.starts_with("To strengthen disaster resilience, consider:"));
    }

    #[test]
    fn test_static_topics_ignore_location() {
        let responder = AssistantResponder::new();
        let a = responder.respond("volcano", None, &mut analyzer());
        let b = responder.respond("volcano", Some(&manila()), &mut analyzer());
        assert_eq!(a, b);
        assert!(a.contains("24 active volcanoes"));
    }
}
