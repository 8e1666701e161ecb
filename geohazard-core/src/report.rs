//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Hazards render in assessment order
//! - JSON output uses snake_case keys

use crate::conversation::ChatMessage;
use crate::hazard::Hazard;
use crate::location::Coordinate;
use serde::{Deserialize, Serialize};

/// Infrastructure rating attached to every report
pub const INFRASTRUCTURE_LABEL: &str = "Moderate";

/// Complete analysis of one selected location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LocationReport {
    pub name: String,
    pub coordinates: Coordinate,
    pub population_estimate: String,
    pub hazards: Vec<Hazard>,
    pub infrastructure: String,
    pub resilience_score: u8,
}

impl LocationReport {
    /// One line per hazard, e.g. "Earthquake: high"
    pub fn hazard_lines(&self) -> Vec<String> {
        self.hazards
            .iter()
            .map(|h| format!("{}: {}", h.name, h.level))
            .collect()
    }
}

/// Render a report as text output
pub fn render_text(report: &LocationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", report.name));
    output.push_str(&format!("{:<14} {}\n", "Coordinates", report.coordinates));
    output.push_str(&format!("{:<14} {}\n", "Population", report.population_estimate));
    output.push_str(&format!("{:<14} {}\n", "Infrastructure", report.infrastructure));
    output.push_str(&format!(
        "{:<14} {}/100\n",
        "Resilience", report.resilience_score
    ));
    output.push_str("\nHAZARD       LEVEL\n");
    for hazard in &report.hazards {
        output.push_str(&format!(
            "{:<12} {}\n",
            hazard.name.as_str(),
            hazard.level.as_str()
        ));
    }

    output
}

/// Render a report as JSON output
pub fn render_json(report: &LocationReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Render a conversation transcript as text, one message per block
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    let mut output = String::new();
    for message in messages {
        output.push_str(&format!("[{}] {}\n", message.role.as_str(), message.content));
        if message.attachment.is_some() {
            output.push_str("       (image attached)\n");
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::hazard::{HazardKind, HazardLevel};

    fn sample_report() -> LocationReport {
        LocationReport {
            name: "Metro Manila".to_string(),
            coordinates: Coordinate::new(14.5995, 120.9842),
            population_estimate: "~13.5M".to_string(),
            hazards: vec![
                Hazard::new(HazardKind::Earthquake, HazardLevel::High),
                Hazard::new(HazardKind::Typhoon, HazardLevel::High),
                Hazard::new(HazardKind::Flooding, HazardLevel::Moderate),
            ],
            infrastructure: INFRASTRUCTURE_LABEL.to_string(),
            resilience_score: 50,
        }
    }

    #[test]
    fn test_render_text_lists_hazards_in_order() {
        let text = render_text(&sample_report());
        assert!(text.starts_with("Metro Manila\n"));
        assert!(text.contains("Resilience     50/100"));
        let quake = text.find("Earthquake").unwrap();
        let typhoon = text.find("Typhoon").unwrap();
        let flood = text.find("Flooding").unwrap();
        assert!(quake < typhoon && typhoon < flood);
    }

    #[test]
    fn test_render_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&sample_report())).unwrap();
        assert_eq!(json["population_estimate"], "~13.5M");
        assert_eq!(json["resilience_score"], 50);
        assert_eq!(json["coordinates"]["lat"], 14.5995);
        assert_eq!(json["hazards"][0]["name"], "Earthquake");
        assert_eq!(json["hazards"][0]["level"], "high");
    }

    #[test]
    fn test_hazard_lines() {
        assert_eq!(
            sample_report().hazard_lines(),
            vec!["Earthquake: high", "Typhoon: high", "Flooding: moderate"]
        );
    }

    #[test]
    fn test_render_transcript() {
        let messages = vec![
            ChatMessage::new(Role::User, "hello"),
            ChatMessage::new(Role::Assistant, "hi"),
        ];
        assert_eq!(render_transcript(&messages), "[user] hello\n[assistant] hi\n");
    }
}
