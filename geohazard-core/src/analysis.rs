//! Analysis orchestration - ties together hazard classification, population lookup, and scoring

use crate::hazard::{self, HazardRules};
use crate::location::Coordinate;
use crate::population;
use crate::report::{LocationReport, INFRASTRUCTURE_LABEL};
use crate::resilience::{self, ResilienceWeights};
use crate::rng::analysis_rng;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Composes the classifier, the population estimator, and the resilience scorer
///
/// Owns the randomness source so callers can pin outcomes with a seed.
pub struct LocationAnalyzer<R: Rng = ChaCha8Rng> {
    rules: HazardRules,
    weights: ResilienceWeights,
    rng: R,
}

impl LocationAnalyzer<ChaCha8Rng> {
    /// Analyzer with default rules, seeded when `seed` is given
    pub fn new(seed: Option<u64>) -> Self {
        LocationAnalyzer::with_rng(analysis_rng(seed))
    }

    /// Analyzer using the rules, weights, and seed of a resolved config
    pub fn from_config(config: &crate::ResolvedConfig) -> Self {
        LocationAnalyzer::with_config(
            config.hazard_rules.clone(),
            config.resilience_weights,
            analysis_rng(config.seed),
        )
    }
}

impl<R: Rng> LocationAnalyzer<R> {
    /// Analyzer with default rules and an injected RNG
    pub fn with_rng(rng: R) -> Self {
        LocationAnalyzer::with_config(HazardRules::default(), ResilienceWeights::default(), rng)
    }

    pub fn with_config(rules: HazardRules, weights: ResilienceWeights, rng: R) -> Self {
        LocationAnalyzer {
            rules,
            weights,
            rng,
        }
    }

    pub fn rules(&self) -> &HazardRules {
        &self.rules
    }

    pub fn weights(&self) -> &ResilienceWeights {
        &self.weights
    }

    /// Build a report for a coordinate
    ///
    /// `place_name` is expected to be resolved by the caller (reverse geocoding).
    /// When it is absent the coordinate label stands in as the report name and
    /// the population estimate is "Unknown".
    pub fn analyze(
        &mut self,
        coordinates: Coordinate,
        place_name: Option<&str>,
    ) -> LocationReport {
        let hazards =
            hazard::identify_hazards_with_rules(coordinates, &self.rules, &mut self.rng);
        let population_estimate = population::estimate_population(place_name, &mut self.rng);
        let resilience_score =
            resilience::calculate_resilience_with_weights(&hazards, &self.weights);

        let name = match place_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => coordinates.label(),
        };

        tracing::debug!(
            name = %name,
            lat = coordinates.lat,
            lon = coordinates.lon,
            score = resilience_score,
            "analyzed location"
        );

        LocationReport {
            name,
            coordinates,
            population_estimate,
            hazards,
            infrastructure: INFRASTRUCTURE_LABEL.to_string(),
            resilience_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hazard::{level_of, HazardKind, HazardLevel};
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_manila_report_without_tsunami() {
        let mut analyzer = LocationAnalyzer::with_rng(StepRng::new(0, 0));
        let report = analyzer.analyze(Coordinate::new(14.5995, 120.9842), Some("Metro Manila"));

        assert_eq!(report.name, "Metro Manila");
        assert_eq!(report.population_estimate, "~13.5M");
        assert_eq!(report.infrastructure, "Moderate");
        assert_eq!(report.hazards.len(), 3);
        assert_eq!(report.resilience_score, 50);
    }

    #[test]
    fn test_manila_report_with_tsunami() {
        let mut analyzer = LocationAnalyzer::with_rng(StepRng::new(u64::MAX, 0));
        let report = analyzer.analyze(Coordinate::new(14.5995, 120.9842), Some("Metro Manila"));

        assert_eq!(level_of(&report.hazards, HazardKind::Tsunami), Some(HazardLevel::Moderate));
        assert_eq!(report.resilience_score, 40);
    }

    #[test]
    fn test_missing_name_uses_coordinate_label() {
        let mut analyzer = LocationAnalyzer::new(Some(3));
        let report = analyzer.analyze(Coordinate::new(7.0731, 125.6128), None);
        assert_eq!(report.name, "7.0731, 125.6128");
        assert_eq!(report.population_estimate, "Unknown");
    }

    #[test]
    fn test_from_config_applies_rules_and_weights() {
        let mut config = crate::ResolvedConfig::defaults().unwrap();
        config.hazard_rules.tsunami_threshold = 1.0;
        config.resilience_weights.high_penalty = 25;
        config.seed = Some(5);

        let mut analyzer = LocationAnalyzer::from_config(&config);
        assert_eq!(analyzer.rules(), &config.hazard_rules);
        assert_eq!(analyzer.weights(), &config.resilience_weights);

        // Two high hazards and one moderate, tsunami never fires
        let report = analyzer.analyze(Coordinate::new(14.5995, 120.9842), Some("Manila"));
        assert_eq!(report.resilience_score, 100 - 25 - 25 - 10);
    }

    #[test]
    fn test_seeded_analyzers_agree() {
        let coord = Coordinate::new(12.8797, 121.7740);
        let a = LocationAnalyzer::new(Some(11)).analyze(coord, Some("Romblon"));
        let b = LocationAnalyzer::new(Some(11)).analyze(coord, Some("Romblon"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_score_always_in_bounds() {
        let mut analyzer = LocationAnalyzer::new(Some(2024));
        for lat in (-90..=90).step_by(5) {
            for lon in (-180..=180).step_by(15) {
                let report = analyzer.analyze(Coordinate::new(lat as f64, lon as f64), None);
                assert!((30..=100).contains(&report.resilience_score));
                assert!(level_of(&report.hazards, HazardKind::Earthquake).is_some());
                assert!(level_of(&report.hazards, HazardKind::Typhoon).is_some());
                assert!(level_of(&report.hazards, HazardKind::Flooding).is_some());
            }
        }
    }
}
