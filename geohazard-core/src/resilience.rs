//! Resilience score calculation
//!
//! Global invariants enforced:
//! - Deterministic for a fixed hazard assessment
//! - Score always lies in [floor, base], which defaults to [30, 100]

use crate::hazard::{Hazard, HazardLevel};

/// Configurable penalties for the resilience score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResilienceWeights {
    pub base: u8,
    pub high_penalty: u8,
    pub moderate_penalty: u8,
    pub floor: u8,
}

impl Default for ResilienceWeights {
    fn default() -> Self {
        ResilienceWeights {
            base: 100,
            high_penalty: 20,
            moderate_penalty: 10,
            floor: 30,
        }
    }
}

/// Calculate the resilience score with default weights
///
/// Formula:
/// score = clamp(100 - 20 * #high - 10 * #moderate, 30, 100)
pub fn calculate_resilience(hazards: &[Hazard]) -> u8 {
    calculate_resilience_with_weights(hazards, &ResilienceWeights::default())
}

/// Calculate the resilience score with custom weights
pub fn calculate_resilience_with_weights(hazards: &[Hazard], weights: &ResilienceWeights) -> u8 {
    let penalty: i64 = hazards
        .iter()
        .map(|h| match h.level {
            HazardLevel::High => i64::from(weights.high_penalty),
            HazardLevel::Moderate => i64::from(weights.moderate_penalty),
            HazardLevel::Low => 0,
        })
        .sum();

    let raw = i64::from(weights.base) - penalty;
    // clamp panics when min > max
    let floor = i64::from(weights.floor.min(weights.base));
    raw.clamp(floor, i64::from(weights.base)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hazard::HazardKind;

    fn hazard(level: HazardLevel) -> Hazard {
        Hazard::new(HazardKind::Earthquake, level)
    }

    #[test]
    fn test_no_hazards_is_full_score() {
        assert_eq!(calculate_resilience(&[]), 100);
    }

    #[test]
    fn test_manila_baseline() {
        let hazards = vec![
            hazard(HazardLevel::High),
            hazard(HazardLevel::High),
            hazard(HazardLevel::Moderate),
        ];
        assert_eq!(calculate_resilience(&hazards), 50);
    }

    #[test]
    fn test_low_costs_nothing() {
        let hazards = vec![hazard(HazardLevel::Low), hazard(HazardLevel::Low)];
        assert_eq!(calculate_resilience(&hazards), 100);
    }

    #[test]
    fn test_clamped_to_floor() {
        let hazards = vec![hazard(HazardLevel::High); 5];
        assert_eq!(calculate_resilience(&hazards), 30);
    }

    #[test]
    fn test_custom_weights() {
        let weights = ResilienceWeights {
            base: 90,
            high_penalty: 5,
            moderate_penalty: 1,
            floor: 0,
        };
        let hazards = vec![hazard(HazardLevel::High), hazard(HazardLevel::Moderate)];
        assert_eq!(calculate_resilience_with_weights(&hazards, &weights), 84);
    }

    #[test]
    fn test_floor_above_base_does_not_panic() {
        let weights = ResilienceWeights {
            base: 40,
            high_penalty: 20,
            moderate_penalty: 10,
            floor: 60,
        };
        assert_eq!(calculate_resilience_with_weights(&[], &weights), 40);
    }
}
