//! Fixed-range normalization
//!
//! Used only when no scaler artifact exists. The constants approximate the
//! climate ranges seen in the field and never change between calls.

use serde::{Deserialize, Serialize};

use super::to_network_value;
use crate::logic::error::ValidationError;
use crate::logic::features::{ClimateReading, FeatureVector, FEATURE_LAYOUT};

/// How a single feature is mapped into the network's range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RangeRule {
    /// `(value - min) / (max - min)`, not clamped
    MinMax { min: f64, max: f64 },
    /// `min(value / cap, 1.0)`
    Capped { cap: f64 },
}

impl RangeRule {
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            RangeRule::MinMax { min, max } => (value - min) / (max - min),
            RangeRule::Capped { cap } => (value / cap).min(1.0),
        }
    }
}

/// Rules in `FEATURE_LAYOUT` order
pub const FIXED_RANGE_RULES: [RangeRule; 4] = [
    RangeRule::MinMax { min: 15.0, max: 35.0 }, // temperature
    RangeRule::MinMax { min: 30.0, max: 90.0 }, // humidity
    RangeRule::Capped { cap: 30.0 },            // rainy_days
    RangeRule::Capped { cap: 100.0 },           // previous_cases
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedRangeScaler;

impl FixedRangeScaler {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, reading: &ClimateReading) -> Result<FeatureVector, ValidationError> {
        let raw = [
            reading.temperature,
            reading.humidity,
            reading.rainy_days,
            reading.previous_cases,
        ];

        let values = FEATURE_LAYOUT
            .iter()
            .zip(raw.iter().zip(FIXED_RANGE_RULES.iter()))
            .map(|(name, (value, rule))| to_network_value(name, *value, rule.apply(*value)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureVector::new(FEATURE_LAYOUT, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_COUNT;

    #[test]
    fn test_rules_cover_layout() {
        assert_eq!(FIXED_RANGE_RULES.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_reference_reading() {
        let reading = ClimateReading {
            temperature: 28.0,
            humidity: 75.0,
            rainy_days: 5.0,
            previous_cases: 0.0,
        };
        let v = FixedRangeScaler::new().transform(&reading).unwrap();
        let expected = [0.65f32, 0.75, 5.0 / 30.0, 0.0];
        for (got, want) in v.values.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "{} != {}", got, want);
        }
    }

    #[test]
    fn test_counts_are_capped() {
        let reading = ClimateReading {
            rainy_days: 45.0,
            previous_cases: 500.0,
            ..Default::default()
        };
        let v = FixedRangeScaler::new().transform(&reading).unwrap();
        assert_eq!(v.get(2), Some(1.0));
        assert_eq!(v.get(3), Some(1.0));
    }

    #[test]
    fn test_ranges_are_not_clamped() {
        let reading = ClimateReading {
            temperature: 40.0,
            ..Default::default()
        };
        let v = FixedRangeScaler::new().transform(&reading).unwrap();
        assert_eq!(v.get(0), Some(1.25));
    }

    #[test]
    fn test_huge_previous_cases_stay_capped() {
        let reading = ClimateReading {
            previous_cases: 1.0e300,
            ..Default::default()
        };
        let v = FixedRangeScaler::new().transform(&reading).unwrap();
        assert_eq!(v.get(3), Some(1.0));
    }

    #[test]
    fn test_min_max_overflow_is_rejected() {
        let reading = ClimateReading {
            humidity: -1.0e300,
            ..Default::default()
        };
        let err = FixedRangeScaler::new().transform(&reading).unwrap_err();
        assert!(matches!(err, ValidationError::NotFinite { ref field, .. } if field == "humidity"));
    }
}
