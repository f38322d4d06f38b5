//! Risk Classifier
//!
//! Maps the network's probability (0-100) onto a tier, a recommendation,
//! a confidence label and, when the historical case ceiling is known, an
//! absolute case estimate.
//!
//! Tier boundaries are half-open: `[0,20) Low`, `[20,50) Moderate`,
//! `[50,80) High`, `[80,100] Very High`. Confidence is `High` strictly
//! outside `[20, 80]`, so both 20 and 80 report `Moderate` confidence.

use serde::{Deserialize, Serialize};

/// Lower bound of the Moderate tier
pub const MODERATE_FROM: f64 = 20.0;
/// Lower bound of the High tier
pub const HIGH_FROM: f64 = 50.0;
/// Lower bound of the Very High tier
pub const VERY_HIGH_FROM: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskTier {
    pub fn from_probability(probability: f64) -> Self {
        if probability < MODERATE_FROM {
            RiskTier::Low
        } else if probability < HIGH_FROM {
            RiskTier::Moderate
        } else if probability < VERY_HIGH_FROM {
            RiskTier::High
        } else {
            RiskTier::VeryHigh
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskTier::Low => "Maintain standard prevention measures and surveillance.",
            RiskTier::Moderate => "Increase surveillance and vector control.",
            RiskTier::High => "Prioritize testing, treatment and community measures.",
            RiskTier::VeryHigh => "Urgent public health response needed.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
            RiskTier::VeryHigh => "Very High",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Moderate,
}

impl Confidence {
    pub fn from_probability(probability: f64) -> Self {
        if probability < MODERATE_FROM || probability > VERY_HIGH_FROM {
            Confidence::High
        } else {
            Confidence::Moderate
        }
    }
}

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 0-100, rounded to two decimals
    pub probability: f64,
    pub risk_level: RiskTier,
    pub recommendation: String,
    pub model_confidence: Confidence,
    /// `None` when no case ceiling is known; never a stand-in zero
    pub predicted_cases: Option<u64>,
    pub max_cases_reference: Option<f64>,
}

/// Classify a probability in percent
///
/// Tier, confidence and case estimate use the unrounded value; only the
/// reported `probability` is rounded.
pub fn classify(probability: f64, max_cases: Option<f64>) -> PredictionResult {
    let probability = probability.clamp(0.0, 100.0);
    let tier = RiskTier::from_probability(probability);

    let predicted_cases =
        max_cases.map(|max| ((probability / 100.0) * max).round_ties_even().max(0.0) as u64);

    PredictionResult {
        probability: round2(probability),
        risk_level: tier,
        recommendation: tier.recommendation().to_string(),
        model_confidence: Confidence::from_probability(probability),
        predicted_cases,
        max_cases_reference: max_cases,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_fall_to_upper_interval_start() {
        assert_eq!(RiskTier::from_probability(0.0), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(19.999), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(20.0), RiskTier::Moderate);
        assert_eq!(RiskTier::from_probability(49.999), RiskTier::Moderate);
        assert_eq!(RiskTier::from_probability(50.0), RiskTier::High);
        assert_eq!(RiskTier::from_probability(79.999), RiskTier::High);
        assert_eq!(RiskTier::from_probability(80.0), RiskTier::VeryHigh);
        assert_eq!(RiskTier::from_probability(100.0), RiskTier::VeryHigh);
    }

    #[test]
    fn test_tiers_are_ordered() {
        assert!(RiskTier::Low < RiskTier::Moderate);
        assert!(RiskTier::High < RiskTier::VeryHigh);
    }

    #[test]
    fn test_confidence_band() {
        assert_eq!(Confidence::from_probability(19.99), Confidence::High);
        assert_eq!(Confidence::from_probability(20.0), Confidence::Moderate);
        assert_eq!(Confidence::from_probability(50.0), Confidence::Moderate);
        assert_eq!(Confidence::from_probability(80.0), Confidence::Moderate);
        assert_eq!(Confidence::from_probability(80.0001), Confidence::High);
    }

    #[test]
    fn test_tiers_and_confidence_sweep() {
        for i in 0..=1000 {
            let p = i as f64 / 10.0;
            let result = classify(p, None);
            let expected_tier = if p < 20.0 {
                RiskTier::Low
            } else if p < 50.0 {
                RiskTier::Moderate
            } else if p < 80.0 {
                RiskTier::High
            } else {
                RiskTier::VeryHigh
            };
            assert_eq!(result.risk_level, expected_tier, "p={}", p);
            assert_eq!(result.recommendation, expected_tier.recommendation());
            assert_eq!(
                result.model_confidence == Confidence::High,
                p < 20.0 || p > 80.0,
                "p={}",
                p
            );
        }
    }

    #[test]
    fn test_no_ceiling_means_unknown_cases() {
        let result = classify(42.0, None);
        assert_eq!(result.predicted_cases, None);
        assert_eq!(result.max_cases_reference, None);
    }

    #[test]
    fn test_case_estimate() {
        let result = classify(37.5, Some(200.0));
        assert_eq!(result.predicted_cases, Some(75));
        assert_eq!(result.max_cases_reference, Some(200.0));

        assert_eq!(classify(0.0, Some(200.0)).predicted_cases, Some(0));
        assert_eq!(classify(100.0, Some(200.0)).predicted_cases, Some(200));
    }

    #[test]
    fn test_probability_rounding() {
        assert_eq!(classify(33.33333, None).probability, 33.33);
        assert_eq!(classify(66.666, None).probability, 66.67);
    }

    #[test]
    fn test_probability_ties_round_to_even() {
        assert_eq!(classify(0.125, None).probability, 0.12);
        assert_eq!(classify(0.375, None).probability, 0.38);
        assert_eq!(classify(0.625, None).probability, 0.62);
    }

    #[test]
    fn test_probability_is_clamped() {
        assert_eq!(classify(-3.0, None).probability, 0.0);
        assert_eq!(classify(130.0, None).probability, 100.0);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(classify(85.0, None)).unwrap();
        assert_eq!(json["risk_level"], "Very High");
        assert_eq!(json["model_confidence"], "High");
        assert!(json["predicted_cases"].is_null());
        assert!(json["max_cases_reference"].is_null());
    }
}
