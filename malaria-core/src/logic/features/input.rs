//! Raw caller input and its resolved numeric form
//!
//! Every field is optional. Absent (or `null`) fields take the documented
//! default before any scaling happens; an explicit `0` is kept as `0`.

use serde::{Deserialize, Serialize};

use crate::logic::error::ValidationError;

/// Default temperature (°C)
pub const DEFAULT_TEMPERATURE: f64 = 25.0;
/// Default relative humidity (%)
pub const DEFAULT_HUMIDITY: f64 = 50.0;
/// Default rainy day count
pub const DEFAULT_RAINY_DAYS: f64 = 0.0;
/// Default previous-month case count
pub const DEFAULT_PREVIOUS_CASES: f64 = 0.0;

/// A single caller-supplied value before coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawValue {
    /// Coerce to a finite number
    pub fn coerce(&self, field: &str) -> Result<f64, ValidationError> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                ValidationError::NotNumeric {
                    field: field.to_string(),
                    value: format!("{:?}", s),
                }
            })?,
            RawValue::Other(v) => {
                return Err(ValidationError::NotNumeric {
                    field: field.to_string(),
                    value: v.to_string(),
                })
            }
        };

        if !value.is_finite() {
            return Err(ValidationError::NotFinite {
                field: field.to_string(),
                value,
            });
        }
        Ok(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// Prediction request fields, as supplied by a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(default)]
    pub temperature: Option<RawValue>,
    #[serde(default)]
    pub humidity: Option<RawValue>,
    #[serde(default)]
    pub rainy_days: Option<RawValue>,
    #[serde(default)]
    pub previous_cases: Option<RawValue>,
}

impl RawInput {
    pub fn builder() -> RawInputBuilder {
        RawInputBuilder::default()
    }

    /// Apply defaults and coerce every field
    pub fn resolve(&self) -> Result<ClimateReading, ValidationError> {
        Ok(ClimateReading {
            temperature: resolve_field(&self.temperature, "temperature", DEFAULT_TEMPERATURE)?,
            humidity: resolve_field(&self.humidity, "humidity", DEFAULT_HUMIDITY)?,
            rainy_days: resolve_field(&self.rainy_days, "rainy_days", DEFAULT_RAINY_DAYS)?,
            previous_cases: resolve_field(
                &self.previous_cases,
                "previous_cases",
                DEFAULT_PREVIOUS_CASES,
            )?,
        })
    }
}

fn resolve_field(
    value: &Option<RawValue>,
    field: &str,
    default: f64,
) -> Result<f64, ValidationError> {
    match value {
        Some(v) => v.coerce(field),
        None => Ok(default),
    }
}

/// Builder for `RawInput` with named setters
#[derive(Debug, Default)]
pub struct RawInputBuilder {
    input: RawInput,
}

impl RawInputBuilder {
    pub fn temperature(mut self, value: impl Into<RawValue>) -> Self {
        self.input.temperature = Some(value.into());
        self
    }

    pub fn humidity(mut self, value: impl Into<RawValue>) -> Self {
        self.input.humidity = Some(value.into());
        self
    }

    pub fn rainy_days(mut self, value: impl Into<RawValue>) -> Self {
        self.input.rainy_days = Some(value.into());
        self
    }

    pub fn previous_cases(mut self, value: impl Into<RawValue>) -> Self {
        self.input.previous_cases = Some(value.into());
        self
    }

    pub fn build(self) -> RawInput {
        self.input
    }
}

/// Fully resolved input: every feature has a finite value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateReading {
    pub temperature: f64,
    pub humidity: f64,
    pub rainy_days: f64,
    pub previous_cases: f64,
}

impl ClimateReading {
    /// Look a feature up by its layout name
    pub fn value(&self, name: &str) -> Result<f64, ValidationError> {
        match name {
            "temperature" => Ok(self.temperature),
            "humidity" => Ok(self.humidity),
            "rainy_days" => Ok(self.rainy_days),
            "previous_cases" => Ok(self.previous_cases),
            other => Err(ValidationError::UnknownFeature(other.to_string())),
        }
    }
}

impl Default for ClimateReading {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            humidity: DEFAULT_HUMIDITY,
            rainy_days: DEFAULT_RAINY_DAYS,
            previous_cases: DEFAULT_PREVIOUS_CASES,
        }
    }
}
