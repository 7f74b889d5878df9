//! Confidence score value object (0-100 scale).

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::ValidationError;

/// How well a learner has grasped a topic, between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ConfidenceScore(u8);

impl ConfidenceScore {
    /// Zero confidence.
    pub const ZERO: Self = Self(0);

    /// Full confidence.
    pub const MAX: Self = Self(100);

    /// Creates a new score, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a score, returning error if out of range.
    pub fn try_new(value: i64) -> Result<Self, ValidationError> {
        if !(0..=100).contains(&value) {
            return Err(ValidationError::out_of_range("confidence_score", 0, 100, value));
        }
        Ok(Self(value as u8))
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the whole tens of the score (`floor(score / 10)`).
    pub fn tens(&self) -> u32 {
        u32::from(self.0 / 10)
    }
}

impl Default for ConfidenceScore {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for ConfidenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// Models sometimes answer with `85.0` or `"85"`; accept any numeric shape in range.
// Fractions are floored so a score never reaches a threshold it did not meet.
impl<'de> Deserialize<'de> for ConfidenceScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let number = match &raw {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| serde::de::Error::custom(format!("invalid confidence score: {}", raw)))?;

        ConfidenceScore::try_new(number.floor() as i64).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_to_100() {
        assert_eq!(ConfidenceScore::new(101).value(), 100);
        assert_eq!(ConfidenceScore::new(255).value(), 100);
    }

    #[test]
    fn try_new_rejects_out_of_range() {
        assert!(ConfidenceScore::try_new(-1).is_err());
        assert!(ConfidenceScore::try_new(101).is_err());
        assert_eq!(ConfidenceScore::try_new(80).unwrap().value(), 80);
    }

    #[test]
    fn tens_floors() {
        assert_eq!(ConfidenceScore::new(85).tens(), 8);
        assert_eq!(ConfidenceScore::new(9).tens(), 0);
        assert_eq!(ConfidenceScore::new(100).tens(), 10);
    }

    #[test]
    fn deserializes_integers_floats_and_strings() {
        let a: ConfidenceScore = serde_json::from_str("85").unwrap();
        let b: ConfidenceScore = serde_json::from_str("72.4").unwrap();
        let c: ConfidenceScore = serde_json::from_str("\"90\"").unwrap();
        assert_eq!(a.value(), 85);
        assert_eq!(b.value(), 72);
        assert_eq!(c.value(), 90);
    }

    #[test]
    fn fractional_scores_are_floored() {
        let just_below: ConfidenceScore = serde_json::from_str("79.5").unwrap();
        let near_max: ConfidenceScore = serde_json::from_str("99.9").unwrap();
        assert_eq!(just_below.value(), 79);
        assert_eq!(near_max.value(), 99);
    }

    #[test]
    fn deserialize_rejects_out_of_range_and_non_numbers() {
        assert!(serde_json::from_str::<ConfidenceScore>("150").is_err());
        assert!(serde_json::from_str::<ConfidenceScore>("true").is_err());
    }

    #[test]
    fn displays_as_percentage() {
        assert_eq!(ConfidenceScore::new(42).to_string(), "42%");
    }
}
