//! Bounded scores and verdict labels.
//!
//! Every probability or score that leaves this crate passes through one of
//! the constructors here, so range enforcement lives in a single place no
//! matter whether the value came from a provider or the synthetic generator.

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::ContentKind;

/// Verdict band thresholds (exclusive lower bounds on `aiProbability`).
pub mod bands {
    pub const LIKELY_AI: f64 = 80.0;
    pub const POSSIBLY_AI: f64 = 60.0;
    pub const UNCERTAIN: f64 = 40.0;
}

/// Comparison difference thresholds (exclusive, in percentage points).
pub mod difference {
    pub const SIGNIFICANT: f64 = 40.0;
    pub const MODERATE: f64 = 20.0;
}

/// A value in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Percent(f64);

impl Percent {
    /// Clamp into `[0, 100]`. NaN maps to zero.
    pub fn new(value: f64) -> Self {
        Self(clamp(value, 0.0, 100.0))
    }

    /// Convert a `[0, 1]` fraction into a percentage.
    pub fn from_fraction(value: f64) -> Self {
        Self::new(clamp(value, 0.0, 1.0) * 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `100 - self`.
    pub fn complement(self) -> Self {
        Self::new(100.0 - self.0)
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Percent::new)
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// A value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Fraction(f64);

impl Fraction {
    /// Clamp into `[0, 1]`. NaN maps to zero.
    pub fn new(value: f64) -> Self {
        Self(clamp(value, 0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Fraction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Fraction::new)
    }
}

/// Clamp `value` into `[min, max]`, mapping NaN to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Human-facing verdict derived from the AI probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    LikelyAi,
    PossiblyAi,
    Uncertain,
    LikelyHuman,
    LikelyAuthentic,
}

impl Verdict {
    /// Classify an AI probability for the given content kind.
    pub fn from_probability(ai_probability: Percent, kind: ContentKind) -> Self {
        match ai_probability.value() {
            p if p > bands::LIKELY_AI => Verdict::LikelyAi,
            p if p > bands::POSSIBLY_AI => Verdict::PossiblyAi,
            p if p > bands::UNCERTAIN => Verdict::Uncertain,
            _ => match kind {
                ContentKind::Text => Verdict::LikelyHuman,
                ContentKind::Image => Verdict::LikelyAuthentic,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::LikelyAi => "Likely AI-Generated",
            Verdict::PossiblyAi => "Possibly AI-Generated",
            Verdict::Uncertain => "Uncertain",
            Verdict::LikelyHuman => "Likely Human-Written",
            Verdict::LikelyAuthentic => "Likely Authentic",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How far a suspected image's score sits from its reference image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difference {
    Significant,
    Moderate,
    Similar,
}

impl Difference {
    pub fn between(suspected: Percent, reference: Percent) -> Self {
        match (suspected.value() - reference.value()).abs() {
            d if d > difference::SIGNIFICANT => Difference::Significant,
            d if d > difference::MODERATE => Difference::Moderate,
            _ => Difference::Similar,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difference::Significant => "Significant Difference",
            Difference::Moderate => "Moderate Difference",
            Difference::Similar => "Similar Scores",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Difference::Significant => "The significant difference between the original and suspected image suggests manipulation or AI generation.",
            Difference::Moderate => "The moderate difference between images may indicate some manipulation.",
            Difference::Similar => "Both images have similar AI probability scores.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_clamps() {
        assert_eq!(Percent::new(-5.0).value(), 0.0);
        assert_eq!(Percent::new(150.0).value(), 100.0);
        assert_eq!(Percent::new(42.5).value(), 42.5);
        assert_eq!(Percent::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn test_percent_from_fraction() {
        assert!((Percent::from_fraction(0.73).value() - 73.0).abs() < 1e-9);
        assert_eq!(Percent::from_fraction(1.7).value(), 100.0);
        assert_eq!(Percent::from_fraction(-0.2).value(), 0.0);
    }

    #[test]
    fn test_complement_sums_to_hundred() {
        for v in [0.0, 12.34, 50.0, 99.999, 100.0] {
            let p = Percent::new(v);
            assert!((p.value() + p.complement().value() - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_percent_deserialize_clamps() {
        let p: Percent = serde_json::from_str("250").unwrap();
        assert_eq!(p.value(), 100.0);
        let f: Fraction = serde_json::from_str("-1.5").unwrap();
        assert_eq!(f.value(), 0.0);
    }

    #[test]
    fn test_verdict_bands() {
        let text = ContentKind::Text;
        assert_eq!(Verdict::from_probability(Percent::new(95.0), text), Verdict::LikelyAi);
        assert_eq!(Verdict::from_probability(Percent::new(80.0), text), Verdict::PossiblyAi);
        assert_eq!(Verdict::from_probability(Percent::new(61.0), text), Verdict::PossiblyAi);
        assert_eq!(Verdict::from_probability(Percent::new(60.0), text), Verdict::Uncertain);
        assert_eq!(Verdict::from_probability(Percent::new(40.0), text), Verdict::LikelyHuman);
        assert_eq!(
            Verdict::from_probability(Percent::new(10.0), ContentKind::Image),
            Verdict::LikelyAuthentic
        );
    }

    #[test]
    fn test_difference_bands() {
        assert_eq!(
            Difference::between(Percent::new(90.0), Percent::new(10.0)),
            Difference::Significant
        );
        assert_eq!(
            Difference::between(Percent::new(30.0), Percent::new(60.0)),
            Difference::Moderate
        );
        assert_eq!(
            Difference::between(Percent::new(50.0), Percent::new(70.0)),
            Difference::Similar
        );
    }
}
