//! Risk tier classification from performance metrics.
//!
//! Each metric present in the record is scored against a static band table,
//! the points are averaged over the factors considered, and the average is
//! mapped onto low / medium / high.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::models::{PerformanceMetrics, RiskLevel};

/// Metric scored by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Volatility,
    StandardDeviation,
    Beta,
    SharpeRatio,
    ValueAtRisk,
    MaxDrawdown,
    Alpha,
}

impl RiskFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFactor::Volatility => "volatility",
            RiskFactor::StandardDeviation => "standard_deviation",
            RiskFactor::Beta => "beta",
            RiskFactor::SharpeRatio => "sharpe_ratio",
            RiskFactor::ValueAtRisk => "value_at_risk",
            RiskFactor::MaxDrawdown => "max_drawdown",
            RiskFactor::Alpha => "alpha",
        }
    }

    fn read(&self, metrics: &PerformanceMetrics) -> Option<f64> {
        match self {
            RiskFactor::Volatility => metrics.volatility,
            RiskFactor::StandardDeviation => metrics.standard_deviation,
            RiskFactor::Beta => metrics.beta,
            RiskFactor::SharpeRatio => metrics.sharpe_ratio,
            RiskFactor::ValueAtRisk => metrics.value_at_risk,
            RiskFactor::MaxDrawdown => metrics.max_drawdown,
            RiskFactor::Alpha => metrics.alpha,
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Strict comparison against a band limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Below,
    Above,
}

/// One row of a factor table: if the value compares against `limit`, score `points`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub comparison: Comparison,
    pub limit: f64,
    pub points: f64,
}

impl Band {
    const fn below(limit: f64, points: f64) -> Self {
        Self {
            comparison: Comparison::Below,
            limit,
            points,
        }
    }

    const fn above(limit: f64, points: f64) -> Self {
        Self {
            comparison: Comparison::Above,
            limit,
            points,
        }
    }

    fn matches(&self, value: f64) -> bool {
        match self.comparison {
            Comparison::Below => value < self.limit,
            Comparison::Above => value > self.limit,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.comparison {
            Comparison::Below => "<",
            Comparison::Above => ">",
        };
        write!(f, "{} {} => {:+}", op, self.limit, self.points)
    }
}

/// Scoring table for a single factor. Bands are checked in order; the first
/// match wins and `otherwise` applies when none match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorScale {
    pub factor: RiskFactor,
    /// Score the absolute value (VaR and drawdown are sign-agnostic)
    pub magnitude: bool,
    pub bands: &'static [Band],
    pub otherwise: f64,
}

impl FactorScale {
    pub fn points(&self, value: f64) -> f64 {
        let value = if self.magnitude { value.abs() } else { value };
        self.bands
            .iter()
            .find(|band| band.matches(value))
            .map(|band| band.points)
            .unwrap_or(self.otherwise)
    }
}

/// The factor tables, in evaluation order.
pub const FACTORS: [FactorScale; 7] = [
    FactorScale {
        factor: RiskFactor::Volatility,
        magnitude: false,
        bands: &[Band::below(0.15, 0.0), Band::below(0.30, 1.5)],
        otherwise: 3.0,
    },
    FactorScale {
        factor: RiskFactor::StandardDeviation,
        magnitude: false,
        bands: &[Band::below(0.10, 0.0), Band::below(0.25, 1.5)],
        otherwise: 3.0,
    },
    FactorScale {
        factor: RiskFactor::Beta,
        magnitude: false,
        bands: &[Band::below(0.8, 0.0), Band::below(1.2, 1.0)],
        otherwise: 2.5,
    },
    FactorScale {
        factor: RiskFactor::SharpeRatio,
        magnitude: false,
        bands: &[Band::above(1.5, 0.0), Band::above(0.8, 1.0), Band::above(0.3, 2.0)],
        otherwise: 3.0,
    },
    FactorScale {
        factor: RiskFactor::ValueAtRisk,
        magnitude: true,
        bands: &[Band::below(0.02, 0.0), Band::below(0.05, 1.5)],
        otherwise: 3.0,
    },
    FactorScale {
        factor: RiskFactor::MaxDrawdown,
        magnitude: true,
        bands: &[Band::below(0.05, 0.0), Band::below(0.15, 1.0)],
        otherwise: 2.0,
    },
    // Adjustment only: not on the 0-3 scale, but still counted as a factor
    FactorScale {
        factor: RiskFactor::Alpha,
        magnitude: false,
        bands: &[Band::above(0.05, -0.5), Band::below(-0.05, 0.5)],
        otherwise: 0.0,
    },
];

/// Averages below this are low risk.
pub const LOW_CEILING: f64 = 1.0;
/// Averages below this (and at or above [`LOW_CEILING`]) are medium risk.
pub const MEDIUM_CEILING: f64 = 2.0;
/// Average used when no factor is present: the middle of the medium band.
pub const NO_DATA_SCORE: f64 = 1.5;

/// Points contributed by one factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorContribution {
    pub factor: RiskFactor,
    pub value: f64,
    pub points: f64,
}

/// Classification result with the score breakdown behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub average_score: f64,
    pub total_score: f64,
    pub contributions: Vec<FactorContribution>,
}

impl RiskAssessment {
    pub fn factors_considered(&self) -> usize {
        self.contributions.len()
    }
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Risk Level:    {}", self.level)?;
        writeln!(
            f,
            "Average Score: {:.3} ({} factors)",
            self.average_score,
            self.factors_considered()
        )?;
        for c in &self.contributions {
            writeln!(f, "  {:<20} {:>10.4} {:>+6.1}", c.factor.as_str(), c.value, c.points)?;
        }
        write!(f, "{}", self.level.description())
    }
}

/// Stateless classifier mapping performance metrics to a risk tier.
pub struct RiskLevelClassifier;

impl RiskLevelClassifier {
    /// Risk tier for a metrics record. Absent (or NaN) fields are skipped.
    pub fn classify(metrics: &PerformanceMetrics) -> RiskLevel {
        Self::assess(metrics).level
    }

    /// Full assessment with per-factor contributions.
    pub fn assess(metrics: &PerformanceMetrics) -> RiskAssessment {
        let contributions: Vec<FactorContribution> = FACTORS
            .iter()
            .filter_map(|scale| {
                let value = scale.factor.read(metrics).filter(|v| !v.is_nan())?;
                Some(FactorContribution {
                    factor: scale.factor,
                    value,
                    points: scale.points(value),
                })
            })
            .collect();

        let total_score: f64 = contributions.iter().map(|c| c.points).sum();
        let average_score = if contributions.is_empty() {
            NO_DATA_SCORE
        } else {
            total_score / contributions.len() as f64
        };
        let level = Self::level_for_score(average_score);

        debug!(
            factors = contributions.len(),
            total_score,
            average_score,
            level = level.as_str(),
            "Classified risk level"
        );

        RiskAssessment {
            level,
            average_score,
            total_score,
            contributions,
        }
    }

    /// Map an average score onto a tier. Upper bounds are exclusive.
    pub fn level_for_score(average_score: f64) -> RiskLevel {
        if average_score < LOW_CEILING {
            RiskLevel::Low
        } else if average_score < MEDIUM_CEILING {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics_with_volatility(volatility: f64) -> PerformanceMetrics {
        PerformanceMetrics {
            volatility: Some(volatility),
            beta: Some(1.0),
            sharpe_ratio: Some(1.0),
            max_drawdown: Some(0.1),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_data_defaults_to_medium() {
        let assessment = RiskLevelClassifier::assess(&PerformanceMetrics::default());
        assert_eq!(assessment.level, RiskLevel::Medium);
        assert_eq!(assessment.average_score, NO_DATA_SCORE);
        assert_eq!(assessment.factors_considered(), 0);
    }

    #[test]
    fn test_average_of_exactly_one_is_medium() {
        // beta 1.0 scores 1 point as the only factor
        let metrics = PerformanceMetrics {
            beta: Some(1.0),
            ..Default::default()
        };
        let assessment = RiskLevelClassifier::assess(&metrics);
        assert_eq!(assessment.average_score, 1.0);
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn test_average_of_exactly_two_is_high() {
        // drawdown 0.2 scores 2, sharpe 0.5 scores 2
        let metrics = PerformanceMetrics {
            max_drawdown: Some(-0.2),
            sharpe_ratio: Some(0.5),
            ..Default::default()
        };
        let assessment = RiskLevelClassifier::assess(&metrics);
        assert_eq!(assessment.average_score, 2.0);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_band_edges_are_strict() {
        let volatility = &FACTORS[0];
        assert_eq!(volatility.points(0.1499), 0.0);
        assert_eq!(volatility.points(0.15), 1.5);
        assert_eq!(volatility.points(0.30), 3.0);

        let sharpe = &FACTORS[3];
        assert_eq!(sharpe.points(1.5), 1.0);
        assert_eq!(sharpe.points(0.8), 2.0);
        assert_eq!(sharpe.points(0.3), 3.0);
        assert_eq!(sharpe.points(-1.0), 3.0);
    }

    #[test]
    fn test_magnitude_factors_ignore_sign() {
        let var = &FACTORS[4];
        assert_eq!(var.points(-0.03), 1.5);
        assert_eq!(var.points(0.03), 1.5);

        let drawdown = &FACTORS[5];
        assert_eq!(drawdown.points(-0.04), 0.0);
        assert_eq!(drawdown.points(-0.3), 2.0);
    }

    #[test]
    fn test_alpha_adjusts_and_counts() {
        let alpha = &FACTORS[6];
        assert_eq!(alpha.points(0.06), -0.5);
        assert_eq!(alpha.points(-0.06), 0.5);
        assert_eq!(alpha.points(0.05), 0.0);

        // 1.5 volatility points over two factors (alpha adds 0 but counts)
        let metrics = PerformanceMetrics {
            volatility: Some(0.2),
            alpha: Some(0.01),
            ..Default::default()
        };
        let assessment = RiskLevelClassifier::assess(&metrics);
        assert_eq!(assessment.factors_considered(), 2);
        assert_eq!(assessment.average_score, 0.75);
        assert_eq!(assessment.level, RiskLevel::Low);
    }

    #[test]
    fn test_increasing_volatility_never_lowers_tier() {
        let levels: Vec<RiskLevel> = [0.10, 0.20, 0.40]
            .iter()
            .map(|&v| RiskLevelClassifier::classify(&metrics_with_volatility(v)))
            .collect();

        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
        // 3 / 4, 4.5 / 4, 6 / 4
        assert_eq!(levels, vec![RiskLevel::Low, RiskLevel::Medium, RiskLevel::Medium]);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let metrics = metrics_with_volatility(0.35);
        let first = RiskLevelClassifier::classify(&metrics);
        let second = RiskLevelClassifier::classify(&metrics);
        assert_eq!(first, second);
        assert_eq!(metrics, metrics_with_volatility(0.35));
    }

    #[test]
    fn test_nan_fields_are_skipped() {
        let metrics = PerformanceMetrics {
            volatility: Some(f64::NAN),
            beta: Some(0.5),
            ..Default::default()
        };
        let assessment = RiskLevelClassifier::assess(&metrics);
        assert_eq!(assessment.factors_considered(), 1);
        assert_eq!(assessment.level, RiskLevel::Low);
    }

    #[test]
    fn test_extreme_values() {
        let metrics = PerformanceMetrics {
            volatility: Some(5.0),
            standard_deviation: Some(4.0),
            beta: Some(3.0),
            sharpe_ratio: Some(-10.0),
            value_at_risk: Some(-2.0),
            max_drawdown: Some(-0.9),
            alpha: Some(-0.5),
            ..Default::default()
        };
        // (3 + 3 + 2.5 + 3 + 3 + 2 + 0.5) / 7
        let assessment = RiskLevelClassifier::assess(&metrics);
        assert_eq!(assessment.total_score, 17.0);
        assert_eq!(assessment.level, RiskLevel::High);
    }
}
