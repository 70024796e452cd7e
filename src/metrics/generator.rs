//! Synthetic risk metrics for backtest results.
//!
//! Given a strategy archetype and the three summary figures of a backtest
//! (total return, max drawdown, win rate) this produces a full, internally
//! consistent set of risk metrics:
//! - Volatility from archetype base ranges, adjusted by return and drawdown
//! - Standard deviation as a distinct estimate around that volatility
//! - Beta and alpha scaled around archetype bases
//! - Sharpe ratio and a parametric one-day VaR derived from the above

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{ArchetypeFamily, PerformanceMetrics, StrategyArchetype};

use super::random::{RandomSource, RngSource};
use super::GeneratorConfig;

/// Uniform sampling ranges for one archetype family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseRanges {
    pub volatility: (f64, f64),
    pub beta: (f64, f64),
    pub alpha: (f64, f64),
}

/// Base ranges per family.
pub const FAMILY_RANGES: [(ArchetypeFamily, BaseRanges); 4] = [
    (
        ArchetypeFamily::Income,
        BaseRanges {
            volatility: (0.08, 0.15),
            beta: (0.6, 1.0),
            alpha: (0.01, 0.04),
        },
    ),
    (
        ArchetypeFamily::Spread,
        BaseRanges {
            volatility: (0.12, 0.25),
            beta: (0.7, 1.3),
            alpha: (-0.01, 0.03),
        },
    ),
    (
        ArchetypeFamily::Directional,
        BaseRanges {
            volatility: (0.25, 0.50),
            beta: (1.2, 2.0),
            alpha: (-0.02, 0.04),
        },
    ),
    (
        ArchetypeFamily::Default,
        BaseRanges {
            volatility: (0.15, 0.30),
            beta: (0.8, 1.6),
            alpha: (0.00, 0.04),
        },
    ),
];

impl BaseRanges {
    pub fn for_family(family: ArchetypeFamily) -> BaseRanges {
        FAMILY_RANGES
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, ranges)| *ranges)
            .unwrap_or(FAMILY_RANGES[3].1)
    }
}

/// Multiplier range for standard deviation relative to volatility.
const STD_DEV_SPREAD: (f64, f64) = (0.8, 1.2);
/// Multiplier range applied to the sampled base beta.
const BETA_SPREAD: (f64, f64) = (0.9, 1.1);
/// Multiplier range applied to the sampled base alpha.
const ALPHA_SPREAD: (f64, f64) = (0.5, 1.5);

/// The six generated risk figures, already rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRiskMetrics {
    pub volatility: f64,
    pub standard_deviation: f64,
    pub beta: f64,
    pub alpha: f64,
    pub sharpe_ratio: f64,
    pub value_at_risk: f64,
}

impl GeneratedRiskMetrics {
    /// Write the generated figures into a performance record, leaving the
    /// summary fields untouched.
    pub fn apply_to(&self, metrics: &mut PerformanceMetrics) {
        metrics.volatility = Some(self.volatility);
        metrics.standard_deviation = Some(self.standard_deviation);
        metrics.beta = Some(self.beta);
        metrics.alpha = Some(self.alpha);
        metrics.sharpe_ratio = Some(self.sharpe_ratio);
        metrics.value_at_risk = Some(self.value_at_risk);
    }
}

/// Round half up (toward positive infinity) to `decimals` places.
///
/// Values too large to scale without overflowing are returned unchanged.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor + 0.5;
    if !scaled.is_finite() {
        return value;
    }
    scaled.floor() / factor
}

/// Good returns compress assumed volatility, poor returns inflate it.
pub fn return_adjustment(total_return: f64) -> f64 {
    if total_return > 0.10 {
        0.9
    } else if total_return < -0.05 {
        1.2
    } else {
        1.0
    }
}

/// Deep drawdowns inflate assumed volatility, shallow ones compress it.
pub fn drawdown_adjustment(max_drawdown: f64) -> f64 {
    let depth = max_drawdown.abs();
    if depth > 0.15 {
        1.3
    } else if depth < 0.05 {
        0.8
    } else {
        1.0
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Generator for archetype-appropriate synthetic risk metrics.
#[derive(Debug, Clone, Default)]
pub struct RiskMetricsGenerator {
    config: GeneratorConfig,
}

impl RiskMetricsGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate metrics with a fresh entropy-seeded source.
    pub fn generate(
        &self,
        archetype: &StrategyArchetype,
        total_return: f64,
        max_drawdown: f64,
        win_rate: f64,
    ) -> GeneratedRiskMetrics {
        let mut source = RngSource::from_entropy();
        self.generate_with(&mut source, archetype, total_return, max_drawdown, win_rate)
    }

    /// Generate metrics drawing every random value from `source`.
    ///
    /// Never fails: non-finite inputs count as zero and `win_rate` is clamped
    /// to `[0, 1]`.
    pub fn generate_with<R: RandomSource + ?Sized>(
        &self,
        source: &mut R,
        archetype: &StrategyArchetype,
        total_return: f64,
        max_drawdown: f64,
        win_rate: f64,
    ) -> GeneratedRiskMetrics {
        let total_return = finite_or_zero(total_return);
        let max_drawdown = finite_or_zero(max_drawdown);
        let win_rate = finite_or_zero(win_rate).clamp(0.0, 1.0);

        let family = archetype.family();
        let ranges = BaseRanges::for_family(family);

        let base_volatility = source.uniform(ranges.volatility.0, ranges.volatility.1);
        let base_beta = source.uniform(ranges.beta.0, ranges.beta.1);
        let base_alpha = source.uniform(ranges.alpha.0, ranges.alpha.1);

        let volatility = (base_volatility
            * return_adjustment(total_return)
            * drawdown_adjustment(max_drawdown))
        .max(0.0);
        let standard_deviation =
            (volatility * source.uniform(STD_DEV_SPREAD.0, STD_DEV_SPREAD.1)).max(0.0);
        let beta = base_beta * source.uniform(BETA_SPREAD.0, BETA_SPREAD.1);
        let alpha = base_alpha * source.uniform(ALPHA_SPREAD.0, ALPHA_SPREAD.1);

        let sharpe_ratio = if standard_deviation > 0.0 {
            (total_return - self.config.risk_free_rate) / standard_deviation
        } else {
            0.0
        };

        // Annual volatility next to a daily return term; volatility is not
        // rescaled by sqrt(trading days).
        let value_at_risk = -(volatility * self.config.var_z_score
            + total_return / self.config.trading_days_per_year);

        debug!(
            archetype = %archetype,
            family = family.as_str(),
            total_return,
            max_drawdown,
            win_rate,
            base_volatility,
            volatility,
            "Generated synthetic risk metrics"
        );

        GeneratedRiskMetrics {
            volatility: round_half_up(volatility, 4),
            standard_deviation: round_half_up(standard_deviation, 4),
            beta: round_half_up(beta, 2),
            alpha: round_half_up(alpha, 4),
            sharpe_ratio: round_half_up(sharpe_ratio, 2),
            value_at_risk: round_half_up(value_at_risk, 4),
        }
    }

    /// Generate from a performance record; absent summary figures count as zero.
    pub fn generate_for<R: RandomSource + ?Sized>(
        &self,
        source: &mut R,
        archetype: &StrategyArchetype,
        performance: &PerformanceMetrics,
    ) -> GeneratedRiskMetrics {
        self.generate_with(
            source,
            archetype,
            performance.total_return.unwrap_or(0.0),
            performance.max_drawdown.unwrap_or(0.0),
            performance.win_rate.unwrap_or(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::random::FixedFraction;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn has_at_most_decimals(value: f64, decimals: u32) -> bool {
        let factor = 10f64.powi(decimals as i32);
        close((value * factor).round() / factor, value)
    }

    #[test]
    fn test_fixed_source_is_deterministic() {
        let generator = RiskMetricsGenerator::default();
        let archetype = StrategyArchetype::IronCondor;

        let mut source = FixedFraction::midpoint();
        let a = generator.generate_with(&mut source, &archetype, 0.156, 0.08, 0.73);
        let b = generator.generate_with(&mut source, &archetype, 0.156, 0.08, 0.73);

        assert_eq!(a, b);
    }

    #[test]
    fn test_seeded_source_is_deterministic() {
        let generator = RiskMetricsGenerator::default();
        let archetype = StrategyArchetype::Scalping;

        let a = generator.generate_with(&mut RngSource::seeded(99), &archetype, -0.1, 0.2, 0.4);
        let b = generator.generate_with(&mut RngSource::seeded(99), &archetype, -0.1, 0.2, 0.4);

        assert_eq!(a, b);
    }

    #[test]
    fn test_covered_calls_midpoint_scenario() {
        let generator = RiskMetricsGenerator::default();
        let metrics = generator.generate_with(
            &mut FixedFraction::midpoint(),
            &StrategyArchetype::CoveredCalls,
            0.085,
            0.04,
            0.82,
        );

        // base vol 0.115, return adj 1.0, drawdown adj 0.8
        assert!(close(metrics.volatility, 0.092));
        assert!(close(metrics.standard_deviation, 0.092));
        assert!(close(metrics.beta, 0.8));
        assert!(close(metrics.alpha, 0.025));
        // (0.085 - 0.045) / 0.092 = 0.4348
        assert!(close(metrics.sharpe_ratio, 0.43));
        // -(0.092 * 1.645 + 0.085 / 252) = -0.151677
        assert!(close(metrics.value_at_risk, -0.1517));
    }

    #[test]
    fn test_adjustments() {
        assert_eq!(return_adjustment(0.2), 0.9);
        assert_eq!(return_adjustment(0.10), 1.0);
        assert_eq!(return_adjustment(-0.05), 1.0);
        assert_eq!(return_adjustment(-0.2), 1.2);

        assert_eq!(drawdown_adjustment(-0.2), 1.3);
        assert_eq!(drawdown_adjustment(0.15), 1.0);
        assert_eq!(drawdown_adjustment(0.05), 1.0);
        assert_eq!(drawdown_adjustment(-0.04), 0.8);
    }

    #[test]
    fn test_unknown_archetype_uses_default_ranges() {
        let generator = RiskMetricsGenerator::default();
        let archetype = StrategyArchetype::from("totally_unknown_type");

        // return adj 1.0, |drawdown| 0.05 -> adj 1.0, so volatility is the base
        let low = generator.generate_with(&mut FixedFraction::low(), &archetype, 0.1, -0.05, 0.7);
        let high = generator.generate_with(&mut FixedFraction(1.0), &archetype, 0.1, -0.05, 0.7);

        assert!(close(low.volatility, 0.15));
        assert!(close(high.volatility, 0.30));
    }

    #[test]
    fn test_bounds_and_rounding_across_inputs() {
        let generator = RiskMetricsGenerator::default();
        let mut source = RngSource::seeded(2024);
        let returns = [-0.9, -0.2, -0.05, 0.0, 0.085, 0.1, 0.5, 3.0];
        let drawdowns = [-0.6, -0.1, 0.0, 0.04, 0.15, 0.3];

        for archetype in StrategyArchetype::KNOWN.iter() {
            for &r in &returns {
                for &d in &drawdowns {
                    let m = generator.generate_with(&mut source, archetype, r, d, 0.5);

                    assert!(m.volatility >= 0.0);
                    assert!(m.standard_deviation >= 0.0);
                    assert!(has_at_most_decimals(m.volatility, 4));
                    assert!(has_at_most_decimals(m.standard_deviation, 4));
                    assert!(has_at_most_decimals(m.beta, 2));
                    assert!(has_at_most_decimals(m.alpha, 4));
                    assert!(has_at_most_decimals(m.sharpe_ratio, 2));
                    assert!(has_at_most_decimals(m.value_at_risk, 4));
                }
            }
        }
    }

    #[test]
    fn test_non_finite_inputs_are_neutralized() {
        let generator = RiskMetricsGenerator::default();
        let archetype = StrategyArchetype::Dca;

        let mut source = FixedFraction::midpoint();
        let nan = generator.generate_with(&mut source, &archetype, f64::NAN, f64::NAN, f64::NAN);
        let zero = generator.generate_with(&mut source, &archetype, 0.0, 0.0, 0.0);

        assert_eq!(nan, zero);
        assert!(nan.value_at_risk <= 0.0);
    }

    #[test]
    fn test_extreme_return_stays_finite() {
        let generator = RiskMetricsGenerator::default();
        let m = generator.generate_with(
            &mut FixedFraction::midpoint(),
            &StrategyArchetype::Dca,
            1e306,
            0.1,
            0.5,
        );

        assert!(m.sharpe_ratio.is_finite());
        assert!(m.value_at_risk.is_finite());

        let mut record = PerformanceMetrics::default();
        m.apply_to(&mut record);
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(0.125, 2), 0.13);
        assert_eq!(round_half_up(-0.125, 2), -0.12);
        assert_eq!(round_half_up(1e307, 2), 1e307);
    }

    #[test]
    fn test_zero_std_dev_gives_zero_sharpe() {
        // Degenerate source: every draw is zero, so volatility is zero too.
        struct Zero;
        impl RandomSource for Zero {
            fn uniform(&mut self, _low: f64, _high: f64) -> f64 {
                0.0
            }
        }

        let generator = RiskMetricsGenerator::default();
        let m = generator.generate_with(&mut Zero, &StrategyArchetype::Wheel, 0.3, 0.1, 0.6);

        assert_eq!(m.standard_deviation, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        // -(0 + 0.3 / 252)
        assert!(close(m.value_at_risk, -0.0012));
    }

    #[test]
    fn test_generate_for_defaults_absent_fields() {
        let generator = RiskMetricsGenerator::default();
        let empty = PerformanceMetrics::default();
        let mut source = FixedFraction::midpoint();

        let from_record = generator.generate_for(&mut source, &StrategyArchetype::Orb, &empty);
        let explicit = generator.generate_with(&mut source, &StrategyArchetype::Orb, 0.0, 0.0, 0.0);

        assert_eq!(from_record, explicit);
    }

    #[test]
    fn test_apply_to_keeps_summary_fields() {
        let generator = RiskMetricsGenerator::default();
        let mut source = FixedFraction::midpoint();
        let generated =
            generator.generate_with(&mut source, &StrategyArchetype::Wheel, 0.1, 0.1, 0.6);

        let mut record = PerformanceMetrics {
            total_return: Some(0.1),
            total_trades: Some(30),
            ..Default::default()
        };
        generated.apply_to(&mut record);

        assert_eq!(record.total_return, Some(0.1));
        assert_eq!(record.total_trades, Some(30));
        assert_eq!(record.beta, Some(generated.beta));
        assert_eq!(record.value_at_risk, Some(generated.value_at_risk));
    }
}
