//! Realized performance metrics from a return series: drawdown, volatility,
//! Sharpe ratio, historical VaR, beta/alpha and trade win rate.

use rust_decimal::Decimal;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use super::generator::round_half_up;
use super::CalculatorConfig;
use crate::models::PerformanceMetrics;

/// Calculator for metrics backed by an actual return history.
pub struct PerformanceCalculator;

impl PerformanceCalculator {
    /// Calculate a performance record from per-period returns.
    ///
    /// `period_returns` are simple returns per period (0.01 = +1%). The
    /// benchmark is only used when it has the same length as the returns.
    /// Trade P&Ls drive `win_rate` and `total_trades`. Non-finite returns are
    /// left out of every statistic, and beta/alpha are then omitted.
    pub fn calculate(
        period_returns: &[f64],
        benchmark_returns: Option<&[f64]>,
        trade_pnls: &[Decimal],
        config: &CalculatorConfig,
    ) -> PerformanceMetrics {
        let mut metrics = PerformanceMetrics::new();
        let returns: Vec<f64> = period_returns.iter().copied().filter(|r| r.is_finite()).collect();

        if !trade_pnls.is_empty() {
            Self::calculate_trade_metrics(&mut metrics, trade_pnls);
        }

        if !returns.is_empty() {
            let total_return = returns.iter().fold(1.0, |equity, r| equity * (1.0 + r)) - 1.0;
            metrics.total_return = Some(round_half_up(total_return, 4));
            metrics.max_drawdown = Some(round_half_up(Self::max_drawdown(&returns), 4));
        }

        // Dispersion needs at least two observations
        if returns.len() < 2 {
            return metrics;
        }

        Self::calculate_risk_metrics(&mut metrics, &returns, config);

        if let Some(benchmark) = benchmark_returns {
            // Compared against the raw series so pairs stay aligned
            if benchmark.len() == period_returns.len() {
                Self::calculate_beta_alpha(&mut metrics, period_returns, benchmark, config);
            }
        }

        metrics
    }

    fn calculate_trade_metrics(metrics: &mut PerformanceMetrics, pnls: &[Decimal]) {
        let wins = pnls.iter().filter(|&&p| p > Decimal::ZERO).count();
        metrics.total_trades = Some(pnls.len() as u32);
        metrics.win_rate = Some(round_half_up(wins as f64 / pnls.len() as f64, 4));
    }

    /// Largest peak-to-trough decline of the compounded equity curve, as a
    /// positive fraction of the peak.
    fn max_drawdown(returns: &[f64]) -> f64 {
        let mut equity = 1.0f64;
        let mut peak = 1.0f64;
        let mut max_dd = 0.0f64;

        for r in returns {
            equity *= 1.0 + r;
            if equity > peak {
                peak = equity;
            }
            if peak > 0.0 {
                max_dd = max_dd.max((peak - equity) / peak);
            }
        }

        max_dd
    }

    fn calculate_risk_metrics(
        metrics: &mut PerformanceMetrics,
        returns: &[f64],
        config: &CalculatorConfig,
    ) {
        let annualizer = config.periods_per_year.sqrt();
        let mean = returns.mean();
        let volatility = returns.std_dev() * annualizer;
        let standard_deviation = returns.population_std_dev() * annualizer;
        let annual_return = mean * config.periods_per_year;

        let sharpe_ratio = if standard_deviation > 0.0 {
            (annual_return - config.risk_free_rate) / standard_deviation
        } else {
            0.0
        };

        let mut data = Data::new(returns.to_vec());
        let value_at_risk = data.quantile(1.0 - config.var_confidence).min(0.0);

        metrics.volatility = Some(round_half_up(volatility, 4));
        metrics.standard_deviation = Some(round_half_up(standard_deviation, 4));
        metrics.sharpe_ratio = Some(round_half_up(sharpe_ratio, 2));
        metrics.value_at_risk = Some(round_half_up(value_at_risk, 4));
    }

    /// CAPM beta and annualized Jensen's alpha.
    fn calculate_beta_alpha(
        metrics: &mut PerformanceMetrics,
        returns: &[f64],
        benchmark: &[f64],
        config: &CalculatorConfig,
    ) {
        if returns.iter().chain(benchmark).any(|r| !r.is_finite()) {
            return;
        }

        let benchmark_variance = benchmark.variance();
        if benchmark_variance <= 0.0 {
            return;
        }

        let beta = returns.covariance(benchmark) / benchmark_variance;
        let annual_return = returns.mean() * config.periods_per_year;
        let annual_benchmark = benchmark.mean() * config.periods_per_year;
        let alpha = annual_return
            - (config.risk_free_rate + beta * (annual_benchmark - config.risk_free_rate));

        metrics.beta = Some(round_half_up(beta, 2));
        metrics.alpha = Some(round_half_up(alpha, 4));
    }
}
