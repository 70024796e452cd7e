//! Performance and risk metrics attached to a strategy.

use serde::{Deserialize, Serialize};

/// Flat performance record exchanged with the strategy API.
///
/// Every field is optional: a feed may only know the summary figures, and the
/// classifier skips whatever is absent. Field names are part of the wire contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Fractional return over the window (0.156 = 15.6%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_return: Option<f64>,

    /// Fraction of profitable trades (0.0 to 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_rate: Option<f64>,

    /// Peak-to-trough decline; either sign is accepted, the magnitude is what counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_drawdown: Option<f64>,

    /// (total_return - risk_free_rate) / standard_deviation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<f64>,

    /// Passed through from the backtest feed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_trades: Option<u32>,

    /// Passed through from the backtest feed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_trade_duration: Option<f64>,

    /// Annualized standard deviation of returns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,

    /// Second dispersion estimate, distinct from volatility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_deviation: Option<f64>,

    /// Sensitivity to the market benchmark
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,

    /// Excess return not explained by beta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,

    /// 95% worst-case loss, conventionally negative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_at_risk: Option<f64>,
}

impl PerformanceMetrics {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no field is populated.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay every populated field of `other` onto this record.
    pub fn merge(&mut self, other: &PerformanceMetrics) {
        fn take<T: Copy>(dst: &mut Option<T>, src: Option<T>) {
            if src.is_some() {
                *dst = src;
            }
        }

        take(&mut self.total_return, other.total_return);
        take(&mut self.win_rate, other.win_rate);
        take(&mut self.max_drawdown, other.max_drawdown);
        take(&mut self.sharpe_ratio, other.sharpe_ratio);
        take(&mut self.total_trades, other.total_trades);
        take(&mut self.avg_trade_duration, other.avg_trade_duration);
        take(&mut self.volatility, other.volatility);
        take(&mut self.standard_deviation, other.standard_deviation);
        take(&mut self.beta, other.beta);
        take(&mut self.alpha, other.alpha);
        take(&mut self.value_at_risk, other.value_at_risk);
    }
}
