//! Risk metrics configuration.

use serde::{Deserialize, Serialize};

/// Constants used by the synthetic metrics generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Annualized risk-free rate subtracted in the Sharpe ratio
    pub risk_free_rate: f64,

    /// One-tailed z-score for the VaR confidence level
    pub var_z_score: f64,

    /// Trading days used to scale the return term of VaR
    pub trading_days_per_year: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.045,      // 4.5%
            var_z_score: 1.645,         // 95% one-tailed
            trading_days_per_year: 252.0,
        }
    }
}

/// Settings for realized metrics computed from a return series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Number of return periods per year (252 for daily bars)
    pub periods_per_year: f64,

    /// Annualized risk-free rate subtracted in the Sharpe ratio
    pub risk_free_rate: f64,

    /// Confidence level for historical VaR (0.0 to 1.0)
    pub var_confidence: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            periods_per_year: 252.0,
            risk_free_rate: 0.045,
            var_confidence: 0.95,
        }
    }
}
