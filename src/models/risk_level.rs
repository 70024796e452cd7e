//! Ordinal risk tier displayed for a strategy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Three-tier risk level. Ordered from least to most risky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Short description of what the tier means for a strategy.
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Income generation, hedged positions, limited loss potential",
            RiskLevel::Medium => {
                "Defined loss spreads, volatility-dependent, moderate directional bias"
            }
            RiskLevel::High => {
                "Unhedged short options, leveraged directional plays, high volatility exposure"
            }
        }
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Medium
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(anyhow::anyhow!("Unknown risk level: {}", other)),
        }
    }
}
