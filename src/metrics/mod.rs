//! Risk metrics: synthetic generation, realized calculation and tier classification.

mod calculator;
mod classifier;
mod config;
mod generator;
mod random;

pub use calculator::PerformanceCalculator;
pub use classifier::{
    Band, Comparison, FactorContribution, FactorScale, RiskAssessment, RiskFactor,
    RiskLevelClassifier, FACTORS, LOW_CEILING, MEDIUM_CEILING, NO_DATA_SCORE,
};
pub use config::{CalculatorConfig, GeneratorConfig};
pub use generator::{
    drawdown_adjustment, return_adjustment, round_half_up, BaseRanges, GeneratedRiskMetrics,
    RiskMetricsGenerator, FAMILY_RANGES,
};
pub use random::{FixedFraction, RandomSource, RngSource};
