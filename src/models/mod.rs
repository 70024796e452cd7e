//! Data models for strategies, archetypes, performance metrics and risk tiers.

mod archetype;
mod performance;
mod risk_level;
mod strategy;

pub use archetype::{ArchetypeFamily, StrategyArchetype};
pub use performance::PerformanceMetrics;
pub use risk_level::RiskLevel;
pub use strategy::{RiskTransition, StrategyRecord};
