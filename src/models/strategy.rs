//! Strategy record: the part of a strategy the risk core reads and writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::RiskLevelClassifier;

use super::{PerformanceMetrics, RiskLevel, StrategyArchetype};

/// Change of risk tier caused by a performance update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskTransition {
    pub previous: RiskLevel,
    pub current: RiskLevel,
}

impl RiskTransition {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// A trading strategy with its latest performance and derived risk tier.
///
/// Once performance data exists the tier is always the classifier's verdict on
/// it. The field is private and every path that touches performance (creation,
/// deserialization, updates) recomputes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StrategyRecordData")]
pub struct StrategyRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub archetype: StrategyArchetype,
    risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    performance: Option<PerformanceMetrics>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Wire shape used when deserializing; converted through [`StrategyRecord::restore`].
#[derive(Deserialize)]
struct StrategyRecordData {
    id: String,
    name: String,
    #[serde(rename = "type")]
    archetype: StrategyArchetype,
    #[serde(default)]
    risk_level: RiskLevel,
    #[serde(default)]
    performance: Option<PerformanceMetrics>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

impl From<StrategyRecordData> for StrategyRecord {
    fn from(data: StrategyRecordData) -> Self {
        StrategyRecord::restore(
            data.id,
            data.name,
            data.archetype,
            data.risk_level,
            data.performance,
            data.created_at,
            data.updated_at,
        )
    }
}

impl StrategyRecord {
    /// Create a new strategy with the catalog risk level of its template.
    pub fn new(
        name: impl Into<String>,
        archetype: StrategyArchetype,
        catalog_level: RiskLevel,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            archetype,
            risk_level: catalog_level,
            performance: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a record from stored fields.
    ///
    /// A stored tier is only trusted when there is no performance data to derive
    /// one from.
    pub fn restore(
        id: String,
        name: String,
        archetype: StrategyArchetype,
        stored_level: RiskLevel,
        performance: Option<PerformanceMetrics>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let risk_level = match &performance {
            Some(metrics) => RiskLevelClassifier::classify(metrics),
            None => stored_level,
        };

        Self {
            id,
            name,
            archetype,
            risk_level,
            performance,
            created_at,
            updated_at,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn performance(&self) -> Option<&PerformanceMetrics> {
        self.performance.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the performance record and re-derive the risk tier.
    pub fn update_performance(&mut self, metrics: PerformanceMetrics) -> RiskTransition {
        let previous = self.risk_level;
        self.risk_level = RiskLevelClassifier::classify(&metrics);
        self.performance = Some(metrics);
        self.updated_at = Utc::now();

        RiskTransition {
            previous,
            current: self.risk_level,
        }
    }

    /// Apply a partial edit on top of the current performance record.
    pub fn edit_performance(&mut self, edit: &PerformanceMetrics) -> RiskTransition {
        let mut metrics = self.performance.clone().unwrap_or_default();
        metrics.merge(edit);
        self.update_performance(metrics)
    }
}
