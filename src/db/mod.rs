//! Strategy persistence.
//!
//! Stores:
//! - Strategies with their latest performance record and risk tier
//! - An append-only history of every performance record saved

mod memory;

pub use memory::MemoryStore;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{debug, info};

use crate::models::{
    PerformanceMetrics, RiskLevel, RiskTransition, StrategyArchetype, StrategyRecord,
};

/// Repository for strategy records.
#[allow(async_fn_in_trait)]
pub trait StrategyStore {
    /// Load a strategy by id. Unknown ids yield `None`.
    async fn load_strategy(&self, id: &str) -> Result<Option<StrategyRecord>>;

    /// Insert or replace a strategy.
    async fn save_strategy(&self, record: &StrategyRecord) -> Result<()>;

    /// All strategies, oldest first.
    async fn list_strategies(&self) -> Result<Vec<StrategyRecord>>;

    /// Replace a strategy's performance, re-derive its tier and save it.
    ///
    /// Returns `None` when the id is unknown.
    async fn update_performance(
        &self,
        id: &str,
        metrics: PerformanceMetrics,
    ) -> Result<Option<RiskTransition>> {
        let Some(mut record) = self.load_strategy(id).await? else {
            return Ok(None);
        };

        let transition = record.update_performance(metrics);
        self.save_strategy(&record).await?;
        log_transition(&record, &transition);

        Ok(Some(transition))
    }

    /// Merge populated fields of `edit` into a strategy's performance,
    /// re-derive its tier and save it.
    ///
    /// Returns `None` when the id is unknown.
    async fn edit_performance(
        &self,
        id: &str,
        edit: &PerformanceMetrics,
    ) -> Result<Option<RiskTransition>> {
        let Some(mut record) = self.load_strategy(id).await? else {
            return Ok(None);
        };

        let transition = record.edit_performance(edit);
        self.save_strategy(&record).await?;
        log_transition(&record, &transition);

        Ok(Some(transition))
    }
}

fn log_transition(record: &StrategyRecord, transition: &RiskTransition) {
    if transition.changed() {
        info!(
            strategy = %record.id,
            from = transition.previous.as_str(),
            to = transition.current.as_str(),
            "Risk level changed"
        );
    }
}

/// SQLite-backed strategy store.
pub struct Database {
    pool: SqlitePool,
}

/// Stored strategy row.
#[derive(Debug, Clone, sqlx::FromRow)]
struct StoredStrategy {
    id: String,
    name: String,
    archetype: String,
    risk_level: String,
    performance: Option<String>,
    created_at: String,
    updated_at: String,
}

impl StoredStrategy {
    fn into_record(self) -> Result<StrategyRecord> {
        let stored_level = self.risk_level.parse::<RiskLevel>()?;
        let performance = self
            .performance
            .as_deref()
            .map(|json| serde_json::from_str::<PerformanceMetrics>(json))
            .transpose()
            .with_context(|| format!("Invalid performance JSON for strategy {}", self.id))?;

        Ok(StrategyRecord::restore(
            self.id,
            self.name,
            StrategyArchetype::from(self.archetype),
            stored_level,
            performance,
            parse_timestamp(&self.created_at)?,
            parse_timestamp(&self.updated_at)?,
        ))
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp: {}", value))
}

/// One saved performance record with the tier it produced.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub recorded_at: DateTime<Utc>,
    pub risk_level: RiskLevel,
    pub performance: PerformanceMetrics,
}

impl Database {
    /// Create a new database connection.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Every in-memory connection is its own database
        let in_memory = database_url.contains(":memory:");
        let mut options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            options = options.idle_timeout(None).max_lifetime(None);
        }

        let pool = options
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        info!("Database ready at {}", database_url);
        Ok(db)
    }

    /// Run all database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS strategies (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                archetype TEXT NOT NULL,
                risk_level TEXT NOT NULL,
                performance TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS performance_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                strategy_id TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                risk_level TEXT NOT NULL,
                performance TEXT NOT NULL,
                FOREIGN KEY (strategy_id) REFERENCES strategies(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_history_strategy
            ON performance_history(strategy_id, id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Performance history for a strategy, oldest first.
    pub async fn performance_history(&self, strategy_id: &str) -> Result<Vec<HistoryEntry>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT recorded_at, risk_level, performance FROM performance_history
            WHERE strategy_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(strategy_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(recorded_at, risk_level, performance)| {
                Ok(HistoryEntry {
                    recorded_at: parse_timestamp(&recorded_at)?,
                    risk_level: risk_level.parse()?,
                    performance: serde_json::from_str(&performance)
                        .context("Invalid performance JSON in history")?,
                })
            })
            .collect()
    }

    /// Close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl StrategyStore for Database {
    async fn load_strategy(&self, id: &str) -> Result<Option<StrategyRecord>> {
        let row = sqlx::query_as::<_, StoredStrategy>("SELECT * FROM strategies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(StoredStrategy::into_record).transpose()
    }

    async fn save_strategy(&self, record: &StrategyRecord) -> Result<()> {
        let performance = record
            .performance()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to serialize performance")?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO strategies
                (id, name, archetype, risk_level, performance, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                archetype = excluded.archetype,
                risk_level = excluded.risk_level,
                performance = excluded.performance,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.archetype.as_str())
        .bind(record.risk_level().as_str())
        .bind(performance.as_deref())
        .bind(record.created_at().to_rfc3339())
        .bind(record.updated_at().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        if let Some(performance) = &performance {
            sqlx::query(
                r#"
                INSERT INTO performance_history (strategy_id, recorded_at, risk_level, performance)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&record.id)
            .bind(record.updated_at().to_rfc3339())
            .bind(record.risk_level().as_str())
            .bind(performance)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(strategy = %record.id, "Saved strategy");
        Ok(())
    }

    async fn list_strategies(&self) -> Result<Vec<StrategyRecord>> {
        let rows = sqlx::query_as::<_, StoredStrategy>(
            "SELECT * FROM strategies ORDER BY created_at ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoredStrategy::into_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    async fn memory_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    fn risky_metrics() -> PerformanceMetrics {
        PerformanceMetrics {
            volatility: Some(0.45),
            beta: Some(1.8),
            sharpe_ratio: Some(0.1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let db = memory_db().await;
        let record =
            StrategyRecord::new("Covered Calls", StrategyArchetype::CoveredCalls, RiskLevel::Low);
        assert_ok!(db.save_strategy(&record).await);

        let loaded = db.load_strategy(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Covered Calls");
        assert_eq!(loaded.archetype, StrategyArchetype::CoveredCalls);
        assert_eq!(loaded.risk_level(), RiskLevel::Low);
        assert!(loaded.performance().is_none());
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let db = memory_db().await;
        assert!(db.load_strategy("missing").await.unwrap().is_none());
        let transition = db.update_performance("missing", risky_metrics()).await.unwrap();
        assert!(transition.is_none());
    }

    #[tokio::test]
    async fn test_update_performance_persists_tier_and_history() {
        let db = memory_db().await;
        let record =
            StrategyRecord::new("Iron Condor", StrategyArchetype::IronCondor, RiskLevel::Medium);
        db.save_strategy(&record).await.unwrap();

        let transition = db
            .update_performance(&record.id, risky_metrics())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(transition.current, RiskLevel::High);

        let loaded = db.load_strategy(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.risk_level(), RiskLevel::High);
        assert_eq!(loaded.performance(), Some(&risky_metrics()));

        let history = db.performance_history(&record.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_stale_stored_level_is_rederived() {
        let db = memory_db().await;
        let now = Utc::now().to_rfc3339();
        let performance = serde_json::to_string(&risky_metrics()).unwrap();

        sqlx::query("INSERT INTO strategies VALUES (?, ?, ?, ?, ?, ?, ?)")
            .bind("stale")
            .bind("Tampered")
            .bind("wheel")
            .bind("low")
            .bind(&performance)
            .bind(&now)
            .bind(&now)
            .execute(&db.pool)
            .await
            .unwrap();

        let loaded = db.load_strategy("stale").await.unwrap().unwrap();
        assert_eq!(loaded.risk_level(), RiskLevel::High);
    }

    #[tokio::test]
    async fn test_list_keeps_unknown_archetypes() {
        let db = memory_db().await;
        let known = StrategyRecord::new("Wheel", StrategyArchetype::Wheel, RiskLevel::Low);
        let custom =
            StrategyRecord::new("Grid", StrategyArchetype::from("grid_bot"), RiskLevel::Medium);
        db.save_strategy(&known).await.unwrap();
        db.save_strategy(&custom).await.unwrap();

        let all = db.list_strategies().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|s| s.archetype.as_str() == "grid_bot"));
    }

    #[tokio::test]
    async fn test_edit_performance_merges_and_logs_history() {
        let db = memory_db().await;
        let record = StrategyRecord::new("Scalper", StrategyArchetype::Scalping, RiskLevel::High);
        db.save_strategy(&record).await.unwrap();
        db.update_performance(&record.id, risky_metrics()).await.unwrap();

        let edit = PerformanceMetrics {
            volatility: Some(0.05),
            beta: Some(0.5),
            sharpe_ratio: Some(2.0),
            ..Default::default()
        };
        let transition = db
            .edit_performance(&record.id, &edit)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(transition.previous, RiskLevel::High);
        assert_eq!(transition.current, RiskLevel::Low);

        let history = db.performance_history(&record.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_tag_spelling_survives_storage() {
        let db = memory_db().await;
        let record = StrategyRecord::new(
            "Shouty",
            StrategyArchetype::from("COVERED_CALLS"),
            RiskLevel::Medium,
        );
        db.save_strategy(&record).await.unwrap();

        let loaded = db.load_strategy(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.archetype.as_str(), "COVERED_CALLS");
        assert!(!loaded.archetype.is_recognized());
    }
}
