//! In-process strategy store.

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::RwLock;

use super::StrategyStore;
use crate::models::StrategyRecord;

/// Strategy store held in memory; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    strategies: RwLock<HashMap<String, StrategyRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.strategies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.strategies.read().await.is_empty()
    }
}

impl StrategyStore for MemoryStore {
    async fn load_strategy(&self, id: &str) -> Result<Option<StrategyRecord>> {
        Ok(self.strategies.read().await.get(id).cloned())
    }

    async fn save_strategy(&self, record: &StrategyRecord) -> Result<()> {
        self.strategies
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn list_strategies(&self) -> Result<Vec<StrategyRecord>> {
        let mut all: Vec<StrategyRecord> = self.strategies.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(all)
    }
}
