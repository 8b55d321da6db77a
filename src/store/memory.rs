//! In-memory progress store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{Progress, ProgressKey, ProgressStore};
use crate::error::DatabaseError;

#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: RwLock<HashMap<ProgressKey, Progress>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn save(&self, progress: &Progress) -> Result<(), DatabaseError> {
        self.records
            .write()
            .await
            .insert(progress.key(), progress.clone());
        Ok(())
    }

    async fn load(&self, key: &ProgressKey) -> Result<Option<Progress>, DatabaseError> {
        Ok(self.records.read().await.get(key).cloned())
    }
}
