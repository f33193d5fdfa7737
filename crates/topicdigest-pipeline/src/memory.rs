//! In-process [`DigestStore`] for single-shot runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use topicdigest_core::{ClusterSnapshot, DigestStore, StoreError, Summary};

#[derive(Debug, Default)]
struct Inner {
    snapshots: HashMap<String, ClusterSnapshot>,
    /// Per topic, oldest first.
    summaries: HashMap<String, Vec<Summary>>,
}

/// Keeps everything in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DigestStore for MemoryStore {
    async fn load_snapshot(&self, topic_id: &str) -> Result<Option<ClusterSnapshot>, StoreError> {
        Ok(self.inner.read().await.snapshots.get(topic_id).cloned())
    }

    async fn save_snapshot(&self, topic_id: &str, snapshot: &ClusterSnapshot) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .snapshots
            .insert(topic_id.to_string(), snapshot.clone());
        Ok(())
    }

    async fn latest_summary(&self, topic_id: &str) -> Result<Option<Summary>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .summaries
            .get(topic_id)
            .and_then(|s| s.last().cloned()))
    }

    async fn list_summaries(&self, topic_id: &str, limit: usize) -> Result<Vec<Summary>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .summaries
            .get(topic_id)
            .map(|s| s.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn append_summary(&self, summary: &Summary) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .summaries
            .entry(summary.topic_id.clone())
            .or_default()
            .push(summary.clone());
        Ok(())
    }
}
