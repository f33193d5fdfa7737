//! Postgres-backed [`DigestStore`].

use async_trait::async_trait;
use sqlx::PgPool;
use topicdigest_core::{ClusterSnapshot, DigestStore, StoreError, Summary};

use crate::{snapshots, summaries};

/// Stores snapshots and summaries as JSONB rows.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DigestStore for PgStore {
    async fn load_snapshot(&self, topic_id: &str) -> Result<Option<ClusterSnapshot>, StoreError> {
        snapshots::load_snapshot(&self.pool, topic_id)
            .await
            .map_err(|e| StoreError::backend("load_snapshot", e))
    }

    async fn save_snapshot(&self, topic_id: &str, snapshot: &ClusterSnapshot) -> Result<(), StoreError> {
        snapshots::save_snapshot(&self.pool, topic_id, snapshot)
            .await
            .map_err(|e| StoreError::backend("save_snapshot", e))
    }

    async fn latest_summary(&self, topic_id: &str) -> Result<Option<Summary>, StoreError> {
        summaries::latest_summary(&self.pool, topic_id)
            .await
            .map_err(|e| StoreError::backend("latest_summary", e))
    }

    async fn list_summaries(&self, topic_id: &str, limit: usize) -> Result<Vec<Summary>, StoreError> {
        summaries::list_summaries(&self.pool, topic_id, limit)
            .await
            .map_err(|e| StoreError::backend("list_summaries", e))
    }

    async fn append_summary(&self, summary: &Summary) -> Result<(), StoreError> {
        summaries::insert_summary(&self.pool, summary)
            .await
            .map_err(|e| StoreError::backend("append_summary", e))?;
        tracing::debug!(topic = %summary.topic_id, summary_id = %summary.id, "summary stored");
        Ok(())
    }
}
