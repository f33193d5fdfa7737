//! Persistence seam for per-topic run state.

use async_trait::async_trait;
use thiserror::Error;

use crate::digest::Summary;
use crate::snapshot::ClusterSnapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed while running `operation`.
    #[error("store operation {operation} failed: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("stored record could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    #[must_use]
    pub fn backend(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            operation,
            source: source.into(),
        }
    }
}

/// Where a topic's last cluster snapshot and its summary history live.
///
/// Summaries are append-only; the snapshot is overwritten each run.
#[async_trait]
pub trait DigestStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be read.
    async fn load_snapshot(&self, topic_id: &str) -> Result<Option<ClusterSnapshot>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be written.
    async fn save_snapshot(&self, topic_id: &str, snapshot: &ClusterSnapshot) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be read.
    async fn latest_summary(&self, topic_id: &str) -> Result<Option<Summary>, StoreError>;

    /// Up to `limit` summaries for `topic_id`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be read.
    async fn list_summaries(&self, topic_id: &str, limit: usize) -> Result<Vec<Summary>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be written.
    async fn append_summary(&self, summary: &Summary) -> Result<(), StoreError>;
}
