use thiserror::Error;
use topicdigest_core::StoreError;
use topicdigest_feeds::FeedError;
use topicdigest_llm::LlmError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("feed client error: {0}")]
    Feed(#[from] FeedError),

    #[error("text generation client error: {0}")]
    Llm(#[from] LlmError),

    /// Every configured source failed, so there is nothing to compare.
    #[error("all {sources} sources failed for topic {topic}")]
    AllSourcesFailed { topic: String, sources: usize },
}
