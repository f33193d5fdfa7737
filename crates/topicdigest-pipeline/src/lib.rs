//! Orchestration of topicdigest runs.
//!
//! One run of a topic fetches its sources, clusters the articles, compares
//! the clusters with the previous run and only calls the text-generation
//! service when enough has changed. [`MemoryStore`] is the in-process
//! [`topicdigest_core::DigestStore`].

pub mod dedup;
pub mod error;
pub mod memory;
pub mod run;

pub use dedup::dedup_articles;
pub use error::PipelineError;
pub use memory::MemoryStore;
pub use run::{Pipeline, RunOutcome, RunReport};
