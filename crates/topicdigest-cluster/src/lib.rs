//! Lexical clustering for topicdigest.
//!
//! Extracts rarity-ranked significant words from articles, groups articles
//! into clusters through a four-stage merge pipeline, measures how much a
//! cluster set changed since the previous run, and budgets cluster content
//! into summarization-sized chunks.

pub mod budget;
pub mod change;
pub mod engine;
pub mod rarity;
pub mod significance;

pub use budget::{estimate_tokens, limit_cluster_content, plan_chunks};
pub use change::{cluster_difference, is_significant, summary_difference, CHANGE_THRESHOLD};
pub use engine::{
    assign_initial, cluster_articles, enforce_min_size, merge_by_percentage, merge_by_threshold,
    ClusterParams,
};
pub use rarity::{sort_by_rarity, WordCounts};
pub use significance::{
    assign_significant_words, extract, significant_words, ExtractionMode, SignificanceOptions,
};
