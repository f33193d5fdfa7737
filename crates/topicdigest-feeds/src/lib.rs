//! Feed ingestion for topicdigest.
//!
//! Fetches RSS/Atom sources concurrently, keeps entries inside the run's
//! time window, and expands aggregator entries that embed links to other
//! articles. A failing source is logged and skipped; it never aborts a run.

pub mod client;
pub mod error;
pub mod parse;

mod html;

pub use client::{FeedClient, FeedClientConfig, FetchReport, SourceFailure};
pub use error::FeedError;
pub use parse::{parse_feed, TimeWindow};
