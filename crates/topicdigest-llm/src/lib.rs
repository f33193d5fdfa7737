//! Text generation for topicdigest.
//!
//! [`ChatClient`] talks to an OpenAI-compatible chat completions endpoint
//! behind the [`TextGenerator`] trait, [`Summarizer`] turns clusters into
//! summaries and digests, and [`repair`] recovers the JSON digest from
//! free-form model output.

pub mod client;
pub mod error;
pub mod repair;
pub mod retry;
pub mod summarize;

pub use client::{ChatClient, ChatClientConfig, GenerationRequest, ModelParams, TextGenerator};
pub use error::LlmError;
pub use repair::{extract_json_span, parse_digest, DigestOutcome};
pub use retry::RetryPolicy;
pub use summarize::Summarizer;
