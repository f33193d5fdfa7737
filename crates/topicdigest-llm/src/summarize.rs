//! Cluster summaries and the final digest.

use std::fmt::Write as _;
use std::sync::Arc;

use topicdigest_cluster::budget::{article_listing, plan_chunks};
use topicdigest_core::{Cluster, Topic};

use crate::client::{GenerationRequest, ModelParams, TextGenerator};
use crate::error::LlmError;
use crate::repair::{parse_digest, DigestOutcome};

const CLUSTER_SYSTEM_PROMPT: &str = "You are a news editor. Summarize the articles below into a \
concise, factual briefing of what happened. Merge overlapping reports, keep names, numbers and \
dates, and do not speculate beyond the articles.";

const DIGEST_SYSTEM_PROMPT: &str = "You are a news editor writing a digest for a reader who \
follows one topic. Respond with a single JSON object and nothing else.";

/// Produces cluster summaries and digests through a [`TextGenerator`].
#[derive(Clone)]
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    params: ModelParams,
    max_request_tokens: usize,
    sentences_per_story: u32,
}

impl Summarizer {
    #[must_use]
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        params: ModelParams,
        max_request_tokens: usize,
        sentences_per_story: u32,
    ) -> Self {
        Self {
            generator,
            params,
            max_request_tokens,
            sentences_per_story,
        }
    }

    fn request(&self, system: &str, user: String) -> GenerationRequest {
        GenerationRequest {
            system: system.to_string(),
            user,
            params: self.params.clone(),
        }
    }

    /// Summarize one cluster.
    ///
    /// Oversized clusters are split into chunks that are summarized one
    /// after another and concatenated. If any chunk fails after retries the
    /// whole cluster gets a placeholder naming its common words.
    pub async fn summarize_cluster(&self, topic: &Topic, cluster: &Cluster) -> String {
        let chunks = plan_chunks(&cluster.articles, self.max_request_tokens);
        let mut parts = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            let mut user = format!("Topic: {}\n\n", topic.name);
            for article in chunk {
                user.push_str(&article_listing(article));
                user.push('\n');
            }
            let request = self.request(CLUSTER_SYSTEM_PROMPT, user);

            match self.generator.generate(&request).await {
                Ok(text) => parts.push(text.trim().to_string()),
                Err(e) => {
                    tracing::warn!(
                        topic = %topic.id,
                        cluster = %cluster.label(),
                        chunk = index,
                        error = %e,
                        "cluster summarization failed; using placeholder"
                    );
                    return placeholder_cluster_summary(cluster);
                }
            }
        }

        parts.join("\n\n")
    }

    /// Turn the cluster summaries into the final structured digest.
    ///
    /// An unparseable response resolves to the placeholder document.
    ///
    /// # Errors
    ///
    /// Returns the generator's [`LlmError`] once its retries are exhausted.
    pub async fn summarize_digest(
        &self,
        topic: &Topic,
        cluster_summaries: &[String],
    ) -> Result<DigestOutcome, LlmError> {
        let request = self.request(DIGEST_SYSTEM_PROMPT, self.digest_prompt(topic, cluster_summaries));
        let raw = self.generator.generate(&request).await?;
        Ok(parse_digest(&raw))
    }

    fn digest_prompt(&self, topic: &Topic, cluster_summaries: &[String]) -> String {
        let mut prompt = format!("Topic: {}\n", topic.name);
        if let Some(focus) = &topic.prompt {
            let _ = writeln!(prompt, "Reader focus: {focus}");
        }
        let _ = write!(
            prompt,
            "\nWrite one story per distinct development below, each {} sentences long, \
             then three follow-up questions the reader might ask.\n\
             Return exactly this JSON shape:\n\
             {{\"stories\":[{{\"title\":\"...\",\"content\":\"...\"}}],\"questions\":[\"...\"]}}\n\n",
            self.sentences_per_story
        );
        for (i, summary) in cluster_summaries.iter().enumerate() {
            let _ = writeln!(prompt, "Development {}:\n{}\n", i + 1, summary.trim());
        }
        prompt
    }
}

fn placeholder_cluster_summary(cluster: &Cluster) -> String {
    format!("Summary unavailable for stories about {}.", cluster.label())
}

#[cfg(test)]
#[path = "summarize_test.rs"]
mod tests;
