//! The per-topic run and the multi-topic driver.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use topicdigest_cluster::{
    assign_significant_words, cluster_articles, cluster_difference, is_significant,
    summary_difference, ClusterParams, SignificanceOptions,
};
use topicdigest_core::{AppConfig, ClusterSnapshot, DigestStore, RunSettings, Summary, Topic};
use topicdigest_feeds::{FeedClient, FeedClientConfig};
use topicdigest_llm::{ChatClient, ChatClientConfig, ModelParams, Summarizer};
use uuid::Uuid;

use crate::dedup::dedup_articles;
use crate::error::PipelineError;

/// How a topic run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Sources answered but nothing fell inside the window. The stored
    /// snapshot is reset to empty.
    NoArticles,
    /// Clusters moved less than the change threshold; no generation calls.
    Unchanged { cluster_ratio: f64 },
    /// Cluster summaries were regenerated but read the same as last time.
    SummariesStable {
        cluster_ratio: f64,
        summary_ratio: f64,
    },
    /// Digest generation failed after retries. The snapshot was saved and
    /// no summary was written.
    DigestFailed {
        cluster_ratio: f64,
        summary_ratio: f64,
        error: String,
    },
    /// A new summary was appended to the store.
    Published {
        summary_id: Uuid,
        cluster_ratio: f64,
        summary_ratio: f64,
        placeholder: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub topic_id: String,
    pub articles: usize,
    pub clusters: usize,
    pub failed_sources: Vec<String>,
    pub outcome: RunOutcome,
}

/// Everything a run needs, shared across topics.
pub struct Pipeline {
    feeds: FeedClient,
    summarizer: Summarizer,
    store: Arc<dyn DigestStore>,
    settings: RunSettings,
    max_concurrent_topics: usize,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        feeds: FeedClient,
        summarizer: Summarizer,
        store: Arc<dyn DigestStore>,
        settings: RunSettings,
    ) -> Self {
        Self {
            feeds,
            summarizer,
            store,
            settings,
            max_concurrent_topics: 1,
        }
    }

    #[must_use]
    pub fn with_max_concurrent_topics(mut self, max: usize) -> Self {
        self.max_concurrent_topics = max.max(1);
        self
    }

    /// Wire the HTTP feed client and chat client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if either HTTP client cannot be built.
    pub fn from_config(config: &AppConfig, store: Arc<dyn DigestStore>) -> Result<Self, PipelineError> {
        let feeds = FeedClient::new(FeedClientConfig::from(config))?;
        let chat = ChatClient::new(ChatClientConfig::from(config))?;
        let summarizer = Summarizer::new(
            Arc::new(chat),
            ModelParams::from(config),
            config.run.max_request_tokens,
            config.run.sentences_per_story,
        );
        Ok(Self::new(feeds, summarizer, store, config.run.clone())
            .with_max_concurrent_topics(config.max_concurrent_topics))
    }

    /// Run one topic end to end.
    ///
    /// The cluster snapshot is saved as soon as it is computed. The summary
    /// is appended in a single write once every part of it is ready.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AllSourcesFailed`] when no source could be
    /// fetched, or [`PipelineError::Store`] when the store fails.
    pub async fn run_topic(&self, topic: &Topic) -> Result<RunReport, PipelineError> {
        let fetched = self
            .feeds
            .fetch_all(&topic.sources, self.settings.days_back)
            .await;
        let failed_sources: Vec<String> =
            fetched.failed_sources.iter().map(|f| f.url.clone()).collect();
        if !topic.sources.is_empty() && failed_sources.len() == topic.sources.len() {
            return Err(PipelineError::AllSourcesFailed {
                topic: topic.id.clone(),
                sources: topic.sources.len(),
            });
        }

        let mut articles = dedup_articles(fetched.articles);
        let article_count = articles.len();
        let report = |clusters: usize, outcome: RunOutcome| RunReport {
            topic_id: topic.id.clone(),
            articles: article_count,
            clusters,
            failed_sources: failed_sources.clone(),
            outcome,
        };
        if articles.is_empty() {
            tracing::info!(topic = %topic.id, "no articles in window; clearing snapshot");
            self.store
                .save_snapshot(&topic.id, &ClusterSnapshot::default())
                .await?;
            return Ok(report(0, RunOutcome::NoArticles));
        }

        assign_significant_words(&mut articles, SignificanceOptions::from(&self.settings));
        let clusters = cluster_articles(articles, &ClusterParams::from(&self.settings));
        let current = ClusterSnapshot::from_clusters(&clusters);

        let previous_summary = self.store.latest_summary(&topic.id).await?;
        let previous = match self.store.load_snapshot(&topic.id).await? {
            Some(snapshot) => snapshot,
            None => previous_summary
                .as_ref()
                .map(|s| s.clusters.clone())
                .unwrap_or_default(),
        };
        self.store.save_snapshot(&topic.id, &current).await?;

        let cluster_ratio = cluster_difference(&current, &previous);
        tracing::info!(
            topic = %topic.id,
            articles = article_count,
            clusters = clusters.len(),
            cluster_ratio,
            "clustered topic"
        );
        if !is_significant(cluster_ratio) {
            return Ok(report(clusters.len(), RunOutcome::Unchanged { cluster_ratio }));
        }

        let mut cluster_summaries = Vec::with_capacity(clusters.len());
        for cluster in &clusters {
            cluster_summaries.push(self.summarizer.summarize_cluster(topic, cluster).await);
        }

        let previous_summaries = previous_summary
            .as_ref()
            .map(|s| s.cluster_summaries.as_slice())
            .unwrap_or_default();
        let summary_ratio = summary_difference(&cluster_summaries, previous_summaries);
        if !is_significant(summary_ratio) {
            tracing::info!(topic = %topic.id, summary_ratio, "cluster summaries stable; no digest");
            return Ok(report(
                clusters.len(),
                RunOutcome::SummariesStable {
                    cluster_ratio,
                    summary_ratio,
                },
            ));
        }

        let outcome = match self
            .summarizer
            .summarize_digest(topic, &cluster_summaries)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(topic = %topic.id, error = %e, "digest generation failed; no summary written");
                return Ok(report(
                    clusters.len(),
                    RunOutcome::DigestFailed {
                        cluster_ratio,
                        summary_ratio,
                        error: e.to_string(),
                    },
                ));
            }
        };
        let placeholder = outcome.is_placeholder();
        let summary = Summary::new(
            &topic.id,
            outcome.into_document(),
            current,
            cluster_summaries,
            article_count,
        );
        self.store.append_summary(&summary).await?;
        tracing::info!(topic = %topic.id, summary_id = %summary.id, placeholder, "published digest");

        Ok(report(
            clusters.len(),
            RunOutcome::Published {
                summary_id: summary.id,
                cluster_ratio,
                summary_ratio,
                placeholder,
            },
        ))
    }

    /// Run every topic, bounded by the configured topic concurrency.
    ///
    /// A failing topic is logged and does not stop the others. Results come
    /// back in input order.
    pub async fn run_topics(&self, topics: &[Topic]) -> Vec<(String, Result<RunReport, PipelineError>)> {
        let mut results: Vec<(usize, String, Result<RunReport, PipelineError>)> =
            stream::iter(topics.iter().enumerate())
                .map(|(i, topic)| async move { (i, topic.id.clone(), self.run_topic(topic).await) })
                .buffer_unordered(self.max_concurrent_topics)
                .collect()
                .await;
        results.sort_by_key(|(i, _, _)| *i);

        let failed = results.iter().filter(|(_, _, r)| r.is_err()).count();
        for (_, id, result) in &results {
            if let Err(e) = result {
                let name = topics
                    .iter()
                    .find(|t| &t.id == id)
                    .map_or(id.as_str(), |t| t.name.as_str());
                tracing::error!(topic = %name, error = %e, "topic run failed");
            }
        }
        if failed > 0 {
            tracing::warn!(failed_topics = failed, total_topics = topics.len(), "some topics failed");
        }

        results.into_iter().map(|(_, id, r)| (id, r)).collect()
    }
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
