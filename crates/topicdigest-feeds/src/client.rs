//! HTTP fetching of RSS/Atom sources.

use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use topicdigest_core::{AppConfig, Article};

use crate::error::FeedError;
use crate::parse::{parse_feed, TimeWindow};

/// Network limits for feed fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedClientConfig {
    /// Per-request timeout applied by `reqwest`.
    pub request_timeout_secs: u64,
    /// Overall budget for one source, covering connect, body and parse.
    pub source_timeout_secs: u64,
    /// Sources fetched at the same time.
    pub max_concurrent: usize,
    pub user_agent: String,
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            source_timeout_secs: 60,
            max_concurrent: 10,
            user_agent: "topicdigest/0.1 (feed-reader)".to_string(),
        }
    }
}

impl From<&AppConfig> for FeedClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            request_timeout_secs: config.feed_request_timeout_secs,
            source_timeout_secs: config.feed_source_timeout_secs,
            max_concurrent: config.feed_max_concurrent,
            user_agent: config.feed_user_agent.clone(),
        }
    }
}

/// A source that produced no articles because it failed.
#[derive(Debug)]
pub struct SourceFailure {
    pub url: String,
    pub error: FeedError,
}

/// Result of fetching a topic's sources.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Articles from every successful source, in source order.
    pub articles: Vec<Article>,
    pub failed_sources: Vec<SourceFailure>,
}

/// Fetches and parses feeds.
pub struct FeedClient {
    client: Client,
    config: FeedClientConfig,
}

impl FeedClient {
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetch one source and keep its entries inside `window`.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Timeout`] if the source exceeds its overall budget.
    /// - [`FeedError::Http`] on network failure.
    /// - [`FeedError::UnexpectedStatus`] on a non-2xx response.
    /// - [`FeedError::Parse`] if the body is not a feed.
    pub async fn try_fetch(&self, url: &str, window: &TimeWindow) -> Result<Vec<Article>, FeedError> {
        let secs = self.config.source_timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), self.fetch_inner(url, window))
            .await
            .map_err(|_| FeedError::Timeout {
                url: url.to_string(),
                secs,
            })?
    }

    async fn fetch_inner(&self, url: &str, window: &TimeWindow) -> Result<Vec<Article>, FeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        parse_feed(&body, url, window)
    }

    /// Fetch one source, logging and swallowing any failure.
    pub async fn fetch(&self, url: &str, days_back: u32) -> Vec<Article> {
        let window = TimeWindow::days_back(Utc::now(), days_back);
        match self.try_fetch(url, &window).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(source_url = %url, error = %e, "feed fetch failed; skipping source");
                Vec::new()
            }
        }
    }

    /// Fetch every source for the last `days_back` days.
    pub async fn fetch_all(&self, urls: &[String], days_back: u32) -> FetchReport {
        let window = TimeWindow::days_back(Utc::now(), days_back);
        self.fetch_all_in(urls, &window).await
    }

    /// Fetch every source concurrently, bounded by `max_concurrent`.
    ///
    /// Results are reassembled in source order so the article batch is
    /// deterministic regardless of completion order.
    pub async fn fetch_all_in(&self, urls: &[String], window: &TimeWindow) -> FetchReport {
        let max_concurrent = self.config.max_concurrent.max(1);

        let mut results: Vec<(usize, &String, Result<Vec<Article>, FeedError>)> =
            stream::iter(urls.iter().enumerate())
                .map(|(i, url)| async move { (i, url, self.try_fetch(url, window).await) })
                .buffer_unordered(max_concurrent)
                .collect()
                .await;
        results.sort_by_key(|(i, _, _)| *i);

        let mut report = FetchReport::default();
        for (_, url, result) in results {
            match result {
                Ok(articles) => {
                    tracing::debug!(source_url = %url, articles = articles.len(), "fetched source");
                    report.articles.extend(articles);
                }
                Err(error) => {
                    tracing::warn!(source_url = %url, error = %error, "feed fetch failed; skipping source");
                    report.failed_sources.push(SourceFailure {
                        url: url.clone(),
                        error,
                    });
                }
            }
        }

        if !report.failed_sources.is_empty() {
            tracing::info!(
                failed_sources = report.failed_sources.len(),
                total_sources = urls.len(),
                "some sources failed"
            );
        }
        report
    }
}
