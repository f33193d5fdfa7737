use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use topicdigest_core::{DigestDocument, DigestStore};
use topicdigest_llm::{GenerationRequest, LlmError, TextGenerator};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::memory::MemoryStore;

/// Answers cluster prompts with `cluster_text` and digest prompts with JSON,
/// or with an error when `digest_down` is set.
struct CountingGenerator {
    calls: AtomicUsize,
    digest_calls: AtomicUsize,
    cluster_text: String,
    digest_down: bool,
}

impl CountingGenerator {
    fn new(cluster_text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            digest_calls: AtomicUsize::new(0),
            cluster_text: cluster_text.to_string(),
            digest_down: false,
        })
    }

    fn with_digest_down(cluster_text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            digest_calls: AtomicUsize::new(0),
            cluster_text: cluster_text.to_string(),
            digest_down: true,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for CountingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.system.contains("JSON") {
            self.digest_calls.fetch_add(1, Ordering::SeqCst);
            if self.digest_down {
                return Err(LlmError::RateLimited);
            }
            return Ok(r#"{"stories":[{"title":"Budget","content":"Passed."}],"questions":["Q1","Q2","Q3"]}"#.to_string());
        }
        if request.user.contains("Tesla") {
            return Ok(format!("{} Tesla recall widens", self.cluster_text));
        }
        Ok(self.cluster_text.clone())
    }
}

fn rss(titles: &[&str], host: &str) -> String {
    let date = (Utc::now() - chrono::Duration::hours(1)).to_rfc2822();
    let items: String = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            format!("<item><title>{title}</title><link>https://{host}/{i}</link><pubDate>{date}</pubDate></item>")
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title><link>https://{host}</link><description>d</description>{items}</channel></rss>"#
    )
}

const SENATE: [&str; 5] = [
    "Senate Budget Filibuster",
    "Senate Budget Shutdown",
    "Senate Budget Deadline",
    "Senate Budget Compromise",
    "Senate Budget Markup",
];
const TESLA: [&str; 3] = ["Tesla Recall Brakes", "Tesla Recall Software", "Tesla Recall Probe"];

async fn mount(server: &MockServer, route: &str, body: String, delay_secs: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .set_delay(Duration::from_secs(delay_secs)),
        )
        .mount(server)
        .await;
}

fn pipeline(generator: Arc<CountingGenerator>, store: Arc<MemoryStore>) -> Pipeline {
    let feeds = FeedClient::new(FeedClientConfig {
        request_timeout_secs: 10,
        source_timeout_secs: 1,
        max_concurrent: 4,
        user_agent: "topicdigest-test".to_string(),
    })
    .unwrap();
    let params = ModelParams {
        model: "test".to_string(),
        temperature: 0.0,
        max_tokens: None,
    };
    let summarizer = Summarizer::new(generator, params, 100_000, 3);
    Pipeline::new(feeds, summarizer, store, RunSettings::default())
}

fn topic(id: &str, sources: Vec<String>) -> Topic {
    Topic {
        id: id.to_string(),
        name: id.to_uppercase(),
        sources,
        prompt: None,
    }
}

#[tokio::test]
async fn first_run_publishes_and_identical_rerun_is_free() {
    let server = MockServer::start().await;
    mount(&server, "/senate", rss(&SENATE, "a.test"), 0).await;
    mount(&server, "/tesla", rss(&TESLA, "b.test"), 0).await;

    let generator = CountingGenerator::new("Senate passed the budget");
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline(generator.clone(), store.clone());
    let t = topic(
        "politics",
        vec![format!("{}/senate", server.uri()), format!("{}/tesla", server.uri())],
    );

    let first = pipeline.run_topic(&t).await.unwrap();
    assert_eq!(first.articles, 8);
    assert_eq!(first.clusters, 2);
    assert!(matches!(first.outcome, RunOutcome::Published { placeholder: false, .. }));
    assert_eq!(generator.calls(), 3, "two clusters and one digest");

    let stored = store.latest_summary("politics").await.unwrap().unwrap();
    assert_eq!(stored.number_of_articles, 8);
    assert_eq!(stored.cluster_summaries.len(), 2);
    assert_eq!(stored.final_summary.stories[0].title, "Budget");
    let snapshot_after_first = store.load_snapshot("politics").await.unwrap().unwrap();
    assert_eq!(snapshot_after_first, stored.clusters);

    let second = pipeline.run_topic(&t).await.unwrap();
    assert!(matches!(second.outcome, RunOutcome::Unchanged { cluster_ratio } if cluster_ratio < 1e-9));
    assert_eq!(generator.calls(), 3, "no generation on an unchanged run");
    assert_eq!(store.list_summaries("politics", 10).await.unwrap().len(), 1);
    assert_eq!(
        store.load_snapshot("politics").await.unwrap(),
        Some(snapshot_after_first)
    );
}

#[tokio::test]
async fn stable_cluster_summaries_skip_the_digest() {
    let server = MockServer::start().await;
    mount(&server, "/senate", rss(&SENATE, "a.test"), 0).await;

    let generator = CountingGenerator::new("Senate passed the budget");
    let store = Arc::new(MemoryStore::new());
    // Prior digest with the same cluster summary text but no clusters on file.
    store
        .append_summary(&Summary::new(
            "politics",
            DigestDocument::default(),
            ClusterSnapshot::default(),
            vec!["Senate passed the budget".to_string()],
            5,
        ))
        .await
        .unwrap();
    let pipeline = pipeline(generator.clone(), store.clone());
    let t = topic("politics", vec![format!("{}/senate", server.uri())]);

    let report = pipeline.run_topic(&t).await.unwrap();

    assert!(matches!(report.outcome, RunOutcome::SummariesStable { .. }));
    assert_eq!(generator.calls(), 1, "one cluster summary, no digest");
    assert_eq!(generator.digest_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.list_summaries("politics", 10).await.unwrap().len(), 1);
    assert!(store.load_snapshot("politics").await.unwrap().is_some());
}

#[tokio::test]
async fn timed_out_source_is_reported_and_others_cluster() {
    let server = MockServer::start().await;
    mount(&server, "/senate", rss(&SENATE, "a.test"), 0).await;
    mount(&server, "/slow", rss(&["Never arrives"], "slow.test"), 3).await;
    mount(&server, "/tesla", rss(&TESLA, "b.test"), 0).await;

    let generator = CountingGenerator::new("Senate passed the budget");
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline(generator, store);
    let slow = format!("{}/slow", server.uri());
    let t = topic(
        "politics",
        vec![
            format!("{}/senate", server.uri()),
            slow.clone(),
            format!("{}/tesla", server.uri()),
        ],
    );

    let report = pipeline.run_topic(&t).await.unwrap();

    assert_eq!(report.failed_sources, vec![slow]);
    assert_eq!(report.articles, 8);
    assert_eq!(report.clusters, 2);
}

#[tokio::test]
async fn failing_topic_does_not_stop_the_others() {
    let server = MockServer::start().await;
    mount(&server, "/senate", rss(&SENATE, "a.test"), 0).await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let generator = CountingGenerator::new("Senate passed the budget");
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline(generator, store.clone()).with_max_concurrent_topics(2);
    let topics = vec![
        topic("broken", vec![format!("{}/down", server.uri())]),
        topic("politics", vec![format!("{}/senate", server.uri())]),
    ];

    let results = pipeline.run_topics(&topics).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "broken");
    assert!(matches!(
        results[0].1,
        Err(PipelineError::AllSourcesFailed { sources: 1, .. })
    ));
    assert_eq!(results[1].0, "politics");
    assert!(results[1].1.is_ok());
    assert!(store.load_snapshot("broken").await.unwrap().is_none());
    assert!(store.latest_summary("politics").await.unwrap().is_some());
}

#[tokio::test]
async fn empty_window_clears_the_stored_snapshot() {
    let server = MockServer::start().await;
    mount(&server, "/senate", rss(&SENATE, "a.test"), 0).await;
    mount(&server, "/empty", rss(&[], "a.test"), 0).await;

    let generator = CountingGenerator::new("Senate passed the budget");
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline(generator.clone(), store.clone());

    let busy = pipeline
        .run_topic(&topic("quiet", vec![format!("{}/senate", server.uri())]))
        .await
        .unwrap();
    assert!(matches!(busy.outcome, RunOutcome::Published { .. }));
    let calls_after_first = generator.calls();

    let report = pipeline
        .run_topic(&topic("quiet", vec![format!("{}/empty", server.uri())]))
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::NoArticles);
    assert_eq!(generator.calls(), calls_after_first);
    assert_eq!(
        store.load_snapshot("quiet").await.unwrap(),
        Some(ClusterSnapshot::default())
    );
    assert_eq!(store.list_summaries("quiet", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_digest_saves_snapshot_but_no_summary() {
    let server = MockServer::start().await;
    mount(&server, "/senate", rss(&SENATE, "a.test"), 0).await;

    let generator = CountingGenerator::with_digest_down("Senate passed the budget");
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline(generator.clone(), store.clone());
    let t = topic("politics", vec![format!("{}/senate", server.uri())]);

    let report = pipeline.run_topic(&t).await.unwrap();

    assert!(matches!(report.outcome, RunOutcome::DigestFailed { .. }));
    assert_eq!(generator.digest_calls.load(Ordering::SeqCst), 1);
    assert!(store.list_summaries("politics", 10).await.unwrap().is_empty());
    let snapshot = store.load_snapshot("politics").await.unwrap().unwrap();
    assert_eq!(snapshot.article_count(), 5);
}
