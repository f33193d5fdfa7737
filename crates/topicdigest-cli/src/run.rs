//! The `run` command.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;
use topicdigest_core::{load_topics, AppConfig, DigestStore, Topic};
use topicdigest_pipeline::{Pipeline, RunOutcome, RunReport};

/// Pick the topics to run: all of them, or the one whose slug matches.
pub(crate) fn select_topics(topics: Vec<Topic>, filter: Option<&str>) -> anyhow::Result<Vec<Topic>> {
    let Some(slug) = filter else {
        return Ok(topics);
    };
    let selected: Vec<Topic> = topics.into_iter().filter(|t| t.id == slug).collect();
    if selected.is_empty() {
        anyhow::bail!("topic '{slug}' not found; check config/topics.yaml");
    }
    Ok(selected)
}

pub(crate) fn describe(report: &RunReport) -> String {
    let outcome = match &report.outcome {
        RunOutcome::NoArticles => "no articles in window".to_string(),
        RunOutcome::Unchanged { cluster_ratio } => {
            format!("unchanged (cluster change {cluster_ratio:.2})")
        }
        RunOutcome::SummariesStable { summary_ratio, .. } => {
            format!("summaries stable (summary change {summary_ratio:.2})")
        }
        RunOutcome::DigestFailed { error, .. } => format!("digest failed ({error})"),
        RunOutcome::Published {
            summary_id,
            placeholder,
            ..
        } => {
            let suffix = if *placeholder { " [placeholder]" } else { "" };
            format!("published {summary_id}{suffix}")
        }
    };
    let mut line = format!(
        "{}: {} articles, {} clusters, {outcome}",
        report.topic_id, report.articles, report.clusters
    );
    if !report.failed_sources.is_empty() {
        let _ = write!(line, ", {} failed source(s)", report.failed_sources.len());
    }
    line
}

pub(crate) async fn run_pipeline(
    config: &AppConfig,
    store: Arc<dyn DigestStore>,
    topic_filter: Option<&str>,
) -> anyhow::Result<()> {
    let topics_file = load_topics(&config.topics_path)
        .with_context(|| format!("failed to load {}", config.topics_path.display()))?;
    let topics = select_topics(topics_file.to_topics(), topic_filter)?;

    let pipeline = Pipeline::from_config(config, store)?;
    let results = pipeline.run_topics(&topics).await;

    let mut failed = 0usize;
    for (topic_id, result) in &results {
        match result {
            Ok(report) => println!("{}", describe(report)),
            Err(e) => {
                failed += 1;
                println!("{topic_id}: failed: {e}");
            }
        }
    }

    if failed > 0 && failed == results.len() {
        anyhow::bail!("all {failed} topics failed");
    }
    Ok(())
}
