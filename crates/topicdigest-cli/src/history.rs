//! The `history` command.

use std::fmt::Write as _;

use topicdigest_core::{DigestStore, Summary};

/// Render one stored digest as plain text.
pub(crate) fn format_summary(summary: &Summary) -> String {
    let mut out = format!(
        "== {} | {} articles | {} clusters ==\n",
        summary.created_at.format("%Y-%m-%d %H:%M UTC"),
        summary.number_of_articles,
        summary.clusters.clusters.len()
    );
    for story in &summary.final_summary.stories {
        let _ = writeln!(out, "\n{}\n{}", story.title, story.content);
    }
    if !summary.final_summary.questions.is_empty() {
        out.push_str("\nQuestions:\n");
        for question in &summary.final_summary.questions {
            let _ = writeln!(out, "- {question}");
        }
    }
    out
}

pub(crate) async fn print_history(
    store: &dyn DigestStore,
    topic: &str,
    limit: usize,
) -> anyhow::Result<()> {
    let summaries = store.list_summaries(topic, limit).await?;
    if summaries.is_empty() {
        println!("no digests for topic '{topic}'");
        return Ok(());
    }
    for summary in &summaries {
        println!("{}", format_summary(summary));
    }
    Ok(())
}
