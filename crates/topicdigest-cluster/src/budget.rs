//! Token budgeting for summarization requests.
//!
//! Token counts are a whitespace-split estimate, not tokenizer parity.

use std::cmp::Reverse;

use topicdigest_core::Article;

/// Reserved for the system instruction and the model's response.
pub const PROMPT_RESERVE_TOKENS: usize = 2_000;

/// Above this estimate a cluster is cut in half without sorting.
pub const HARD_TOKEN_CEILING: usize = 180_000;

/// Articles per chunk when a cluster has to be split.
pub const CHUNK_SIZE: usize = 10;

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The text an article contributes to a summarization request.
#[must_use]
pub fn article_listing(article: &Article) -> String {
    format!(
        "Title: {}\nURL: {}\nSummary: {}\nContent: {}\n",
        article.title, article.link, article.summary, article.content
    )
}

fn article_tokens(article: &Article) -> usize {
    estimate_tokens(&article_listing(article))
}

fn newest_first(articles: &[Article]) -> Vec<Article> {
    let mut sorted = articles.to_vec();
    // `None` sorts below every `Some`, so undated articles land last.
    sorted.sort_by_key(|a| Reverse(a.published_at));
    sorted
}

/// Select the articles that fit in one request of `max_tokens`.
///
/// Newest articles are taken first until the running total would exceed
/// `max_tokens - PROMPT_RESERVE_TOKENS`. A cluster whose full estimate is
/// above [`HARD_TOKEN_CEILING`] is instead reduced to the first half of its
/// unsorted article list.
#[must_use]
pub fn limit_cluster_content(articles: &[Article], max_tokens: usize) -> Vec<Article> {
    let total: usize = articles.iter().map(article_tokens).sum();
    if total > HARD_TOKEN_CEILING {
        tracing::debug!(
            total_tokens = total,
            articles = articles.len(),
            "cluster above hard ceiling; keeping first half"
        );
        return articles[..articles.len() / 2].to_vec();
    }

    let budget = max_tokens.saturating_sub(PROMPT_RESERVE_TOKENS);
    let mut used = 0usize;
    let mut selected = Vec::new();
    for article in newest_first(articles) {
        let cost = article_tokens(&article);
        if used + cost > budget {
            break;
        }
        used += cost;
        selected.push(article);
    }
    selected
}

/// Split a cluster into request-sized groups.
///
/// When the budgeted selection keeps at least half of the articles it is the
/// single chunk. Otherwise the newest-first list is partitioned into chunks
/// of [`CHUNK_SIZE`] that are summarized independently.
#[must_use]
pub fn plan_chunks(articles: &[Article], max_tokens: usize) -> Vec<Vec<Article>> {
    if articles.is_empty() {
        return Vec::new();
    }

    let limited = limit_cluster_content(articles, max_tokens);
    if limited.len() * 2 >= articles.len() {
        return vec![limited];
    }

    newest_first(articles)
        .chunks(CHUNK_SIZE)
        .map(<[Article]>::to_vec)
        .collect()
}
