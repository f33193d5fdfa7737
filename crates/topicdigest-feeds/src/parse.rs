//! RSS/Atom body → [`Article`] normalization.

use chrono::{DateTime, Duration, Utc};
use feed_rs::model::Entry;
use topicdigest_core::Article;

use crate::error::FeedError;
use crate::html::{extract_anchors, strip_html};

/// Anchors whose text contains this are aggregator navigation, not stories.
const FULL_COVERAGE: &str = "full coverage";

/// Inclusive publication window for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// `[now - days, now]`.
    #[must_use]
    pub fn days_back(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: now - Duration::days(i64::from(days)),
            end: now,
        }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Parse a feed body into the articles that fall inside `window`.
///
/// Entries without a title, a link, or any date are dropped. Aggregator
/// entries whose description carries two or more anchors also yield one
/// article per embedded link.
///
/// # Errors
///
/// Returns [`FeedError::Parse`] if the body is not a recognizable RSS or
/// Atom document.
pub fn parse_feed(body: &str, url: &str, window: &TimeWindow) -> Result<Vec<Article>, FeedError> {
    let feed = feed_rs::parser::parse(body.as_bytes()).map_err(|source| FeedError::Parse {
        url: url.to_string(),
        source,
    })?;

    let mut articles = Vec::new();
    for entry in &feed.entries {
        let Some(article) = entry_to_article(entry) else {
            continue;
        };
        let Some(published) = article.published_at else {
            continue;
        };
        if !window.contains(published) {
            continue;
        }
        let embedded = embedded_articles(entry, &article);
        articles.push(article);
        articles.extend(embedded);
    }

    tracing::debug!(
        source_url = %url,
        entries = feed.entries.len(),
        articles = articles.len(),
        "parsed feed"
    );
    Ok(articles)
}

fn entry_to_article(entry: &Entry) -> Option<Article> {
    let title = entry
        .title
        .as_ref()
        .map(|t| strip_html(&t.content))
        .filter(|t| !t.is_empty())?;
    let link = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .filter(|l| !l.is_empty())?;

    let mut article = Article::new(title, link);
    article.published_at = entry.published.or(entry.updated);
    article.summary = entry
        .summary
        .as_ref()
        .map(|s| strip_html(&s.content))
        .unwrap_or_default();
    article.content = entry
        .content
        .as_ref()
        .and_then(|c| c.body.as_deref())
        .map(strip_html)
        .unwrap_or_default();
    Some(article)
}

fn embedded_articles(entry: &Entry, parent: &Article) -> Vec<Article> {
    let Some(description) = entry.summary.as_ref() else {
        return Vec::new();
    };
    let anchors = extract_anchors(&description.content);
    if anchors.len() < 2 {
        return Vec::new();
    }

    anchors
        .into_iter()
        .filter(|(href, text)| {
            !text.is_empty()
                && href != &parent.link
                && !text.to_lowercase().contains(FULL_COVERAGE)
        })
        .map(|(href, text)| {
            let mut article = Article::new(text, href);
            article.published_at = parent.published_at;
            article
        })
        .collect()
}
