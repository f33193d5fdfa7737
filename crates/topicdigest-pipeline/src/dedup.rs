use std::collections::HashSet;

use topicdigest_core::Article;

/// Drop repeated `(title, link)` pairs, keeping the first occurrence.
#[must_use]
pub fn dedup_articles(articles: Vec<Article>) -> Vec<Article> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(articles.len());
    articles
        .into_iter()
        .filter(|a| seen.insert((a.title.clone(), a.link.clone())))
        .collect()
}
