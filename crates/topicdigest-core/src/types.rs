use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single feed entry, normalized for clustering.
///
/// Identity within a run is the `(title, link)` pair. `significant_words` is
/// empty until the significance extractor fills it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: String,
    pub content: String,
    /// Rarest first. Assigned once per run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub significant_words: Vec<String>,
}

impl Article {
    #[must_use]
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published_at: None,
            summary: String::new(),
            content: String::new(),
            significant_words: Vec::new(),
        }
    }

    /// Identity key used for deduplication and snapshots.
    #[must_use]
    pub fn identity(&self) -> (&str, &str) {
        (&self.title, &self.link)
    }

    /// The first `n` significant words as a set.
    #[must_use]
    pub fn top_words(&self, n: usize) -> BTreeSet<String> {
        self.significant_words.iter().take(n).cloned().collect()
    }
}

/// A group of articles sharing significant words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub common_words: BTreeSet<String>,
    pub articles: Vec<Article>,
    /// Set on the overflow bucket that collects undersized clusters.
    #[serde(default)]
    pub miscellaneous: bool,
}

impl Cluster {
    #[must_use]
    pub fn seeded(article: Article, common_words: BTreeSet<String>) -> Self {
        Self {
            common_words,
            articles: vec![article],
            miscellaneous: false,
        }
    }

    #[must_use]
    pub fn miscellaneous(articles: Vec<Article>) -> Self {
        Self {
            common_words: BTreeSet::new(),
            articles,
            miscellaneous: true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Union of every member's significant words.
    #[must_use]
    pub fn aggregate_words(&self) -> BTreeSet<&str> {
        self.articles
            .iter()
            .flat_map(|a| a.significant_words.iter().map(String::as_str))
            .collect()
    }

    /// Human-readable label for logs and placeholder text.
    #[must_use]
    pub fn label(&self) -> String {
        if self.miscellaneous {
            return "miscellaneous".to_string();
        }
        self.common_words
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(words: &[&str]) -> Article {
        let mut a = Article::new("t", "https://example.com/t");
        a.significant_words = words.iter().map(|w| (*w).to_string()).collect();
        a
    }

    #[test]
    fn top_words_takes_prefix() {
        let a = article(&["Senate", "Budget", "Vote", "Monday"]);
        let top = a.top_words(2);
        assert_eq!(top.len(), 2);
        assert!(top.contains("Senate") && top.contains("Budget"));
    }

    #[test]
    fn aggregate_words_unions_members() {
        let mut c = Cluster::seeded(article(&["A", "B"]), BTreeSet::new());
        c.articles.push(article(&["B", "C"]));
        let words = c.aggregate_words();
        assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn miscellaneous_label() {
        let c = Cluster::miscellaneous(vec![]);
        assert_eq!(c.label(), "miscellaneous");
        assert!(c.is_empty());
    }
}
