//! Per-run word frequency table.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use topicdigest_core::Article;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}+").expect("valid word regex"));

/// Frequency of every word across the titles and bodies of one run's articles.
///
/// Built once per run and passed explicitly to extraction and sorting; it is
/// never shared between runs or topics.
#[derive(Debug, Clone, Default)]
pub struct WordCounts {
    counts: HashMap<String, usize>,
}

impl WordCounts {
    #[must_use]
    pub fn build(articles: &[Article]) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for article in articles {
            for text in [&article.title, &article.summary, &article.content] {
                for m in WORD.find_iter(text) {
                    *counts.entry(m.as_str().to_string()).or_insert(0) += 1;
                }
            }
        }
        Self { counts }
    }

    /// Occurrences of `word` in the batch; 0 when never seen.
    #[must_use]
    pub fn count(&self, word: &str) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Reorder `words` from rarest to most common.
///
/// The sort is stable: words with equal counts keep their relative order.
#[must_use]
pub fn sort_by_rarity(mut words: Vec<String>, counts: &WordCounts) -> Vec<String> {
    words.sort_by_key(|w| counts.count(w));
    words
}
