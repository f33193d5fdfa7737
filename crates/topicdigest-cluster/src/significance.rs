//! Significant-word extraction.
//!
//! A significant word is a token that survives stop-word filtering and, for
//! the title and body modes, starts with a capital letter. Sentence-initial
//! capitals carry no signal, so body mode drops the first capitalized token
//! of every sentence.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use topicdigest_core::{Article, RunSettings};

use crate::rarity::{sort_by_rarity, WordCounts};

static CAPITALIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\p{Lu}\p{L}+\b").expect("valid capitalized regex"));

static ALPHABETIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\p{L}{3,}\b").expect("valid alphabetic regex"));

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+\s+|\n+").expect("valid sentence regex"));

/// Generic, time and publisher words that never identify a story.
const STOP_WORDS: &[&str] = &[
    // articles, pronouns, connectives
    "the", "a", "an", "and", "or", "but", "if", "then", "this", "that", "these", "those", "it",
    "its", "he", "she", "they", "we", "you", "his", "her", "their", "our", "your", "who", "what",
    "when", "where", "why", "how", "which", "there", "here", "after", "before", "as", "at", "by",
    "for", "from", "in", "into", "of", "on", "to", "with", "without", "about", "over", "under",
    "new", "more", "most", "some", "all", "any", "not", "no", "yes", "is", "are", "was", "were",
    "be", "been", "has", "have", "had", "will", "would", "can", "could", "should", "may", "might",
    "also", "just", "now", "than", "while", "amid", "says", "said", "mr", "mrs", "ms", "dr",
    // time
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "today",
    "yesterday", "tomorrow", "tonight", "week", "weekend", "month", "year", "january",
    "february", "march", "april", "june", "july", "august", "september", "october", "november",
    "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov",
    "dec", "am", "pm", "gmt", "utc", "est", "edt", "pst", "pdt",
    // publishers and feed boilerplate
    "news", "reuters", "ap", "afp", "cnn", "bbc", "nbc", "cbs", "abc", "fox", "npr", "msnbc",
    "guardian", "times", "post", "journal", "bloomberg", "associated", "press", "google",
    "yahoo", "live", "update", "updates", "breaking", "video", "photos", "watch", "read",
    "full", "coverage", "opinion", "analysis", "report", "exclusive", "comment",
];

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

fn is_stop_word(token: &str) -> bool {
    STOP_SET.contains(token.to_lowercase().as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Every capitalized token of a single title string.
    TitleOnly,
    /// Capitalized tokens per sentence, minus the first one in each sentence.
    Body,
    /// Every alphabetic token of three or more letters, any case.
    AllWords,
}

/// Extract significant words from `text`, in first-seen order without duplicates.
#[must_use]
pub fn extract(text: &str, mode: ExtractionMode) -> Vec<String> {
    let tokens: Vec<&str> = match mode {
        ExtractionMode::TitleOnly => CAPITALIZED.find_iter(text).map(|m| m.as_str()).collect(),
        ExtractionMode::Body => SENTENCE_BREAK
            .split(text)
            .flat_map(|sentence| CAPITALIZED.find_iter(sentence).skip(1).map(|m| m.as_str()))
            .collect(),
        ExtractionMode::AllWords => ALPHABETIC.find_iter(text).map(|m| m.as_str()).collect(),
    };

    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .filter(|t| !is_stop_word(t))
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignificanceOptions {
    pub title_only: bool,
    pub all_words: bool,
}

impl From<&RunSettings> for SignificanceOptions {
    fn from(settings: &RunSettings) -> Self {
        Self {
            title_only: settings.title_only,
            all_words: settings.all_words,
        }
    }
}

fn body_text(article: &Article) -> String {
    format!("{}\n{}", article.summary, article.content)
}

/// Rarity-ranked significant words for one article.
///
/// Title words always come first, followed by body words not already
/// present, so the title dominates prefix comparisons during clustering.
#[must_use]
pub fn significant_words(
    article: &Article,
    options: SignificanceOptions,
    counts: &WordCounts,
) -> Vec<String> {
    if options.all_words {
        let text = format!("{}\n{}", article.title, body_text(article));
        return sort_by_rarity(extract(&text, ExtractionMode::AllWords), counts);
    }

    let mut words = sort_by_rarity(extract(&article.title, ExtractionMode::TitleOnly), counts);
    if options.title_only {
        return words;
    }

    let seen: HashSet<String> = words.iter().cloned().collect();
    let body: Vec<String> = extract(&body_text(article), ExtractionMode::Body)
        .into_iter()
        .filter(|w| !seen.contains(w))
        .collect();
    words.extend(sort_by_rarity(body, counts));
    words
}

/// Build the run's word counts and fill in every article's significant words.
pub fn assign_significant_words(
    articles: &mut [Article],
    options: SignificanceOptions,
) -> WordCounts {
    let counts = WordCounts::build(articles);
    for article in articles.iter_mut() {
        article.significant_words = significant_words(article, options, &counts);
    }
    counts
}
