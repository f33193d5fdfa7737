//! Change detection between consecutive runs of a topic.
//!
//! Both ratios are Jaccard distances in `[0, 1]`: 0 means nothing changed,
//! 1 means the two sides share nothing.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use topicdigest_core::ClusterSnapshot;

/// Ratios at or above this value count as a meaningful change.
pub const CHANGE_THRESHOLD: f64 = 0.4;

static SUMMARY_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[[:alnum:]]+").expect("valid summary word regex"));

#[must_use]
pub fn is_significant(ratio: f64) -> bool {
    ratio >= CHANGE_THRESHOLD
}

/// How much `current` differs from `previous`.
///
/// Mean of three distances: the pooled common words, the set of article
/// identities, and the set of cluster compositions (each cluster's sorted
/// member identities). Regrouping the same articles therefore still counts
/// as a partial change.
#[must_use]
pub fn cluster_difference(current: &ClusterSnapshot, previous: &ClusterSnapshot) -> f64 {
    let words = |s: &ClusterSnapshot| -> BTreeSet<String> {
        s.clusters
            .iter()
            .flat_map(|c| c.common_words.iter().cloned())
            .collect()
    };
    let articles = |s: &ClusterSnapshot| -> BTreeSet<String> {
        s.clusters
            .iter()
            .flat_map(|c| c.articles.iter().map(topicdigest_core::ArticleRef::key))
            .collect()
    };
    let compositions = |s: &ClusterSnapshot| -> BTreeSet<String> {
        s.clusters
            .iter()
            .map(|c| {
                let mut keys: Vec<String> = c.articles.iter().map(|a| a.key()).collect();
                keys.sort();
                keys.join("\n")
            })
            .collect()
    };

    let distances = [
        jaccard_distance(&words(current), &words(previous)),
        jaccard_distance(&articles(current), &articles(previous)),
        jaccard_distance(&compositions(current), &compositions(previous)),
    ];
    distances.iter().sum::<f64>() / 3.0
}

/// How much the cluster-level summary text changed, by lowercase word sets.
#[must_use]
pub fn summary_difference(current: &[String], previous: &[String]) -> f64 {
    let tokens = |summaries: &[String]| -> BTreeSet<String> {
        summaries
            .iter()
            .flat_map(|s| SUMMARY_WORD.find_iter(s).map(|m| m.as_str().to_lowercase()))
            .collect()
    };
    jaccard_distance(&tokens(current), &tokens(previous))
}

#[allow(clippy::cast_precision_loss)]
fn jaccard_distance(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    1.0 - shared as f64 / union as f64
}
