//! Four-stage article clustering.
//!
//! Clusters live in a plain `Vec` and are addressed by index. A merge always
//! folds the later cluster into the earlier one and removes the later index,
//! so creation order is preserved and no two clusters alias each other.
//!
//! 1. [`assign_initial`]: first-fit assignment on each article's rarest words.
//! 2. [`merge_by_threshold`]: pairwise merge on shared common words.
//! 3. [`enforce_min_size`]: dissolve small clusters and re-offer their articles.
//! 4. [`merge_by_percentage`]: merge clusters whose word pools mutually overlap.

use std::collections::BTreeSet;

use topicdigest_core::{Article, Cluster, RunSettings};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    pub common_word_threshold: usize,
    pub top_words_to_consider: usize,
    pub merge_threshold: usize,
    pub min_articles: usize,
    pub join_percentage: f64,
    pub final_merge_percentage: f64,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self::from(&RunSettings::default())
    }
}

impl From<&RunSettings> for ClusterParams {
    fn from(settings: &RunSettings) -> Self {
        Self {
            common_word_threshold: settings.common_word_threshold,
            top_words_to_consider: settings.top_words_to_consider,
            merge_threshold: settings.merge_threshold,
            min_articles: settings.min_articles,
            join_percentage: settings.join_percentage,
            final_merge_percentage: settings.final_merge_percentage,
        }
    }
}

/// Run all four stages over `articles`, which must already carry their
/// significant words. An empty batch yields no clusters.
#[must_use]
pub fn cluster_articles(articles: Vec<Article>, params: &ClusterParams) -> Vec<Cluster> {
    if articles.is_empty() {
        return Vec::new();
    }
    let article_count = articles.len();

    let mut clusters = assign_initial(articles, params);
    let initial = clusters.len();

    let threshold_merges = merge_by_threshold(&mut clusters, params.merge_threshold);

    let mut clusters = enforce_min_size(clusters, params);
    let after_min_size = clusters.len();

    let percentage_merges = merge_by_percentage(&mut clusters, params.final_merge_percentage);

    tracing::debug!(
        articles = article_count,
        initial,
        threshold_merges,
        after_min_size,
        percentage_merges,
        clusters = clusters.len(),
        "clustering complete"
    );

    clusters
}

/// Stage 1: walk articles in input order and put each into the first cluster
/// whose common words share at least `common_word_threshold` words with the
/// article's top words, shrinking that cluster's common words to the
/// intersection. Otherwise the article seeds a new cluster.
#[must_use]
pub fn assign_initial(articles: Vec<Article>, params: &ClusterParams) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();

    for article in articles {
        let top = article.top_words(params.top_words_to_consider);
        let slot = clusters.iter().position(|c| {
            c.common_words.intersection(&top).count() >= params.common_word_threshold
        });

        match slot {
            Some(idx) => {
                let cluster = &mut clusters[idx];
                cluster.common_words = cluster.common_words.intersection(&top).cloned().collect();
                cluster.articles.push(article);
            }
            None => clusters.push(Cluster::seeded(article, top)),
        }
    }

    clusters
}

/// Stage 2: merge the first pair of clusters sharing at least `threshold`
/// common words, then rescan from the start, until a full pass finds none.
///
/// Returns the number of merges performed. Running it again on its own
/// output performs no merges.
pub fn merge_by_threshold(clusters: &mut Vec<Cluster>, threshold: usize) -> usize {
    let mut merges = 0;
    while let Some((i, j)) = find_pair(clusters, |a, b| {
        a.common_words.intersection(&b.common_words).count() >= threshold
    }) {
        absorb(clusters, i, j);
        merges += 1;
    }
    merges
}

/// Stage 3: dissolve clusters smaller than `min_articles` and offer each of
/// their articles to the surviving clusters in order.
///
/// An article joins the first cluster whose aggregate word pool contains at
/// least `join_percentage` of the article's own significant words. Articles
/// nobody takes end up in a trailing miscellaneous cluster, which is only
/// emitted when non-empty.
#[must_use]
pub fn enforce_min_size(clusters: Vec<Cluster>, params: &ClusterParams) -> Vec<Cluster> {
    let (mut valid, small): (Vec<Cluster>, Vec<Cluster>) = clusters
        .into_iter()
        .partition(|c| !c.miscellaneous && c.len() >= params.min_articles);

    let mut leftover = Vec::new();
    for article in small.into_iter().flat_map(|c| c.articles) {
        let slot = valid.iter().position(|c| {
            join_fraction(&article, c).is_some_and(|f| f >= params.join_percentage)
        });
        match slot {
            Some(idx) => valid[idx].articles.push(article),
            None => leftover.push(article),
        }
    }

    if !leftover.is_empty() {
        tracing::debug!(articles = leftover.len(), "articles left in miscellaneous");
        valid.push(Cluster::miscellaneous(leftover));
    }

    valid
}

/// Stage 4: merge the first pair of clusters whose aggregate word pools
/// overlap by at least `percentage` in both directions, then rescan.
///
/// The miscellaneous bucket never takes part. Returns the number of merges.
pub fn merge_by_percentage(clusters: &mut Vec<Cluster>, percentage: f64) -> usize {
    let mut merges = 0;
    while let Some((i, j)) = find_pair(clusters, |a, b| {
        mutual_overlap(a, b).is_some_and(|(ab, ba)| ab >= percentage && ba >= percentage)
    }) {
        absorb(clusters, i, j);
        merges += 1;
    }
    merges
}

/// First `(i, j)` with `i < j`, both non-miscellaneous, satisfying `mergeable`.
fn find_pair<F>(clusters: &[Cluster], mergeable: F) -> Option<(usize, usize)>
where
    F: Fn(&Cluster, &Cluster) -> bool,
{
    for (i, a) in clusters.iter().enumerate() {
        if a.miscellaneous {
            continue;
        }
        for (j, b) in clusters.iter().enumerate().skip(i + 1) {
            if !b.miscellaneous && mergeable(a, b) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Fold cluster `j` into cluster `i` (`i < j`) and remove `j`.
fn absorb(clusters: &mut Vec<Cluster>, i: usize, j: usize) {
    debug_assert!(i < j, "absorb expects i < j");
    let other = clusters.remove(j);
    let target = &mut clusters[i];
    target.common_words = target
        .common_words
        .intersection(&other.common_words)
        .cloned()
        .collect::<BTreeSet<_>>();
    target.articles.extend(other.articles);
}

/// Share of the article's words present in the cluster's pool, or `None`
/// when the article has no significant words.
#[allow(clippy::cast_precision_loss)]
fn join_fraction(article: &Article, cluster: &Cluster) -> Option<f64> {
    let words: BTreeSet<&str> = article.significant_words.iter().map(String::as_str).collect();
    if words.is_empty() {
        return None;
    }
    let pool = cluster.aggregate_words();
    let hits = words.iter().filter(|w| pool.contains(*w)).count();
    Some(hits as f64 / words.len() as f64)
}

/// `(|A∩B|/|A|, |A∩B|/|B|)` over aggregate word pools; `None` if either is empty.
#[allow(clippy::cast_precision_loss)]
fn mutual_overlap(a: &Cluster, b: &Cluster) -> Option<(f64, f64)> {
    let wa = a.aggregate_words();
    let wb = b.aggregate_words();
    if wa.is_empty() || wb.is_empty() {
        return None;
    }
    let shared = wa.intersection(&wb).count() as f64;
    Some((shared / wa.len() as f64, shared / wb.len() as f64))
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
