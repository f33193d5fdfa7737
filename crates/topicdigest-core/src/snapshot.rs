//! Cleaned, persistable cluster shape used for change comparison between runs.

use serde::{Deserialize, Serialize};

use crate::types::Cluster;

/// Minimal article identity kept in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArticleRef {
    pub title: String,
    pub link: String,
}

impl ArticleRef {
    /// Stable string key for set comparisons.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}|{}", self.title, self.link)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCluster {
    /// Sorted.
    pub common_words: Vec<String>,
    pub articles: Vec<ArticleRef>,
    #[serde(default)]
    pub miscellaneous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterSnapshot {
    pub clusters: Vec<SnapshotCluster>,
}

impl ClusterSnapshot {
    #[must_use]
    pub fn from_clusters(clusters: &[Cluster]) -> Self {
        let clusters = clusters
            .iter()
            .map(|c| SnapshotCluster {
                common_words: c.common_words.iter().cloned().collect(),
                articles: c
                    .articles
                    .iter()
                    .map(|a| ArticleRef {
                        title: a.title.clone(),
                        link: a.link.clone(),
                    })
                    .collect(),
                miscellaneous: c.miscellaneous,
            })
            .collect();
        Self { clusters }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    #[must_use]
    pub fn article_count(&self) -> usize {
        self.clusters.iter().map(|c| c.articles.len()).sum()
    }
}
