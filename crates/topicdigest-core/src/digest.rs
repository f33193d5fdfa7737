//! Digest documents and persisted summary records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::snapshot::ClusterSnapshot;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// The structured final digest for one topic run.
///
/// Every field defaults so that partially-formed model output still
/// deserializes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestDocument {
    #[serde(default)]
    pub stories: Vec<Story>,
    #[serde(default)]
    pub questions: Vec<String>,
}

impl DigestDocument {
    /// Well-formed stand-in used when model output cannot be parsed.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            stories: vec![Story {
                title: "Error".to_string(),
                content: "The digest for this run could not be generated. \
                          It will be retried when the news changes again."
                    .to_string(),
            }],
            questions: vec![
                "What are the most important developments in this topic?".to_string(),
                "Which sources are covering this topic most closely?".to_string(),
                "What should I watch for next?".to_string(),
            ],
        }
    }
}

/// Immutable record of one published digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: Uuid,
    pub topic_id: String,
    pub final_summary: DigestDocument,
    pub clusters: ClusterSnapshot,
    pub cluster_summaries: Vec<String>,
    pub number_of_articles: usize,
    pub created_at: DateTime<Utc>,
}

impl Summary {
    #[must_use]
    pub fn new(
        topic_id: &str,
        final_summary: DigestDocument,
        clusters: ClusterSnapshot,
        cluster_summaries: Vec<String>,
        number_of_articles: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic_id: topic_id.to_string(),
            final_summary,
            clusters,
            cluster_summaries,
            number_of_articles,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_error_story_and_three_questions() {
        let doc = DigestDocument::placeholder();
        assert_eq!(doc.stories.len(), 1);
        assert_eq!(doc.stories[0].title, "Error");
        assert_eq!(doc.questions.len(), 3);
    }

    #[test]
    fn missing_fields_default() {
        let doc: DigestDocument =
            serde_json::from_str(r#"{"stories":[{"title":"Only a title"}]}"#).unwrap();
        assert_eq!(doc.stories[0].content, "");
        assert!(doc.questions.is_empty());
    }
}
