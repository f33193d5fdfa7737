use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One topic entry as written in `topics.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    pub name: String,
    pub sources: Vec<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl TopicConfig {
    /// Generate a URL-safe slug from the topic name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// A validated topic ready for a pipeline run.
///
/// The last cluster snapshot is not held here; it lives in the store keyed by
/// `id` so configuration edits and pipeline writes never touch the same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: String,
    pub name: String,
    /// Deduplicated, in first-seen order.
    pub sources: Vec<String>,
    pub prompt: Option<String>,
}

impl From<&TopicConfig> for Topic {
    fn from(cfg: &TopicConfig) -> Self {
        let mut seen = HashSet::new();
        let sources = cfg
            .sources
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
        Self {
            id: cfg.slug(),
            name: cfg.name.trim().to_string(),
            sources,
            prompt: cfg.prompt.clone().filter(|p| !p.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TopicsFile {
    pub topics: Vec<TopicConfig>,
}

impl TopicsFile {
    #[must_use]
    pub fn to_topics(&self) -> Vec<Topic> {
        self.topics.iter().map(Topic::from).collect()
    }
}

/// Load and validate the topics configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_topics(path: &Path) -> Result<TopicsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TopicsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let topics_file: TopicsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::TopicsFileParse)?;

    validate_topics(&topics_file)?;

    Ok(topics_file)
}

fn validate_topics(topics_file: &TopicsFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for topic in &topics_file.topics {
        if topic.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "topic name must be non-empty".to_string(),
            ));
        }

        let slug = topic.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "topic '{}' produces an empty slug",
                topic.name
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate topic slug: '{}' (from topic '{}')",
                slug, topic.name
            )));
        }

        if topic.sources.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "topic '{}' has no sources",
                topic.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write yaml");
        file
    }

    #[test]
    fn slug_strips_punctuation() {
        let cfg = TopicConfig {
            name: "U.S. Politics & Policy".to_string(),
            sources: vec![],
            prompt: None,
        };
        assert_eq!(cfg.slug(), "us-politics-policy");
    }

    #[test]
    fn loads_valid_file() {
        let file = write_yaml(
            "topics:\n  - name: World News\n    sources:\n      - https://a.test/rss\n      - https://a.test/rss\n      - https://b.test/atom\n    prompt: Focus on diplomacy\n",
        );
        let loaded = load_topics(file.path()).expect("valid topics file");
        let topics = loaded.to_topics();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].id, "world-news");
        assert_eq!(topics[0].sources.len(), 2, "duplicate sources collapse");
        assert_eq!(topics[0].prompt.as_deref(), Some("Focus on diplomacy"));
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let file = write_yaml(
            "topics:\n  - name: Tech\n    sources: [https://a.test]\n  - name: tech\n    sources: [https://b.test]\n",
        );
        let err = load_topics(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn rejects_topic_without_sources() {
        let file = write_yaml("topics:\n  - name: Empty\n    sources: []\n");
        let err = load_topics(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("no sources")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_topics(Path::new("/nonexistent/topics.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::TopicsFileIo { .. }));
    }
}
