use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Per-run clustering and extraction knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub days_back: u32,
    pub common_word_threshold: usize,
    pub top_words_to_consider: usize,
    pub merge_threshold: usize,
    pub min_articles: usize,
    pub join_percentage: f64,
    pub final_merge_percentage: f64,
    pub sentences_per_story: u32,
    pub title_only: bool,
    pub all_words: bool,
    /// Upper bound on estimated tokens per summarization request.
    pub max_request_tokens: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            days_back: 1,
            common_word_threshold: 2,
            top_words_to_consider: 3,
            merge_threshold: 2,
            min_articles: 3,
            join_percentage: 0.5,
            final_merge_percentage: 0.5,
            sentences_per_story: 3,
            title_only: false,
            all_words: false,
            max_request_tokens: 100_000,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub database_url: Option<String>,
    pub topics_path: PathBuf,
    pub llm_api_base: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub llm_backoff_base_ms: u64,
    pub feed_request_timeout_secs: u64,
    pub feed_source_timeout_secs: u64,
    pub feed_max_concurrent: usize,
    pub feed_user_agent: String,
    pub max_concurrent_topics: usize,
    pub run: RunSettings,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("topics_path", &self.topics_path)
            .field("llm_api_base", &self.llm_api_base)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("llm_temperature", &self.llm_temperature)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("llm_max_retries", &self.llm_max_retries)
            .field("llm_backoff_base_ms", &self.llm_backoff_base_ms)
            .field("feed_request_timeout_secs", &self.feed_request_timeout_secs)
            .field("feed_source_timeout_secs", &self.feed_source_timeout_secs)
            .field("feed_max_concurrent", &self.feed_max_concurrent)
            .field("feed_user_agent", &self.feed_user_agent)
            .field("max_concurrent_topics", &self.max_concurrent_topics)
            .field("run", &self.run)
            .finish()
    }
}
