use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, RunSettings};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration from an arbitrary env-var lookup so parsing can be
/// tested against a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("TOPICDIGEST_ENV", "development"))?;
    let log_level = or_default("TOPICDIGEST_LOG_LEVEL", "info");
    let database_url = lookup("DATABASE_URL").ok().filter(|v| !v.is_empty());
    let topics_path = PathBuf::from(or_default("TOPICDIGEST_TOPICS_PATH", "./config/topics.yaml"));

    let llm_api_base = or_default("TOPICDIGEST_LLM_API_BASE", "https://api.openai.com/v1");
    let llm_api_key = lookup("TOPICDIGEST_LLM_API_KEY").ok().filter(|v| !v.is_empty());
    let llm_model = or_default("TOPICDIGEST_LLM_MODEL", "gpt-4o-mini");
    let llm_temperature: f32 = parse_var(&lookup, "TOPICDIGEST_LLM_TEMPERATURE", "0.2")?;
    let llm_timeout_secs: u64 = parse_var(&lookup, "TOPICDIGEST_LLM_TIMEOUT_SECS", "120")?;
    let llm_max_retries: u32 = parse_var(&lookup, "TOPICDIGEST_LLM_MAX_RETRIES", "3")?;
    let llm_backoff_base_ms: u64 = parse_var(&lookup, "TOPICDIGEST_LLM_BACKOFF_BASE_MS", "1000")?;

    let feed_request_timeout_secs: u64 =
        parse_var(&lookup, "TOPICDIGEST_FEED_REQUEST_TIMEOUT_SECS", "15")?;
    let feed_source_timeout_secs: u64 =
        parse_var(&lookup, "TOPICDIGEST_FEED_SOURCE_TIMEOUT_SECS", "60")?;
    let feed_max_concurrent: usize = parse_var(&lookup, "TOPICDIGEST_FEED_MAX_CONCURRENT", "10")?;
    let feed_user_agent = or_default("TOPICDIGEST_FEED_USER_AGENT", "topicdigest/0.1 (feed-reader)");
    let max_concurrent_topics: usize =
        parse_var(&lookup, "TOPICDIGEST_MAX_CONCURRENT_TOPICS", "1")?;

    let run = build_run_settings(&lookup)?;

    Ok(AppConfig {
        env,
        log_level,
        database_url,
        topics_path,
        llm_api_base,
        llm_api_key,
        llm_model,
        llm_temperature,
        llm_timeout_secs,
        llm_max_retries,
        llm_backoff_base_ms,
        feed_request_timeout_secs,
        feed_source_timeout_secs,
        feed_max_concurrent,
        feed_user_agent,
        max_concurrent_topics,
        run,
    })
}

fn build_run_settings<F>(lookup: &F) -> Result<RunSettings, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = RunSettings::default();

    let settings = RunSettings {
        days_back: parse_or(lookup, "TOPICDIGEST_DAYS_BACK", defaults.days_back)?,
        common_word_threshold: parse_or(
            lookup,
            "TOPICDIGEST_COMMON_WORD_THRESHOLD",
            defaults.common_word_threshold,
        )?,
        top_words_to_consider: parse_or(
            lookup,
            "TOPICDIGEST_TOP_WORDS_TO_CONSIDER",
            defaults.top_words_to_consider,
        )?,
        merge_threshold: parse_or(lookup, "TOPICDIGEST_MERGE_THRESHOLD", defaults.merge_threshold)?,
        min_articles: parse_or(lookup, "TOPICDIGEST_MIN_ARTICLES", defaults.min_articles)?,
        join_percentage: parse_or(lookup, "TOPICDIGEST_JOIN_PERCENTAGE", defaults.join_percentage)?,
        final_merge_percentage: parse_or(
            lookup,
            "TOPICDIGEST_FINAL_MERGE_PERCENTAGE",
            defaults.final_merge_percentage,
        )?,
        sentences_per_story: parse_or(
            lookup,
            "TOPICDIGEST_SENTENCES_PER_STORY",
            defaults.sentences_per_story,
        )?,
        title_only: parse_or(lookup, "TOPICDIGEST_TITLE_ONLY", defaults.title_only)?,
        all_words: parse_or(lookup, "TOPICDIGEST_ALL_WORDS", defaults.all_words)?,
        max_request_tokens: parse_or(
            lookup,
            "TOPICDIGEST_MAX_REQUEST_TOKENS",
            defaults.max_request_tokens,
        )?,
    };

    for (var, value) in [
        ("TOPICDIGEST_JOIN_PERCENTAGE", settings.join_percentage),
        (
            "TOPICDIGEST_FINAL_MERGE_PERCENTAGE",
            settings.final_merge_percentage,
        ),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("{value} is outside [0, 1]"),
            });
        }
    }
    if settings.top_words_to_consider == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TOPICDIGEST_TOP_WORDS_TO_CONSIDER".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(settings)
}

fn parse_var<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TOPICDIGEST_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
