//! Connection pool settings and construction.

use std::str::FromStr;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::DbError;

/// Sizing and acquire timeout for the Postgres pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 10,
        }
    }
}

impl PoolConfig {
    /// Read `TOPICDIGEST_DB_*` overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; missing or unparsable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |var: &str| lookup(var);
        Self {
            max_connections: parse_or(
                read("TOPICDIGEST_DB_MAX_CONNECTIONS"),
                defaults.max_connections,
            ),
            min_connections: parse_or(
                read("TOPICDIGEST_DB_MIN_CONNECTIONS"),
                defaults.min_connections,
            ),
            acquire_timeout_secs: parse_or(
                read("TOPICDIGEST_DB_ACQUIRE_TIMEOUT_SECS"),
                defaults.acquire_timeout_secs,
            ),
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Open a pool against `database_url`.
///
/// # Errors
///
/// Returns [`DbError::MissingDatabaseUrl`] when no URL is configured, or
/// [`DbError::Sqlx`] if the connection cannot be established.
pub async fn connect_pool(database_url: Option<&str>, config: PoolConfig) -> Result<PgPool, DbError> {
    let url = database_url
        .filter(|u| !u.is_empty())
        .ok_or(DbError::MissingDatabaseUrl)?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(url)
        .await?;
    tracing::debug!(
        max_connections = config.max_connections,
        "connected to postgres"
    );
    Ok(pool)
}

/// `SELECT 1` round trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn lookup_overrides_and_ignores_garbage() {
        let vars = HashMap::from([
            ("TOPICDIGEST_DB_MAX_CONNECTIONS", "12"),
            ("TOPICDIGEST_DB_MIN_CONNECTIONS", "lots"),
        ]);

        let config = PoolConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.max_connections, 12);
        assert_eq!(config.min_connections, PoolConfig::default().min_connections);
        assert_eq!(config.acquire_timeout_secs, 10);
    }

    #[tokio::test]
    async fn missing_url_is_reported_before_connecting() {
        let err = connect_pool(None, PoolConfig::default()).await.unwrap_err();
        assert!(matches!(err, DbError::MissingDatabaseUrl));

        let err = connect_pool(Some(""), PoolConfig::default()).await.unwrap_err();
        assert!(matches!(err, DbError::MissingDatabaseUrl));
    }
}
