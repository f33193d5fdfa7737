//! Database operations for `summaries`.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use topicdigest_core::{ClusterSnapshot, DigestDocument, Summary};
use uuid::Uuid;

use crate::DbError;

const SUMMARY_COLUMNS: &str = "id, topic_id, final_summary, clusters, cluster_summaries, \
                               number_of_articles, created_at";

/// A row from the `summaries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SummaryRow {
    pub id: Uuid,
    pub topic_id: String,
    pub final_summary: Json<DigestDocument>,
    pub clusters: Json<ClusterSnapshot>,
    pub cluster_summaries: Json<Vec<String>>,
    /// The schema defines this as `INTEGER NOT NULL`, never negative.
    pub number_of_articles: i32,
    pub created_at: DateTime<Utc>,
}

impl From<SummaryRow> for Summary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            topic_id: row.topic_id,
            final_summary: row.final_summary.0,
            clusters: row.clusters.0,
            cluster_summaries: row.cluster_summaries.0,
            number_of_articles: usize::try_from(row.number_of_articles).unwrap_or(0),
            created_at: row.created_at,
        }
    }
}

/// Insert one summary. Summaries are never updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_summary(pool: &PgPool, summary: &Summary) -> Result<(), DbError> {
    let number_of_articles = i32::try_from(summary.number_of_articles).unwrap_or(i32::MAX);

    sqlx::query(
        "INSERT INTO summaries \
         (id, topic_id, final_summary, clusters, cluster_summaries, number_of_articles, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(summary.id)
    .bind(&summary.topic_id)
    .bind(Json(&summary.final_summary))
    .bind(Json(&summary.clusters))
    .bind(Json(&summary.cluster_summaries))
    .bind(number_of_articles)
    .bind(summary.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// The most recent summary for `topic_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_summary(pool: &PgPool, topic_id: &str) -> Result<Option<Summary>, DbError> {
    let row = sqlx::query_as::<_, SummaryRow>(&format!(
        "SELECT {SUMMARY_COLUMNS} FROM summaries \
         WHERE topic_id = $1 ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(topic_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Summary::from))
}

/// Up to `limit` summaries for `topic_id`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_summaries(
    pool: &PgPool,
    topic_id: &str,
    limit: usize,
) -> Result<Vec<Summary>, DbError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = sqlx::query_as::<_, SummaryRow>(&format!(
        "SELECT {SUMMARY_COLUMNS} FROM summaries \
         WHERE topic_id = $1 ORDER BY created_at DESC LIMIT $2"
    ))
    .bind(topic_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Summary::from).collect())
}
