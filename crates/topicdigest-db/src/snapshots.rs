//! Database operations for `topic_snapshots`.

use sqlx::types::Json;
use sqlx::PgPool;
use topicdigest_core::ClusterSnapshot;

use crate::DbError;

/// The stored snapshot for `topic_id`, if any run has saved one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query or JSON decode fails.
pub async fn load_snapshot(pool: &PgPool, topic_id: &str) -> Result<Option<ClusterSnapshot>, DbError> {
    let row = sqlx::query_scalar::<_, Json<ClusterSnapshot>>(
        "SELECT clusters FROM topic_snapshots WHERE topic_id = $1",
    )
    .bind(topic_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|Json(snapshot)| snapshot))
}

/// Insert or replace the snapshot for `topic_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn save_snapshot(
    pool: &PgPool,
    topic_id: &str,
    snapshot: &ClusterSnapshot,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO topic_snapshots (topic_id, clusters, updated_at) \
         VALUES ($1, $2, NOW()) \
         ON CONFLICT (topic_id) DO UPDATE \
         SET clusters = EXCLUDED.clusters, updated_at = NOW()",
    )
    .bind(topic_id)
    .bind(Json(snapshot))
    .execute(pool)
    .await?;

    Ok(())
}
