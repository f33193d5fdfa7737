//! Schema migrations embedded from `<workspace-root>/migrations/`.

use std::collections::HashSet;

use sqlx::PgPool;

use crate::DbError;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Apply pending migrations and return the descriptions of the ones that ran,
/// in version order.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let before = applied_versions(pool).await;
    MIGRATOR.run(pool).await?;

    let applied: Vec<String> = MIGRATOR
        .iter()
        .filter(|m| !before.contains(&m.version))
        .map(|m| format!("{} {}", m.version, m.description))
        .collect();
    tracing::info!(count = applied.len(), "migrations applied");
    Ok(applied)
}

// A fresh database has no _sqlx_migrations table yet.
async fn applied_versions(pool: &PgPool) -> HashSet<i64> {
    sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success = true")
        .fetch_all(pool)
        .await
        .map(|versions| versions.into_iter().collect())
        .unwrap_or_default()
}
