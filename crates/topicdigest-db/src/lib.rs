//! Postgres persistence for topic snapshots and digests.

use thiserror::Error;

pub mod migrate;
pub mod pool;
pub mod snapshots;
pub mod store;
pub mod summaries;

pub use migrate::run_migrations;
pub use pool::{connect_pool, ping, PoolConfig};
pub use snapshots::{load_snapshot, save_snapshot};
pub use store::PgStore;
pub use summaries::{insert_summary, latest_summary, list_summaries, SummaryRow};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}
