mod history;
mod run;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use topicdigest_core::{AppConfig, DigestStore, Environment};
use topicdigest_db::PgStore;
use topicdigest_pipeline::MemoryStore;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "topicdigest")]
#[command(about = "Cluster news feeds per topic and publish digests when the news changes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the pipeline for every configured topic, or one
    Run {
        /// Only run the topic with this slug
        #[arg(long)]
        topic: Option<String>,
    },
    /// Show recent digests for a topic
    History {
        /// Topic slug
        #[arg(long)]
        topic: String,
        /// Maximum number of digests to show
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check the database connection
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = topicdigest_core::load_app_config_from_env().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Some(Commands::Run { topic }) => {
            let store = open_store(&config).await?;
            run::run_pipeline(&config, store, topic.as_deref()).await?;
        }
        Some(Commands::History { topic, limit }) => {
            let store = connect_pg(&config).await?;
            history::print_history(&store, &topic, limit).await?;
        }
        Some(Commands::Db { command }) => {
            let store = connect_pg(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = topicdigest_db::run_migrations(store.pool()).await?;
                    if applied.is_empty() {
                        println!("schema is up to date");
                    }
                    for migration in &applied {
                        println!("applied {migration}");
                    }
                }
                DbCommands::Ping => {
                    topicdigest_db::ping(store.pool()).await?;
                    println!("database connection ok");
                }
            }
        }
        None => println!("topicdigest: use --help to list commands"),
    }

    Ok(())
}

async fn connect_pg(config: &AppConfig) -> anyhow::Result<PgStore> {
    let pool = topicdigest_db::connect_pool(
        config.database_url.as_deref(),
        topicdigest_db::PoolConfig::from_env(),
    )
    .await
    .context("failed to connect to database")?;
    Ok(PgStore::new(pool))
}

/// Production runs must persist state between invocations.
fn ensure_memory_store_allowed(env: &Environment) -> anyhow::Result<()> {
    if *env == Environment::Production {
        anyhow::bail!("DATABASE_URL must be set when TOPICDIGEST_ENV=production");
    }
    Ok(())
}

/// Postgres when `DATABASE_URL` is set, otherwise an in-memory store that
/// lives only as long as this process.
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DigestStore>> {
    if config.database_url.is_some() {
        return Ok(Arc::new(connect_pg(config).await?));
    }
    ensure_memory_store_allowed(&config.env)?;
    tracing::warn!("DATABASE_URL not set; run state will not persist");
    Ok(Arc::new(MemoryStore::new()))
}
