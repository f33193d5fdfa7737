//! Shared domain types and configuration for the topicdigest workspace.

pub mod app_config;
pub mod config;
pub mod digest;
pub mod snapshot;
pub mod store;
pub mod topics;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, RunSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use digest::{DigestDocument, Story, Summary};
pub use snapshot::{ArticleRef, ClusterSnapshot, SnapshotCluster};
pub use store::{DigestStore, StoreError};
pub use topics::{load_topics, Topic, TopicConfig, TopicsFile};
pub use types::{Article, Cluster};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read topics file {path}: {source}")]
    TopicsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse topics file: {0}")]
    TopicsFileParse(#[from] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
