use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightsError>;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Table error: {0}")]
    Table(#[from] table::TableError),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod assistant;
pub mod commands;
pub mod completion;
pub mod config;
pub mod embeddings;
pub mod stats;
pub mod table;
pub mod vector_index;
